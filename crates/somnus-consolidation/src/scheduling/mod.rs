//! Run scheduling: per-project exclusivity, cooperative cancellation, and
//! write throttling.

pub mod cancellation;
pub mod locks;
pub mod throttle;

pub use cancellation::CancellationToken;
pub use locks::{ProjectGuard, ProjectLocks};
pub use throttle::{Throttle, ThrottleConfig};
