use chrono::Duration;

use crate::errors::SomnusResult;
use crate::models::EpisodicEvent;

/// The external raw event store.
pub trait IEventStore: Send + Sync {
    /// Unconsolidated events of `project_id` with a timestamp inside the
    /// lookback window ending now.
    fn get_unconsolidated(
        &self,
        project_id: &str,
        since: Duration,
    ) -> SomnusResult<Vec<EpisodicEvent>>;

    /// Flip the given events to `consolidated`.
    fn mark_consolidated(&self, event_ids: &[String]) -> SomnusResult<()>;
}
