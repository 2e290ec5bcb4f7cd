//! Consolidation monitoring: bounded run history and a health dashboard.

pub mod dashboard;
pub mod history;

pub use dashboard::ConsolidationDashboard;
pub use history::RunHistory;
