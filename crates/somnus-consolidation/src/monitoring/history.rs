//! Bounded history of run reports, oldest evicted first.

use std::collections::VecDeque;

use somnus_core::constants::MAX_RUN_HISTORY;
use somnus_core::models::RunReport;

#[derive(Debug, Clone)]
pub struct RunHistory {
    reports: VecDeque<RunReport>,
    capacity: usize,
}

impl RunHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            reports: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, report: RunReport) {
        if self.reports.len() == self.capacity {
            self.reports.pop_front();
        }
        self.reports.push_back(report);
    }

    /// Most recent report first.
    pub fn recent(&self, limit: usize) -> Vec<RunReport> {
        self.reports.iter().rev().take(limit).cloned().collect()
    }

    /// Most recent report of one project.
    pub fn latest_for(&self, project_id: &str) -> Option<&RunReport> {
        self.reports.iter().rev().find(|r| r.project_id == project_id)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

impl Default for RunHistory {
    fn default() -> Self {
        Self::new(MAX_RUN_HISTORY)
    }
}
