//! One consolidation run per project, tracked in a concurrent map.

use std::sync::Arc;

use dashmap::DashMap;

/// Set of projects with a run in progress.
#[derive(Debug, Clone, Default)]
pub struct ProjectLocks {
    running: Arc<DashMap<String, String>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `project_id` for `run_id`. `None` if another run holds it.
    pub fn try_acquire(&self, project_id: &str, run_id: &str) -> Option<ProjectGuard> {
        match self.running.entry(project_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => None,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(run_id.to_string());
                Some(ProjectGuard {
                    running: Arc::clone(&self.running),
                    project_id: project_id.to_string(),
                })
            }
        }
    }

    pub fn is_running(&self, project_id: &str) -> bool {
        self.running.contains_key(project_id)
    }

    /// Run id currently holding `project_id`.
    pub fn holder(&self, project_id: &str) -> Option<String> {
        self.running.get(project_id).map(|r| r.value().clone())
    }
}

/// Releases the project when dropped.
#[derive(Debug)]
pub struct ProjectGuard {
    running: Arc<DashMap<String, String>>,
    project_id: String,
}

impl Drop for ProjectGuard {
    fn drop(&mut self) {
        self.running.remove(&self.project_id);
    }
}
