//! Scripted reasoning collaborators for slow-path tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use somnus_core::errors::{CollaboratorError, SomnusResult};
use somnus_core::traits::IReasoner;

/// Answers every prompt with the next scripted reply (the last one repeats).
/// Records prompts for inspection.
pub struct ScriptedReasoner {
    replies: Vec<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedReasoner {
    pub fn new(reply: &str) -> Self {
        Self::sequence(&[reply])
    }

    pub fn sequence(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl IReasoner for ScriptedReasoner {
    fn reason(&self, prompt: &str, _timeout: Duration) -> SomnusResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let idx = n.min(self.replies.len().saturating_sub(1));
        self.replies.get(idx).cloned().ok_or_else(|| {
            CollaboratorError::MalformedResponse {
                collaborator: "scripted-reasoner".to_string(),
                reason: "no replies scripted".to_string(),
            }
            .into()
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Sleeps for `delay` before answering, ignoring the timeout it is given.
/// Exercises the extractor's own deadline.
pub struct SlowReasoner {
    delay: Duration,
    reply: String,
    calls: AtomicUsize,
}

impl SlowReasoner {
    pub fn new(delay: Duration, reply: &str) -> Self {
        Self {
            delay,
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IReasoner for SlowReasoner {
    fn reason(&self, _prompt: &str, _timeout: Duration) -> SomnusResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "slow"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Always errors, counting calls.
#[derive(Default)]
pub struct FailingReasoner {
    calls: AtomicUsize,
}

impl FailingReasoner {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IReasoner for FailingReasoner {
    fn reason(&self, _prompt: &str, _timeout: Duration) -> SomnusResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CollaboratorError::Unavailable {
            collaborator: "failing-reasoner".to_string(),
            reason: "connection refused".to_string(),
        }
        .into())
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// A configured reasoner whose service can be taken down and brought back.
/// Answers with `reply` only while online; availability changes show up
/// after the next health check.
pub struct OfflineReasoner {
    online: AtomicBool,
    available: AtomicBool,
    reply: String,
    calls: AtomicUsize,
}

impl OfflineReasoner {
    pub fn new(reply: &str) -> Self {
        Self {
            online: AtomicBool::new(false),
            available: AtomicBool::new(false),
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IReasoner for OfflineReasoner {
    fn reason(&self, _prompt: &str, _timeout: Duration) -> SomnusResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.online.load(Ordering::SeqCst) {
            Ok(self.reply.clone())
        } else {
            Err(CollaboratorError::Unavailable {
                collaborator: "offline-reasoner".to_string(),
                reason: "connection refused".to_string(),
            }
            .into())
        }
    }

    fn name(&self) -> &str {
        "offline"
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn health_check(&self) -> bool {
        let online = self.online.load(Ordering::SeqCst);
        self.available.store(online, Ordering::SeqCst);
        online
    }
}
