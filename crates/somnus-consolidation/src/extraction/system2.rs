//! System 2: validated extraction through the reasoner.
//!
//! The reasoner runs on its own thread and the extractor enforces the
//! timeout itself, so a reasoner that ignores its deadline cannot stall a
//! worker. Failed attempts are retried with doubling backoff.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use somnus_core::config::SlowPathConfig;
use somnus_core::errors::{CollaboratorError, SomnusResult};
use somnus_core::models::{Pattern, PatternType};
use somnus_core::traits::IReasoner;

use super::Cluster;

/// How reply patterns combine with the System-1 candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlowPathAction {
    Replace,
    Augment,
}

#[derive(Debug, Clone, Deserialize)]
struct RawReply {
    action: SlowPathAction,
    confidence: f64,
    #[serde(default)]
    patterns: Vec<RawPattern>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPattern {
    pattern_type: PatternType,
    description: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    evidence_refs: Vec<String>,
}

/// A validated reasoner reply.
#[derive(Debug, Clone, PartialEq)]
pub struct SlowPathReply {
    pub action: SlowPathAction,
    pub confidence: f64,
    pub patterns: Vec<Pattern>,
}

pub fn build_prompt(cluster: &Cluster, candidates: &[Pattern], system1_confidence: f64) -> String {
    let mut prompt = String::from(
        "You consolidate episodic events into durable knowledge.\n\
         Events (id | type | content):\n",
    );
    for event in &cluster.events {
        prompt.push_str(&format!(
            "- {} | {} | {}\n",
            event.id,
            event.event_type.as_str(),
            event.content
        ));
    }
    prompt.push_str(&format!(
        "\nHeuristic candidates (confidence {system1_confidence:.2}):\n"
    ));
    if candidates.is_empty() {
        prompt.push_str("- none\n");
    }
    for p in candidates {
        prompt.push_str(&format!(
            "- {} | {} | refs {}\n",
            p.pattern_type.as_str(),
            p.description,
            p.evidence_refs.join(",")
        ));
    }
    prompt.push_str(
        "\nReply with one JSON object only:\n\
         {\"action\": \"replace\" | \"augment\", \"confidence\": 0.0-1.0, \
         \"patterns\": [{\"pattern_type\": \"frequency\" | \"temporal\" | \"causal\" | \
         \"procedural\", \"description\": \"...\", \"confidence\": 0.0-1.0, \
         \"evidence_refs\": [\"event id\", ...]}]}\n",
    );
    prompt
}

/// Parse the first balanced `{ ... }` block of `reply`.
///
/// Evidence refs outside the cluster are dropped; a pattern left with no refs
/// cites the whole cluster. Patterns without a description are skipped.
pub fn parse_reply(reply: &str, cluster_ids: &[String]) -> Result<SlowPathReply, CollaboratorError> {
    let malformed = |reason: String| CollaboratorError::MalformedResponse {
        collaborator: "reasoner".to_string(),
        reason,
    };
    let block = first_json_object(reply).ok_or_else(|| malformed("no JSON object".to_string()))?;
    let raw: RawReply =
        serde_json::from_str(block).map_err(|e| malformed(format!("invalid reply: {e}")))?;
    if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
        return Err(malformed(format!("confidence out of range: {}", raw.confidence)));
    }

    let patterns = raw
        .patterns
        .into_iter()
        .filter(|p| !p.description.trim().is_empty())
        .map(|p| {
            let mut refs: Vec<String> = Vec::new();
            for r in p.evidence_refs {
                if cluster_ids.contains(&r) && !refs.contains(&r) {
                    refs.push(r);
                }
            }
            if refs.is_empty() {
                refs = cluster_ids.to_vec();
            }
            let confidence = p
                .confidence
                .filter(|c| c.is_finite())
                .unwrap_or(raw.confidence)
                .clamp(0.0, 1.0);
            Pattern {
                pattern_type: p.pattern_type,
                description: p.description.trim().to_string(),
                confidence,
                support: refs.len(),
                evidence_refs: refs,
            }
        })
        .collect();

    Ok(SlowPathReply {
        action: raw.action,
        confidence: raw.confidence,
        patterns,
    })
}

fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Detached reasoner threads with a cap on how many may be alive at once.
///
/// A call that times out abandons its thread, which keeps running until the
/// reasoner returns. Reasoners get the same deadline (the Ollama client sets
/// it on the request) so well-behaved ones exit with the timeout; the cap
/// keeps ones that ignore it from piling up threads.
#[derive(Debug)]
pub struct ReasonerWorkers {
    in_flight: Arc<AtomicUsize>,
    limit: usize,
}

struct InFlightSlot(Arc<AtomicUsize>);

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ReasonerWorkers {
    pub fn new(limit: usize) -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            limit: limit.max(1),
        }
    }

    /// Reasoner threads still running, abandoned ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Option<InFlightSlot> {
        self.in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.limit).then_some(n + 1)
            })
            .ok()
            .map(|_| InFlightSlot(Arc::clone(&self.in_flight)))
    }

    /// One reasoner call bounded by `timeout`.
    pub fn call(
        &self,
        reasoner: &Arc<dyn IReasoner>,
        prompt: &str,
        timeout: Duration,
    ) -> SomnusResult<String> {
        let slot = self.acquire().ok_or_else(|| CollaboratorError::Unavailable {
            collaborator: reasoner.name().to_string(),
            reason: format!("{} reasoner calls still running", self.limit),
        })?;
        let (tx, rx) = mpsc::channel();
        let worker = Arc::clone(reasoner);
        let prompt = prompt.to_string();
        thread::Builder::new()
            .name("somnus-reasoner".to_string())
            .spawn(move || {
                let _slot = slot;
                let _ = tx.send(worker.reason(&prompt, timeout));
            })
            .map_err(|e| CollaboratorError::Unavailable {
                collaborator: reasoner.name().to_string(),
                reason: format!("could not spawn reasoner thread: {e}"),
            })?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(CollaboratorError::Timeout {
                collaborator: reasoner.name().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
            .into()),
            Err(RecvTimeoutError::Disconnected) => Err(CollaboratorError::Unavailable {
                collaborator: reasoner.name().to_string(),
                reason: "reasoner thread exited without a reply".to_string(),
            }
            .into()),
        }
    }
}

/// Call and parse, retrying up to `config.max_retries` times.
pub fn reason(
    workers: &ReasonerWorkers,
    reasoner: &Arc<dyn IReasoner>,
    prompt: &str,
    cluster_ids: &[String],
    config: &SlowPathConfig,
) -> SomnusResult<SlowPathReply> {
    let mut backoff = Duration::from_millis(config.backoff_ms);
    let mut attempt = 0u32;
    loop {
        let result = workers
            .call(reasoner, prompt, config.timeout())
            .and_then(|text| parse_reply(&text, cluster_ids).map_err(Into::into));
        match result {
            Ok(reply) => {
                debug!(attempt, patterns = reply.patterns.len(), "slow path answered");
                return Ok(reply);
            }
            Err(e) if attempt < config.max_retries => {
                warn!(attempt, error = %e, backoff_ms = backoff.as_millis() as u64, "slow path attempt failed, retrying");
                if !backoff.is_zero() {
                    thread::sleep(backoff);
                }
                backoff *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
