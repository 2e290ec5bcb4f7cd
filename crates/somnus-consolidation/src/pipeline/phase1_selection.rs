//! Phase 1: Selection. Unconsolidated events of the project inside the
//! lookback window, embedded in one batch.

use chrono::Duration;

use somnus_core::errors::SomnusResult;
use somnus_core::models::{ConsolidationState, EpisodicEvent};
use somnus_core::traits::{IEmbeddingProvider, IEventStore};

/// Fetch the run's input events in `(timestamp, id)` order.
///
/// Rows of other projects or already consolidated rows are dropped even if
/// the store returns them.
pub fn select_events(
    store: &dyn IEventStore,
    project_id: &str,
    lookback: Duration,
) -> SomnusResult<Vec<EpisodicEvent>> {
    let mut events: Vec<EpisodicEvent> = store
        .get_unconsolidated(project_id, lookback)?
        .into_iter()
        .filter(|e| {
            e.project_id == project_id
                && e.consolidation_state == ConsolidationState::Unconsolidated
        })
        .collect();
    events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
    Ok(events)
}

/// Embeddings parallel to `events`, plus the failure that forced a fallback.
///
/// Any failure leaves every slot `None` so clustering falls back to session
/// and time proximity for the whole run.
pub fn embed_events(
    embedder: &dyn IEmbeddingProvider,
    events: &[EpisodicEvent],
) -> (Vec<Option<Vec<f32>>>, Option<String>) {
    if events.is_empty() {
        return (Vec::new(), None);
    }
    let none = || vec![None; events.len()];
    // Probed per run so an outage at startup does not outlive its cause.
    if !embedder.health_check() {
        return (none(), Some(format!("{} unavailable", embedder.name())));
    }

    let texts: Vec<String> = events.iter().map(|e| e.content.clone()).collect();
    match embedder.embed_batch(&texts) {
        Ok(vectors) if vectors.len() == events.len() => {
            (vectors.into_iter().map(Some).collect(), None)
        }
        Ok(vectors) => (
            none(),
            Some(format!(
                "{} returned {} embeddings for {} events",
                embedder.name(),
                vectors.len(),
                events.len()
            )),
        ),
        Err(e) => (none(), Some(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::{EventBuilder, FailingEmbedder, HashEmbedder};

    #[test]
    fn embeds_every_event() {
        let events = vec![
            EventBuilder::new("e1", "ran migrations").build(),
            EventBuilder::new("e2", "tests passed").build(),
        ];
        let (vectors, failure) = embed_events(&HashEmbedder::default(), &events);
        assert!(failure.is_none());
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.is_some()));
    }

    #[test]
    fn failure_falls_back_to_no_embeddings() {
        let events = vec![EventBuilder::new("e1", "ran migrations").build()];
        let (vectors, failure) = embed_events(&FailingEmbedder::default(), &events);
        assert!(failure.is_some());
        assert_eq!(vectors, vec![None]);
    }

    #[test]
    fn empty_input_is_not_a_failure() {
        let (vectors, failure) = embed_events(&FailingEmbedder::default(), &[]);
        assert!(vectors.is_empty());
        assert!(failure.is_none());
    }
}
