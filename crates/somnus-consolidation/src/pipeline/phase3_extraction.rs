//! Phase 3: Extraction. Clusters are extracted in parallel on the engine's
//! bounded pool; cancellation is honored between clusters.

use rayon::prelude::*;
use rayon::ThreadPool;

use somnus_core::models::ConsolidationStrategy;
use somnus_observability::extraction_span;

use crate::extraction::{Cluster, ExtractionResult, PatternExtractor};
use crate::scheduling::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct ExtractionPhase {
    /// Parallel to the input clusters. `None` for clusters skipped after
    /// cancellation.
    pub results: Vec<Option<ExtractionResult>>,
    pub cancelled: bool,
}

pub fn extract_all(
    pool: &ThreadPool,
    extractor: &PatternExtractor,
    clusters: &[Cluster],
    strategy: ConsolidationStrategy,
    cancel: &CancellationToken,
) -> ExtractionPhase {
    let results: Vec<Option<ExtractionResult>> = pool.install(|| {
        clusters
            .par_iter()
            .map(|cluster| {
                if cancel.is_cancelled() {
                    return None;
                }
                let _span = extraction_span!(cluster.index, cluster.support()).entered();
                Some(extractor.extract(cluster, strategy))
            })
            .collect()
    });
    let cancelled = results.iter().any(Option::is_none);
    ExtractionPhase { results, cancelled }
}
