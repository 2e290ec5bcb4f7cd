//! Phase 2: Clustering. Partition the selected events and attach per-event
//! evidence so extraction works on self-contained clusters.

use somnus_core::models::EpisodicEvent;

use crate::clustering::EventClusterer;
use crate::evidence::EvidenceInferencer;
use crate::extraction::Cluster;

/// Build extraction-ready clusters. `embeddings` is parallel to `events`.
/// Cluster `index` is the position in the returned list.
pub fn build_clusters(
    clusterer: &EventClusterer,
    inferencer: &EvidenceInferencer,
    events: &[EpisodicEvent],
    embeddings: &[Option<Vec<f32>>],
) -> Vec<Cluster> {
    clusterer
        .cluster(events, embeddings)
        .into_iter()
        .enumerate()
        .map(|(index, members)| {
            let cluster_events = members.iter().map(|&i| events[i].clone()).collect();
            let cluster_embeddings = members
                .iter()
                .map(|&i| embeddings.get(i).cloned().flatten())
                .collect();
            Cluster::new(index, cluster_events, cluster_embeddings, inferencer)
        })
        .collect()
}
