//! EventClusterer: groups unconsolidated events into candidate clusters.
//!
//! Signals, applied greedily in priority order:
//! 1. same `session_id` → same cluster
//! 2. timestamp gap ≤ proximity threshold → same cluster; an event near two
//!    clusters joins the one whose latest event is most recent
//! 3. embedding cosine ≥ similarity threshold → same cluster (union-find)
//!
//! Events are visited in `(timestamp, id)` order, so the partition only
//! depends on the input set.

use std::collections::HashMap;

use chrono::Duration;

use somnus_core::config::ConsolidationConfig;
use somnus_core::models::EpisodicEvent;

use crate::algorithms::similarity::cosine_similarity;
use crate::algorithms::union_find::UnionFind;

#[derive(Debug, Clone)]
pub struct EventClusterer {
    proximity: Duration,
    similarity_threshold: f64,
}

/// A growing cluster during the greedy pass.
struct Group<'a> {
    members: Vec<usize>,
    session: Option<&'a str>,
    latest: chrono::DateTime<chrono::Utc>,
}

impl EventClusterer {
    pub fn new(config: &ConsolidationConfig) -> Self {
        Self {
            proximity: config.proximity(),
            similarity_threshold: config.similarity_threshold,
        }
    }

    /// Partition `events` into clusters of indices into `events`.
    ///
    /// `embeddings` is parallel to `events`; a `None` entry (or a short
    /// slice) disables the similarity signal for that event. Every event
    /// lands in exactly one cluster. Members are in `(timestamp, id)` order
    /// and clusters are ordered by their earliest member.
    pub fn cluster(
        &self,
        events: &[EpisodicEvent],
        embeddings: &[Option<Vec<f32>>],
    ) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..events.len()).collect();
        order.sort_by(|&a, &b| {
            events[a]
                .timestamp
                .cmp(&events[b].timestamp)
                .then_with(|| events[a].id.cmp(&events[b].id))
        });

        let mut groups: Vec<Group<'_>> = Vec::new();
        let mut by_session: HashMap<&str, usize> = HashMap::new();

        for &i in &order {
            let event = &events[i];
            let session = event.session_id();

            let target = session
                .and_then(|s| by_session.get(s).copied())
                .or_else(|| self.nearest_group(&groups, event, session));

            match target {
                Some(g) => {
                    let group = &mut groups[g];
                    group.members.push(i);
                    group.latest = group.latest.max(event.timestamp);
                    if group.session.is_none() {
                        group.session = session;
                    }
                    if let Some(s) = session {
                        by_session.entry(s).or_insert(g);
                    }
                }
                None => {
                    if let Some(s) = session {
                        by_session.insert(s, groups.len());
                    }
                    groups.push(Group {
                        members: vec![i],
                        session,
                        latest: event.timestamp,
                    });
                }
            }
        }

        self.merge_similar(events, embeddings, groups)
    }

    /// Group whose latest event is within the proximity threshold, preferring
    /// the most recent. A group bound to another session is not a candidate.
    fn nearest_group(
        &self,
        groups: &[Group<'_>],
        event: &EpisodicEvent,
        session: Option<&str>,
    ) -> Option<usize> {
        groups
            .iter()
            .enumerate()
            .filter(|(_, g)| match (g.session, session) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            })
            .filter(|(_, g)| (event.timestamp - g.latest).abs() <= self.proximity)
            .max_by(|(ia, a), (ib, b)| a.latest.cmp(&b.latest).then(ia.cmp(ib)))
            .map(|(idx, _)| idx)
    }

    fn merge_similar(
        &self,
        events: &[EpisodicEvent],
        embeddings: &[Option<Vec<f32>>],
        groups: Vec<Group<'_>>,
    ) -> Vec<Vec<usize>> {
        let mut group_of = vec![0usize; events.len()];
        for (g, group) in groups.iter().enumerate() {
            for &m in &group.members {
                group_of[m] = g;
            }
        }

        let mut uf = UnionFind::new(groups.len());
        let embedded: Vec<(usize, &[f32])> = embeddings
            .iter()
            .take(events.len())
            .enumerate()
            .filter_map(|(i, e)| e.as_deref().map(|v| (i, v)))
            .collect();
        for (x, &(i, ei)) in embedded.iter().enumerate() {
            for &(j, ej) in &embedded[x + 1..] {
                if uf.find(group_of[i]) == uf.find(group_of[j]) {
                    continue;
                }
                if cosine_similarity(ei, ej) >= self.similarity_threshold {
                    uf.union(group_of[i], group_of[j]);
                }
            }
        }

        let mut merged: HashMap<usize, Vec<usize>> = HashMap::new();
        for (g, group) in groups.into_iter().enumerate() {
            merged.entry(uf.find(g)).or_default().extend(group.members);
        }

        let mut clusters: Vec<Vec<usize>> = merged.into_values().collect();
        for cluster in &mut clusters {
            cluster.sort_by(|&a, &b| {
                events[a]
                    .timestamp
                    .cmp(&events[b].timestamp)
                    .then_with(|| events[a].id.cmp(&events[b].id))
            });
        }
        clusters.sort_by(|a, b| {
            let (ea, eb) = (&events[a[0]], &events[b[0]]);
            ea.timestamp.cmp(&eb.timestamp).then_with(|| ea.id.cmp(&eb.id))
        });
        clusters
    }
}
