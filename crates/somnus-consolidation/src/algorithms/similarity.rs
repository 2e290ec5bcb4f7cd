//! Cluster cohesion: average pairwise similarity of a cluster's members.

pub use somnus_core::similarity::{cosine_similarity, token_jaccard};

/// Average pairwise cosine similarity when every member has an embedding,
/// otherwise average pairwise token Jaccard over `texts`. Negative cosine
/// counts as 0. A singleton has no pairs and scores 0.0.
pub fn cohesion(texts: &[&str], embeddings: &[Option<&[f32]>]) -> f64 {
    let n = texts.len();
    if n < 2 {
        return 0.0;
    }
    let all_embedded = embeddings.len() == n && embeddings.iter().all(Option::is_some);

    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            let sim = match (all_embedded, embeddings.get(i), embeddings.get(j)) {
                (true, Some(Some(a)), Some(Some(b))) => cosine_similarity(a, b).max(0.0),
                _ => token_jaccard(texts[i], texts[j]),
            };
            total += sim;
            pairs += 1;
        }
    }
    total / pairs as f64
}
