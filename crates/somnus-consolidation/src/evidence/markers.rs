//! Marker phrase sets for evidence classification, matched case-insensitively
//! on word boundaries.

use std::sync::LazyLock;

use regex::Regex;

fn word_set(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("marker set is a valid regex")
}

pub static HEDGING: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "might", "may", "maybe", "possibly", "perhaps", "probably", "could be", "not sure",
        "unclear", "i think", "i guess",
    ])
});

pub static PREMISE: LazyLock<Regex> =
    LazyLock::new(|| word_set(&["based on", "given that", "since", "because of"]));

pub static CONCLUSION: LazyLock<Regex> =
    LazyLock::new(|| word_set(&["therefore", "thus", "hence", "so", "consequently"]));

pub static ATTRIBUTION: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "according to", "documentation says", "docs say", "per the docs", "the docs state",
        "reported by", "upstream says",
    ])
});

pub static LEARNING: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&["learned", "learnt", "lesson", "takeaway", "next time", "in hindsight"])
});

pub static INFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "seems", "seem", "appears", "appear", "suggests", "implies", "indicates", "likely",
    ])
});

/// Language marking one event as the consequence of another.
pub static CAUSAL: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "because", "caused", "causes", "led to", "leads to", "due to", "resulted in",
        "results in", "as a result", "triggered", "so that",
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_match_whole_words_only() {
        assert!(HEDGING.is_match("this might break"));
        assert!(!HEDGING.is_match("mighty fine"));
        assert!(CONCLUSION.is_match("So we rolled back"));
        assert!(!CONCLUSION.is_match("some tests"));
        assert!(ATTRIBUTION.is_match("According  to the RFC"));
        assert!(CAUSAL.is_match("timeouts led to retries"));
    }
}
