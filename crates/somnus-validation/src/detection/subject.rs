//! Subject extraction: what a statement is about, minus the words that say
//! how it turned out.

use somnus_core::similarity::{jaccard, tokenize};

use super::{outcome, value};

/// Subjects match at this token Jaccard or above.
pub const SUBJECT_MATCH_THRESHOLD: f64 = 0.5;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "it", "its", "of", "to", "in",
    "on", "at", "for", "with", "and", "or", "but", "not", "no", "this", "that", "these", "those",
    "we", "our", "i", "they", "has", "have", "had", "did", "does", "when", "after", "before",
    "by", "as", "again", "still", "then", "now",
];

/// Content tokens that name the subject of a statement.
pub fn subject_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| {
            !STOP_WORDS.contains(&t.as_str())
                && !outcome::is_polarity_word(t)
                && !value::is_qualifier_word(t)
                && t.parse::<f64>().is_err()
        })
        .collect()
}

pub fn same_subject(a: &str, b: &str) -> bool {
    let sa = subject_tokens(a);
    let sb = subject_tokens(b);
    if sa.is_empty() || sb.is_empty() {
        return false;
    }
    jaccard(sa.iter().map(String::as_str), sb.iter().map(String::as_str))
        >= SUBJECT_MATCH_THRESHOLD
}
