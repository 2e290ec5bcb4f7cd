//! Value conflicts: different numbers, or opposite qualifiers, for the same
//! subject.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use somnus_core::similarity::tokenize;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid number regex"));

/// Opposing qualifier pairs. A negative that contains its positive
/// ("must not" / "must") is checked first.
const NEGATION_PAIRS: &[(&str, &str)] = &[
    ("always", "never"),
    ("must", "must not"),
    ("should", "should not"),
    ("enable", "disable"),
    ("enabled", "disabled"),
    ("allow", "deny"),
    ("include", "exclude"),
    ("use", "avoid"),
    ("prefer", "avoid"),
    ("required", "forbidden"),
    ("do", "don't"),
    ("can", "cannot"),
    ("safe", "unsafe"),
    ("secure", "insecure"),
    ("correct", "incorrect"),
    ("valid", "invalid"),
];

/// Words that qualify a claim rather than name its subject.
pub fn is_qualifier_word(token: &str) -> bool {
    NEGATION_PAIRS
        .iter()
        .flat_map(|(pos, neg)| pos.split(' ').chain(neg.split(' ')))
        .any(|w| w == token)
}

fn numbers(text: &str) -> BTreeSet<String> {
    NUMBER_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split(' ').collect();
    tokens
        .windows(words.len())
        .any(|w| w.iter().zip(&words).all(|(t, p)| t == p))
}

/// `Some(true)` for the positive side of a pair, `Some(false)` for the
/// negative side, `None` when neither appears.
fn side(tokens: &[String], pos: &str, neg: &str) -> Option<bool> {
    if contains_phrase(tokens, neg) {
        Some(false)
    } else if contains_phrase(tokens, pos) {
        Some(true)
    } else {
        None
    }
}

pub fn detect(a: &str, b: &str) -> Option<String> {
    let (na, nb) = (numbers(a), numbers(b));
    if !na.is_empty() && !nb.is_empty() && na != nb {
        return Some(format!("value conflict: '{a}' vs '{b}' disagree on a number"));
    }

    let (ta, tb) = (tokenize(a), tokenize(b));
    for (pos, neg) in NEGATION_PAIRS {
        if let (Some(sa), Some(sb)) = (side(&ta, pos, neg), side(&tb, pos, neg)) {
            if sa != sb {
                return Some(format!("value conflict: '{a}' vs '{b}' ({pos} / {neg})"));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn different_numbers_conflict() {
        assert!(detect("request timeout is 30 seconds", "request timeout is 60 seconds").is_some());
        assert!(detect("request timeout is 30 seconds", "request timeout is 30 seconds").is_none());
    }

    #[test]
    fn negation_pairs_conflict() {
        assert!(detect("always squash commits", "never squash commits").is_some());
        assert!(detect("you must pin versions", "you must not pin versions").is_some());
    }

    #[test]
    fn negative_containing_positive_is_not_self_conflict() {
        assert!(detect("must not pin versions", "must not pin versions").is_none());
    }
}
