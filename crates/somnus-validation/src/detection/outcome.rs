//! Outcome conflicts: the same action reported as both success and failure.

use somnus_core::similarity::tokenize;

const SUCCESS_WORDS: &[&str] = &[
    "succeeded", "succeeds", "success", "successful", "passed", "passes", "pass", "worked",
    "works", "fixed", "ok", "green",
];

const FAILURE_WORDS: &[&str] = &[
    "failed", "fails", "fail", "failure", "broke", "broken", "crashed", "crashes", "error",
    "errored", "regressed", "red",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Success,
    Failure,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::Success => "success",
            Polarity::Failure => "failure",
        }
    }

    /// Parse an explicit outcome label such as a context `outcome` value.
    pub fn from_label(label: &str) -> Option<Self> {
        polarity(label)
    }
}

pub fn is_polarity_word(token: &str) -> bool {
    SUCCESS_WORDS.contains(&token) || FAILURE_WORDS.contains(&token)
}

/// Outcome polarity of a text. Mixed or absent signals yield `None`.
pub fn polarity(text: &str) -> Option<Polarity> {
    let tokens = tokenize(text);
    let success = tokens.iter().any(|t| SUCCESS_WORDS.contains(&t.as_str()));
    let failure = tokens.iter().any(|t| FAILURE_WORDS.contains(&t.as_str()));
    match (success, failure) {
        (true, false) => Some(Polarity::Success),
        (false, true) => Some(Polarity::Failure),
        _ => None,
    }
}

pub fn detect(a: &str, b: &str) -> Option<String> {
    match (polarity(a)?, polarity(b)?) {
        (pa, pb) if pa != pb => Some(format!(
            "outcome conflict: '{a}' reports {} but '{b}' reports {}",
            pa.as_str(),
            pb.as_str()
        )),
        _ => None,
    }
}
