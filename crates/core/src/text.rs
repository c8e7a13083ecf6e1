//! Text normalization: tokenizing raw text into words and stemming those words to
//! their canonical index terms.

use rust_stemmers::{Algorithm, Stemmer};

/// Lowercase the input, replace every character that is not an ASCII letter with a
/// single space, split on whitespace runs, and return the non-empty tokens in order.
pub fn parse(text: &str) -> Vec<String> {
    let lowered = text.to_ascii_lowercase();
    let mut normalized = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_ascii_lowercase() {
            normalized.push(c);
        } else {
            normalized.push(' ');
        }
    }
    normalized.split_whitespace().map(str::to_string).collect()
}

/// Apply the English Snowball stemming algorithm to a single word.
pub fn stem(word: &str) -> String {
    thread_local! {
        static STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    }
    STEMMER.with(|s| s.stem(word).into_owned())
}

/// Tokenize and stem `text` in one pass, returning stemmed terms in document order.
pub fn parse_and_stem(text: &str) -> Vec<String> {
    parse(text).into_iter().map(|w| stem(&w)).collect()
}
