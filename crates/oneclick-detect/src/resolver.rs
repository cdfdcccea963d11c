//! Match resolution for a single run of text.

use std::collections::HashSet;

use crate::keypad::{canonical_dial_string, letters_to_digits};
use crate::patterns::patterns;

/// A validated number found in a text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberCandidate {
    /// The matched substring, exactly as it appears in the text.
    pub text: String,
    /// Byte offset of the match in the text.
    pub start: usize,
}

impl NumberCandidate {
    /// Byte offset just past the match.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Dial string for this candidate, see [`canonical_dial_string`].
    pub fn dial_string(&self) -> String {
        canonical_dial_string(&self.text)
    }
}

/// Digits of `text` after keypad mapping, ignoring everything else including `+`.
pub fn significant_digits(text: &str) -> String {
    letters_to_digits(text)
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

/// A candidate is dialable when it reduces to exactly 10 or 11 digits.
pub fn is_valid_number(text: &str) -> bool {
    matches!(significant_digits(text).len(), 10 | 11)
}

/// Run every pattern over `text` and return the surviving candidates by offset.
///
/// Matches sharing a start offset collapse to the one found first, in
/// pattern order. Overlaps at different offsets are kept; the rewriter
/// decides what to do with them.
pub fn resolve(text: &str) -> Vec<NumberCandidate> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut candidates: Vec<NumberCandidate> = patterns()
        .iter()
        .flat_map(|pattern| pattern.find_all(text))
        .filter(|(start, _)| seen.insert(*start))
        .filter(|(_, matched)| is_valid_number(matched))
        .map(|(start, matched)| NumberCandidate {
            text: matched.to_string(),
            start,
        })
        .collect();

    candidates.sort_by_key(|c| c.start);
    candidates
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
