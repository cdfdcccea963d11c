//! Number recognition rules.
//!
//! Patterns are evaluated independently over the same text; overlapping
//! matches are left for the resolver to sort out. Word boundaries are
//! ASCII-only, so a digit run directly after a non-ASCII letter still counts.

use once_cell::sync::Lazy;
use regex::Regex;

const SOURCES: [(&str, &str); 7] = [
    // 716-923-4121, 716.923.4121, 716 923 4121
    ("separated", r"(?-u:\b)[0-9]{3}[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}(?-u:\b)"),
    // (716) 923-4121
    ("area_code", r"\([0-9]{3}\)\s?[0-9]{3}[-.\s]?[0-9]{4}(?-u:\b)"),
    // (716)-923-4121
    ("area_code_separated", r"\([0-9]{3}\)[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}(?-u:\b)"),
    // 1-855-VASPIAN, 1-800-GO-FEDEX
    (
        "vanity",
        r"(?-u:\b)[0-9]{1,3}[-.\s]?(?:[0-9]{3}|\([A-Za-z0-9]{3}\))[-.\s]?[A-Za-z][A-Za-z0-9\-.\s]{4,}(?-u:\b)",
    ),
    // (800) MATTRESS
    ("vanity_area_code", r"\([A-Za-z0-9]{3}\)\s?[A-Za-z][A-Za-z0-9\-.\s]{4,}(?-u:\b)"),
    // 7169234121, 17169234121
    ("bare", r"(?-u:\b)[0-9]{10,11}(?-u:\b)"),
    // +1 7169234121
    ("international", r"\+[0-9]{1,3}\s?[0-9]{10,11}(?-u:\b)"),
];

static PATTERNS: Lazy<Vec<NumberPattern>> = Lazy::new(|| {
    SOURCES
        .iter()
        .map(|(name, source)| NumberPattern {
            name,
            regex: Regex::new(source).expect("number pattern must compile"),
        })
        .collect()
});

/// One recognition rule.
#[derive(Debug)]
pub struct NumberPattern {
    name: &'static str,
    regex: Regex,
}

impl NumberPattern {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Every non-overlapping `(start, text)` match of this rule, left to right.
    pub fn find_all<'t>(&self, text: &'t str) -> impl Iterator<Item = (usize, &'t str)> {
        self.regex.find_iter(text).map(|m| (m.start(), m.as_str()))
    }
}

/// The registered patterns, in evaluation order.
pub fn patterns() -> &'static [NumberPattern] {
    &PATTERNS
}
