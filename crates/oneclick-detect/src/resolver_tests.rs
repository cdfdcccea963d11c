use super::*;
use proptest::prelude::*;

#[test]
fn test_empty_input() {
    assert!(resolve("").is_empty());
}

#[test]
fn test_common_formats() {
    for text in [
        "716-923-4121",
        "(716) 923-4121",
        "7169234121",
        "716.923.4121",
        "(716)-923-4121",
    ] {
        let candidates = resolve(text);
        assert_eq!(candidates.len(), 1, "{text}");
        assert_eq!(candidates[0].start, 0);
        assert_eq!(candidates[0].text, text);
        assert_eq!(significant_digits(&candidates[0].text).len(), 10);
    }
}

#[test]
fn test_vanity_number() {
    let candidates = resolve("1-855-VASPIAN");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].dial_string(), "18558277426");
    assert_eq!(significant_digits(&candidates[0].text).len(), 11);
}

#[test]
fn test_international_number() {
    let candidates = resolve("Dial +1 7169234121 from abroad");
    assert_eq!(candidates[0].start, 5);
    assert_eq!(candidates[0].text, "+1 7169234121");
    assert_eq!(candidates[0].dial_string(), "+17169234121");

    // The national part also matches on its own, starting inside the first match.
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[1].start, 8);
    assert!(candidates[1].start < candidates[0].end());
}

#[test]
fn test_sorted_by_offset() {
    let text = "Sales 800-555-1212 or support (716) 923-4121.";
    let candidates = resolve(text);
    let offsets: Vec<_> = candidates.iter().map(|c| c.start).collect();
    assert_eq!(offsets, vec![6, 30]);
    assert_eq!(candidates[1].text, "(716) 923-4121");
    assert_eq!(&text[candidates[1].start..candidates[1].end()], "(716) 923-4121");
}

#[test]
fn test_number_after_non_ascii_letter() {
    let text = "é7169234121";
    let candidates = resolve(text);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].start, 'é'.len_utf8());
    assert_eq!(candidates[0].text, "7169234121");
}

#[test]
fn test_invalid_digit_counts_rejected() {
    assert!(resolve("Room 555-1212").is_empty());
    assert!(resolve("Order 123456789").is_empty());
    assert!(resolve("Serial 123456789012").is_empty());
}

#[test]
fn test_same_offset_keeps_first_pattern() {
    // Both "separated" and "bare" match at 0; the first wins.
    let candidates = resolve("7169234121");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].text, "7169234121");
}

#[test]
fn test_is_valid_number() {
    assert!(is_valid_number("716-923-4121"));
    assert!(is_valid_number("1-800-FLOWERS"));
    assert!(is_valid_number("+1 7169234121"));
    assert!(!is_valid_number("923-4121"));
}

proptest! {
    #[test]
    fn prop_non_numeric_text_has_no_candidates(text in "[a-zA-Z ,.!?'\\-]{0,200}") {
        prop_assert!(resolve(&text).is_empty());
    }

    #[test]
    fn prop_dashed_numbers_resolve_once(a in "[0-9]{3}", b in "[0-9]{3}", c in "[0-9]{4}") {
        let text = format!("{a}-{b}-{c}");
        let candidates = resolve(&text);
        prop_assert_eq!(candidates.len(), 1);
        prop_assert_eq!(significant_digits(&candidates[0].text).len(), 10);
    }

    #[test]
    fn prop_parenthesized_numbers_resolve_once(a in "[0-9]{3}", b in "[0-9]{3}", c in "[0-9]{4}") {
        let text = format!("({a}) {b}-{c}");
        let candidates = resolve(&text);
        prop_assert_eq!(candidates.len(), 1);
        prop_assert_eq!(&candidates[0].text, &text);
        prop_assert_eq!(significant_digits(&candidates[0].text).len(), 10);
    }

    #[test]
    fn prop_bare_numbers_resolve_once(digits in "[0-9]{10}") {
        let candidates = resolve(&digits);
        prop_assert_eq!(candidates.len(), 1);
        prop_assert_eq!(&candidates[0].dial_string(), &digits);
    }

    #[test]
    fn prop_candidates_sorted_and_unique(text in "[0-9a-zA-Z()+ .\\-]{0,80}") {
        let candidates = resolve(&text);
        for pair in candidates.windows(2) {
            prop_assert!(pair[0].start < pair[1].start);
        }
        for candidate in &candidates {
            prop_assert!(is_valid_number(&candidate.text));
            prop_assert_eq!(&text[candidate.start..candidate.end()], candidate.text.as_str());
        }
    }
}
