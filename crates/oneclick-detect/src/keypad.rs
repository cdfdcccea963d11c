//! Telephone keypad letter mapping.

use oneclick_protocols::CallError;

/// Keypad digit for an ASCII letter, case-folded.
pub fn keypad_digit(c: char) -> Option<char> {
    let digit = match c.to_ascii_lowercase() {
        'a' | 'b' | 'c' => '2',
        'd' | 'e' | 'f' => '3',
        'g' | 'h' | 'i' => '4',
        'j' | 'k' | 'l' => '5',
        'm' | 'n' | 'o' => '6',
        'p' | 'q' | 'r' | 's' => '7',
        't' | 'u' | 'v' => '8',
        'w' | 'x' | 'y' | 'z' => '9',
        _ => return None,
    };
    Some(digit)
}

/// Replace every letter with its keypad digit. Other characters pass through.
pub fn letters_to_digits(text: &str) -> String {
    text.chars().map(|c| keypad_digit(c).unwrap_or(c)).collect()
}

/// Dial string for `text`: letters mapped, then whitespace, `.`, `-`, `(` and `)` removed.
///
/// A leading `+` survives.
pub fn canonical_dial_string(text: &str) -> String {
    letters_to_digits(text)
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '.' | '-' | '(' | ')'))
        .collect()
}

/// A number submitted for dialing, already canonicalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialRequest {
    number: String,
}

impl DialRequest {
    /// Canonicalise `raw`. Rejects input that does not reduce to digits with an optional leading `+`.
    pub fn new(raw: &str) -> Result<Self, CallError> {
        let number = canonical_dial_string(raw.trim());
        let digits = number.strip_prefix('+').unwrap_or(&number);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(CallError::InvalidNumber(raw.to_string()));
        }
        Ok(Self { number })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn into_number(self) -> String {
        self.number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_groups() {
        let cases = [
            ("abc", '2'),
            ("def", '3'),
            ("ghi", '4'),
            ("jkl", '5'),
            ("mno", '6'),
            ("pqrs", '7'),
            ("tuv", '8'),
            ("wxyz", '9'),
        ];
        for (letters, digit) in cases {
            for c in letters.chars() {
                assert_eq!(keypad_digit(c), Some(digit));
                assert_eq!(keypad_digit(c.to_ascii_uppercase()), Some(digit));
            }
        }
        assert_eq!(keypad_digit('7'), None);
        assert_eq!(keypad_digit('-'), None);
    }

    #[test]
    fn test_letters_to_digits_passthrough() {
        assert_eq!(letters_to_digits("1-855-VASPIAN"), "1-855-8277426");
        assert_eq!(letters_to_digits("(716) 923-4121"), "(716) 923-4121");
    }

    #[test]
    fn test_canonical_dial_string() {
        assert_eq!(canonical_dial_string("(716) 923-4121"), "7169234121");
        assert_eq!(canonical_dial_string("716.923.4121"), "7169234121");
        assert_eq!(canonical_dial_string("1-800-FLOWERS"), "18003569377");
        assert_eq!(canonical_dial_string("+1 7169234121"), "+17169234121");
    }

    #[test]
    fn test_dial_request_canonicalises() {
        let request = DialRequest::new(" (716) 923-4121 ").unwrap();
        assert_eq!(request.number(), "7169234121");

        let request = DialRequest::new("+44 2079460000").unwrap();
        assert_eq!(request.number(), "+442079460000");
    }

    #[test]
    fn test_dial_request_rejects_empty() {
        assert!(matches!(DialRequest::new(""), Err(CallError::InvalidNumber(_))));
        assert!(matches!(DialRequest::new(" - () "), Err(CallError::InvalidNumber(_))));
        assert!(matches!(DialRequest::new("+"), Err(CallError::InvalidNumber(_))));
    }

    #[test]
    fn test_dial_request_rejects_stray_characters() {
        assert!(DialRequest::new("716#923").is_err());
        assert!(DialRequest::new("71+69234121").is_err());
    }
}
