//! Human formatting of dial strings.

/// Format a dial string for notifications.
///
/// `+` followed by at least 11 digits becomes `+D (DDD) DDD-DDDD`, exactly
/// 10 digits become `(DDD) DDD-DDDD`; anything else is returned as is.
pub fn format_for_display(number: &str) -> String {
    let cleaned: String = number
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let digits: String = cleaned.chars().filter(char::is_ascii_digit).collect();

    if cleaned.starts_with('+') && digits.len() >= 11 {
        format!(
            "+{} ({}) {}-{}",
            &digits[0..1],
            &digits[1..4],
            &digits[4..7],
            &digits[7..11]
        )
    } else if digits.len() == 10 {
        format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..])
    } else {
        number.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_number() {
        assert_eq!(format_for_display("7169234121"), "(716) 923-4121");
        assert_eq!(format_for_display("716-923-4121"), "(716) 923-4121");
    }

    #[test]
    fn test_international_number() {
        assert_eq!(format_for_display("+17169234121"), "+1 (716) 923-4121");
    }

    #[test]
    fn test_other_lengths_unchanged() {
        assert_eq!(format_for_display("18558277426"), "18558277426");
        assert_eq!(format_for_display("5551212"), "5551212");
    }
}
