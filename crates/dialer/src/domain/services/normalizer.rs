//! Phone Number Normalizer
//!
//! Shapes user- or provider-supplied numbers into the canonical digits used
//! for storage and matching, and into the `+`-prefixed form the provider
//! expects. It never validates: malformed numbers pass through and are left
//! for the provider to reject.

use crate::domain::value_objects::CanonicalNumber;

/// US country code prepended to bare 10-digit numbers
const US_COUNTRY_CODE: char = '1';

/// Normalize any input into canonical digits. Total: never fails.
pub fn normalize(input: &str) -> CanonicalNumber {
    let trimmed = input.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if trimmed.starts_with('+') {
        return CanonicalNumber::from_stored(digits);
    }

    match digits.len() {
        11 if digits.starts_with(US_COUNTRY_CODE) => CanonicalNumber::from_stored(digits),
        10 => CanonicalNumber::from_stored(format!("{}{}", US_COUNTRY_CODE, digits)),
        _ => CanonicalNumber::from_stored(digits),
    }
}

/// E.164-shaped form handed to the telephony provider
pub fn to_provider_format(number: &CanonicalNumber) -> String {
    format!("+{}", number.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_digits_get_country_code() {
        assert_eq!(normalize("8007742678").as_str(), "18007742678");
    }

    #[test]
    fn test_eleven_digits_with_country_code_unchanged() {
        assert_eq!(normalize("18007742678").as_str(), "18007742678");
    }

    #[test]
    fn test_plus_prefixed_passes_through() {
        let number = normalize("+18007742678");
        assert_eq!(number.as_str(), "18007742678");
        assert_eq!(to_provider_format(&number), "+18007742678");

        // Already country-coded: no US prefix is added even for 10 digits
        assert_eq!(normalize("+4420794600").as_str(), "4420794600");
    }

    #[test]
    fn test_strips_formatting() {
        assert_eq!(normalize("(800) 774-2678").as_str(), "18007742678");
        assert_eq!(normalize(" 1-800-774-2678 ").as_str(), "18007742678");
        assert_eq!(normalize("+1 (800) 774-2678").as_str(), "18007742678");
    }

    #[test]
    fn test_other_lengths_pass_through() {
        assert_eq!(normalize("12345").as_str(), "12345");
        assert_eq!(normalize("28007742678").as_str(), "28007742678");
        assert_eq!(normalize("").as_str(), "");
        assert_eq!(normalize("call me").as_str(), "");
    }
}
