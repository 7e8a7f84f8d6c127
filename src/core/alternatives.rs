//! Alternative code suggestions for structured numeric codes

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Number of alternatives proposed when the caller does not say otherwise
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// Width of the structured numeric code convention
const CODE_WIDTH: usize = 7;

/// Step families tried in order, smallest first
const INCREMENTS: [u64; 4] = [1, 10, 100, 1000];

/// Multiples tried within each step family
const MAX_MULTIPLE: u64 = 5;

static STRUCTURED_CODE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[0-9]{7}$").expect("structured code pattern is valid")
});

/// Whether `code` follows the fixed-width all-numeric convention
pub fn is_structured_code(code: &str) -> bool {
    STRUCTURED_CODE.is_match(code)
}

/// Propose up to `max_suggestions` unused codes near `base_code`.
///
/// Candidates are `base + increment * multiple` for increments 1, 10, 100,
/// 1000 and multiples 1 to 5, in that order, zero-padded to seven digits.
/// Codes in `used_codes` and codes that would overflow the width are skipped.
/// Any code that is not seven ASCII digits yields no suggestions.
pub fn suggest_alternatives(
    base_code: &str,
    used_codes: &HashSet<String>,
    max_suggestions: usize,
) -> Vec<String> {
    if max_suggestions == 0 || !is_structured_code(base_code) {
        return Vec::new();
    }

    let base: u64 = match base_code.parse() {
        Ok(n) => n,
        Err(_) => return Vec::new(),
    };

    let mut suggestions: Vec<String> = Vec::with_capacity(max_suggestions);
    for increment in INCREMENTS {
        for multiple in 1..=MAX_MULTIPLE {
            let candidate = format!("{:0width$}", base + increment * multiple, width = CODE_WIDTH);
            if candidate.len() != CODE_WIDTH
                || used_codes.contains(&candidate)
                || suggestions.contains(&candidate)
            {
                continue;
            }
            suggestions.push(candidate);
            if suggestions.len() == max_suggestions {
                return suggestions;
            }
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(codes: &[&str]) -> HashSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_skips_used_codes() {
        let result = suggest_alternatives(
            "1000000",
            &used(&["1000001", "1000010"]),
            DEFAULT_MAX_SUGGESTIONS,
        );
        assert_eq!(result, vec!["1000002", "1000003", "1000004"]);
        assert!(!result.contains(&"1000001".to_string()));
        assert!(!result.contains(&"1000010".to_string()));
        assert!(result
            .iter()
            .all(|c| c.len() == 7 && c.chars().all(|ch| ch.is_ascii_digit())));
    }

    #[test]
    fn test_moves_to_next_increment_family() {
        let taken = used(&["0000001", "0000002", "0000003", "0000004", "0000005"]);
        let result = suggest_alternatives("0000000", &taken, 3);
        assert_eq!(result, vec!["0000010", "0000020", "0000030"]);
    }

    #[test]
    fn test_preserves_zero_padding() {
        let result = suggest_alternatives("0000042", &HashSet::new(), 2);
        assert_eq!(result, vec!["0000043", "0000044"]);
    }

    #[test]
    fn test_overflow_candidates_are_skipped() {
        let result = suggest_alternatives("9999998", &HashSet::new(), 3);
        // Only +1 stays within seven digits
        assert_eq!(result, vec!["9999999"]);
        assert!(suggest_alternatives("9999999", &HashSet::new(), 3).is_empty());
    }

    #[test]
    fn test_non_structured_codes_yield_nothing() {
        for code in ["", "100", "10000000", "ABC1234", "123 456", "１２３４５６７"] {
            assert!(
                suggest_alternatives(code, &HashSet::new(), 3).is_empty(),
                "{:?}",
                code
            );
        }
    }

    #[test]
    fn test_respects_max_suggestions() {
        assert!(suggest_alternatives("1000000", &HashSet::new(), 0).is_empty());
        assert_eq!(suggest_alternatives("1000000", &HashSet::new(), 7).len(), 7);
        // 4 families x 5 multiples
        assert_eq!(suggest_alternatives("1000000", &HashSet::new(), 100).len(), 20);
    }
}
