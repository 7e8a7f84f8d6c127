//! Normalized edit-distance similarity between record names

/// Normalize a name for comparison: trimmed, lowercased.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Similarity of two strings in `[0.0, 1.0]`.
///
/// Both inputs are trimmed and lowercased, then scored as
/// `(max_len - distance) / max_len` where `distance` is the Levenshtein
/// distance and lengths are counted in characters. Two empty strings score
/// 1.0; exactly one empty string scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = strsim::levenshtein(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        for s in ["Cash", "Accounts Receivable", "a", "ünïcödé"] {
            assert_eq!(similarity(s, s), 1.0);
        }
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("", "x"), 0.0);
        assert_eq!(similarity("Cash", ""), 0.0);
        // Whitespace-only normalizes to empty
        assert_eq!(similarity("   ", ""), 1.0);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(similarity("ABC", "abc"), 1.0);
        assert_eq!(similarity(" ABC ", "ABC"), 1.0);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("Cash Account", "Cash Acount"),
            ("Petty Cash", "Cash"),
            ("Inventory", "Cash Account"),
            ("kitten", "sitting"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_one_deletion_scores_high() {
        let score = similarity("Cash Account", "Cash Acount");
        assert!((score - 11.0 / 12.0).abs() < 1e-9);
        assert!(score > 0.70);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        assert!(similarity("Cash Account", "Inventory") < 0.70);
        // 4 of 10 characters survive
        assert!((similarity("Petty Cash", "Cash") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // One substitution across four characters
        assert!((similarity("café", "cafe") - 0.75).abs() < 1e-9);
    }
}
