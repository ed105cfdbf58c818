/// Lexical markers of dosage, diagnostic or prescriptive language.
pub const BANNED_TERMS: [&str; 7] = ["dosage", "mg", "take", "cure", "treat", "diagnose", "prescribe"];

/// Banned terms found anywhere in `text` (case-insensitive substring match),
/// in [`BANNED_TERMS`] order. Advisory only.
pub fn scan(text: &str) -> Vec<String> {
    let low = text.to_lowercase();
    BANNED_TERMS.iter().filter(|t| low.contains(*t)).map(|t| (*t).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dosage_advice_is_flagged_in_list_order() {
        assert_eq!(scan("Take 500mg daily"), vec!["mg", "take"]);
    }

    #[test]
    fn substring_matches_count() {
        // "treatment" contains "treat"
        assert_eq!(scan("No TREATMENT was studied"), vec!["treat"]);
        assert!(scan("Evidence is limited.").is_empty());
    }
}
