//! Autocomplete suggestion rules shared by every store

use std::collections::HashSet;

/// Queries shorter than this (in characters) never produce suggestions.
pub const MIN_QUERY_CHARS: usize = 2;
/// Maximum number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 10;
/// Rows fetched per lookup column from the remote backend.
pub const PER_SOURCE_LIMIT: usize = 5;

pub fn is_suggestable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

/// Union of the given sources in order, first occurrence wins, capped at
/// [`MAX_SUGGESTIONS`].
pub fn merge_suggestions<I, S>(sources: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for value in sources.into_iter().flatten() {
        if merged.len() == MAX_SUGGESTIONS {
            break;
        }
        if seen.insert(value.clone()) {
            merged.push(value);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_minimum_length_counts_characters() {
        assert!(!is_suggestable(""));
        assert!(!is_suggestable("a"));
        assert!(is_suggestable("an"));
        assert!(!is_suggestable("é"));
        assert!(is_suggestable("éa"));
    }

    #[test]
    fn test_merge_dedupes_in_first_seen_order() {
        let merged = merge_suggestions(vec![
            strings(&["RX-001", "RX-002"]),
            strings(&["Ana Souza", "RX-001"]),
            strings(&["Dr. Souza", "Ana Souza"]),
        ]);
        assert_eq!(merged, strings(&["RX-001", "RX-002", "Ana Souza", "Dr. Souza"]));
    }

    #[test]
    fn test_merge_truncates_to_ten() {
        let ids: Vec<String> = (0..7).map(|i| format!("RX-{i}")).collect();
        let names: Vec<String> = (0..7).map(|i| format!("Paciente {i}")).collect();
        let merged = merge_suggestions(vec![ids, names]);
        assert_eq!(merged.len(), MAX_SUGGESTIONS);
        assert_eq!(merged[7], "Paciente 0");
    }
}
