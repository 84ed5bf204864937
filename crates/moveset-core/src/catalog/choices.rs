//! Autocomplete ranking and lenient name matching.

use std::collections::HashSet;

/// Maximum number of suggestions returned by [`filter_choices`]
pub const MAX_CHOICES: usize = 25;

/// Lowercase and drop every non-alphanumeric character
pub fn normalize_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Rank `options` against a typed query.
///
/// Case-insensitive prefix matches come first, then substring matches, then
/// substring matches on normalized names. Within a tier the input order is
/// kept. At most [`MAX_CHOICES`] unique results are returned.
pub fn filter_choices(options: &[String], query: &str) -> Vec<String> {
    let query = query.trim().to_lowercase();
    let mut picked = Picked::default();

    if query.is_empty() {
        options.iter().for_each(|option| picked.take(option));
        return picked.out;
    }

    let lowered: Vec<String> = options.iter().map(|o| o.to_lowercase()).collect();
    for (option, lower) in options.iter().zip(&lowered) {
        if lower.starts_with(&query) {
            picked.take(option);
        }
    }
    for (option, lower) in options.iter().zip(&lowered) {
        if lower.contains(&query) {
            picked.take(option);
        }
    }

    let normalized_query = normalize_name(&query);
    if !normalized_query.is_empty() {
        for option in options {
            if normalize_name(option).contains(&normalized_query) {
                picked.take(option);
            }
        }
    }
    picked.out
}

#[derive(Default)]
struct Picked<'a> {
    seen: HashSet<&'a str>,
    out: Vec<String>,
}

impl<'a> Picked<'a> {
    fn take(&mut self, option: &'a str) {
        if self.out.len() < MAX_CHOICES && self.seen.insert(option) {
            self.out.push(option.to_string());
        }
    }
}

/// Resolve a user-typed name: exact normalized match first, then the first
/// option whose normalized form starts with the query.
pub fn resolve_name<'a>(options: &'a [String], query: &str) -> Option<&'a str> {
    let target = normalize_name(query);
    if target.is_empty() {
        return None;
    }
    let normalized: Vec<String> = options.iter().map(|o| normalize_name(o)).collect();
    normalized
        .iter()
        .position(|n| *n == target)
        .or_else(|| normalized.iter().position(|n| n.starts_with(&target)))
        .map(|idx| options[idx].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prefix_tier_keeps_input_order() {
        let opts = options(&["Garchomp", "Gardevoir", "Landorus"]);
        assert_eq!(filter_choices(&opts, "gar"), vec!["Garchomp", "Gardevoir"]);
        assert_eq!(filter_choices(&opts, "GAR"), vec!["Garchomp", "Gardevoir"]);
    }

    #[test]
    fn test_substring_tier() {
        let opts = options(&["Garchomp", "Gardevoir", "Landorus"]);
        assert_eq!(filter_choices(&opts, "evo"), vec!["Gardevoir"]);
    }

    #[test]
    fn test_tiers_are_ordered() {
        let opts = options(&["Landorus-Therian", "Mr. Mime", "Mime Jr.", "Tauros"]);
        assert_eq!(filter_choices(&opts, "mime"), vec!["Mime Jr.", "Mr. Mime"]);
        assert_eq!(filter_choices(&opts, "mr mi"), vec!["Mr. Mime"]);
        assert_eq!(filter_choices(&opts, "rus-th"), vec!["Landorus-Therian"]);
    }

    #[test]
    fn test_empty_query_and_limit() {
        let opts: Vec<String> = (0..40).map(|i| format!("Mon{}", i)).collect();
        let out = filter_choices(&opts, "");
        assert_eq!(out.len(), MAX_CHOICES);
        assert_eq!(out[0], "Mon0");

        let out = filter_choices(&opts, "mon");
        assert_eq!(out.len(), MAX_CHOICES);
        assert!(filter_choices(&[], "gar").is_empty());
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let opts = options(&["Tauros", "Tauros", "Tauros-Paldea"]);
        assert_eq!(filter_choices(&opts, "tau"), vec!["Tauros", "Tauros-Paldea"]);
    }

    #[test]
    fn test_resolve_name_exact_then_prefix() {
        let opts = options(&["Urshifu-Rapid-Strike", "Urshifu", "Mr Mime"]);
        assert_eq!(resolve_name(&opts, "urshifu"), Some("Urshifu"));
        assert_eq!(resolve_name(&opts, "urshifu rapid"), Some("Urshifu-Rapid-Strike"));
        assert_eq!(resolve_name(&opts, "Mr. Mime"), Some("Mr Mime"));
        assert_eq!(resolve_name(&opts, "pikachu"), None);
        assert_eq!(resolve_name(&opts, " . "), None);
    }
}
