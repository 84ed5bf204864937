//! Format key decomposition (`gen9ou` -> `gen9` / `ou`).

/// Generation bucket for keys without a `gen<N>` prefix
pub const UNKNOWN_GENERATION: &str = "unknown";

/// Split a format key into (generation, format suffix).
///
/// The prefix is `gen` followed by one digit 1-9, case-insensitive. Both
/// parts are lowercased and a single `-` separating them is dropped. Keys
/// that do not match fall into the `unknown` generation with the full key
/// as the suffix.
pub fn split_format_key(key: &str) -> (String, String) {
    let fallback = || (UNKNOWN_GENERATION.to_string(), key.to_string());

    let bytes = key.as_bytes();
    let has_prefix = key
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("gen"));
    if bytes.len() < 5 || !has_prefix {
        return fallback();
    }
    if !matches!(bytes[3], b'1'..=b'9') {
        return fallback();
    }
    let rest = &key[4..];
    let format = rest.strip_prefix('-').unwrap_or(rest);
    if format.is_empty() {
        return fallback();
    }
    (key[..4].to_ascii_lowercase(), format.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(key: &str) -> (String, String) {
        split_format_key(key)
    }

    #[test]
    fn test_split_standard_keys() {
        assert_eq!(split("gen9ou"), ("gen9".to_string(), "ou".to_string()));
        assert_eq!(
            split("gen3ubers"),
            ("gen3".to_string(), "ubers".to_string())
        );
        assert_eq!(split("GEN1OU"), ("gen1".to_string(), "ou".to_string()));
        assert_eq!(
            split("gen8-nationaldex"),
            ("gen8".to_string(), "nationaldex".to_string())
        );
    }

    #[test]
    fn test_split_unknown_fallback() {
        assert_eq!(split("ou"), ("unknown".to_string(), "ou".to_string()));
        assert_eq!(split("gen0ou"), ("unknown".to_string(), "gen0ou".to_string()));
        assert_eq!(split("gen9"), ("unknown".to_string(), "gen9".to_string()));
        assert_eq!(split("gen9-"), ("unknown".to_string(), "gen9-".to_string()));
        assert_eq!(split("génération"), ("unknown".to_string(), "génération".to_string()));
    }
}
