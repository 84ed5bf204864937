use std::fmt;

use crate::error::{Error, Result};

/// Characters the store rejects inside a key
const FORBIDDEN: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// Strip characters the store forbids in keys (`. $ # [ ] /` and ASCII
/// control characters). `Mr. Mime` becomes `Mr Mime`. Idempotent.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !FORBIDDEN.contains(c) && !c.is_ascii_control())
        .collect()
}

/// Slash-separated location in the store. Every segment is sanitized when
/// it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn root(name: &str) -> Result<Self> {
        Self { segments: Vec::new() }.child(name)
    }

    /// Append a segment. A segment that sanitizes to nothing is rejected,
    /// it would silently address the parent.
    pub fn child(&self, segment: &str) -> Result<Self> {
        let clean = sanitize_key(segment);
        if clean.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "{:?} is not a usable store key",
                segment
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(clean);
        Ok(Self { segments })
    }

    /// `<root>/<format key>/<rating>`
    pub fn bucket(root: &str, format_key: &str, rating: &str) -> Result<Self> {
        Self::root(root)?.child(format_key)?.child(rating)
    }

    /// `<root>/<format key>/<rating>/<pokemon>`
    pub fn record(root: &str, format_key: &str, rating: &str, pokemon: &str) -> Result<Self> {
        Self::bucket(root, format_key, rating)?.child(pokemon)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("Mr. Mime"), "Mr Mime");
        assert_eq!(sanitize_key("Mime Jr."), "Mime Jr");
        assert_eq!(sanitize_key("a$b#c[d]e/f"), "abcdef");
        assert_eq!(sanitize_key("Tab\tName"), "TabName");
        assert_eq!(sanitize_key("Flabébé"), "Flabébé");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for name in ["Mr. Mime", "Type: Null", "Farfetch’d", "Zygarde-10%", "[a.b]/c"] {
            let once = sanitize_key(name);
            assert_eq!(sanitize_key(&once), once);
        }
    }

    #[test]
    fn test_record_path() {
        let path = StorePath::record("pokemondata", "gen1ou", "1760", "Mr. Mime").unwrap();
        assert_eq!(path.to_string(), "pokemondata/gen1ou/1760/Mr Mime");
        assert_eq!(path.segments().len(), 4);
    }

    #[test]
    fn test_empty_segment_rejected() {
        let root = StorePath::root("pokemondata").unwrap();
        assert!(matches!(root.child("..."), Err(Error::InvalidInput(_))));
        assert!(root.child("").is_err());
    }
}
