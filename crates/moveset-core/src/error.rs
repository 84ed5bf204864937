use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown format: {generation}{format} has no ratings")]
    UnknownFormat { generation: String, format: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Catalog is not ready yet")]
    CacheNotReady,

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed source {source_name}: {message}")]
    MalformedSource {
        source_name: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error means "valid request, no data"
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this error was caused by the caller's parameters
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::UnknownFormat { .. })
    }

    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedSource {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert!(Error::Io(io_err).is_not_found());
        assert!(Error::NotFound("Tauros".to_string()).is_not_found());

        let other_io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::Io(other_io_err).is_not_found());
    }

    #[test]
    fn test_unknown_format_is_invalid_input() {
        let err = Error::UnknownFormat {
            generation: "gen9".to_string(),
            format: "ou".to_string(),
        };
        assert!(err.is_invalid_input());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Unknown format: gen9ou has no ratings");
    }
}
