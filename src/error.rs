use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for the appgen library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Generative backend request failure (transport, auth, or backend-level error).
    #[error("AI backend request failed: {message}")]
    Api {
        /// Error message
        message: String,
    },

    /// The model's reply could not be interpreted as a file structure.
    #[error("Invalid AI response: {message}")]
    InvalidResponse {
        /// Detailed error message
        message: String,
    },

    /// The reply contained more files than the configured ceiling allows.
    #[error("AI response contains {count} files, exceeding the limit of {limit}")]
    TooManyFiles {
        /// Number of files in the reply
        count: usize,
        /// Configured maximum
        limit: usize,
    },

    /// A descriptor path would resolve outside the output directory.
    #[error("Unsafe file path '{path}' escapes the output directory")]
    UnsafePath {
        /// The offending descriptor path
        path: String,
    },

    /// Prompt template rendering error.
    #[error("Failed to render template '{template}': {message}")]
    Template {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Archive construction error.
    #[error("Archive error: {message}")]
    Zip {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a backend request error.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates a file ceiling error.
    #[must_use]
    pub const fn too_many_files(count: usize, limit: usize) -> Self {
        Self::TooManyFiles { count, limit }
    }

    /// Creates an unsafe path error.
    #[must_use]
    pub fn unsafe_path(path: impl Into<String>) -> Self {
        Self::UnsafePath { path: path.into() }
    }

    /// Creates a template error.
    #[must_use]
    pub fn template(template: impl Into<String>, source: tera::Error) -> Self {
        Self::Template {
            template: template.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a backend request error.
    #[must_use]
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Returns true if the model's reply was rejected rather than the run
    /// failing outright. The CLI recovers from these: it logs the offending
    /// reply and exits cleanly without producing output.
    #[must_use]
    pub const fn is_rejected_reply(&self) -> bool {
        matches!(self, Self::InvalidResponse { .. } | Self::TooManyFiles { .. })
    }
}

// Conversion implementations for convenient error handling
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Api {
            message: e.to_string(),
        }
    }
}

impl From<tera::Error> for Error {
    fn from(e: tera::Error) -> Self {
        Self::Template {
            template: "unknown".to_string(),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse {
            message: e.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Zip {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test message");
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/test.txt", io_err);
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/test.txt"));
    }

    #[test]
    fn test_rejected_reply_classification() {
        assert!(Error::invalid_response("not json").is_rejected_reply());
        assert!(Error::too_many_files(25, 20).is_rejected_reply());
        assert!(!Error::api("timeout").is_rejected_reply());
        assert!(!Error::unsafe_path("../etc/passwd").is_rejected_reply());
    }

    #[test]
    fn test_too_many_files_message() {
        let err = Error::too_many_files(25, 20);
        assert!(err.to_string().contains("25"));
        assert!(err.to_string().contains("20"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.is_rejected_reply());
    }

    #[test]
    fn test_error_clone() {
        let err = Error::unsafe_path("../x");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
