//! Error types for docbinder.
//!
//! Library crates use [`DocbinderError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docbinder operations.
#[derive(Debug, thiserror::Error)]
pub enum DocbinderError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during fetch (transport failure, timeout,
    /// or non-success status).
    #[error("network error: {0}")]
    Network(String),

    /// Markup that could not be parsed at all. html5ever is lenient,
    /// so in practice this only fires on pathological input.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The expected main-content container is missing from an
    /// otherwise valid page.
    #[error("content not found at {url}: {container}")]
    ContentNotFound { url: String, container: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// External renderer failure (spawn error or non-zero exit).
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocbinderError>;

impl DocbinderError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a content-not-found error for a page URL and container.
    pub fn content_not_found(url: impl Into<String>, container: impl Into<String>) -> Self {
        Self::ContentNotFound {
            url: url.into(),
            container: container.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocbinderError::config("missing output directory");
        assert_eq!(err.to_string(), "config error: missing output directory");

        let err = DocbinderError::content_not_found("https://example.com/ch1.htm", "#mainContent");
        assert!(err.to_string().contains("#mainContent"));
        assert!(err.to_string().contains("ch1.htm"));
    }
}
