//! Error types for CI environment normalization.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for normalization operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while normalizing a CI environment.
///
/// Every variant except [`Error::Configuration`] aborts normalization: a
/// caller never receives a partially populated schema.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A provider reference did not have the expected shape.
    #[error("Pull request reference parsing failed: {variable}={value:?} has no id segment")]
    #[diagnostic(
        code(nci::reference::malformed),
        help("Expected a reference such as `refs/pull/<id>/merge`")
    )]
    MalformedReference {
        /// The environment variable the reference was read from
        variable: String,
        /// The raw reference value
        value: String,
    },

    /// No repository could be found above the working directory.
    #[error("VCS lookup failed: no repository found above {}", start.display())]
    #[diagnostic(
        code(nci::vcs::not_found),
        help("Run inside a repository checkout or pass --workdir")
    )]
    RepositoryNotFound {
        /// Directory the search started from
        start: PathBuf,
    },

    /// The repository exists but its information could not be read.
    #[error("VCS lookup failed for {}: {message}", path.display())]
    #[diagnostic(
        code(nci::vcs::unavailable),
        help("Ensure the `git` binary is installed and the checkout is readable")
    )]
    Vcs {
        /// Repository root that was inspected
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(nci::config), help("{help}"))]
    Configuration {
        /// The error message
        message: String,
        /// Help text for the user
        help: String,
    },

    /// Wrapped I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(nci::io))]
    Io(#[from] std::io::Error),

    /// Wrapped JSON error.
    #[error("JSON error: {0}")]
    #[diagnostic(code(nci::json))]
    Json(#[from] serde_json::Error),

    /// Wrapped TOML parsing error.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(nci::toml_parse))]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Create a new malformed reference error.
    #[must_use]
    pub fn malformed_reference(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedReference {
            variable: variable.into(),
            value: value.into(),
        }
    }

    /// Create a new repository-not-found error.
    #[must_use]
    pub fn repository_not_found(start: impl Into<PathBuf>) -> Self {
        Self::RepositoryNotFound {
            start: start.into(),
        }
    }

    /// Create a new VCS error.
    #[must_use]
    pub fn vcs(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Vcs {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: help.into(),
        }
    }
}
