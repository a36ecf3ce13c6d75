//! Optional TOML configuration for the `nci` CLI.
//!
//! ```toml
//! # Detection order; providers left out are never detected.
//! providers = ["gitlab-ci", "github-actions"]
//!
//! # "remote" derives project name/path/url from the git remote, "none" skips it.
//! project-details = "none"
//!
//! # git binary used for repository introspection.
//! git = "/usr/bin/git"
//! ```

use crate::provider::{Dispatcher, Provider};
use nci_core::{Error, Result};
use nci_normalizer::{NoProjectDetails, ProjectDetailsProvider, RemoteUrlProjectDetails};
use nci_vcs::GitCli;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where project details come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectDetailsSource {
    /// Derive from the repository remote URL.
    #[default]
    Remote,
    /// Leave the project fields untouched.
    None,
}

impl ProjectDetailsSource {
    /// The collaborator implementing this source.
    #[must_use]
    pub fn provider(self) -> &'static dyn ProjectDetailsProvider {
        match self {
            Self::Remote => &RemoteUrlProjectDetails,
            Self::None => &NoProjectDetails,
        }
    }
}

/// CLI configuration file contents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Provider slugs in detection order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,

    /// Project details source.
    #[serde(default)]
    pub project_details: ProjectDetailsSource,

    /// Path to the git binary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<PathBuf>,
}

impl Config {
    /// Parse a configuration document.
    ///
    /// # Errors
    /// Returns [`Error::TomlParse`] for malformed TOML or unknown fields.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] when the file cannot be read and
    /// [`Error::TomlParse`] when it is not valid.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(
                format!("cannot read {}: {e}", path.display()),
                "Check the --config path or the NCI_CONFIG variable",
            )
        })?;
        Self::from_toml(&content)
    }

    /// Dispatcher honoring the configured provider order.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] for an empty list, unknown slugs
    /// or slugs listed twice.
    pub fn dispatcher(&self) -> Result<Dispatcher> {
        let Some(slugs) = &self.providers else {
            return Ok(Dispatcher::new());
        };
        if slugs.is_empty() {
            return Err(Error::configuration(
                "`providers` is empty",
                format!(
                    "List at least one provider or remove the key. Known providers: {}",
                    Provider::known_slugs()
                ),
            ));
        }

        let mut seen = HashSet::new();
        let mut providers = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let provider: Provider = slug.parse()?;
            if !seen.insert(provider) {
                return Err(Error::configuration(
                    format!("provider `{slug}` is listed twice"),
                    "Each provider may appear once in `providers`",
                ));
            }
            providers.push(provider);
        }
        Ok(Dispatcher::with_providers(providers))
    }

    /// The git client to use.
    #[must_use]
    pub fn git(&self) -> GitCli {
        self.git
            .as_ref()
            .map_or_else(GitCli::new, |binary| GitCli::with_binary(binary.clone()))
    }
}
