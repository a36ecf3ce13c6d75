use crate::{RepositoryInfo, VcsClient};
use nci_core::{Error, Result};
use std::path::{Path, PathBuf};

/// [`VcsClient`] that answers with facts supplied up front.
///
/// Useful for embedders that already know the commit being built, and for
/// tests that must not depend on a real checkout.
#[derive(Debug, Clone, Default)]
pub struct FixedVcs {
    root: Option<PathBuf>,
    info: RepositoryInfo,
}

impl FixedVcs {
    /// Report `info` for a repository rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, info: RepositoryInfo) -> Self {
        Self {
            root: Some(root.into()),
            info,
        }
    }

    /// A client for which no repository can be found.
    #[must_use]
    pub fn without_repository() -> Self {
        Self::default()
    }
}

impl VcsClient for FixedVcs {
    fn find_repository_root(&self, start: &Path) -> Result<PathBuf> {
        self.root
            .clone()
            .ok_or_else(|| Error::repository_not_found(start))
    }

    fn repository_info(&self, root: &Path) -> Result<RepositoryInfo> {
        match &self.root {
            Some(known) if known == root => Ok(self.info.clone()),
            _ => Err(Error::vcs(root, "no repository information recorded")),
        }
    }
}
