//! Repository and commit introspection for nci.
//!
//! Normalizers never read the repository themselves. They call a
//! [`VcsClient`], which is injected by the caller:
//!
//! - [`GitCli`] shells out to the `git` binary (read-only)
//! - [`FixedVcs`] returns facts the caller already holds
//!
//! Both produce a [`RepositoryInfo`], which writes the repository, commit
//! and last-release namespaces of an [`NciSpec`](nci_core::NciSpec).

mod fixed;
mod git;
mod info;

pub use fixed::FixedVcs;
pub use git::GitCli;
pub use info::{CommitInfo, GitRef, LastRelease, RefType, RepositoryInfo, RepositoryStatus, Signature};

use nci_core::Result;
use std::path::{Path, PathBuf};

/// Source of repository facts.
pub trait VcsClient {
    /// Find the root of the repository containing `start`.
    ///
    /// # Errors
    /// Returns [`nci_core::Error::RepositoryNotFound`] when `start` is not
    /// inside a repository.
    fn find_repository_root(&self, start: &Path) -> Result<PathBuf>;

    /// Read repository, ref and commit facts for the repository at `root`.
    ///
    /// # Errors
    /// Returns [`nci_core::Error::Vcs`] when the repository cannot be read.
    fn repository_info(&self, root: &Path) -> Result<RepositoryInfo>;
}

/// Walk up from `start` looking for a `.git` entry.
///
/// `.git` may be a directory or, for worktrees and submodules, a file.
#[must_use]
pub fn discover_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.canonicalize().ok()?;
    loop {
        if current.join(".git").exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Release-friendly form of a ref name.
///
/// Slashes become dashes and a leading `v` is dropped, so `v1.2.3` becomes
/// `1.2.3` and `feature/login` becomes `feature-login`.
#[must_use]
pub fn release_name(ref_name: &str) -> String {
    ref_name
        .replace('/', "-")
        .trim_start_matches('v')
        .to_string()
}
