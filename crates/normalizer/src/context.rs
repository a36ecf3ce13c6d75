//! Collaborators handed to a normalizer for one invocation.

use crate::project::ProjectDetailsProvider;
use nci_vcs::VcsClient;
use std::fmt;
use std::path::PathBuf;

/// Borrowed collaborators and the directory the job runs in.
///
/// The context is read-only; a normalizer never retains it past
/// [`Normalizer::normalize`](crate::Normalizer::normalize).
pub struct NormalizeContext<'a> {
    /// Directory repository discovery starts from.
    pub working_dir: PathBuf,
    /// Repository facts.
    pub vcs: &'a dyn VcsClient,
    /// Forge project facts.
    pub project: &'a dyn ProjectDetailsProvider,
}

impl<'a> NormalizeContext<'a> {
    /// Create a context.
    #[must_use]
    pub fn new(
        working_dir: impl Into<PathBuf>,
        vcs: &'a dyn VcsClient,
        project: &'a dyn ProjectDetailsProvider,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            vcs,
            project,
        }
    }
}

impl fmt::Debug for NormalizeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizeContext")
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}
