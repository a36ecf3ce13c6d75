//! Normalizer framework for nci.
//!
//! Every CI platform gets one [`Normalizer`] implementation living in its
//! own crate. This crate defines the capability set those implementations
//! share, the [`NormalizeContext`] through which collaborators are injected,
//! and the [`steps`] every normalizer runs in the same order:
//!
//! 1. [`steps::seed`] an [`NciSpec`] from the environment and stamp identity
//! 2. fill worker and pipeline fields (provider specific)
//! 3. [`steps::apply_checkout`] repository, project, registry and control
//!    fields from the collaborators
//! 4. apply provider overrides (provider specific)

pub mod context;
pub mod project;
pub mod steps;

pub use context::NormalizeContext;
pub use project::{
    FixedProjectDetails, NoProjectDetails, ProjectDetails, ProjectDetailsProvider,
    RemoteUrlProjectDetails,
};

use nci_core::{Environment, NciSpec, Result};
use semver::Version;

/// Immutable identity of a normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerInfo {
    /// Schema version the normalizer emits.
    pub version: Version,
    /// Display name of the CI service.
    pub name: &'static str,
    /// Slug of the CI service.
    pub slug: &'static str,
}

impl NormalizerInfo {
    /// Identity for a normalizer emitting the current schema version.
    #[must_use]
    pub const fn new(name: &'static str, slug: &'static str) -> Self {
        Self {
            version: Version::new(1, 0, 0),
            name,
            slug,
        }
    }
}

/// Converts one CI platform's environment into the canonical schema.
pub trait Normalizer {
    /// Static identity.
    fn info(&self) -> &'static NormalizerInfo;

    /// Display name, e.g. `GitHub Actions`.
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Slug, e.g. `github-actions`.
    fn slug(&self) -> &'static str {
        self.info().slug
    }

    /// Schema version emitted.
    fn version(&self) -> &'static Version {
        &self.info().version
    }

    /// `true` when `env` was produced by this platform.
    ///
    /// Must be cheap, pure and free of false positives against the other
    /// supported platforms.
    fn check(&self, env: &Environment) -> bool;

    /// Map `env` into a fresh [`NciSpec`].
    ///
    /// # Errors
    /// Fails when a provider reference is malformed or when the VCS
    /// collaborator cannot locate or read the repository.
    fn normalize(&self, env: &Environment, ctx: &NormalizeContext<'_>) -> Result<NciSpec>;

    /// Reconstruct platform-native variables from canonical ones.
    ///
    /// Platforms that cannot be driven by injected variables return an
    /// empty mapping.
    fn denormalize(&self, env: &Environment) -> Environment {
        let _ = env;
        Environment::new()
    }
}
