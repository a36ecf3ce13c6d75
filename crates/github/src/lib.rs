//! GitHub Actions normalizer for nci.
//!
//! Recognizes runs via `GITHUB_ACTIONS=true` and maps the `GITHUB_*`,
//! `RUNNER_*` and runner image variables into the canonical schema.
//! GitHub Actions cannot be driven by injected variables, so
//! [`Normalizer::denormalize`](nci_normalizer::Normalizer::denormalize)
//! returns an empty mapping.

#![warn(missing_docs)]

mod actions;

pub use actions::GitHubActionsNormalizer;
