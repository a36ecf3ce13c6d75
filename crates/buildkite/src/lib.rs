//! Buildkite normalizer for nci.
//!
//! Recognizes jobs via `BUILDKITE=true`. Buildkite exposes the pull
//! request number directly in `BUILDKITE_PULL_REQUEST` (`false` outside of
//! pull request builds), so no ref parsing is needed.

#![warn(missing_docs)]

mod agent;

pub use agent::BuildkiteNormalizer;
