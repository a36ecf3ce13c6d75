//! GitLab CI normalizer for nci.
//!
//! Recognizes jobs via `GITLAB_CI=true`. GitLab is the only supported
//! platform with a deploy freeze signal (`CI_DEPLOY_FREEZE`), and its
//! predefined variables can be reconstructed from the canonical schema,
//! which lets tooling written for GitLab run unchanged elsewhere.

#![warn(missing_docs)]

mod ci;

pub use ci::GitLabCiNormalizer;
