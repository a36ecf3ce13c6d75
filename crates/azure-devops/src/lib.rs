//! Azure DevOps Pipelines normalizer for nci.
//!
//! Recognizes runs via `TF_BUILD=True` (any case). Agent facts come from
//! the `AGENT_*` variables, build facts from `BUILD_*` and `SYSTEM_*`.

#![warn(missing_docs)]

mod pipelines;

pub use pipelines::AzureDevOpsNormalizer;
