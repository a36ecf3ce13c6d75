//! Pipeline trigger classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a pipeline run started.
///
/// This is a closed set: provider events that do not map to `Push` or
/// `PullRequest` become `Unknown` rather than being passed through raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineTrigger {
    /// A commit was pushed to a branch or tag.
    Push,
    /// A pull/merge request was opened or updated.
    PullRequest,
    /// Anything else (schedules, manual runs, API triggers, ...).
    #[default]
    Unknown,
}

impl PipelineTrigger {
    /// Canonical string form used in the NCI schema.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull-request",
            Self::Unknown => "unknown",
        }
    }

    /// `true` for [`PipelineTrigger::PullRequest`].
    #[must_use]
    pub const fn is_pull_request(self) -> bool {
        matches!(self, Self::PullRequest)
    }
}

impl fmt::Display for PipelineTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineTrigger {
    type Err = std::convert::Infallible;

    /// Parses the canonical form. Unrecognized input yields `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "push" => Self::Push,
            "pull-request" => Self::PullRequest,
            _ => Self::Unknown,
        })
    }
}
