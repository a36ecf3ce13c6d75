//! nci - CI environment normalization
//!
//! Detects which CI platform produced an environment and maps its
//! variables into the vendor-neutral NCI schema.
//!
//! # Example
//!
//! ```no_run
//! use nci::{Dispatcher, NormalizeContext};
//! use nci_normalizer::RemoteUrlProjectDetails;
//! use nci_vcs::GitCli;
//!
//! let env = nci_core::environment::from_process();
//! let vcs = GitCli::new();
//! let ctx = NormalizeContext::new(".", &vcs, &RemoteUrlProjectDetails);
//!
//! if let Some(spec) = Dispatcher::new().normalize(&env, &ctx)? {
//!     assert!(spec.is_found());
//! }
//! # Ok::<(), nci_core::Error>(())
//! ```

/// CLI argument parsing, errors and exit codes.
pub mod cli;
/// Command implementations.
pub mod commands;
pub mod config;
pub mod output;
pub mod provider;
/// Tracing setup for the CLI.
pub mod tracing;

pub use config::{Config, ProjectDetailsSource};
pub use nci_core::{Environment, Error, NciSpec, PipelineTrigger, Result};
pub use nci_normalizer::{NormalizeContext, Normalizer};
pub use provider::{Dispatcher, Provider};
