//! Core types for nci.
//!
//! This crate holds the pieces every normalizer shares:
//!
//! - [`spec`] - the canonical [`NciSpec`] schema and its key constants
//! - [`environment`] - the [`Environment`] snapshot normalizers read from
//! - [`slug`] - deterministic slugification
//! - [`trigger`] - the closed [`PipelineTrigger`] classification
//! - [`error`] - the error taxonomy shared by all crates

pub mod environment;
pub mod error;
pub mod slug;
pub mod spec;
pub mod trigger;

pub use environment::{Environment, EnvironmentExt};
pub use error::{Error, Result};
pub use slug::slugify;
pub use spec::{NciSpec, SPEC_VERSION, keys};
pub use trigger::PipelineTrigger;
