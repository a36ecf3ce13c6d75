//! Environment snapshots handed to normalizers.

use std::collections::BTreeMap;

/// An immutable snapshot of environment variables.
///
/// A `BTreeMap` keeps rendering order stable, so two runs over the same
/// input print byte-identical output.
pub type Environment = BTreeMap<String, String>;

/// Read helpers over an [`Environment`].
pub trait EnvironmentExt {
    /// Value of `key`, or the empty string when unset.
    fn value(&self, key: &str) -> &str;

    /// `true` when `key` is set to a non-empty value.
    fn is_set(&self, key: &str) -> bool {
        !self.value(key).is_empty()
    }

    /// `true` when `key` equals `expected`, ignoring ASCII case.
    fn is_flag(&self, key: &str, expected: &str) -> bool {
        self.value(key).eq_ignore_ascii_case(expected)
    }
}

impl EnvironmentExt for Environment {
    fn value(&self, key: &str) -> &str {
        self.get(key).map_or("", String::as_str)
    }
}

/// Build an environment from `(key, value)` pairs.
///
/// ```
/// use nci_core::environment::{from_pairs, EnvironmentExt};
///
/// let env = from_pairs([("GITHUB_ACTIONS", "true")]);
/// assert!(env.is_flag("GITHUB_ACTIONS", "TRUE"));
/// ```
pub fn from_pairs<I, K, V>(pairs: I) -> Environment
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Snapshot the current process environment.
///
/// Variables whose name or value is not valid unicode are skipped.
#[must_use]
pub fn from_process() -> Environment {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}
