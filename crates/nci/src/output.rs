//! Rendering of environment mappings.

use crate::cli::OutputFormat;
use nci_core::{Environment, Result};

/// Render `env` in `format`.
///
/// Output is sorted by key and ends with a newline unless `env` is empty,
/// in which case the env formats render nothing and JSON renders `{}`.
/// The env format writes exactly one line per key: backslashes, newlines
/// and carriage returns in values are escaped as `\\`, `\n` and `\r`.
///
/// # Errors
/// Returns [`nci_core::Error::Json`] if JSON serialization fails.
pub fn render(env: &Environment, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Env => env
            .iter()
            .map(|(key, value)| format!("{key}={}\n", escape_env_value(value)))
            .collect(),
        OutputFormat::Export => env
            .iter()
            .map(|(key, value)| format!("export {key}=\"{}\"\n", escape_shell_value(value)))
            .collect(),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(env)?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}

/// Escape line breaks so a value cannot spill onto the next line
fn escape_env_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Escape special characters in double-quoted shell values
fn escape_shell_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('`', "\\`")
}
