use crate::provider::Provider;
use crate::tracing::{LogLevel, TracingConfig, TracingFormat};
use clap::{Parser, Subcommand, ValueEnum};
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Normalization failed (malformed reference, repository not readable)
pub const EXIT_NORMALIZE: i32 = 1;
/// No supported CI provider recognized the environment
pub const EXIT_NOT_DETECTED: i32 = 2;
/// CLI or configuration error exit code
pub const EXIT_CONFIG: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// No provider matched (exit code 2)
    #[error("No supported CI provider detected")]
    #[diagnostic(
        code(nci::cli::not_detected),
        help("Supported providers: {known}")
    )]
    NotDetected {
        /// Slugs the environment was checked against
        known: String,
    },
    /// CLI or configuration error (exit code 3)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(nci::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Normalization error (exit code 1)
    #[error(transparent)]
    #[diagnostic(transparent)]
    Normalize(nci_core::Error),
}

impl CliError {
    /// Create a new not-detected error listing the checked providers
    #[must_use]
    pub fn not_detected(providers: &[Provider]) -> Self {
        Self::NotDetected {
            known: providers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

/// Convert `nci_core::Error` to the appropriate `CliError` variant.
///
/// Configuration, TOML and I/O problems are user-facing config issues;
/// everything else happened while normalizing.
impl From<nci_core::Error> for CliError {
    fn from(err: nci_core::Error) -> Self {
        match err {
            nci_core::Error::Configuration { message, help } => {
                Self::config_with_help(message, help)
            }
            nci_core::Error::TomlParse(e) => Self::config_with_help(
                e.to_string(),
                "Check the configuration file syntax and field names",
            ),
            nci_core::Error::Io(e) => Self::config(e.to_string()),
            other => Self::Normalize(other),
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::NotDetected { .. } => EXIT_NOT_DETECTED,
        CliError::Config { .. } => EXIT_CONFIG,
        CliError::Normalize(_) => EXIT_NORMALIZE,
    }
}

/// Render an error to stderr with miette
#[allow(clippy::print_stderr)]
pub fn render_error(err: CliError) {
    let report = Report::new(err);
    eprintln!("{report:?}");
    let _ = io::stderr().flush();
}

/// Output format for rendered mappings
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Default)]
pub enum OutputFormat {
    /// `KEY=value` lines
    #[default]
    Env,
    /// `export KEY="value"` lines, safe to `eval` in POSIX shells
    Export,
    /// A JSON object
    Json,
}

/// Normalize CI environment variables into one vendor-neutral schema.
#[derive(Parser, Debug)]
#[command(name = "nci")]
#[command(about = "Normalize CI environment variables into one vendor-neutral schema")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Directory repository discovery starts from.
    #[arg(long, global = true, env = "NCI_WORKDIR", value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Configuration file.
    #[arg(long, global = true, env = "NCI_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        env = "NCI_LOG_LEVEL",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "NCI_LOG_FORMAT",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    /// Emit logs as JSON (shorthand for `--log-format json`).
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Explicit tracing filter directive, e.g. `nci_vcs=trace`.
    /// Overrides `--level` and `RUST_LOG`.
    #[arg(long, global = true, env = "NCI_LOG_FILTER", value_name = "DIRECTIVE")]
    pub log_filter: Option<String>,
}

impl Cli {
    /// Tracing configuration selected by the global logging flags.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: if self.json_logs {
                TracingFormat::Json
            } else {
                self.log_format
            },
            level: self.level.into(),
            filter: self.log_filter.clone(),
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the slug of the detected CI provider.
    Detect,
    /// Print the normalized environment.
    Normalize {
        /// Output format.
        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Env)]
        format: OutputFormat,
    },
    /// Print provider-native variables reconstructed from NCI variables.
    Denormalize {
        /// Provider whose variables are produced.
        #[arg(long, short = 't', value_enum)]
        target: Provider,
        /// Output format.
        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Env)]
        format: OutputFormat,
    },
    /// List providers in detection order.
    Providers,
}

/// Parse the process arguments.
///
/// # Errors
/// Returns the clap error for usage problems and for `--help`/`--version`,
/// which the caller prints.
pub fn parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}

/// Exit code for a clap error: success for help and version output,
/// [`EXIT_CONFIG`] for usage errors.
#[must_use]
pub fn exit_code_for_usage(err: &clap::Error) -> i32 {
    if err.use_stderr() { EXIT_CONFIG } else { EXIT_OK }
}
