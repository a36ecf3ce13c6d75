//! Command implementations.
//!
//! Commands take the environment snapshot as a parameter and return the
//! text to print, so they can be exercised without touching the process
//! environment or stdout.

use crate::cli::{CliError, Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::output::render;
use crate::provider::Dispatcher;
use nci_core::Environment;
use nci_normalizer::{NormalizeContext, Normalizer};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Execute the parsed command against `env`.
///
/// # Errors
/// Returns [`CliError::NotDetected`] when `detect` or `normalize` find no
/// provider, [`CliError::Config`] for configuration problems and
/// [`CliError::Normalize`] when normalization fails.
#[instrument(skip_all, fields(command = ?cli.command))]
pub fn execute(cli: &Cli, env: &Environment) -> Result<String, CliError> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let dispatcher = config.dispatcher()?;

    match cli.command {
        Commands::Detect => {
            let provider = dispatcher
                .detect(env)
                .ok_or_else(|| CliError::not_detected(dispatcher.providers()))?;
            Ok(format!("{}\n", provider.slug()))
        }
        Commands::Normalize { format } => normalize(cli, &config, &dispatcher, env, format),
        Commands::Denormalize { target, format } => {
            debug!(target = target.slug(), "Denormalizing");
            Ok(render(&target.denormalize(env), format)?)
        }
        Commands::Providers => Ok(dispatcher
            .providers()
            .iter()
            .map(|p| format!("{}\t{}\n", p.slug(), p.name()))
            .collect()),
    }
}

fn normalize(
    cli: &Cli,
    config: &Config,
    dispatcher: &Dispatcher,
    env: &Environment,
    format: OutputFormat,
) -> Result<String, CliError> {
    let working_dir = working_dir(cli)?;
    let vcs = config.git();
    let ctx = NormalizeContext::new(working_dir, &vcs, config.project_details.provider());

    let spec = dispatcher
        .normalize(env, &ctx)?
        .ok_or_else(|| CliError::not_detected(dispatcher.providers()))?;
    Ok(render(&spec.to_map(), format)?)
}

fn working_dir(cli: &Cli) -> Result<PathBuf, CliError> {
    match &cli.workdir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(|e| {
            CliError::config_with_help(
                format!("cannot determine the working directory: {e}"),
                "Pass --workdir or set NCI_WORKDIR",
            )
        }),
    }
}
