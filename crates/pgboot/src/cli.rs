//! Command-line entry for the bootstrap orchestrator.
//!
//! The binary entrypoint delegates here so tests can drive the full argument
//! handling with substituted IO streams.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use clap::error::ErrorKind;
use pgboot_config::{InstanceConfig, LogFormat};
use tracing::info;

use crate::bootstrap;
use crate::errors::BootstrapError;
use crate::state::BootstrapState;
use crate::telemetry;

/// Tracing target for the command-line layer.
const CLI_TARGET: &str = "pgboot::cli";

/// Exit code for command-line usage errors.
const USAGE_EXIT_CODE: u8 = 2;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "pgboot",
    version,
    about = "Bootstraps a database cluster exactly once"
)]
struct Cli {
    /// Path to the instance configuration document.
    #[arg(long, value_name = "FILE")]
    config: Utf8PathBuf,
    /// Overrides the configured log filter.
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
    /// Overrides the configured log format.
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
    /// Validates the configuration and reports the detected cluster state
    /// without invoking the engine.
    #[arg(long)]
    check: bool,
}

/// Runs the orchestrator using the provided arguments and IO handles.
#[must_use]
pub fn run<I, T, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return handle_parse_error(&error, stdout, stderr),
    };
    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

/// Routes help and version requests to stdout; everything else is a usage
/// error.
fn handle_parse_error<W, E>(error: &clap::Error, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    W: Write,
    E: Write,
{
    let rendered = error.render();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(stdout, "{rendered}");
            ExitCode::SUCCESS
        }
        _ => {
            let _ = write!(stderr, "{rendered}");
            ExitCode::from(USAGE_EXIT_CODE)
        }
    }
}

/// Loads configuration, initialises telemetry, and runs the requested mode.
fn execute(cli: &Cli) -> Result<(), BootstrapError> {
    let config =
        InstanceConfig::from_toml_file(&cli.config).map_err(|source| BootstrapError::Config {
            path: cli.config.clone(),
            source,
        })?;
    let preferences = config
        .logging
        .clone()
        .with_overrides(cli.log_filter.clone(), cli.log_format);
    telemetry::initialise(&preferences)?;
    if cli.check {
        let data_dir = config.data_dir.resolve()?;
        let socket_dir = config.socket_dir.resolve()?;
        let state = BootstrapState::detect(&data_dir);
        info!(
            target: CLI_TARGET,
            config = %cli.config,
            data_dir = %data_dir,
            socket_dir = %socket_dir,
            state = state.as_str(),
            "configuration is valid"
        );
        return Ok(());
    }
    bootstrap::bootstrap(&config).map(|_| ())
}
