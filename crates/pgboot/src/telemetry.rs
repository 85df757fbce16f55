//! Telemetry initialisation for the bootstrap orchestrator.
//!
//! Logs are written to standard error so that the orchestrator's own output
//! never interleaves with anything a supervising process captures from the
//! managed server binaries.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use pgboot_config::{LogFormat, LogPreferences};
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Errors raised while initialising telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive could not be parsed.
    #[error("invalid log filter '{0}'")]
    Filter(String),
    /// Installing the global subscriber failed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Marker confirming telemetry has been initialised.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryHandle;

/// Initialises the global tracing subscriber once per process.
///
/// Subsequent calls are no-ops returning the same handle, so embedding
/// callers and tests may invoke this freely.
///
/// # Errors
///
/// Returns a [`TelemetryError`] when the filter does not parse or the
/// subscriber cannot be installed.
pub fn initialise(preferences: &LogPreferences) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD.get_or_try_init(|| install_subscriber(preferences))?;
    Ok(TelemetryHandle)
}

fn install_subscriber(preferences: &LogPreferences) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&preferences.filter)
        .map_err(|_| TelemetryError::Filter(preferences.filter.clone()))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());
    match preferences.format {
        LogFormat::Json => {
            let subscriber = builder.json().flatten_event(true).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = builder.compact().finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}
