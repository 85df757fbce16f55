//! Bootstrap orchestration for a PostgreSQL-compatible cluster.
//!
//! The orchestrator prepares a data directory exactly once: when the
//! directory is missing it initialises a cluster, starts a short-lived
//! server on a private socket, provisions databases and schemas over SQL,
//! and stops the server again. When the directory already exists the run is
//! a logged no-op, so the binary is safe to place unconditionally in front
//! of a service start.
//!
//! The sequence is designed around fail-fast semantics. Every phase
//! surfaces a typed [`BootstrapError`] naming the step that broke, and the
//! transient server plus its socket directory are cleaned up on every exit
//! path, including interruption by signal, without masking the original
//! error.
//!
//! Engine processes are driven through the [`pgboot_engine::ClusterEngine`]
//! trait, so tests exercise the whole sequence against recorded doubles
//! while the binary uses the system implementation.

mod bootstrap;
mod cli;
mod conf;
mod errors;
mod init;
mod interrupt;
mod provision;
mod scripts;
mod state;
mod telemetry;
mod transient;

pub use bootstrap::{BootstrapOutcome, bootstrap, bootstrap_with};
pub use cli::run;
pub use errors::BootstrapError;
pub use interrupt::{InterruptError, InterruptFlag};
pub use scripts::BootstrapHook;
pub use state::BootstrapState;
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};

#[cfg(test)]
mod test_support;
