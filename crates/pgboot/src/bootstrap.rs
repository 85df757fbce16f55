//! Top-level bootstrap orchestration.
//!
//! A run either initialises a brand-new cluster and provisions it through a
//! transient server, or observes an existing data directory and does nothing.
//! The data directory's existence is the only state consulted; re-running
//! after success is always a no-op.

use pgboot_config::InstanceConfig;
use pgboot_engine::{ClusterEngine, EngineBinaries, SystemEngine};
use tracing::info;

use crate::errors::BootstrapError;
use crate::init;
use crate::interrupt::InterruptFlag;
use crate::state::BootstrapState;
use crate::transient;

/// Tracing target for orchestration.
const BOOTSTRAP_TARGET: &str = "pgboot::bootstrap";

/// What a completed bootstrap run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A new cluster was initialised and provisioned.
    Bootstrapped,
    /// The data directory already existed; nothing was changed.
    AlreadyInitialised,
}

/// Bootstraps the configured instance with the provided collaborators.
///
/// Configured directories are resolved here, immediately before use, so
/// environment-indirected locations reflect the environment at execution
/// time rather than at configuration load.
///
/// # Errors
///
/// Returns a [`BootstrapError`] naming the first step that failed. The
/// transient server and its socket directory are cleaned up before the
/// error is returned.
pub fn bootstrap_with<E: ClusterEngine>(
    config: &InstanceConfig,
    engine: &E,
    interrupt: &InterruptFlag,
) -> Result<BootstrapOutcome, BootstrapError> {
    interrupt.ensure_clear()?;
    let data_dir = config.data_dir.resolve()?;
    let mut state = BootstrapState::detect(&data_dir);
    if state == BootstrapState::Uninitialised {
        state = init::initialise_cluster(engine, config, &data_dir)?;
    }
    if state.requires_transient_phase() {
        transient::run_transient_phase(engine, config, &data_dir, interrupt)?;
        info!(target: BOOTSTRAP_TARGET, data_dir = %data_dir, "bootstrap complete");
        Ok(BootstrapOutcome::Bootstrapped)
    } else {
        info!(
            target: BOOTSTRAP_TARGET,
            data_dir = %data_dir,
            "cluster already initialised; nothing to do"
        );
        Ok(BootstrapOutcome::AlreadyInitialised)
    }
}

/// Bootstraps the configured instance with the system engine and live
/// signal handling.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when signal handlers cannot be installed or
/// any bootstrap step fails.
pub fn bootstrap(config: &InstanceConfig) -> Result<BootstrapOutcome, BootstrapError> {
    let interrupt = InterruptFlag::install()?;
    let engine = SystemEngine::new(EngineBinaries::discover(config.bin_dir.as_deref()));
    bootstrap_with(config, &engine, &interrupt)
}
