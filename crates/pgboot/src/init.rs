//! Cluster initialisation for a missing data directory.

use camino::Utf8Path;
use pgboot_config::InstanceConfig;
use pgboot_engine::{ClusterEngine, InitRequest};
use tracing::info;

use crate::errors::BootstrapError;
use crate::state::BootstrapState;

/// Tracing target for cluster initialisation.
const INIT_TARGET: &str = "pgboot::init";

/// Initialises a fresh cluster in the resolved data directory.
///
/// Only called when detection found no directory; a successful return moves
/// the run to [`BootstrapState::FreshlyInitialised`].
pub(crate) fn initialise_cluster<E: ClusterEngine>(
    engine: &E,
    config: &InstanceConfig,
    data_dir: &Utf8Path,
) -> Result<BootstrapState, BootstrapError> {
    info!(
        target: INIT_TARGET,
        data_dir = %data_dir,
        "initialising new cluster"
    );
    let request = InitRequest {
        data_dir: data_dir.to_owned(),
        superuser: config.superuser.clone(),
        extra_args: config.init_args.clone(),
    };
    engine
        .init_cluster(&request)
        .map_err(|source| BootstrapError::Initialisation { source })?;
    Ok(BootstrapState::FreshlyInitialised)
}
