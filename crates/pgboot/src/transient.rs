//! Transient-server lifecycle with guaranteed socket cleanup.
//!
//! The server run here exists only to accept local SQL during bootstrap. It
//! binds a private, randomly named socket directory and opens no network
//! listener, so nothing outside this process can mistake it for the real
//! service. The socket directory is removed on every exit path, success or
//! failure, by a drop guard.

use std::fs;
use std::io;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use pgboot_config::InstanceConfig;
use pgboot_engine::{ClusterEngine, ShutdownMode, SqlSession, StartRequest, StopRequest};
use tempfile::TempDir;
use tracing::{info, warn};

use crate::conf;
use crate::errors::BootstrapError;
use crate::interrupt::InterruptFlag;
use crate::provision;
use crate::scripts::{self, BootstrapHook};

/// Tracing target for the transient-server phase.
const TRANSIENT_TARGET: &str = "pgboot::transient";

/// Bounded wait for the immediate-shutdown fallback.
const ESCALATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Private socket directory removed when the guard drops.
struct TransientSocketDir {
    path: Utf8PathBuf,
    dir: Option<TempDir>,
}

impl TransientSocketDir {
    /// Creates a randomly named directory under `parent`.
    fn create(parent: &Utf8Path) -> Result<Self, BootstrapError> {
        let dir = tempfile::Builder::new()
            .prefix("pgboot-")
            .tempdir_in(parent)
            .map_err(|source| BootstrapError::TransientSocketDirectory {
                path: parent.to_owned(),
                source,
            })?;
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).map_err(|path| {
            BootstrapError::TransientSocketDirectory {
                path: parent.to_owned(),
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("socket path is not UTF-8: {}", path.display()),
                ),
            }
        })?;
        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Drop for TransientSocketDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Err(error) if error.kind() != io::ErrorKind::NotFound => {
                warn!(
                    target: TRANSIENT_TARGET,
                    path = %self.path,
                    error = %error,
                    "failed to remove transient socket directory"
                );
            }
            _ => {}
        }
    }
}

/// Runs the full transient phase against a freshly initialised cluster.
///
/// Writes the merged settings, starts the server on a private socket, runs
/// the SQL steps, and stops the server. A stop failure after a SQL failure
/// is logged rather than raised, so the first error always reaches the
/// caller.
pub(crate) fn run_transient_phase<E: ClusterEngine>(
    engine: &E,
    config: &InstanceConfig,
    data_dir: &Utf8Path,
    interrupt: &InterruptFlag,
) -> Result<(), BootstrapError> {
    conf::write_server_config(data_dir, &config.merged_settings())?;

    let socket_parent = config.socket_dir.resolve()?;
    fs::create_dir_all(&socket_parent).map_err(|source| BootstrapError::SocketDirectory {
        path: socket_parent.clone(),
        source,
    })?;
    let socket_dir = TransientSocketDir::create(&socket_parent)?;
    interrupt.ensure_clear()?;

    info!(
        target: TRANSIENT_TARGET,
        socket_dir = %socket_dir.path(),
        port = config.port,
        "starting transient server"
    );
    let start = StartRequest {
        data_dir: data_dir.to_owned(),
        socket_dir: socket_dir.path().to_owned(),
        port: config.port,
        timeout: Duration::from_secs(config.start_timeout_secs),
    };
    engine
        .start(&start)
        .map_err(|source| BootstrapError::TransientStart { source })?;

    let sql_result = run_sql_steps(engine, config, socket_dir.path(), interrupt);
    let stop_result = stop_transient(engine, config, data_dir);
    if let (Err(_), Err(stop_error)) = (&sql_result, &stop_result) {
        warn!(
            target: TRANSIENT_TARGET,
            error = %stop_error,
            "transient server stop failed during error cleanup"
        );
    }
    sql_result.and(stop_result)
}

/// The SQL work performed while the transient server is up.
fn run_sql_steps<E: ClusterEngine>(
    engine: &E,
    config: &InstanceConfig,
    socket_dir: &Utf8Path,
    interrupt: &InterruptFlag,
) -> Result<(), BootstrapError> {
    let admin = SqlSession::admin(socket_dir.to_owned(), config.port);
    interrupt.ensure_clear()?;
    scripts::run_hook(
        engine,
        &admin,
        BootstrapHook::Before,
        config.scripts.before.as_deref(),
    )?;
    provision::provision_databases(engine, config, &admin, interrupt)?;
    interrupt.ensure_clear()?;
    scripts::run_hook(
        engine,
        &admin,
        BootstrapHook::After,
        config.scripts.after.as_deref(),
    )
}

/// Stops the transient server, escalating once when the graceful stop
/// fails.
fn stop_transient<E: ClusterEngine>(
    engine: &E,
    config: &InstanceConfig,
    data_dir: &Utf8Path,
) -> Result<(), BootstrapError> {
    let graceful = StopRequest {
        data_dir: data_dir.to_owned(),
        mode: ShutdownMode::Graceful,
        timeout: Duration::from_secs(config.stop_timeout_secs),
    };
    match engine.stop(&graceful) {
        Ok(()) => Ok(()),
        Err(error) => {
            warn!(
                target: TRANSIENT_TARGET,
                error = %error,
                "graceful stop did not complete; escalating to immediate shutdown"
            );
            let immediate = StopRequest {
                data_dir: data_dir.to_owned(),
                mode: ShutdownMode::Immediate,
                timeout: ESCALATION_TIMEOUT,
            };
            engine
                .stop(&immediate)
                .map_err(|source| BootstrapError::TransientStop { source })
        }
    }
}
