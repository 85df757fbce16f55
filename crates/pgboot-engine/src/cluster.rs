//! Contract between the bootstrap orchestrator and the database engine.
//!
//! The orchestrator never shells out directly; it drives the engine through
//! the [`ClusterEngine`] trait so tests can substitute doubles that record
//! calls or inject failures without spawning real processes. The production
//! implementation is [`SystemEngine`](crate::system::SystemEngine).

use std::time::Duration;

use camino::Utf8PathBuf;
use pgboot_config::DatabaseName;

use crate::error::EngineError;

/// Arguments for initialising a new cluster data directory.
///
/// The data directory is resolved from configuration immediately before the
/// call so environment-indirected locations reflect the live environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitRequest {
    /// Target data directory.
    pub data_dir: Utf8PathBuf,
    /// Cluster superuser name, passed when configured.
    pub superuser: Option<String>,
    /// Operator arguments passed through ahead of the standard ones.
    pub extra_args: Vec<String>,
}

/// Arguments for starting a transient server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    /// Data directory of the initialised cluster.
    pub data_dir: Utf8PathBuf,
    /// Private socket directory the server binds exclusively; no network
    /// listener is opened.
    pub socket_dir: Utf8PathBuf,
    /// Port number associated with the socket.
    pub port: u16,
    /// Bounded wait for the server to report ready.
    pub timeout: Duration,
}

/// Arguments for stopping a running server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopRequest {
    /// Data directory of the running cluster.
    pub data_dir: Utf8PathBuf,
    /// Shutdown mode to request.
    pub mode: ShutdownMode,
    /// Bounded wait for the shutdown to complete.
    pub timeout: Duration,
}

/// Shutdown escalation rungs understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Wait for active sessions to finish before stopping.
    Graceful,
    /// Disconnect sessions and stop cleanly.
    Fast,
    /// Abort without a clean shutdown; recovery runs on next start.
    Immediate,
}

impl ShutdownMode {
    /// Mode name passed to the engine's stop routine.
    #[must_use]
    pub fn as_flag(self) -> &'static str {
        match self {
            Self::Graceful => "smart",
            Self::Fast => "fast",
            Self::Immediate => "immediate",
        }
    }
}

/// Endpoint and target database for SQL submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlSession {
    /// Socket directory the transient server listens on.
    pub socket_dir: Utf8PathBuf,
    /// Port the server was started with.
    pub port: u16,
    /// Database the statements run against.
    pub database: DatabaseName,
}

impl SqlSession {
    /// Builds a session against the administrative database.
    #[must_use]
    pub fn admin(socket_dir: Utf8PathBuf, port: u16) -> Self {
        Self {
            socket_dir,
            port,
            database: DatabaseName::admin(),
        }
    }

    /// Builds a session against `database` on the same endpoint.
    #[must_use]
    pub fn with_database(&self, database: DatabaseName) -> Self {
        Self {
            socket_dir: self.socket_dir.clone(),
            port: self.port,
            database,
        }
    }
}

/// Trait abstracting the engine control operations for testability.
pub trait ClusterEngine {
    /// Initialises a fresh cluster in the requested data directory.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the init routine cannot be spawned or
    /// exits unsuccessfully. The data directory must be treated as unusable
    /// afterwards.
    fn init_cluster(&self, request: &InitRequest) -> Result<(), EngineError>;

    /// Starts the server and blocks until it reports ready.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the server fails to start or does not
    /// become ready within the request's timeout.
    fn start(&self, request: &StartRequest) -> Result<(), EngineError>;

    /// Stops the server and blocks until shutdown completes.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the shutdown fails or does not complete
    /// within the request's timeout.
    fn stop(&self, request: &StopRequest) -> Result<(), EngineError>;

    /// Submits a batch of SQL text over the session, failing on the first
    /// erroring statement.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the SQL shell cannot be spawned or any
    /// statement in the batch fails.
    fn execute_sql(&self, session: &SqlSession, sql: &str) -> Result<(), EngineError>;

    /// Queries the catalog for a database with exactly the given name.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the probe cannot run or produces output
    /// that is neither a hit nor a miss.
    fn database_exists(
        &self,
        session: &SqlSession,
        name: &DatabaseName,
    ) -> Result<bool, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_modes_map_to_engine_flags() {
        assert_eq!(ShutdownMode::Graceful.as_flag(), "smart");
        assert_eq!(ShutdownMode::Fast.as_flag(), "fast");
        assert_eq!(ShutdownMode::Immediate.as_flag(), "immediate");
    }

    #[test]
    fn admin_session_targets_the_administrative_database() {
        let session = SqlSession::admin(Utf8PathBuf::from("/tmp/sock"), 5432);
        assert_eq!(session.database.as_str(), "postgres");
    }

    #[test]
    fn with_database_keeps_the_endpoint() {
        let admin = SqlSession::admin(Utf8PathBuf::from("/tmp/sock"), 5433);
        let name = DatabaseName::new("app").expect("name should validate");
        let session = admin.with_database(name);
        assert_eq!(session.socket_dir, admin.socket_dir);
        assert_eq!(session.port, 5433);
        assert_eq!(session.database.as_str(), "app");
    }
}
