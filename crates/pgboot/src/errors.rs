//! Failure taxonomy for the bootstrap orchestrator.
//!
//! Every phase surfaces a dedicated variant so the first failure names the
//! step that broke. Cleanup paths log their own problems instead of raising
//! them, so the original error always reaches the caller intact.

use std::io;

use camino::Utf8PathBuf;
use pgboot_config::{ConfigError, DatabaseName, DirResolveError};
use pgboot_engine::EngineError;
use thiserror::Error;

use crate::interrupt::InterruptError;
use crate::scripts::BootstrapHook;
use crate::telemetry::TelemetryError;

/// Errors raised while bootstrapping a cluster.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Loading or validating the configuration document failed.
    #[error("failed to load configuration from '{path}': {source}")]
    Config {
        /// Configuration file path.
        path: Utf8PathBuf,
        /// Underlying configuration error.
        #[source]
        source: ConfigError,
    },
    /// Resolving a configured directory failed.
    #[error("failed to resolve configured directory: {source}")]
    Directory {
        /// Underlying resolution error.
        #[source]
        source: DirResolveError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Installing signal handlers failed.
    #[error("failed to prepare interruption handling: {source}")]
    Interrupt {
        /// Underlying installation error.
        #[source]
        source: InterruptError,
    },
    /// Initialising the cluster data directory failed.
    #[error("cluster initialisation failed: {source}")]
    Initialisation {
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },
    /// Writing the rendered server settings file failed.
    #[error("failed to write server settings '{path}': {source}")]
    SettingsWrite {
        /// Settings file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Creating the configured socket parent directory failed.
    #[error("failed to create socket directory '{path}': {source}")]
    SocketDirectory {
        /// Socket parent directory path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Creating the private transient socket directory failed.
    #[error("failed to create transient socket directory under '{path}': {source}")]
    TransientSocketDirectory {
        /// Parent directory the private directory was created under.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Starting the transient server failed.
    #[error("transient server failed to start: {source}")]
    TransientStart {
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },
    /// Stopping the transient server failed even after escalation.
    #[error("transient server failed to stop: {source}")]
    TransientStop {
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },
    /// A configured bootstrap script failed against the admin database.
    #[error("{hook} script failed: {source}")]
    Script {
        /// Which bootstrap script failed.
        hook: BootstrapHook,
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },
    /// Probing the catalogue for an existing database failed.
    #[error("failed to check whether database '{name}' exists: {source}")]
    ExistenceProbe {
        /// Database the probe targeted.
        name: DatabaseName,
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },
    /// Creating a configured database failed.
    #[error("failed to create database '{name}': {source}")]
    CreateDatabase {
        /// Database being created.
        name: DatabaseName,
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },
    /// A configured schema source is neither a file nor a directory.
    #[error("schema source '{path}' is neither a file nor a directory")]
    SchemaSourceUnresolvable {
        /// The path as resolved from the configuration.
        path: Utf8PathBuf,
    },
    /// Listing a schema directory failed.
    #[error("failed to enumerate schema directory '{path}': {source}")]
    SchemaEnumeration {
        /// Schema directory path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Reading a schema file failed.
    #[error("failed to read schema file '{path}': {source}")]
    SchemaRead {
        /// Schema file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Applying a schema file to its database failed.
    #[error("failed to apply schema file '{path}' to database '{database}': {source}")]
    SchemaApplication {
        /// Database the file was applied to.
        database: DatabaseName,
        /// Schema file path.
        path: Utf8PathBuf,
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },
    /// The invoking user could not be turned into a default database name.
    #[error("cannot derive default database from invoking user: {message}")]
    DefaultDatabaseUser {
        /// Description of what went wrong.
        message: String,
    },
    /// A termination signal arrived while the bootstrap was in progress.
    #[error("bootstrap interrupted by signal")]
    Interrupted,
}

impl From<DirResolveError> for BootstrapError {
    fn from(source: DirResolveError) -> Self {
        Self::Directory { source }
    }
}

impl From<TelemetryError> for BootstrapError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

impl From<InterruptError> for BootstrapError {
    fn from(source: InterruptError) -> Self {
        Self::Interrupt { source }
    }
}
