//! Defines the error surface for engine binary invocations.

use std::io;

use thiserror::Error;

/// Errors surfaced while driving the engine binaries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Spawning an engine binary failed.
    #[error("failed to spawn '{binary}': {source}")]
    Spawn {
        /// Binary that could not be started.
        binary: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The child process did not expose a stdin pipe.
    #[error("'{binary}' did not expose a stdin pipe")]
    StdinUnavailable {
        /// Binary missing the pipe.
        binary: String,
    },
    /// Exchanging data with the child process failed.
    #[error("failed to exchange data with '{binary}': {source}")]
    Io {
        /// Binary involved in the exchange.
        binary: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// An engine binary exited with a failure status.
    #[error("'{binary}' exited with status {status}: {stderr}")]
    Failed {
        /// Binary that failed.
        binary: String,
        /// Exit code, `-1` when terminated by a signal.
        status: i32,
        /// Trimmed stderr output.
        stderr: String,
    },
    /// Output from an engine binary could not be interpreted.
    #[error("unexpected output from '{binary}': {message}")]
    UnexpectedOutput {
        /// Binary that produced the output.
        binary: String,
        /// Description of the anomaly.
        message: String,
    },
}
