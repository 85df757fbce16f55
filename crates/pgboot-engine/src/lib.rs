//! Process-level adapter between the bootstrap orchestrator and the
//! database engine binaries.
//!
//! The orchestrator sees only the [`ClusterEngine`] trait: initialise a data
//! directory, start and stop a server with bounded waits, submit SQL, and
//! probe the catalog for a database. [`SystemEngine`] implements the trait by
//! invoking the engine's own tools as child processes, located through
//! [`EngineBinaries`]. Keeping the trait narrow lets the orchestrator's
//! phases be exercised in tests with recording doubles instead of a real
//! cluster.

pub mod sql;

mod binaries;
mod cluster;
mod error;
mod system;

pub use binaries::{BIN_DIR_ENV, EngineBinaries};
pub use cluster::{
    ClusterEngine, InitRequest, ShutdownMode, SqlSession, StartRequest, StopRequest,
};
pub use error::EngineError;
pub use system::SystemEngine;
