//! Configuration model for the cluster bootstrap orchestrator.
//!
//! This crate owns everything the orchestrator needs to know before it
//! touches a data directory: the [`InstanceConfig`] describing one bootstrap
//! target, the [`Settings`] map rendered into the server configuration file,
//! the [`DirSpec`] indirection used to point at directories either literally
//! or through an environment variable resolved at execution time, and the
//! validated [`DatabaseName`] identifiers for initial databases.
//!
//! The model is deliberately inert. Nothing here spawns processes or writes
//! files; resolution of a [`DirSpec`] against the live environment is the one
//! operation that consults ambient state, and it does so only when invoked so
//! that values populated late by an outer supervisor are still honoured.

pub mod defaults;

mod database;
mod dirspec;
mod instance;
mod logging;
mod settings;

pub use database::{
    DatabaseName, DatabaseNameError, InitialDatabase, SchemaSource, MAX_IDENTIFIER_BYTES,
};
pub use dirspec::{DirResolveError, DirSpec};
pub use instance::{BootstrapScripts, ConfigError, InstanceConfig};
pub use logging::{LogFormat, LogFormatParseError, LogPreferences};
pub use settings::{SettingValue, Settings};
