//! Built-in defaults shared by the orchestrator and the CLI.

use crate::logging::LogFormat;
use crate::settings::Settings;

/// Administrative database that always exists in a fresh cluster.
pub const ADMIN_DATABASE: &str = "postgres";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5432;

/// Default socket directory, matching the engine's compiled-in default.
pub const DEFAULT_SOCKET_DIR: &str = "/tmp";

/// Default bounded wait for the transient server to report ready.
pub const DEFAULT_START_TIMEOUT_SECS: u64 = 60;

/// Default bounded wait for a graceful shutdown before escalating.
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binary.
#[must_use]
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::default()
}

/// Base server settings rendered into every configuration file.
///
/// Deliberately small: only what a freshly initialised cluster needs to be
/// reachable locally. Everything else stays on the engine's own defaults
/// until the operator overrides it.
#[must_use]
pub fn server_settings() -> Settings {
    let mut settings = Settings::new();
    settings.set("listen_addresses", "localhost");
    settings
}
