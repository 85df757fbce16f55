//! Top-level description of a bootstrap target.
//!
//! [`InstanceConfig`] captures everything one bootstrap run needs: where the
//! cluster lives, how the transient server is reached, which databases and
//! schema sources to provision, and the settings rendered into the server
//! configuration file. It is constructed once, from a TOML document or
//! programmatically, and never mutated during a run.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::{DatabaseName, InitialDatabase};
use crate::defaults;
use crate::dirspec::DirSpec;
use crate::logging::LogPreferences;
use crate::settings::Settings;

/// Optional SQL hooks bracketing database provisioning.
///
/// Each hook is a literal SQL string submitted verbatim against the
/// administrative database. Hooks run exactly once, on fresh initialisation
/// only; authors are responsible for their own re-run safety.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapScripts {
    /// SQL submitted before any database is provisioned.
    pub before: Option<String>,
    /// SQL submitted after all databases are provisioned.
    pub after: Option<String>,
}

impl BootstrapScripts {
    /// Returns `true` when neither hook is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }
}

/// Immutable description of one cluster bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    /// Name passed to the init routine as the cluster superuser.
    #[serde(default)]
    pub superuser: Option<String>,
    /// Port the transient server binds on its private socket.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Data directory holding persistent cluster state.
    pub data_dir: DirSpec,
    /// Directory under which the transient socket directory is created.
    #[serde(default = "default_socket_dir")]
    pub socket_dir: DirSpec,
    /// Additional arguments passed through to the init routine.
    #[serde(default)]
    pub init_args: Vec<String>,
    /// Baseline server settings rendered into the configuration file.
    #[serde(default = "defaults::server_settings")]
    pub default_settings: Settings,
    /// Operator overrides merged over [`Self::default_settings`].
    #[serde(default)]
    pub settings: Settings,
    /// Whether to create a database named after the invoking OS user when no
    /// explicit databases are configured.
    #[serde(default = "default_create_default_database")]
    pub create_default_database: bool,
    /// Databases to provision, in declaration order.
    #[serde(default, rename = "database")]
    pub databases: Vec<InitialDatabase>,
    /// Optional SQL hooks around provisioning.
    #[serde(default)]
    pub scripts: BootstrapScripts,
    /// Telemetry preferences for the orchestrator itself.
    #[serde(default)]
    pub logging: LogPreferences,
    /// Directory holding the engine binaries, when not discovered via `PATH`.
    #[serde(default)]
    pub bin_dir: Option<Utf8PathBuf>,
    /// Seconds to wait for the transient server to report ready.
    #[serde(default = "default_start_timeout")]
    pub start_timeout_secs: u64,
    /// Seconds to wait for a graceful stop before escalating.
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_secs: u64,
}

fn default_port() -> u16 {
    defaults::DEFAULT_PORT
}

fn default_socket_dir() -> DirSpec {
    DirSpec::literal(defaults::DEFAULT_SOCKET_DIR)
}

fn default_create_default_database() -> bool {
    true
}

fn default_start_timeout() -> u64 {
    defaults::DEFAULT_START_TIMEOUT_SECS
}

fn default_stop_timeout() -> u64 {
    defaults::DEFAULT_STOP_TIMEOUT_SECS
}

/// Errors surfaced while loading or validating an [`InstanceConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read configuration file '{path}': {source}")]
    Read {
        /// File that could not be read.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The configuration text is not a valid instance description.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Underlying TOML error.
        #[source]
        source: Box<toml::de::Error>,
    },
    /// The same database name appears in more than one `[[database]]` block.
    #[error("database '{name}' is declared more than once")]
    DuplicateDatabase {
        /// The repeated name.
        name: DatabaseName,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(source: toml::de::Error) -> Self {
        Self::Parse {
            source: Box::new(source),
        }
    }
}

impl InstanceConfig {
    /// Builds a minimal configuration targeting `data_dir`, with every other
    /// field at its default.
    #[must_use]
    pub fn new(data_dir: DirSpec) -> Self {
        Self {
            superuser: None,
            port: default_port(),
            data_dir,
            socket_dir: default_socket_dir(),
            init_args: Vec::new(),
            default_settings: defaults::server_settings(),
            settings: Settings::default(),
            create_default_database: default_create_default_database(),
            databases: Vec::new(),
            scripts: BootstrapScripts::default(),
            logging: LogPreferences::default(),
            bin_dir: None,
            start_timeout_secs: default_start_timeout(),
            stop_timeout_secs: default_stop_timeout(),
        }
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::DuplicateDatabase`] when two `[[database]]` entries
    /// share a name.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] when the file cannot be read, plus the
    /// errors documented on [`Self::from_toml_str`].
    pub fn from_toml_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Returns the settings written to the server configuration file:
    /// defaults, then the configured port, then operator overrides.
    ///
    /// The port is injected between the two layers so a `port` entry in
    /// [`Self::settings`] still wins.
    #[must_use]
    pub fn merged_settings(&self) -> Settings {
        let mut base = self.default_settings.clone();
        base.set("port", i64::from(self.port));
        base.merge(&self.settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: Vec<&DatabaseName> = Vec::new();
        for database in &self.databases {
            if seen.contains(&&database.name) {
                return Err(ConfigError::DuplicateDatabase {
                    name: database.name.clone(),
                });
            }
            seen.push(&database.name);
        }
        Ok(())
    }
}
