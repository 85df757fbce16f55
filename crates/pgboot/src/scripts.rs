//! Literal SQL scripts run against the administrative database.

use std::fmt;

use pgboot_engine::{ClusterEngine, SqlSession};
use tracing::{debug, info};

use crate::errors::BootstrapError;

/// Tracing target for bootstrap scripts.
const SCRIPT_TARGET: &str = "pgboot::scripts";

/// Position of a bootstrap script relative to database provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapHook {
    /// Runs before any database is provisioned.
    Before,
    /// Runs after all databases are provisioned.
    After,
}

impl BootstrapHook {
    /// Stable label for logs and error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for BootstrapHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs one configured script, or nothing when the slot is empty.
///
/// Scripts are literal SQL text, submitted as a single batch against the
/// administrative database.
pub(crate) fn run_hook<E: ClusterEngine>(
    engine: &E,
    admin: &SqlSession,
    hook: BootstrapHook,
    sql: Option<&str>,
) -> Result<(), BootstrapError> {
    let Some(sql) = sql else {
        debug!(target: SCRIPT_TARGET, hook = hook.as_str(), "no script configured");
        return Ok(());
    };
    info!(target: SCRIPT_TARGET, hook = hook.as_str(), "running bootstrap script");
    engine
        .execute_sql(admin, sql)
        .map_err(|source| BootstrapError::Script { hook, source })
}
