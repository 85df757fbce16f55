//! Locates the engine binaries used to drive a cluster.

use camino::{Utf8Path, Utf8PathBuf};

/// Environment variable overriding the engine binary directory.
pub const BIN_DIR_ENV: &str = "PGBOOT_BIN_DIR";

/// Init routine binary.
const INITDB_BINARY: &str = "initdb";
/// Start/stop control binary.
const PG_CTL_BINARY: &str = "pg_ctl";
/// SQL shell binary.
const PSQL_BINARY: &str = "psql";

/// Resolved location of the engine binaries.
///
/// Precedence: an explicitly configured directory, then [`BIN_DIR_ENV`],
/// then bare names left to `PATH` lookup at spawn time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineBinaries {
    bin_dir: Option<Utf8PathBuf>,
}

impl EngineBinaries {
    /// Resolves the binary directory from configuration and environment.
    #[must_use]
    pub fn discover(configured: Option<&Utf8Path>) -> Self {
        let bin_dir = configured.map(Utf8Path::to_path_buf).or_else(env_bin_dir);
        Self { bin_dir }
    }

    /// Uses bare binary names resolved via `PATH`.
    #[must_use]
    pub fn from_path_lookup() -> Self {
        Self { bin_dir: None }
    }

    /// Uses binaries inside a fixed directory.
    #[must_use]
    pub fn in_dir(dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            bin_dir: Some(dir.into()),
        }
    }

    /// Path of the init routine binary.
    #[must_use]
    pub fn initdb(&self) -> Utf8PathBuf {
        self.binary(INITDB_BINARY)
    }

    /// Path of the start/stop control binary.
    #[must_use]
    pub fn pg_ctl(&self) -> Utf8PathBuf {
        self.binary(PG_CTL_BINARY)
    }

    /// Path of the SQL shell binary.
    #[must_use]
    pub fn psql(&self) -> Utf8PathBuf {
        self.binary(PSQL_BINARY)
    }

    fn binary(&self, name: &str) -> Utf8PathBuf {
        match &self.bin_dir {
            Some(dir) => dir.join(name),
            None => Utf8PathBuf::from(name),
        }
    }
}

fn env_bin_dir() -> Option<Utf8PathBuf> {
    std::env::var(BIN_DIR_ENV)
        .ok()
        .map(|candidate| candidate.trim().to_owned())
        .filter(|candidate| !candidate.is_empty())
        .map(Utf8PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directory_prefixes_binary_names() {
        let binaries = EngineBinaries::discover(Some(Utf8Path::new("/opt/pg/bin")));
        assert_eq!(binaries.initdb(), Utf8PathBuf::from("/opt/pg/bin/initdb"));
        assert_eq!(binaries.pg_ctl(), Utf8PathBuf::from("/opt/pg/bin/pg_ctl"));
        assert_eq!(binaries.psql(), Utf8PathBuf::from("/opt/pg/bin/psql"));
    }

    #[test]
    fn path_lookup_uses_bare_names() {
        let binaries = EngineBinaries::from_path_lookup();
        assert_eq!(binaries.psql(), Utf8PathBuf::from("psql"));
    }

    #[test]
    fn environment_override_applies_when_nothing_is_configured() {
        // Environment mutation is unsafe in edition 2024. No other test in
        // this crate reads or writes this variable, so parallel execution
        // cannot observe the mutation.
        unsafe { std::env::set_var(BIN_DIR_ENV, "/usr/lib/pg/17/bin") };
        let from_env = EngineBinaries::discover(None);
        let configured = EngineBinaries::discover(Some(Utf8Path::new("/opt/pg/bin")));
        unsafe { std::env::remove_var(BIN_DIR_ENV) };

        assert_eq!(
            from_env.initdb(),
            Utf8PathBuf::from("/usr/lib/pg/17/bin/initdb")
        );
        assert_eq!(configured.initdb(), Utf8PathBuf::from("/opt/pg/bin/initdb"));
    }
}
