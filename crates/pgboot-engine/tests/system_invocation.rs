//! Behavioural coverage for the system engine against scripted binaries.
//!
//! Real engine binaries are not available in the test environment, so these
//! tests point the engine at small shell scripts that record their argument
//! lists and stdin, then exercise the spawn, pipe, and status-checking paths
//! end to end.

use std::fs;
use std::os::unix::fs::PermissionsExt;

use camino::Utf8PathBuf;
use pgboot_config::DatabaseName;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use pgboot_engine::{ClusterEngine, EngineBinaries, EngineError, SqlSession, SystemEngine};

struct Harness {
    temp_dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self { temp_dir }
    }

    fn root(&self) -> Utf8PathBuf {
        match Utf8PathBuf::from_path_buf(self.temp_dir.path().to_path_buf()) {
            Ok(path) => path,
            Err(path) => panic!("temporary path is not UTF-8: {}", path.display()),
        }
    }

    /// Installs an executable shell script under the harness bin directory.
    fn install_script(&self, name: &str, body: &str) {
        let bin_dir = self.root().join("bin");
        if let Err(error) = fs::create_dir_all(&bin_dir) {
            panic!("failed to create bin directory: {error}");
        }
        let path = bin_dir.join(name);
        let script = format!("#!/bin/sh\n{body}\n");
        if let Err(error) = fs::write(&path, script) {
            panic!("failed to write script: {error}");
        }
        if let Err(error) = fs::set_permissions(&path, fs::Permissions::from_mode(0o755)) {
            panic!("failed to mark script executable: {error}");
        }
    }

    fn engine(&self) -> SystemEngine {
        SystemEngine::new(EngineBinaries::in_dir(self.root().join("bin")))
    }

    fn session(&self) -> SqlSession {
        SqlSession::admin(self.root().join("sock"), 5432)
    }

    fn read(&self, name: &str) -> String {
        let path = self.root().join(name);
        match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) => panic!("failed to read '{path}': {error}"),
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
fn execute_sql_pipes_the_batch_over_stdin(harness: Harness) {
    harness.install_script(
        "psql",
        &format!(
            "printf '%s\\n' \"$@\" > \"{root}/args.txt\"\ncat > \"{root}/stdin.txt\"",
            root = harness.root()
        ),
    );

    harness
        .engine()
        .execute_sql(&harness.session(), "CREATE TABLE t (id int);\n")
        .expect("scripted shell should succeed");

    assert_eq!(harness.read("stdin.txt"), "CREATE TABLE t (id int);\n");

    let args: Vec<String> = harness.read("args.txt").lines().map(String::from).collect();
    assert!(args.contains(&String::from("ON_ERROR_STOP=1")));
    assert!(args.contains(&String::from("postgres")));
    assert!(args.contains(&harness.root().join("sock").to_string()));
}

#[rstest]
fn failing_batches_surface_status_and_stderr(harness: Harness) {
    harness.install_script("psql", "echo 'syntax error at or near \"CREAT\"' >&2\nexit 3");

    let error = harness
        .engine()
        .execute_sql(&harness.session(), "CREAT TABLE t;")
        .expect_err("scripted failure should surface");

    match error {
        EngineError::Failed { status, stderr, .. } => {
            assert_eq!(status, 3);
            assert!(stderr.contains("syntax error"), "stderr was: {stderr}");
        }
        other => panic!("expected a failed invocation, got: {other}"),
    }
}

#[rstest]
fn existence_probe_reports_hits_and_misses(harness: Harness) {
    let name = DatabaseName::new("app").expect("name should validate");

    harness.install_script("psql", "printf '1\\n'");
    let exists = harness
        .engine()
        .database_exists(&harness.session(), &name)
        .expect("probe should succeed");
    assert!(exists);

    harness.install_script("psql", "printf ''");
    let exists = harness
        .engine()
        .database_exists(&harness.session(), &name)
        .expect("probe should succeed");
    assert!(!exists);
}

#[rstest]
fn unexpected_probe_output_is_an_anomaly(harness: Harness) {
    harness.install_script("psql", "echo 'FATAL: role does not exist'");

    let name = DatabaseName::new("app").expect("name should validate");
    let error = harness
        .engine()
        .database_exists(&harness.session(), &name)
        .expect_err("garbled probe output should surface");

    assert!(matches!(error, EngineError::UnexpectedOutput { .. }));
}

#[rstest]
fn missing_binaries_surface_as_spawn_errors(harness: Harness) {
    let error = harness
        .engine()
        .execute_sql(&harness.session(), "SELECT 1;")
        .expect_err("missing binary should fail to spawn");

    assert!(matches!(error, EngineError::Spawn { .. }));
}
