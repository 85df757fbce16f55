//! Drives the engine binaries as child processes.
//!
//! [`SystemEngine`] implements [`ClusterEngine`] by invoking the engine's
//! command-line tools: the init routine for cluster creation, the control
//! binary for supervised start and stop, and the SQL shell for statement
//! batches delivered over stdin. Every invocation runs to completion with
//! stdout and stderr captured; bounded waits for readiness and shutdown are
//! delegated to the control binary's own wait flag, so no polling loop lives
//! here.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use camino::Utf8Path;
use pgboot_config::DatabaseName;
use tracing::debug;

use crate::binaries::EngineBinaries;
use crate::cluster::{ClusterEngine, InitRequest, SqlSession, StartRequest, StopRequest};
use crate::error::EngineError;
use crate::sql;

/// Tracing target for engine invocations.
const ENGINE_TARGET: &str = "pgboot_engine::system";

/// Server log file created inside the data directory during the transient
/// phase. Keeps the server's own output off the control binary's pipes,
/// which would otherwise stay open for the server's lifetime.
const SERVER_LOG_FILE: &str = "bootstrap_server.log";

/// Executes engine operations by spawning the real binaries.
pub struct SystemEngine {
    binaries: EngineBinaries,
}

impl SystemEngine {
    /// Builds an engine adapter over the given binary locations.
    #[must_use]
    pub fn new(binaries: EngineBinaries) -> Self {
        Self { binaries }
    }

    /// Runs a binary to completion with no input.
    fn run(&self, binary: &Utf8Path, args: &[String]) -> Result<Output, EngineError> {
        debug!(
            target: ENGINE_TARGET,
            binary = %binary,
            ?args,
            "running engine binary"
        );

        let output = Command::new(binary.as_std_path())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| EngineError::Spawn {
                binary: binary.to_string(),
                source,
            })?;

        check_status(binary, output)
    }

    /// Runs a binary to completion, feeding `input` over stdin.
    fn run_with_stdin(
        &self,
        binary: &Utf8Path,
        args: &[String],
        input: &str,
    ) -> Result<Output, EngineError> {
        debug!(
            target: ENGINE_TARGET,
            binary = %binary,
            ?args,
            input_bytes = input.len(),
            "running engine binary with piped input"
        );

        let mut child = Command::new(binary.as_std_path())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                binary: binary.to_string(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::StdinUnavailable {
                binary: binary.to_string(),
            })?;
        stdin
            .write_all(input.as_bytes())
            .map_err(|source| EngineError::Io {
                binary: binary.to_string(),
                source,
            })?;
        // Dropping stdin closes the pipe so the shell sees end of input.
        drop(stdin);

        let output = child.wait_with_output().map_err(|source| EngineError::Io {
            binary: binary.to_string(),
            source,
        })?;

        check_status(binary, output)
    }
}

impl ClusterEngine for SystemEngine {
    fn init_cluster(&self, request: &InitRequest) -> Result<(), EngineError> {
        self.run(&self.binaries.initdb(), &init_args(request))
            .map(|_| ())
    }

    fn start(&self, request: &StartRequest) -> Result<(), EngineError> {
        self.run(&self.binaries.pg_ctl(), &start_args(request))
            .map(|_| ())
    }

    fn stop(&self, request: &StopRequest) -> Result<(), EngineError> {
        self.run(&self.binaries.pg_ctl(), &stop_args(request))
            .map(|_| ())
    }

    fn execute_sql(&self, session: &SqlSession, sql: &str) -> Result<(), EngineError> {
        self.run_with_stdin(&self.binaries.psql(), &session_args(session), sql)
            .map(|_| ())
    }

    fn database_exists(
        &self,
        session: &SqlSession,
        name: &DatabaseName,
    ) -> Result<bool, EngineError> {
        let psql = self.binaries.psql();
        let output = self.run(&psql, &probe_args(session, name))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        interpret_probe(&stdout).ok_or_else(|| EngineError::UnexpectedOutput {
            binary: psql.to_string(),
            message: format!("existence probe returned '{}'", stdout.trim()),
        })
    }
}

/// Verifies the exit status, mapping failure to [`EngineError::Failed`].
fn check_status(binary: &Utf8Path, output: Output) -> Result<Output, EngineError> {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
    if !stderr.is_empty() {
        debug!(
            target: ENGINE_TARGET,
            binary = %binary,
            stderr = %stderr,
            "engine binary stderr output"
        );
    }

    if output.status.success() {
        return Ok(output);
    }

    Err(EngineError::Failed {
        binary: binary.to_string(),
        status: output.status.code().unwrap_or(-1),
        stderr,
    })
}

/// Argument list for the init routine.
fn init_args(request: &InitRequest) -> Vec<String> {
    let mut args = request.extra_args.clone();
    if let Some(superuser) = &request.superuser {
        args.push(String::from("-U"));
        args.push(superuser.clone());
    }
    args.push(String::from("-D"));
    args.push(request.data_dir.to_string());
    args
}

/// Argument list for a supervised start.
///
/// Network listening is disabled by clearing the listen addresses; the
/// server is reachable only through the private socket directory.
fn start_args(request: &StartRequest) -> Vec<String> {
    let options = format!(
        "-c listen_addresses='' -c unix_socket_directories='{}' -c port={}",
        request.socket_dir, request.port
    );
    vec![
        String::from("start"),
        String::from("-w"),
        String::from("-t"),
        request.timeout.as_secs().to_string(),
        String::from("-D"),
        request.data_dir.to_string(),
        String::from("-l"),
        request.data_dir.join(SERVER_LOG_FILE).to_string(),
        String::from("-o"),
        options,
    ]
}

/// Argument list for a supervised stop.
fn stop_args(request: &StopRequest) -> Vec<String> {
    vec![
        String::from("stop"),
        String::from("-w"),
        String::from("-t"),
        request.timeout.as_secs().to_string(),
        String::from("-D"),
        request.data_dir.to_string(),
        String::from("-m"),
        String::from(request.mode.as_flag()),
    ]
}

/// Common SQL shell arguments: quiet, no rc file, stop on first error, and
/// the session's socket endpoint and target database.
fn session_args(session: &SqlSession) -> Vec<String> {
    vec![
        String::from("-X"),
        String::from("-q"),
        String::from("-v"),
        String::from("ON_ERROR_STOP=1"),
        String::from("-h"),
        session.socket_dir.to_string(),
        String::from("-p"),
        session.port.to_string(),
        String::from("-d"),
        session.database.to_string(),
    ]
}

/// Argument list for the database existence probe.
fn probe_args(session: &SqlSession, name: &DatabaseName) -> Vec<String> {
    let statement = format!(
        "SELECT 1 FROM pg_database WHERE datname = {}",
        sql::quote_literal(name.as_str())
    );
    let mut args = session_args(session);
    args.push(String::from("-t"));
    args.push(String::from("-A"));
    args.push(String::from("-c"));
    args.push(statement);
    args
}

/// Maps probe output to a hit or a miss; anything else is an anomaly.
fn interpret_probe(stdout: &str) -> Option<bool> {
    match stdout.trim() {
        "" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}
