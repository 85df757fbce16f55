//! Binary entrypoint for the cluster bootstrap orchestrator.
//!
//! The binary delegates to [`pgboot::run`], which parses arguments, loads
//! the instance configuration, and drives the bootstrap.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    pgboot::run(std::env::args_os(), &mut stdout, &mut stderr)
}
