//! Cooperative interruption for the bootstrap phases.
//!
//! Signal handlers cannot unwind through the orchestrator, so termination
//! signals merely raise a flag. The phases poll the flag between steps and
//! abandon the run with an error, which unwinds through the transient-server
//! scope and triggers its guaranteed cleanup.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::flag;
use thiserror::Error;

use crate::errors::BootstrapError;

/// Errors reported while installing interruption handlers.
#[derive(Debug, Error)]
pub enum InterruptError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Flag raised by termination signals and polled between bootstrap steps.
#[derive(Debug, Clone)]
pub struct InterruptFlag {
    flag: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Installs handlers for the usual termination signals.
    ///
    /// # Errors
    ///
    /// Returns [`InterruptError::Install`] when a handler cannot be
    /// registered.
    pub fn install() -> Result<Self, InterruptError> {
        let flag = Arc::new(AtomicBool::new(false));
        for signal in [SIGTERM, SIGINT, SIGQUIT, SIGHUP] {
            flag::register(signal, Arc::clone(&flag))
                .map_err(|source| InterruptError::Install { source })?;
        }
        Ok(Self { flag })
    }

    /// A flag with no signal handlers attached, for embedding and tests.
    #[must_use]
    pub fn inert() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Raises the flag, as a signal handler would.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether an interruption has been requested.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Fails the current step when an interruption is pending.
    pub(crate) fn ensure_clear(&self) -> Result<(), BootstrapError> {
        if self.is_interrupted() {
            Err(BootstrapError::Interrupted)
        } else {
            Ok(())
        }
    }
}
