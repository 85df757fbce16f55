//! First-run detection for a cluster data directory.

use camino::Utf8Path;
use tracing::debug;

/// Tracing target for state detection.
const STATE_TARGET: &str = "pgboot::state";

/// Where one bootstrap run sits in the data directory's lifetime.
///
/// Recomputed on every run by inspecting the data directory; never
/// persisted. The transient-server phase runs only from
/// [`BootstrapState::FreshlyInitialised`], which is reachable solely by
/// initialising the cluster within the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// The data directory does not exist yet.
    Uninitialised,
    /// The data directory was created by this run.
    FreshlyInitialised,
    /// The data directory already existed before this run.
    AlreadyInitialised,
}

impl BootstrapState {
    /// Inspects the data directory and classifies this run.
    ///
    /// Existence of the directory is the sole signal: anything present at
    /// the path means a previous run (or an operator) owns it, and the
    /// bootstrap phase is skipped entirely.
    #[must_use]
    pub fn detect(data_dir: &Utf8Path) -> Self {
        let state = if data_dir.exists() {
            Self::AlreadyInitialised
        } else {
            Self::Uninitialised
        };
        debug!(
            target: STATE_TARGET,
            data_dir = %data_dir,
            state = state.as_str(),
            "classified bootstrap state"
        );
        state
    }

    /// True when the transient-server phase must run.
    #[must_use]
    pub fn requires_transient_phase(self) -> bool {
        matches!(self, Self::FreshlyInitialised)
    }

    /// Stable label for logging.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialised => "uninitialised",
            Self::FreshlyInitialised => "freshly_initialised",
            Self::AlreadyInitialised => "already_initialised",
        }
    }
}
