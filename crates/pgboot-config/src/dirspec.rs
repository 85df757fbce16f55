//! Directory locations given literally or through an environment variable.
//!
//! The data and socket directories may be configured as a literal path or as
//! the *name* of an environment variable whose runtime value supplies the
//! path. Both forms resolve late: the environment is read at the moment an
//! operation needs the path, never when the configuration is constructed, so
//! a supervisor that populates the environment after configuration loading
//! still wins.

use std::env::{self, VarError};
use std::fmt;
use std::io;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A directory location: a literal path or an environment-variable name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DirSpec {
    /// Literal filesystem path, made absolute before use.
    Path(Utf8PathBuf),
    /// Indirection through an environment variable resolved at call time.
    Env {
        /// Name of the variable holding the path.
        env: String,
    },
}

impl DirSpec {
    /// Builds a literal-path location.
    #[must_use]
    pub fn literal(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Builds an environment-indirected location.
    #[must_use]
    pub fn environment(name: impl Into<String>) -> Self {
        Self::Env { env: name.into() }
    }

    /// Returns the environment-variable name when indirected.
    #[must_use]
    pub fn env_name(&self) -> Option<&str> {
        match self {
            Self::Env { env } => Some(env.as_str()),
            Self::Path(_) => None,
        }
    }

    /// Returns the literal path when one was configured.
    #[must_use]
    pub fn literal_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Path(path) => Some(path.as_ref()),
            Self::Env { .. } => None,
        }
    }

    /// Resolves the effective directory path at the point of use.
    ///
    /// Environment indirections read the variable now and use its value
    /// verbatim; an unset or empty variable is a configuration error, not an
    /// empty path. Literal paths are absolutised lexically so a directory
    /// that does not exist yet still resolves.
    pub fn resolve(&self) -> Result<Utf8PathBuf, DirResolveError> {
        match self {
            Self::Env { env } => match env::var(env) {
                Ok(value) if value.trim().is_empty() => Err(DirResolveError::EnvUnset {
                    name: env.clone(),
                }),
                Ok(value) => Ok(Utf8PathBuf::from(value)),
                Err(VarError::NotPresent) => Err(DirResolveError::EnvUnset { name: env.clone() }),
                Err(VarError::NotUnicode(_)) => Err(DirResolveError::EnvNotUnicode {
                    name: env.clone(),
                }),
            },
            Self::Path(path) => absolutise(path),
        }
    }
}

impl fmt::Display for DirSpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(formatter, "{path}"),
            Self::Env { env } => write!(formatter, "${env}"),
        }
    }
}

fn absolutise(path: &Utf8Path) -> Result<Utf8PathBuf, DirResolveError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let absolute = std::path::absolute(path.as_std_path()).map_err(|source| {
        DirResolveError::Absolutise {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Utf8PathBuf::from_path_buf(absolute)
        .map_err(|fallback| DirResolveError::NonUtf8Path { path: fallback })
}

/// Errors raised while resolving a [`DirSpec`] to a concrete path.
#[derive(Debug, Error)]
pub enum DirResolveError {
    /// The configured environment variable is unset or empty at run time.
    #[error("environment variable '{name}' is unset or empty")]
    EnvUnset {
        /// Variable name that failed to resolve.
        name: String,
    },
    /// The environment variable holds a non-UTF-8 value.
    #[error("environment variable '{name}' holds a non-UTF-8 value")]
    EnvNotUnicode {
        /// Variable name that failed to resolve.
        name: String,
    },
    /// A relative path could not be made absolute.
    #[error("failed to absolutise path '{path}': {source}")]
    Absolutise {
        /// Path being resolved.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Absolutisation produced a non-UTF-8 path.
    #[error("path '{}' is not valid UTF-8", path.display())]
    NonUtf8Path {
        /// Offending path.
        path: PathBuf,
    },
}
