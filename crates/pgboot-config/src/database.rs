//! Initial databases and the schema sources applied to them.

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest identifier the engine accepts, in bytes.
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// A validated database identifier.
///
/// Enforces the engine's unquoted-identifier shape (leading letter or
/// underscore; letters, digits, `_`, `$` thereafter; at most 63 bytes) so
/// every name is safe to splice into catalog queries and creation
/// statements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Validates and wraps a database name.
    pub fn new(name: impl Into<String>) -> Result<Self, DatabaseNameError> {
        let name = name.into();
        let Some(first) = name.chars().next() else {
            return Err(DatabaseNameError::Empty);
        };
        if name.len() > MAX_IDENTIFIER_BYTES {
            return Err(DatabaseNameError::TooLong {
                name,
                limit: MAX_IDENTIFIER_BYTES,
            });
        }
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(DatabaseNameError::InvalidStart { name });
        }
        if let Some(character) = name
            .chars()
            .find(|&c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        {
            return Err(DatabaseNameError::InvalidCharacter { name, character });
        }
        Ok(Self(name))
    }

    /// Name of the administrative database that always exists.
    #[must_use]
    pub fn admin() -> Self {
        Self(String::from(crate::defaults::ADMIN_DATABASE))
    }

    /// The validated name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for DatabaseName {
    type Err = DatabaseNameError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::new(input)
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = DatabaseNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors raised while validating a [`DatabaseName`].
#[derive(Debug, Error)]
pub enum DatabaseNameError {
    /// The name was empty.
    #[error("database name must not be empty")]
    Empty,
    /// The name exceeds the engine's identifier limit.
    #[error("database name '{name}' exceeds {limit} bytes")]
    TooLong {
        /// Offending name.
        name: String,
        /// Engine identifier limit in bytes.
        limit: usize,
    },
    /// The name starts with something other than a letter or underscore.
    #[error("database name '{name}' must start with a letter or underscore")]
    InvalidStart {
        /// Offending name.
        name: String,
    },
    /// The name contains a character outside the identifier alphabet.
    #[error("database name '{name}' contains invalid character '{character}'")]
    InvalidCharacter {
        /// Offending name.
        name: String,
        /// First character that failed validation.
        character: char,
    },
}

/// A schema source: one SQL file, or a directory of `*.sql` files.
///
/// Classification as file or directory is deferred to application time so
/// configuration loading stays free of filesystem access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaSource(Utf8PathBuf);

impl SchemaSource {
    /// Wraps a configured schema path.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    /// The configured path.
    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        self.0.as_path()
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<&str> for SchemaSource {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<Utf8PathBuf> for SchemaSource {
    fn from(path: Utf8PathBuf) -> Self {
        Self(path)
    }
}

/// A database created on first bootstrap, with its ordered schema sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialDatabase {
    /// Database name, unique across the configured set.
    pub name: DatabaseName,
    /// Schema sources applied in the order given, after creation.
    #[serde(default)]
    pub schemas: Vec<SchemaSource>,
}

impl InitialDatabase {
    /// Builds an entry from a name and its schema sources.
    #[must_use]
    pub fn new(name: DatabaseName, schemas: Vec<SchemaSource>) -> Self {
        Self { name, schemas }
    }
}
