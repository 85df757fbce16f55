//! Server settings as an ordered key/value map with typed rendering.
//!
//! Settings arrive as two maps (built-in defaults and operator overrides)
//! and leave as one merged, ordered sequence of `key = value` lines ready to
//! be written into the engine's configuration file. Merging preserves the
//! position of a key's first occurrence so the rendered file stays stable
//! across runs.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single configuration value with an explicit semantic type.
///
/// Values deserialise untagged, so configuration authors write natural TOML
/// scalars: `enabled = true`, `max_connections = 100`,
/// `shared_buffers = "128MB"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean, rendered as bare `yes` / `no`.
    Bool(bool),
    /// Integer, rendered via its natural decimal representation.
    Int(i64),
    /// Text, rendered single-quoted with embedded quotes doubled.
    Text(String),
}

impl SettingValue {
    /// Renders the value in the engine configuration file syntax.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Bool(true) => String::from("yes"),
            Self::Bool(false) => String::from("no"),
            Self::Int(value) => value.to_string(),
            Self::Text(value) => format!("'{}'", value.replace('\'', "''")),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.render())
    }
}

/// An ordered key/value settings map.
///
/// Backed by a vector so iteration order is exactly insertion order.
/// Updating an existing key replaces its value in place, keeping the
/// position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: Vec<(String, SettingValue)>,
}

impl Settings {
    /// Creates an empty settings map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces a value, preserving the key's original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Looks up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Returns a merged copy with `overrides` applied on top of `self`.
    ///
    /// Override entries replace same-keyed entries in place; keys new to the
    /// override map append in their own order.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        for (key, value) in &overrides.entries {
            merged.set(key.clone(), value.clone());
        }
        merged
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the whole map as newline-terminated `key = value` lines.
    #[must_use]
    pub fn render(&self) -> String {
        let mut rendered = String::new();
        for (key, value) in &self.entries {
            rendered.push_str(key);
            rendered.push_str(" = ");
            rendered.push_str(&value.render());
            rendered.push('\n');
        }
        rendered
    }
}

impl FromIterator<(String, SettingValue)> for Settings {
    fn from_iter<I: IntoIterator<Item = (String, SettingValue)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (key, value) in iter {
            settings.set(key, value);
        }
        settings
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SettingsVisitor;

        impl<'de> Visitor<'de> for SettingsVisitor {
            type Value = Settings;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a table of boolean, integer, or string values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut settings = Settings::new();
                while let Some((key, value)) = access.next_entry::<String, SettingValue>()? {
                    settings.set(key, value);
                }
                Ok(settings)
            }
        }

        deserializer.deserialize_map(SettingsVisitor)
    }
}

impl Serialize for Settings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
