//! Ambient system properties
//!
//! A snapshot of the process environment expressed as flat string
//! properties (`user.home`, `os.name`, `env.PATH`, ...). The snapshot is
//! taken once and injected, so property merging never reads global state.

use std::collections::BTreeMap;

/// Immutable snapshot of ambient system properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProperties {
    properties: BTreeMap<String, String>,
}

impl SystemProperties {
    /// Capture properties from the running process.
    ///
    /// Every environment variable becomes `env.<NAME>`; on Windows the name
    /// is upper-cased because environment lookups there are case-insensitive.
    pub fn capture() -> Self {
        let mut properties = BTreeMap::new();

        if let Some(home) = dirs::home_dir() {
            properties.insert("user.home".to_string(), home.display().to_string());
        }
        if let Ok(cwd) = std::env::current_dir() {
            properties.insert("user.dir".to_string(), cwd.display().to_string());
        }
        if let Ok(user) = std::env::var("USER").or_else(|_| std::env::var("USERNAME")) {
            properties.insert("user.name".to_string(), user);
        }
        properties.insert("os.name".to_string(), std::env::consts::OS.to_string());
        properties.insert("os.arch".to_string(), std::env::consts::ARCH.to_string());
        properties.insert(
            "file.separator".to_string(),
            std::path::MAIN_SEPARATOR.to_string(),
        );
        properties.insert(
            "path.separator".to_string(),
            if cfg!(windows) { ";" } else { ":" }.to_string(),
        );

        for (key, value) in std::env::vars_os() {
            let key = key.to_string_lossy();
            let key = if cfg!(windows) {
                key.to_uppercase()
            } else {
                key.into_owned()
            };
            properties.insert(format!("env.{}", key), value.to_string_lossy().into_owned());
        }

        Self { properties }
    }

    /// Build a snapshot from explicit values
    pub fn from_map(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    /// Build a snapshot from key/value pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
