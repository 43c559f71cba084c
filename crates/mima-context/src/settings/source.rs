//! Format-agnostic settings file loading

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// On-disk settings format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Toml,
    Json,
    Yaml,
}

impl SettingsFormat {
    /// Detect the format from the extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(SettingsFormat::Toml),
            "json" => Ok(SettingsFormat::Json),
            "yaml" | "yml" => Ok(SettingsFormat::Yaml),
            other => Err(Error::settings_load(
                path,
                format!("unsupported settings format '{}'", other),
            )),
        }
    }

    /// Parse `content` into a generic document
    pub fn parse(self, content: &str) -> std::result::Result<Value, String> {
        match self {
            SettingsFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            SettingsFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            SettingsFormat::Yaml => {
                if content.trim().is_empty() {
                    return Ok(Value::Object(Default::default()));
                }
                serde_yaml::from_str(content).map_err(|e| e.to_string())
            }
        }
    }
}

/// Read and parse a settings file into a generic document.
///
/// The file is only read, never written.
pub fn load_document(path: &Path) -> Result<Value> {
    let format = SettingsFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|e| Error::settings_load(path, e))?;
    let document = format
        .parse(&content)
        .map_err(|message| Error::settings_load(path, message))?;

    if !document.is_object() {
        return Err(Error::settings_load(path, "settings document must be a table/object"));
    }
    Ok(document)
}
