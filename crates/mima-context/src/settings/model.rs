//! Settings document model
//!
//! These types mirror the on-disk settings file. Secrets are still raw
//! (possibly encrypted) strings here; see [`super::EffectiveSettings`] for
//! the decrypted form.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

fn default_layout() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Parsed settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Local repository directory
    pub local_repository: Option<String>,

    /// Work offline unless overridden
    pub offline: bool,

    /// Mirror routing rules, in declaration order
    pub mirrors: Vec<Mirror>,

    /// Proxy definitions, in declaration order
    pub proxies: Vec<Proxy>,

    /// Per-server credentials and transport configuration
    pub servers: Vec<Server>,

    /// Property profiles
    pub profiles: Vec<Profile>,
}

/// A mirror routing rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mirror {
    pub id: String,

    pub url: String,

    /// Layout of the mirror itself
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Repository id pattern this mirror stands in for
    pub mirror_of: String,

    /// Repository layout pattern; empty means `default,legacy`
    #[serde(default)]
    pub mirror_of_layouts: String,

    /// Refuse traffic routed to this mirror
    #[serde(default)]
    pub blocked: bool,
}

/// A proxy definition
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    #[serde(default)]
    pub id: String,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default = "default_protocol")]
    pub protocol: String,

    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Hosts reached directly, separated by `|` or `,`
    #[serde(default)]
    pub non_proxy_hosts: Option<String>,
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("non_proxy_hosts", &self.non_proxy_hosts)
            .finish()
    }
}

/// Credentials and transport configuration for one server id
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Path to a private key file
    #[serde(default)]
    pub private_key: Option<String>,

    #[serde(default)]
    pub passphrase: Option<String>,

    /// Permission bits for deployed files, e.g. "664"
    #[serde(default)]
    pub file_permissions: Option<String>,

    /// Permission bits for created directories, e.g. "775"
    #[serde(default)]
    pub directory_permissions: Option<String>,

    /// Free-form transport configuration block
    #[serde(default)]
    pub configuration: Option<Value>,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("private_key", &self.private_key)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("file_permissions", &self.file_permissions)
            .field("directory_permissions", &self.directory_permissions)
            .field("configuration", &self.configuration)
            .finish()
    }
}

/// A named set of properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub id: String,

    /// Scalar values are stored as their string form
    #[serde(deserialize_with = "scalar_strings")]
    pub properties: BTreeMap<String, String>,

    pub activation: Option<Activation>,
}

fn scalar_strings<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    BTreeMap::<String, Value>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(D::Error::custom(format!(
                        "profile property '{}' must be a string, number or boolean, got {}",
                        key, other
                    )));
                }
            };
            Ok((key, text))
        })
        .collect()
}

/// Profile activation criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activation {
    pub active_by_default: bool,
}
