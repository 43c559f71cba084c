//! Effective settings: parsed, interpolated and decrypted

use secrecy::SecretString;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::model::{Mirror, Profile};

/// A proxy with its password decrypted
#[derive(Clone)]
pub struct ProxyRule {
    pub id: String,
    pub active: bool,
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub non_proxy_hosts: Option<String>,
}

impl fmt::Debug for ProxyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyRule")
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

/// Server credentials with secrets decrypted
#[derive(Clone)]
pub struct ServerCredential {
    pub id: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub private_key: Option<PathBuf>,
    pub passphrase: Option<SecretString>,
    pub file_permissions: Option<String>,
    pub directory_permissions: Option<String>,
    pub configuration: Option<Value>,
}

impl fmt::Debug for ServerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerCredential")
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

/// Settings after loading, interpolation and decryption.
///
/// Produced fresh by every [`super::SettingsResolver::resolve`] call.
#[derive(Debug, Clone, Default)]
pub struct EffectiveSettings {
    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
    pub local_repository: Option<PathBuf>,
    pub offline: bool,
    pub mirrors: Vec<Mirror>,
    pub proxies: Vec<ProxyRule>,
    pub servers: Vec<ServerCredential>,
    pub profiles: Vec<Profile>,
}

impl EffectiveSettings {
    /// Profiles marked `activeByDefault`, in declaration order
    pub fn active_profiles(&self) -> Vec<&Profile> {
        self.profiles
            .iter()
            .filter(|p| p.activation.as_ref().is_some_and(|a| a.active_by_default))
            .collect()
    }

    /// Properties of all active profiles; later profiles win on collision
    pub fn profile_properties(&self) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        for profile in self.active_profiles() {
            for (key, value) in &profile.properties {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Credentials for `id`; the last declaration wins over duplicates
    pub fn server(&self, id: &str) -> Option<&ServerCredential> {
        self.servers.iter().rev().find(|s| s.id == id)
    }
}
