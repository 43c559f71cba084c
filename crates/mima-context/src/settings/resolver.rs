//! Settings resolution
//!
//! The `SettingsResolver` locates the ambient settings file, interpolates
//! it against user and system properties, and decrypts every secret in it.
//! Nothing is cached: each call reads the file again.

use secrecy::SecretString;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::decrypt::{DecryptionRequest, RawSecret, SecretLocation, SettingsDecrypter};
use super::effective::{EffectiveSettings, ProxyRule, ServerCredential};
use super::interpolate::Interpolator;
use super::model::Settings;
use super::source::load_document;
use crate::overrides::ContextOverrides;
use crate::system::SystemProperties;
use crate::{Error, Result};

/// Directory under the user's home holding settings and the local repository
pub const USER_DIR: &str = ".mima";

/// File name of the conventional per-user settings file
pub const SETTINGS_FILE: &str = "settings.toml";

/// Resolves ambient settings into [`EffectiveSettings`]
#[derive(Clone)]
pub struct SettingsResolver {
    system: SystemProperties,
    decrypter: Arc<dyn SettingsDecrypter>,

    /// Home directory; `None` disables the conventional settings location
    home: Option<PathBuf>,
}

impl std::fmt::Debug for SettingsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsResolver")
            .field("system_properties", &self.system.len())
            .field("home", &self.home)
            .finish_non_exhaustive()
    }
}

impl SettingsResolver {
    /// Create a resolver using the platform home directory
    pub fn new(system: SystemProperties, decrypter: Arc<dyn SettingsDecrypter>) -> Self {
        Self {
            system,
            decrypter,
            home: dirs::home_dir(),
        }
    }

    /// Use a custom home directory instead of the platform one.
    ///
    /// Mostly useful in tests, to keep the real user settings out of play.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn home_dir(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Conventional per-user settings file (`<home>/.mima/settings.toml`)
    pub fn user_settings_file(&self) -> Option<PathBuf> {
        self.home
            .as_ref()
            .map(|home| home.join(USER_DIR).join(SETTINGS_FILE))
    }

    /// Decide which settings file, if any, to read.
    ///
    /// An explicit file must exist. The conventional file is optional.
    pub fn locate(&self, overrides: &ContextOverrides) -> Result<Option<PathBuf>> {
        if !overrides.with_user_settings() {
            tracing::debug!("Ambient settings disabled, using empty settings");
            return Ok(None);
        }

        if let Some(explicit) = overrides.settings_file() {
            if !explicit.is_file() {
                return Err(Error::settings_load(explicit, "settings file does not exist"));
            }
            return Ok(Some(explicit.to_path_buf()));
        }

        match self.user_settings_file() {
            Some(path) if path.is_file() => Ok(Some(path)),
            Some(path) => {
                tracing::debug!(?path, "No user settings found, skipping");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Load, interpolate and decrypt the ambient settings.
    ///
    /// Fails with [`Error::SettingsLoad`] for unreadable or malformed files
    /// and with [`Error::CredentialDecryption`] if any secret fails to
    /// decrypt; in that case no secret at all is returned.
    pub fn resolve(&self, overrides: &ContextOverrides) -> Result<EffectiveSettings> {
        let Some(path) = self.locate(overrides)? else {
            return Ok(EffectiveSettings::default());
        };

        tracing::debug!(?path, "Loading settings");
        let mut document = load_document(&path)?;
        Interpolator::new(overrides.user_properties(), &self.system).interpolate_value(&mut document);
        let settings: Settings =
            serde_json::from_value(document).map_err(|e| Error::settings_load(&path, e))?;

        self.decrypt(settings, path)
    }

    fn decrypt(&self, settings: Settings, source: PathBuf) -> Result<EffectiveSettings> {
        let mut request = DecryptionRequest::default();
        for (index, server) in settings.servers.iter().enumerate() {
            let id = server.id.clone();
            if let Some(password) = &server.password {
                request.secrets.push(RawSecret {
                    location: SecretLocation::ServerPassword { index, id: id.clone() },
                    value: password.clone(),
                });
            }
            if let Some(passphrase) = &server.passphrase {
                request.secrets.push(RawSecret {
                    location: SecretLocation::ServerPassphrase { index, id },
                    value: passphrase.clone(),
                });
            }
        }
        for (index, proxy) in settings.proxies.iter().enumerate() {
            if let Some(password) = &proxy.password {
                request.secrets.push(RawSecret {
                    location: SecretLocation::ProxyPassword {
                        index,
                        id: proxy.id.clone(),
                    },
                    value: password.clone(),
                });
            }
        }

        let result = self.decrypter.decrypt(&request);
        if !result.problems.is_empty() {
            return Err(Error::CredentialDecryption {
                problems: result.problems.iter().map(ToString::to_string).collect(),
            });
        }
        let plaintext = result.secrets;

        let servers = settings
            .servers
            .into_iter()
            .enumerate()
            .map(|(index, server)| {
                let password = decrypted_secret(
                    &plaintext,
                    SecretLocation::ServerPassword {
                        index,
                        id: server.id.clone(),
                    },
                    server.password.is_some(),
                )?;
                let passphrase = decrypted_secret(
                    &plaintext,
                    SecretLocation::ServerPassphrase {
                        index,
                        id: server.id.clone(),
                    },
                    server.passphrase.is_some(),
                )?;
                Ok(ServerCredential {
                    id: server.id,
                    username: server.username,
                    password,
                    private_key: server.private_key.map(PathBuf::from),
                    passphrase,
                    file_permissions: server.file_permissions,
                    directory_permissions: server.directory_permissions,
                    configuration: server.configuration,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let proxies = settings
            .proxies
            .into_iter()
            .enumerate()
            .map(|(index, proxy)| {
                let password = decrypted_secret(
                    &plaintext,
                    SecretLocation::ProxyPassword {
                        index,
                        id: proxy.id.clone(),
                    },
                    proxy.password.is_some(),
                )?;
                Ok(ProxyRule {
                    id: proxy.id,
                    active: proxy.active,
                    protocol: proxy.protocol,
                    host: proxy.host,
                    port: proxy.port,
                    username: proxy.username,
                    password,
                    non_proxy_hosts: proxy.non_proxy_hosts,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EffectiveSettings {
            source: Some(source),
            local_repository: settings.local_repository.map(PathBuf::from),
            offline: settings.offline,
            mirrors: settings.mirrors,
            proxies,
            servers,
            profiles: settings.profiles,
        })
    }
}

/// Look up the decrypted value for `location`.
///
/// A requested secret missing from the decrypter's answer is a decryption
/// failure, not an empty password.
fn decrypted_secret(
    plaintext: &BTreeMap<SecretLocation, SecretString>,
    location: SecretLocation,
    requested: bool,
) -> Result<Option<SecretString>> {
    if !requested {
        return Ok(None);
    }
    match plaintext.get(&location) {
        Some(secret) => Ok(Some(secret.clone())),
        None => Err(Error::CredentialDecryption {
            problems: vec![format!("{}: decrypter returned no value", location)],
        }),
    }
}
