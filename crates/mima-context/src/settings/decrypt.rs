//! Credential decryption seam
//!
//! Secret handling is delegated to a [`SettingsDecrypter`]. The resolver
//! hands over every server and proxy secret in one request and refuses to
//! continue if any of them comes back with a problem.

use secrecy::SecretString;
use std::collections::BTreeMap;
use std::fmt;

/// Where a secret came from in the settings document.
///
/// Entries are identified by their position, so two proxies without an id
/// (or two servers sharing one) never share a decrypted value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecretLocation {
    ServerPassword { index: usize, id: String },
    ServerPassphrase { index: usize, id: String },
    ProxyPassword { index: usize, id: String },
}

impl fmt::Display for SecretLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (section, index, id, field) = match self {
            SecretLocation::ServerPassword { index, id } => ("servers", index, id, "password"),
            SecretLocation::ServerPassphrase { index, id } => ("servers", index, id, "passphrase"),
            SecretLocation::ProxyPassword { index, id } => ("proxies", index, id, "password"),
        };
        if id.is_empty() {
            write!(f, "{}[#{}].{}", section, index, field)
        } else {
            write!(f, "{}[{}].{}", section, id, field)
        }
    }
}

/// A raw secret as read from settings, possibly encrypted
#[derive(Clone)]
pub struct RawSecret {
    pub location: SecretLocation,
    pub value: String,
}

impl fmt::Debug for RawSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSecret")
            .field("location", &self.location)
            .field("encrypted", &is_encrypted(&self.value))
            .finish()
    }
}

/// All secrets of one settings document
#[derive(Debug, Clone, Default)]
pub struct DecryptionRequest {
    pub secrets: Vec<RawSecret>,
}

/// A secret that could not be decrypted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionProblem {
    pub location: SecretLocation,
    pub message: String,
}

impl fmt::Display for DecryptionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Plaintext secrets keyed by location, plus any problems
#[derive(Debug, Default)]
pub struct DecryptionResult {
    pub secrets: BTreeMap<SecretLocation, SecretString>,
    pub problems: Vec<DecryptionProblem>,
}

/// Turns raw settings secrets into plaintext
pub trait SettingsDecrypter: Send + Sync {
    fn decrypt(&self, request: &DecryptionRequest) -> DecryptionResult;
}

/// Whether a value uses the `{...}` encrypted form.
///
/// A brace escaped with a backslash does not count.
pub fn is_encrypted(value: &str) -> bool {
    let bytes = value.as_bytes();
    let Some(start) = bytes
        .iter()
        .enumerate()
        .position(|(i, &b)| b == b'{' && (i == 0 || bytes[i - 1] != b'\\'))
    else {
        return false;
    };
    value[start + 1..]
        .find('}')
        .is_some_and(|len| len > 0 && bytes[start + len] != b'\\')
}

/// Default decrypter: passes plain values through unchanged.
///
/// No cipher is configured, so any value in the encrypted `{...}` form is
/// reported as a problem instead of being used as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextDecrypter;

impl SettingsDecrypter for PlaintextDecrypter {
    fn decrypt(&self, request: &DecryptionRequest) -> DecryptionResult {
        let mut result = DecryptionResult::default();
        for secret in &request.secrets {
            if is_encrypted(&secret.value) {
                result.problems.push(DecryptionProblem {
                    location: secret.location.clone(),
                    message: "value is encrypted but no master password is configured"
                        .to_string(),
                });
            } else {
                result.secrets.insert(
                    secret.location.clone(),
                    SecretString::from(secret.value.clone()),
                );
            }
        }
        result
    }
}
