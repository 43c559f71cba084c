//! [`FakeDecrypter`]: a table-driven stand-in for a real cipher.

use mima_context::settings::{
    DecryptionProblem, DecryptionRequest, DecryptionResult, SettingsDecrypter, is_encrypted,
};
use secrecy::SecretString;
use std::collections::BTreeMap;

/// Decrypts `{ciphertext}` values by table lookup.
///
/// Plain values pass through. Encrypted values missing from the table are
/// reported as problems, like a wrong master password would be.
#[derive(Debug, Clone, Default)]
pub struct FakeDecrypter {
    table: BTreeMap<String, String>,
}

impl FakeDecrypter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map the encrypted form `ciphertext` (braces included) to `plaintext`
    pub fn with(mut self, ciphertext: impl Into<String>, plaintext: impl Into<String>) -> Self {
        self.table.insert(ciphertext.into(), plaintext.into());
        self
    }
}

impl SettingsDecrypter for FakeDecrypter {
    fn decrypt(&self, request: &DecryptionRequest) -> DecryptionResult {
        let mut result = DecryptionResult::default();
        for secret in &request.secrets {
            if !is_encrypted(&secret.value) {
                result
                    .secrets
                    .insert(secret.location.clone(), SecretString::from(secret.value.clone()));
                continue;
            }
            match self.table.get(&secret.value) {
                Some(plain) => {
                    result
                        .secrets
                        .insert(secret.location.clone(), SecretString::from(plain.clone()));
                }
                None => result.problems.push(DecryptionProblem {
                    location: secret.location.clone(),
                    message: "unknown ciphertext".to_string(),
                }),
            }
        }
        result
    }
}
