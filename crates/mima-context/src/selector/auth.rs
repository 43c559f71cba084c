//! Authentication lookup by server id

use secrecy::SecretString;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::repository::RemoteRepository;
use crate::settings::ServerCredential;

/// Credentials presented to a repository
#[derive(Clone, Default)]
pub struct Authentication {
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub private_key: Option<PathBuf>,
    pub passphrase: Option<SecretString>,
}

impl Authentication {
    fn from_server(server: &ServerCredential) -> Option<Self> {
        let auth = Self {
            username: server.username.clone(),
            password: server.password.clone(),
            private_key: server.private_key.clone(),
            passphrase: server.passphrase.clone(),
        };
        (!auth.is_empty()).then_some(auth)
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.private_key.is_none()
            && self.passphrase.is_none()
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authentication")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("private_key", &self.private_key)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Maps repository ids to credentials.
///
/// When several servers share an id the last one declared wins.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationSelector {
    by_id: BTreeMap<String, Authentication>,
}

impl AuthenticationSelector {
    pub fn new(servers: &[ServerCredential]) -> Self {
        let mut by_id = BTreeMap::new();
        for server in servers {
            match Authentication::from_server(server) {
                Some(auth) => {
                    if by_id.insert(server.id.clone(), auth).is_some() {
                        tracing::debug!(server = %server.id, "Duplicate server id, later entry wins");
                    }
                }
                None => {
                    by_id.remove(&server.id);
                }
            }
        }
        Self { by_id }
    }

    pub fn select(&self, repository: &RemoteRepository) -> Option<&Authentication> {
        self.get(&repository.id)
    }

    pub fn get(&self, id: &str) -> Option<&Authentication> {
        self.by_id.get(id)
    }

    /// Server ids with credentials, sorted
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn server(id: &str, username: Option<&str>, password: Option<&str>) -> ServerCredential {
        ServerCredential {
            id: id.into(),
            username: username.map(String::from),
            password: password.map(|p| SecretString::from(p.to_string())),
            private_key: None,
            passphrase: None,
            file_permissions: None,
            directory_permissions: None,
            configuration: None,
        }
    }

    #[test]
    fn selects_by_repository_id() {
        let selector = AuthenticationSelector::new(&[server("central", Some("me"), Some("pw"))]);

        let auth = selector.select(&RemoteRepository::central()).unwrap();
        assert_eq!(auth.username.as_deref(), Some("me"));
        assert_eq!(auth.password.as_ref().unwrap().expose_secret(), "pw");
        assert!(selector.get("snapshots").is_none());
    }

    #[test]
    fn last_duplicate_wins() {
        let selector = AuthenticationSelector::new(&[
            server("corp", Some("first"), None),
            server("corp", Some("second"), None),
        ]);
        assert_eq!(selector.len(), 1);
        assert_eq!(selector.get("corp").unwrap().username.as_deref(), Some("second"));
    }

    #[test]
    fn ids_are_sorted_and_unique() {
        let selector = AuthenticationSelector::new(&[
            server("snapshots", Some("a"), None),
            server("releases", Some("b"), None),
            server("snapshots", Some("c"), None),
        ]);
        assert_eq!(selector.ids().collect::<Vec<_>>(), vec!["releases", "snapshots"]);
    }

    #[test]
    fn servers_without_credentials_are_skipped() {
        let selector = AuthenticationSelector::new(&[server("config-only", None, None)]);
        assert!(selector.is_empty());
    }

    #[test]
    fn debug_hides_password() {
        let selector = AuthenticationSelector::new(&[server("corp", Some("me"), Some("hunter2"))]);
        let debug = format!("{:?}", selector);
        assert!(!debug.contains("hunter2"));
    }
}
