//! Scoped context handle

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::engine::{EngineHandle, RepositorySystem};
use crate::repository::RemoteRepository;
use crate::session::{PreparedSession, RepositorySession};

/// A ready-to-use resolution context.
///
/// Owns its session and remote-repository list. A context created with a
/// managed engine shuts that engine down exactly once, either on
/// [`Context::close`] or when dropped. A borrowed engine is left running.
pub struct Context {
    id: Uuid,
    engine: Arc<dyn RepositorySystem>,
    managed: bool,
    session: RepositorySession,
    remote_repositories: Vec<RemoteRepository>,
    released: bool,
}

impl Context {
    pub(crate) fn new(prepared: PreparedSession, handle: EngineHandle) -> Self {
        let (engine, managed) = handle.into_parts();
        let id = Uuid::new_v4();
        tracing::info!(
            %id,
            engine = engine.name(),
            managed,
            local_repository = %prepared.session.local_repository().display(),
            "Context acquired"
        );
        Self {
            id,
            engine,
            managed,
            session: prepared.session,
            remote_repositories: prepared.remote_repositories,
            released: false,
        }
    }

    /// Unique id of this context, for log correlation
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn repository_system(&self) -> &Arc<dyn RepositorySystem> {
        &self.engine
    }

    /// Whether closing this context shuts the engine down
    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub fn session(&self) -> &RepositorySession {
        &self.session
    }

    pub fn remote_repositories(&self) -> &[RemoteRepository] {
        &self.remote_repositories
    }

    pub fn local_repository(&self) -> &Path {
        self.session.local_repository()
    }

    /// Release the context now instead of at end of scope
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.managed {
            self.engine.shutdown();
        }
        tracing::info!(id = %self.id, managed = self.managed, "Context released");
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("engine", &self.engine.name())
            .field("managed", &self.managed)
            .field("session", &self.session)
            .field("remote_repositories", &self.remote_repositories)
            .finish()
    }
}
