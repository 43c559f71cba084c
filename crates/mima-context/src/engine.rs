//! Resolution engine seam

use std::fmt;
use std::sync::Arc;

/// The external dependency-resolution engine a context is bound to.
///
/// Resolution itself happens behind this trait; the context only decides
/// whether it owns the engine and therefore has to shut it down.
pub trait RepositorySystem: Send + Sync {
    /// Short engine name, used in logs
    fn name(&self) -> &str;

    /// Release engine resources. Called at most once per owning context.
    fn shutdown(&self);
}

/// An engine together with who is responsible for shutting it down
#[derive(Clone)]
pub enum EngineHandle {
    /// The context owns the engine and shuts it down on release
    Managed(Arc<dyn RepositorySystem>),
    /// The engine is shared; the context never shuts it down
    Borrowed(Arc<dyn RepositorySystem>),
}

impl EngineHandle {
    pub fn engine(&self) -> &Arc<dyn RepositorySystem> {
        match self {
            EngineHandle::Managed(engine) | EngineHandle::Borrowed(engine) => engine,
        }
    }

    pub fn is_managed(&self) -> bool {
        matches!(self, EngineHandle::Managed(_))
    }

    pub(crate) fn into_parts(self) -> (Arc<dyn RepositorySystem>, bool) {
        match self {
            EngineHandle::Managed(engine) => (engine, true),
            EngineHandle::Borrowed(engine) => (engine, false),
        }
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_managed() { "Managed" } else { "Borrowed" };
        f.debug_tuple(kind).field(&self.engine().name()).finish()
    }
}
