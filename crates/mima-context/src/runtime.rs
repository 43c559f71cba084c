//! Runtime registry
//!
//! A [`Runtime`] is a strategy for turning overrides into a [`Context`]:
//! it knows where its engine comes from and whether contexts own it.
//! [`RuntimeRegistry`] holds the available runtimes and picks the preferred
//! one. [`Runtimes`] installs one registry for the whole process.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::assembler::ContextAssembler;
use crate::context::Context;
use crate::engine::{EngineHandle, RepositorySystem};
use crate::overrides::ContextOverrides;
use crate::{Error, Result};

/// A named context construction strategy
pub trait Runtime: Send + Sync {
    fn name(&self) -> &str;

    /// Lower values are preferred
    fn priority(&self) -> i32;

    /// Whether contexts created by this runtime own their engine
    fn managed(&self) -> bool;

    fn create(&self, overrides: &ContextOverrides) -> Result<Context>;
}

/// Produces a fresh engine for each managed context
pub type EngineFactory = Arc<dyn Fn() -> Result<Arc<dyn RepositorySystem>> + Send + Sync>;

#[derive(Clone)]
enum EngineSource {
    Factory(EngineFactory),
    Shared(Arc<dyn RepositorySystem>),
}

/// Runtime that assembles contexts in-process with a [`ContextAssembler`]
#[derive(Clone)]
pub struct StandaloneRuntime {
    name: String,
    priority: i32,
    assembler: ContextAssembler,
    source: EngineSource,
}

impl StandaloneRuntime {
    /// Each context gets its own engine from `factory` and shuts it down
    pub fn managed(
        name: impl Into<String>,
        priority: i32,
        assembler: ContextAssembler,
        factory: EngineFactory,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            assembler,
            source: EngineSource::Factory(factory),
        }
    }

    /// All contexts share `engine`; none of them shuts it down
    pub fn shared(
        name: impl Into<String>,
        priority: i32,
        assembler: ContextAssembler,
        engine: Arc<dyn RepositorySystem>,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            assembler,
            source: EngineSource::Shared(engine),
        }
    }
}

impl fmt::Debug for StandaloneRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandaloneRuntime")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("managed", &self.managed())
            .finish_non_exhaustive()
    }
}

impl Runtime for StandaloneRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn managed(&self) -> bool {
        matches!(self.source, EngineSource::Factory(_))
    }

    fn create(&self, overrides: &ContextOverrides) -> Result<Context> {
        // prepare first so a bad configuration never spins up an engine
        let prepared = self.assembler.prepare(overrides)?;
        let handle = match &self.source {
            EngineSource::Factory(factory) => EngineHandle::Managed(factory()?),
            EngineSource::Shared(engine) => EngineHandle::Borrowed(engine.clone()),
        };
        Ok(Context::new(prepared, handle))
    }
}

/// Available runtimes, ordered by priority
#[derive(Default)]
pub struct RuntimeRegistry {
    runtimes: Vec<Arc<dyn Runtime>>,
}

impl RuntimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a runtime. A runtime with the same name is replaced.
    pub fn register(&mut self, runtime: Arc<dyn Runtime>) {
        self.runtimes.retain(|r| r.name() != runtime.name());
        self.runtimes.push(runtime);
        // stable sort keeps registration order among equal priorities
        self.runtimes.sort_by_key(|r| r.priority());
    }

    pub fn with(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.register(runtime);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Runtime>> {
        self.runtimes.iter().find(|r| r.name() == name)
    }

    /// The preferred runtime
    pub fn select(&self) -> Result<&Arc<dyn Runtime>> {
        self.runtimes.first().ok_or_else(|| Error::RuntimeRegistry {
            message: "no runtime registered".to_string(),
        })
    }

    /// Runtime names, preferred first
    pub fn names(&self) -> Vec<&str> {
        self.runtimes.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }
}

impl fmt::Debug for RuntimeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeRegistry")
            .field("runtimes", &self.names())
            .finish()
    }
}

static REGISTRY: OnceLock<RuntimeRegistry> = OnceLock::new();

/// Process-wide registry access
pub struct Runtimes;

impl Runtimes {
    /// Install the process registry. Fails if one is already installed.
    pub fn init(registry: RuntimeRegistry) -> Result<&'static RuntimeRegistry> {
        let names = registry.names().join(", ");
        REGISTRY.set(registry).map_err(|_| Error::RuntimeRegistry {
            message: "runtime registry already initialized".to_string(),
        })?;
        tracing::debug!(runtimes = %names, "Runtime registry initialized");
        Self::get()
    }

    pub fn get() -> Result<&'static RuntimeRegistry> {
        REGISTRY.get().ok_or_else(|| Error::RuntimeRegistry {
            message: "runtime registry not initialized".to_string(),
        })
    }

    /// Create a context with the preferred runtime
    pub fn create(overrides: &ContextOverrides) -> Result<Context> {
        Self::get()?.select()?.create(overrides)
    }
}
