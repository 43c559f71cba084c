//! [`RecordingEngine`]: a resolution engine that only records its lifecycle.

use mima_context::RepositorySystem;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct RecordingEngine {
    shutdowns: AtomicUsize,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `shutdown` was called
    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl RepositorySystem for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
