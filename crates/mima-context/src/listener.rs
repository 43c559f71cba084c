//! Repository and transfer event hooks
//!
//! The context only stores listeners and hands them to the resolution
//! engine. The engine decides when, and from which thread, to call them.

use std::fmt;
use std::sync::Arc;

/// Kind of repository event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryEventKind {
    ArtifactResolving,
    ArtifactResolved,
    ArtifactDownloading,
    ArtifactDownloaded,
    MetadataResolving,
    MetadataResolved,
    MetadataInvalid,
    ArtifactDeploying,
    ArtifactDeployed,
}

/// An event about artifact or metadata processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEvent {
    pub kind: RepositoryEventKind,
    /// Coordinates or path of the artifact/metadata
    pub resource: String,
    /// Id of the repository involved, if any
    pub repository: Option<String>,
}

/// Kind of transfer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEventKind {
    Initiated,
    Started,
    Progressed,
    Corrupted,
    Succeeded,
    Failed,
}

/// An event about a single upload or download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub kind: TransferEventKind,
    /// Full URL of the transferred resource
    pub resource: String,
    /// Bytes transferred so far
    pub transferred: u64,
}

/// Receives repository events from the resolution engine
pub trait RepositoryListener: Send + Sync {
    fn on_repository_event(&self, event: &RepositoryEvent);
}

/// Receives transfer events from the resolution engine
pub trait TransferListener: Send + Sync {
    fn on_transfer_event(&self, event: &TransferEvent);
}

/// The optional pair of listener hooks carried by overrides and sessions
#[derive(Clone, Default)]
pub struct Listeners {
    pub repository: Option<Arc<dyn RepositoryListener>>,
    pub transfer: Option<Arc<dyn TransferListener>>,
}

impl Listeners {
    /// Forward a repository event if a listener is attached
    pub fn repository_event(&self, event: &RepositoryEvent) {
        if let Some(listener) = &self.repository {
            listener.on_repository_event(event);
        }
    }

    /// Forward a transfer event if a listener is attached
    pub fn transfer_event(&self, event: &TransferEvent) {
        if let Some(listener) = &self.transfer {
            listener.on_transfer_event(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("repository", &self.repository.is_some())
            .field("transfer", &self.transfer.is_some())
            .finish()
    }
}
