//! Sharing one tournament between observers: the remote contract, an in-process hub
//! implementing it, and the local-first session that writes through both.

mod hub;
mod session;

pub use hub::SyncHub;
pub use session::SyncedTournament;

use crate::models::{Tournament, TournamentId};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Push failed: {0}")]
    Push(String),
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("Malformed remote payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Snapshot belongs to tournament {found}, expected {expected}")]
    WrongTournament {
        expected: TournamentId,
        found: TournamentId,
    },
    #[error("Sync hub unavailable")]
    Unavailable,
}

/// Called with every snapshot the remote accepts for a subscribed tournament.
pub type UpdateHandler = Box<dyn Fn(&Tournament) + Send + Sync>;

/// Remote side of the sync: stores the shared snapshot and fans updates out.
pub trait RemoteSync: Send + Sync {
    /// Offer a snapshot; returns the one the remote holds afterwards (which may carry a
    /// reassigned `updated_at`, or be a newer snapshot that beat this one).
    fn push(&self, tournament: &Tournament) -> Result<Tournament, SyncError>;
    fn fetch(&self, id: TournamentId) -> Result<Option<Tournament>, SyncError>;
    fn subscribe(&self, id: TournamentId, on_update: UpdateHandler) -> Subscription;
}

/// Live subscription. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

/// Parse a snapshot received from outside. Records that break the model invariants are
/// rejected as malformed.
pub fn decode_snapshot(payload: &[u8]) -> Result<Tournament, SyncError> {
    Ok(serde_json::from_slice(payload)?)
}
