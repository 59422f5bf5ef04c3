//! Crate-wide error type.

use crate::models::TournamentError;
use crate::store::PersistenceError;
use crate::sync::SyncError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] TournamentError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl Error {
    /// Persistence and sync failures keep the local state and can be retried.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
