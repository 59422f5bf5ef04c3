//! Reconciling a local snapshot with one that arrived from elsewhere: whole-snapshot
//! last-writer-wins on `updated_at`. Nothing is merged field by field; the older snapshot is
//! dropped entirely.

use crate::models::Tournament;

/// Whether `remote` should replace `local`.
///
/// An unstamped local always yields; an unstamped remote never wins; otherwise the remote wins
/// unless it is strictly older (ties go to the incoming snapshot).
pub fn remote_wins(local: &Tournament, remote: &Tournament) -> bool {
    match (local.updated_at, remote.updated_at) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(local_at), Some(remote_at)) => remote_at >= local_at,
    }
}

pub fn merge(local: &Tournament, remote: &Tournament) -> Tournament {
    if remote_wins(local, remote) {
        log::debug!(
            "Accepting remote snapshot of {} ({:?} over {:?})",
            remote.id,
            remote.updated_at,
            local.updated_at
        );
        remote.clone()
    } else {
        log::debug!(
            "Keeping local snapshot of {} ({:?} over {:?})",
            local.id,
            local.updated_at,
            remote.updated_at
        );
        local.clone()
    }
}
