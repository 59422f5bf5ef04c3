//! Local-first session around one tournament.
//!
//! Every change is applied to the local snapshot first, then saved, then pushed. A failing
//! store or remote never rolls the local state back; the session stays marked unsynced and
//! the next `flush` retries.

use crate::error::Error;
use crate::logic::merge;
use crate::models::{Tournament, TournamentError, TournamentId};
use crate::store::TournamentStore;
use crate::sync::{RemoteSync, Subscription, SyncError};
use chrono::Utc;
use std::mem;
use std::sync::{Arc, Mutex};

pub struct SyncedTournament<S, R> {
    local: Tournament,
    store: S,
    remote: R,
    inbox: Arc<Mutex<Vec<Tournament>>>,
    subscription: Option<Subscription>,
    unsynced: bool,
}

impl<S: TournamentStore, R: RemoteSync> SyncedTournament<S, R> {
    /// Wrap a freshly created tournament. Nothing is written until `flush`.
    pub fn new(mut tournament: Tournament, store: S, remote: R) -> Self {
        tournament.restamp(Utc::now());
        Self {
            local: tournament,
            store,
            remote,
            inbox: Arc::default(),
            subscription: None,
            unsynced: true,
        }
    }

    /// Load the stored snapshot, if any. The remote is not consulted; call `refresh` for that.
    pub fn restore(store: S, remote: R) -> Result<Option<Self>, Error> {
        let Some(local) = store.load()? else {
            return Ok(None);
        };
        Ok(Some(Self {
            local,
            store,
            remote,
            inbox: Arc::default(),
            subscription: None,
            unsynced: false,
        }))
    }

    pub fn tournament(&self) -> &Tournament {
        &self.local
    }

    pub fn id(&self) -> TournamentId {
        self.local.id
    }

    /// True when the local snapshot has changes the store or remote has not acknowledged.
    pub fn has_unsynced_changes(&self) -> bool {
        self.unsynced
    }

    pub fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribe to remote updates. They queue up and are merged by `drain_updates`.
    pub fn watch(&mut self) {
        let inbox = Arc::clone(&self.inbox);
        let subscription = self.remote.subscribe(
            self.local.id,
            Box::new(move |snapshot| match inbox.lock() {
                Ok(mut queue) => queue.push(snapshot.clone()),
                Err(_) => log::warn!("Update inbox poisoned; dropping snapshot {}", snapshot.id),
            }),
        );
        self.subscription = Some(subscription);
    }

    /// Run an engine operation against the current snapshot and write the result through.
    ///
    /// A validation error leaves everything untouched. A persistence or sync error is returned
    /// after the new state has been adopted locally.
    pub fn apply<F>(&mut self, op: F) -> Result<&Tournament, Error>
    where
        F: FnOnce(&Tournament) -> Result<Tournament, TournamentError>,
    {
        self.drain_updates();
        let mut next = op(&self.local)?;
        next.restamp(Utc::now());
        self.local = next;
        self.unsynced = true;
        self.flush()?;
        Ok(&self.local)
    }

    /// Save and push the local snapshot.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.store.save(&self.local)?;
        let held = self.remote.push(&self.local)?;
        self.unsynced = false;
        self.receive(held)?;
        Ok(())
    }

    /// Merge a snapshot from elsewhere. Returns whether the local state changed.
    pub fn receive(&mut self, remote: Tournament) -> Result<bool, Error> {
        if remote.id != self.local.id {
            return Err(SyncError::WrongTournament {
                expected: self.local.id,
                found: remote.id,
            }
            .into());
        }
        let merged = merge(&self.local, &remote);
        if merged == self.local {
            return Ok(false);
        }
        log::info!(
            "Tournament {} replaced by remote snapshot from {:?}",
            merged.id,
            merged.updated_at
        );
        self.local = merged;
        self.unsynced = false;
        if let Err(e) = self.store.save(&self.local) {
            self.unsynced = true;
            return Err(e.into());
        }
        Ok(true)
    }

    /// Merge every queued remote update. Returns how many replaced the local state.
    pub fn drain_updates(&mut self) -> usize {
        let queued = match self.inbox.lock() {
            Ok(mut queue) => mem::take(&mut *queue),
            Err(_) => return 0,
        };
        let mut accepted = 0;
        for snapshot in queued {
            match self.receive(snapshot) {
                Ok(true) => accepted += 1,
                Ok(false) => {}
                Err(e) => log::warn!("Could not apply remote update to {}: {}", self.local.id, e),
            }
        }
        accepted
    }

    /// Pull the remote's current snapshot and merge it.
    pub fn refresh(&mut self) -> Result<bool, Error> {
        match self.remote.fetch(self.local.id)? {
            Some(remote) => self.receive(remote),
            None => Ok(false),
        }
    }

    /// Stop watching and remove the stored record.
    pub fn delete(&mut self) -> Result<(), Error> {
        self.subscription = None;
        self.store.delete()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentity;
    use crate::logic::{record_result, start_tournament};
    use crate::models::TournamentFormat;
    use crate::store::MemoryStore;
    use crate::sync::SyncHub;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn league() -> Tournament {
        let names = ["Ana", "Ben", "Cai", "Dee", "Eli", "Fay"];
        start_tournament(
            &names,
            TournamentFormat::League,
            &FixedIdentity::new("owner"),
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap()
    }

    #[test]
    fn flush_saves_and_pushes() {
        let hub = SyncHub::new();
        let mut session = SyncedTournament::new(league(), MemoryStore::new(), hub.clone());
        assert!(session.has_unsynced_changes());
        session.flush().unwrap();
        assert!(!session.has_unsynced_changes());
        assert_eq!(hub.fetch(session.id()).unwrap().as_ref(), Some(session.tournament()));
    }

    #[test]
    fn validation_errors_change_nothing() {
        let mut session = SyncedTournament::new(league(), MemoryStore::new(), SyncHub::new());
        session.flush().unwrap();
        let before = session.tournament().clone();
        let err = session
            .apply(|t| record_result(t, uuid::Uuid::new_v4(), t.teams[0].id))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(TournamentError::MatchNotFound(_))));
        assert_eq!(session.tournament(), &before);
    }

    #[test]
    fn watched_updates_from_another_session_are_merged() {
        let hub = SyncHub::new();
        let mut first = SyncedTournament::new(league(), MemoryStore::new(), hub.clone());
        first.flush().unwrap();
        first.watch();

        let mut second = SyncedTournament::new(first.tournament().clone(), MemoryStore::new(), hub.clone());
        let m = second.tournament().current_match_id.unwrap();
        let winner = second.tournament().get_match(m).unwrap().team_a;
        second.apply(|t| record_result(t, m, winner)).unwrap();

        assert_eq!(first.drain_updates(), 1);
        assert_eq!(first.tournament(), second.tournament());
    }

    #[test]
    fn foreign_snapshots_are_refused() {
        let mut session = SyncedTournament::new(league(), MemoryStore::new(), SyncHub::new());
        assert!(matches!(
            session.receive(league()),
            Err(Error::Sync(SyncError::WrongTournament { .. }))
        ));
    }
}
