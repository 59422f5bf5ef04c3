//! Integration tests for persistence, reconciliation and the sync session.

use chrono::{Duration, TimeZone, Utc};
use padel_tournament_web::logic::generate_matches;
use padel_tournament_web::{
    merge, record_result, Error, JsonFileStore, MemoryStore, PersistenceError, Player,
    RemoteSync, SyncHub, SyncedTournament, Team, Tournament, TournamentFormat, TournamentStore,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn league() -> Tournament {
    let teams: Vec<Team> = (0..4)
        .map(|i| Team::new(Player::new(format!("A{i}")), Player::new(format!("B{i}"))))
        .collect();
    let players = teams.iter().flat_map(|t| t.players.clone()).collect();
    let mut t = Tournament::new(TournamentFormat::League, players, teams);
    t.matches = generate_matches(TournamentFormat::League, &t.teams);
    t.current_match_id = t.first_pending_in_round(1);
    t
}

/// Memory store that can be switched into failing.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: Arc<MemoryStore>,
    down: Arc<AtomicBool>,
}

impl FlakyStore {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

impl TournamentStore for FlakyStore {
    fn save(&self, tournament: &Tournament) -> Result<(), PersistenceError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable);
        }
        self.inner.save(tournament)
    }

    fn load(&self) -> Result<Option<Tournament>, PersistenceError> {
        self.inner.load()
    }

    fn delete(&self) -> Result<(), PersistenceError> {
        self.inner.delete()
    }
}

fn record_current(session: &mut SyncedTournament<FlakyStore, SyncHub>) -> Result<(), Error> {
    let t = session.tournament();
    let m = t.get_match(t.current_match_id.unwrap()).unwrap().clone();
    session.apply(|t| record_result(t, m.id, m.team_a)).map(|_| ())
}

#[test]
fn file_store_round_trips_and_deletes() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested").join("t.json"));
    assert_eq!(store.load().unwrap(), None);

    let mut t = league();
    t.restamp(Utc::now());
    let m = t.matches[0].clone();
    let t = record_result(&t, m.id, m.team_b).unwrap();
    store.save(&t).unwrap();
    assert_eq!(store.load().unwrap(), Some(t));

    store.delete().unwrap();
    assert_eq!(store.load().unwrap(), None);
    // Deleting twice is fine.
    store.delete().unwrap();
}

#[test]
fn corrupt_file_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        JsonFileStore::new(&path).load(),
        Err(PersistenceError::Decode(_))
    ));
}

#[test]
fn failed_save_keeps_local_state_until_retry() {
    let store = FlakyStore::default();
    let hub = SyncHub::new();
    let mut session = SyncedTournament::new(league(), store.clone(), hub.clone());
    session.flush().unwrap();

    store.set_down(true);
    let err = record_current(&mut session).unwrap_err();
    assert!(err.is_recoverable());
    assert!(session.has_unsynced_changes());
    let local = session.tournament().clone();
    assert_eq!(local.teams.iter().map(|t| t.points).sum::<i32>(), 3);
    // Nothing reached the store or the hub.
    assert_ne!(store.load().unwrap().as_ref(), Some(&local));
    assert_ne!(hub.fetch(local.id).unwrap().as_ref(), Some(&local));

    store.set_down(false);
    session.flush().unwrap();
    assert!(!session.has_unsynced_changes());
    assert_eq!(store.load().unwrap(), Some(local.clone()));
    assert_eq!(hub.fetch(local.id).unwrap(), Some(local));
}

#[test]
fn restore_reads_what_was_flushed() {
    let store = FlakyStore::default();
    let hub = SyncHub::new();
    let mut session = SyncedTournament::new(league(), store.clone(), hub.clone());
    session.flush().unwrap();
    record_current(&mut session).unwrap();

    let restored = SyncedTournament::restore(store.clone(), hub).unwrap().unwrap();
    assert_eq!(restored.tournament(), session.tournament());
    assert!(!restored.has_unsynced_changes());

    session.delete().unwrap();
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn two_observers_converge_through_the_hub() {
    let hub = SyncHub::new();
    let mut court = SyncedTournament::new(league(), FlakyStore::default(), hub.clone());
    court.flush().unwrap();
    let mut spectator =
        SyncedTournament::restore(court_store_copy(&court), hub.clone()).unwrap().unwrap();
    spectator.watch();
    assert!(spectator.is_watching());
    assert_eq!(hub.subscriber_count(court.id()), 1);

    record_current(&mut court).unwrap();
    record_current(&mut court).unwrap();
    assert_eq!(spectator.drain_updates(), 2);
    assert_eq!(spectator.tournament(), court.tournament());

    drop(spectator);
    assert_eq!(hub.subscriber_count(court.id()), 0);
}

fn court_store_copy(session: &SyncedTournament<FlakyStore, SyncHub>) -> FlakyStore {
    let store = FlakyStore::default();
    store.save(session.tournament()).unwrap();
    store
}

#[test]
fn refresh_pulls_a_newer_remote() {
    let hub = SyncHub::new();
    let mut stale = SyncedTournament::new(league(), FlakyStore::default(), hub.clone());
    stale.flush().unwrap();

    let mut newer = stale.tournament().clone();
    newer.restamp(Utc::now() + Duration::seconds(5));
    newer.current_match_id = newer.matches.last().map(|m| m.id);
    hub.push(&newer).unwrap();

    assert!(stale.refresh().unwrap());
    assert_eq!(stale.tournament(), &newer);
    assert!(!stale.refresh().unwrap());
}

fn stamped(base: &Tournament, secs: Option<i64>) -> Tournament {
    let mut t = base.clone();
    t.updated_at = secs.map(|s| Utc.timestamp_opt(1_700_000_000 + s, 0).unwrap());
    t
}

proptest! {
    /// The merged snapshot is never older than either input, and merging with itself is a no-op.
    #[test]
    fn merge_keeps_the_freshest(a in prop::option::of(0i64..1000), b in prop::option::of(0i64..1000)) {
        let base = league();
        let local = stamped(&base, a);
        let mut remote = stamped(&base, b);
        remote.current_round = 2;

        let merged = merge(&local, &remote);
        prop_assert!(merged.updated_at >= local.updated_at.max(remote.updated_at));
        prop_assert_eq!(merge(&local, &local), local.clone());
        prop_assert_eq!(merge(&remote, &remote), remote.clone());
        if a.is_some() && a == b {
            prop_assert_eq!(merged, remote);
        }
    }
}
