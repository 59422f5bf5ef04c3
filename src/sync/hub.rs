//! In-process sync hub: latest snapshot per tournament plus subscriber callbacks.

use crate::logic::merge;
use crate::models::{Tournament, TournamentId};
use crate::sync::{decode_snapshot, RemoteSync, Subscription, SyncError, UpdateHandler};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

type Handler = Arc<dyn Fn(&Tournament) + Send + Sync>;

/// Cheap to clone; clones share the same state.
#[derive(Clone, Default)]
pub struct SyncHub {
    inner: Arc<HubInner>,
}

#[derive(Default)]
struct HubInner {
    snapshots: RwLock<HashMap<TournamentId, Tournament>>,
    subscribers: RwLock<HashMap<TournamentId, Vec<(u64, Handler)>>>,
    next_subscriber: AtomicU64,
}

impl SyncHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and push a JSON snapshot from an observer.
    pub fn accept_json(&self, payload: &[u8]) -> Result<Tournament, SyncError> {
        let snapshot = decode_snapshot(payload)?;
        self.push(&snapshot)
    }

    /// Forget a tournament. Subscribers stay registered until they unsubscribe.
    pub fn remove(&self, id: TournamentId) -> Result<Option<Tournament>, SyncError> {
        let mut snapshots = self
            .inner
            .snapshots
            .write()
            .map_err(|_| SyncError::Unavailable)?;
        Ok(snapshots.remove(&id))
    }

    pub fn subscriber_count(&self, id: TournamentId) -> usize {
        self.inner
            .subscribers
            .read()
            .map(|subs| subs.get(&id).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn notify(&self, snapshot: &Tournament) {
        // Clone the handlers out so callbacks run without holding the lock.
        let handlers: Vec<Handler> = match self.inner.subscribers.read() {
            Ok(subs) => subs
                .get(&snapshot.id)
                .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default(),
            Err(_) => {
                log::warn!("Subscriber registry poisoned; update for {} not delivered", snapshot.id);
                return;
            }
        };
        for handler in handlers {
            handler(snapshot);
        }
    }
}

impl RemoteSync for SyncHub {
    /// Unstamped snapshots get the hub's clock. A snapshot older than the stored one loses and
    /// the stored one is returned instead.
    fn push(&self, tournament: &Tournament) -> Result<Tournament, SyncError> {
        let mut incoming = tournament.clone();
        if incoming.updated_at.is_none() {
            incoming.restamp(Utc::now());
        }

        let (held, changed) = {
            let mut snapshots = self
                .inner
                .snapshots
                .write()
                .map_err(|_| SyncError::Unavailable)?;
            let held = match snapshots.get(&incoming.id) {
                Some(stored) => merge(stored, &incoming),
                None => incoming,
            };
            let changed = snapshots.get(&held.id) != Some(&held);
            snapshots.insert(held.id, held.clone());
            (held, changed)
        };

        if changed {
            log::debug!("Hub accepted snapshot of {} at {:?}", held.id, held.updated_at);
            self.notify(&held);
        }
        Ok(held)
    }

    fn fetch(&self, id: TournamentId) -> Result<Option<Tournament>, SyncError> {
        let snapshots = self
            .inner
            .snapshots
            .read()
            .map_err(|_| SyncError::Unavailable)?;
        Ok(snapshots.get(&id).cloned())
    }

    fn subscribe(&self, id: TournamentId, on_update: UpdateHandler) -> Subscription {
        let key = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        match self.inner.subscribers.write() {
            Ok(mut subs) => subs.entry(id).or_default().push((key, Arc::from(on_update))),
            Err(_) => {
                log::warn!("Subscriber registry poisoned; cannot watch {}", id);
                return Subscription::detached();
            }
        }

        let hub = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            let Some(inner) = hub.upgrade() else {
                return;
            };
            let Ok(mut subs) = inner.subscribers.write() else {
                return;
            };
            if let Some(list) = subs.get_mut(&id) {
                list.retain(|(k, _)| *k != key);
                if list.is_empty() {
                    subs.remove(&id);
                }
            }
        })
    }
}
