//! Padel tournament organizer: library with models, the bracket engine, persistence and sync.

pub mod config;
pub mod error;
pub mod identity;
pub mod logic;
pub mod models;
pub mod store;
pub mod sync;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use identity::{FixedIdentity, OwnerIdentity, SessionIdentity};
pub use logic::{
    advance, champion, correct_winner, edit_teams, merge, parse_roster, record_result, schedule,
    set_current_match, standings, start_tournament, swap_player, transitions, Phase, Schedule,
    TeamEdit, Transition,
};
pub use models::{
    GameMatch, MatchId, MatchStatus, MatchType, Player, Team, TeamId, Tournament, TournamentError,
    TournamentFormat, TournamentId, TournamentStatus,
};
pub use store::{JsonFileStore, MemoryStore, PersistenceError, TournamentStore};
pub use sync::{RemoteSync, Subscription, SyncError, SyncHub, SyncedTournament};
