//! Data structures for the padel tournament: players, teams, matches, tournament state.

mod game;
mod player;
mod record;
mod team;
mod tournament;

pub use game::{GameMatch, MatchId, MatchStatus, MatchType};
pub use player::{Player, BYE_PARTNER};
pub use record::{MatchRecord, TournamentRecord};
pub use team::{Team, TeamId, WIN_POINTS};
pub use tournament::{
    Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
