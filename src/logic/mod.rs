//! Tournament engine: pairing, play order, progression, reconciliation, and setup/editing.

mod pairing;
mod progression;
mod reconcile;
mod roster;
mod scheduling;
mod setup;
mod teams;
mod views;

pub use pairing::{all_pairs, generate_round_robin, second_leg, Pairing};
pub use progression::{
    advance, correct_winner, record_result, set_current_match, SEMIFINAL_TEAMS,
};
pub use reconcile::{merge, remote_wins};
pub use roster::parse_roster;
pub use scheduling::{interleave, order, Fixture};
pub use setup::{build_teams, generate_matches, start_tournament, validate_roster, MIN_PLAYERS};
pub use teams::{edit_teams, swap_player, TeamEdit};
pub use views::{
    champion, current_match, phase, schedule, standings, transitions, upcoming_matches, Phase,
    Schedule, Transition,
};
