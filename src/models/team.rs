//! Team: two players sharing one points tally.

use crate::models::player::Player;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// Points credited for a win (and taken back when the win is revoked).
pub const WIN_POINTS: i32 = 3;

/// A pair of players. A team built from the odd player out carries the bye partner in its
/// second seat.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub players: [Player; 2],
    /// Running tally: only ever moved by `credit_win` / `revoke_win`.
    pub points: i32,
}

impl Team {
    pub fn new(first: Player, second: Player) -> Self {
        Self {
            id: Uuid::new_v4(),
            players: [first, second],
            points: 0,
        }
    }

    /// Team for the odd player out of the roster.
    pub fn with_bye(player: Player) -> Self {
        Self::new(player, Player::bye())
    }

    /// Real players on this team (the bye partner is skipped).
    pub fn members(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_bye())
    }

    pub fn has_bye(&self) -> bool {
        self.players.iter().any(Player::is_bye)
    }

    pub fn credit_win(&mut self) {
        self.points += WIN_POINTS;
    }

    pub fn revoke_win(&mut self) {
        self.points -= WIN_POINTS;
    }

    /// "Alice & Bob" style label.
    pub fn display_name(&self) -> String {
        format!("{} & {}", self.players[0], self.players[1])
    }
}
