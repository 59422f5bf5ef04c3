//! Match (game), MatchType and MatchStatus.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Stage of the tournament this match belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Round-robin match (cup group stage, or either league leg).
    #[default]
    Group,
    Semifinal,
    Final,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Completed,
}

/// A single match between two teams. Teams are referenced by id; the full team records live
/// once in `Tournament::teams`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameMatch {
    pub id: MatchId,
    /// 1 = group stage / first leg, 2 = playoffs / second leg.
    pub round: u32,
    pub match_type: MatchType,
    pub team_a: TeamId,
    pub team_b: TeamId,
    /// None while pending.
    pub winner_id: Option<TeamId>,
    pub status: MatchStatus,
}

impl GameMatch {
    pub fn new(round: u32, match_type: MatchType, team_a: TeamId, team_b: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            match_type,
            team_a,
            team_b,
            winner_id: None,
            status: MatchStatus::Pending,
        }
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.team_a == team || self.team_b == team
    }

    pub fn is_pending(&self) -> bool {
        self.status == MatchStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Store a winner, or clear it and put the match back to pending.
    pub(crate) fn set_winner(&mut self, winner: Option<TeamId>) {
        self.winner_id = winner;
        self.status = match winner {
            Some(_) => MatchStatus::Completed,
            None => MatchStatus::Pending,
        };
    }
}
