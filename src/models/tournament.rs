//! Tournament, TournamentFormat, TournamentStatus and TournamentError.

use crate::models::game::{GameMatch, MatchId, MatchType};
use crate::models::player::Player;
use crate::models::record::TournamentRecord;
use crate::models::team::{Team, TeamId, WIN_POINTS};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Validation errors. Any operation returning one of these leaves the tournament unchanged.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TournamentError {
    #[error("Need at least {required} players to start (found {found})")]
    NotEnoughPlayers { required: usize, found: usize },
    #[error("Need at least {required} teams for the semifinals (found {found})")]
    NotEnoughTeams { required: usize, found: usize },
    #[error("Player name cannot be empty")]
    EmptyPlayerName,
    /// Names are unique (case-insensitive) and each player sits on exactly one team.
    #[error("Player {0} is assigned more than once")]
    DuplicatePlayer(String),
    #[error("Player {0} is not on any team")]
    UnassignedPlayer(String),
    #[error("Player {0} is not part of this tournament")]
    UnknownPlayer(String),
    #[error("The name {0} is reserved")]
    ReservedName(String),
    #[error("Teams have two seats; seat {0} does not exist")]
    InvalidSeat(usize),
    #[error("Could not read roster: {0}")]
    InvalidRoster(String),
    #[error("Match not found")]
    MatchNotFound(MatchId),
    #[error("Team not found")]
    TeamNotFound(TeamId),
    #[error("Team does not play in this match")]
    WinnerNotInMatch { match_id: MatchId, team_id: TeamId },
    #[error("Match already has a result")]
    MatchAlreadyCompleted(MatchId),
    #[error("Match is not part of the current round")]
    MatchNotInCurrentRound(MatchId),
    #[error("Tournament is already finished")]
    TournamentFinished,
    #[error("Invalid tournament record: {0}")]
    InvalidRecord(String),
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Competition format, chosen at setup.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Single round-robin group stage, then top-4 semifinals and a final.
    #[default]
    Cup,
    /// Double round-robin: every pair meets once per leg with sides swapped.
    League,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Active,
    Finished,
}

/// Full tournament state. Engine operations take a snapshot and hand back a new one.
///
/// Serializes as a [`TournamentRecord`] (matches carry embedded team snapshots) and is
/// validated against the model invariants when read back.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(try_from = "TournamentRecord")]
pub struct Tournament {
    pub id: TournamentId,
    /// Stamped from the identity collaborator; not used by any engine algorithm.
    pub owner_id: Option<String>,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    /// All matches ever scheduled, in play order. Never removed.
    pub matches: Vec<GameMatch>,
    pub format: TournamentFormat,
    pub current_round: u32,
    /// The match on court; None between rounds and once finished.
    pub current_match_id: Option<MatchId>,
    pub status: TournamentStatus,
    pub created_at: Option<DateTime<Utc>>,
    /// Freshness stamp used by the reconciler. None until first saved.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create an active tournament in round 1 with no matches scheduled yet.
    pub fn new(format: TournamentFormat, players: Vec<Player>, teams: Vec<Team>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: None,
            players,
            teams,
            matches: Vec::new(),
            format,
            current_round: 1,
            current_match_id: None,
            status: TournamentStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn get_team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn get_team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    pub fn matches_in_round(&self, round: u32) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    /// True when the round has at least one match and every one of them is completed.
    pub fn round_complete(&self, round: u32) -> bool {
        let mut in_round = self.matches_in_round(round).peekable();
        in_round.peek().is_some() && in_round.all(GameMatch::is_completed)
    }

    /// First pending match of the round, in match order.
    pub fn first_pending_in_round(&self, round: u32) -> Option<MatchId> {
        self.matches_in_round(round)
            .find(|m| m.is_pending())
            .map(|m| m.id)
    }

    pub fn matches_of_type(&self, match_type: MatchType) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(move |m| m.match_type == match_type)
    }

    pub fn is_finished(&self) -> bool {
        self.status == TournamentStatus::Finished
    }

    /// Set `updated_at` to `now`, or to just after the previous stamp if the clock has not
    /// moved past it, so every local change is strictly newer than the one before.
    pub fn restamp(&mut self, now: DateTime<Utc>) {
        let stamp = match self.updated_at {
            Some(previous) if now <= previous => previous + Duration::milliseconds(1),
            _ => now,
        };
        self.updated_at = Some(stamp);
    }

    /// Check the model invariants: roster/team membership, match/team references, winner and
    /// status consistency, unique ids, and points matching completed wins.
    pub fn check_invariants(&self) -> Result<(), TournamentError> {
        let mut roster = HashSet::new();
        for player in &self.players {
            if player.is_bye() {
                return Err(TournamentError::ReservedName(player.name().to_string()));
            }
            if !roster.insert(player.name().to_ascii_lowercase()) {
                return Err(TournamentError::DuplicatePlayer(player.name().to_string()));
            }
        }

        let mut assigned = HashSet::new();
        let mut team_ids = HashSet::new();
        for team in &self.teams {
            if !team_ids.insert(team.id) {
                return Err(TournamentError::InvalidRecord(format!(
                    "team {} appears twice",
                    team.id
                )));
            }
            for player in team.members() {
                let key = player.name().to_ascii_lowercase();
                if !roster.contains(&key) {
                    return Err(TournamentError::UnknownPlayer(player.name().to_string()));
                }
                if !assigned.insert(key) {
                    return Err(TournamentError::DuplicatePlayer(player.name().to_string()));
                }
            }
        }
        if let Some(p) = self
            .players
            .iter()
            .find(|p| !assigned.contains(&p.name().to_ascii_lowercase()))
        {
            return Err(TournamentError::UnassignedPlayer(p.name().to_string()));
        }

        let mut match_ids = HashSet::new();
        let mut wins: HashMap<TeamId, i32> = HashMap::new();
        for m in &self.matches {
            if !match_ids.insert(m.id) {
                return Err(TournamentError::InvalidRecord(format!(
                    "match {} appears twice",
                    m.id
                )));
            }
            for team in [m.team_a, m.team_b] {
                if !team_ids.contains(&team) {
                    return Err(TournamentError::TeamNotFound(team));
                }
            }
            if m.team_a == m.team_b {
                return Err(TournamentError::InvalidRecord(format!(
                    "match {} pits a team against itself",
                    m.id
                )));
            }
            match m.winner_id {
                Some(winner) if !m.involves(winner) => {
                    return Err(TournamentError::WinnerNotInMatch {
                        match_id: m.id,
                        team_id: winner,
                    });
                }
                Some(winner) if m.is_completed() => *wins.entry(winner).or_default() += 1,
                None if m.is_pending() => {}
                _ => {
                    return Err(TournamentError::InvalidRecord(format!(
                        "match {} status does not match its winner",
                        m.id
                    )));
                }
            }
        }

        for team in &self.teams {
            let expected = WIN_POINTS * wins.get(&team.id).copied().unwrap_or(0);
            if team.points != expected {
                return Err(TournamentError::InvalidRecord(format!(
                    "team {} has {} points but {} from completed wins",
                    team.id, team.points, expected
                )));
            }
        }

        if !(1..=2).contains(&self.current_round) {
            return Err(TournamentError::InvalidRecord(format!(
                "round {} does not exist",
                self.current_round
            )));
        }
        if let Some(current) = self.current_match_id {
            if !match_ids.contains(&current) {
                return Err(TournamentError::MatchNotFound(current));
            }
        }
        Ok(())
    }
}

impl Serialize for Tournament {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TournamentRecord::try_from(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
