//! Wire shape of a tournament: what gets saved and synced. Each match embeds a snapshot of both
//! teams; reading a record resolves those snapshots back to team ids.

use crate::models::game::{GameMatch, MatchId, MatchStatus, MatchType};
use crate::models::player::Player;
use crate::models::team::{Team, TeamId};
use crate::models::tournament::{
    Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: MatchId,
    pub round: u32,
    /// Records written before playoffs existed leave this out; they are group matches.
    #[serde(default)]
    pub match_type: MatchType,
    pub team_a: Team,
    pub team_b: Team,
    #[serde(default)]
    pub winner_id: Option<TeamId>,
    #[serde(default)]
    pub status: MatchStatus,
}

impl MatchRecord {
    /// Denormalize one match against the tournament's current team records.
    pub fn from_match(m: &GameMatch, tournament: &Tournament) -> Result<Self, TournamentError> {
        let snapshot = |id: TeamId| {
            tournament
                .get_team(id)
                .cloned()
                .ok_or(TournamentError::TeamNotFound(id))
        };
        Ok(Self {
            id: m.id,
            round: m.round,
            match_type: m.match_type,
            team_a: snapshot(m.team_a)?,
            team_b: snapshot(m.team_b)?,
            winner_id: m.winner_id,
            status: m.status,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRecord {
    pub id: TournamentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub matches: Vec<MatchRecord>,
    #[serde(default)]
    pub format: TournamentFormat,
    pub current_round: u32,
    #[serde(default)]
    pub current_match_id: Option<MatchId>,
    #[serde(default)]
    pub status: TournamentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<&Tournament> for TournamentRecord {
    type Error = TournamentError;

    fn try_from(t: &Tournament) -> Result<Self, Self::Error> {
        let matches = t
            .matches
            .iter()
            .map(|m| MatchRecord::from_match(m, t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: t.id,
            owner_id: t.owner_id.clone(),
            players: t.players.clone(),
            teams: t.teams.clone(),
            matches,
            format: t.format,
            current_round: t.current_round,
            current_match_id: t.current_match_id,
            status: t.status,
            created_at: t.created_at,
            updated_at: t.updated_at,
        })
    }
}

impl TryFrom<TournamentRecord> for Tournament {
    type Error = TournamentError;

    fn try_from(record: TournamentRecord) -> Result<Self, Self::Error> {
        let matches = record
            .matches
            .into_iter()
            .map(|m| GameMatch {
                id: m.id,
                round: m.round,
                match_type: m.match_type,
                team_a: m.team_a.id,
                team_b: m.team_b.id,
                winner_id: m.winner_id,
                status: m.status,
            })
            .collect();
        let tournament = Tournament {
            id: record.id,
            owner_id: record.owner_id,
            players: record.players,
            teams: record.teams,
            matches,
            format: record.format,
            current_round: record.current_round,
            current_match_id: record.current_match_id,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        tournament.check_invariants()?;
        Ok(tournament)
    }
}
