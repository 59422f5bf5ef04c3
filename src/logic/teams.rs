//! Team editing: reassigning players between teams after setup.
//!
//! Matches reference teams by id, so an edit shows up in every match (played or not) the next
//! time the tournament is serialized.

use crate::models::{Player, TeamId, Tournament, TournamentError, BYE_PARTNER};
use serde::Deserialize;

/// New line-up for one team.
#[derive(Clone, Debug, Deserialize)]
pub struct TeamEdit {
    pub id: TeamId,
    pub players: [String; 2],
}

/// Apply several line-ups at once. The result must still have every player on exactly one team.
pub fn edit_teams(
    tournament: &Tournament,
    edits: &[TeamEdit],
) -> Result<Tournament, TournamentError> {
    let mut next = tournament.clone();
    for edit in edits {
        let first = resolve_player(tournament, &edit.players[0])?;
        let second = resolve_player(tournament, &edit.players[1])?;
        next.get_team_mut(edit.id)
            .ok_or(TournamentError::TeamNotFound(edit.id))?
            .players = [first, second];
    }
    next.check_invariants()?;
    Ok(next)
}

/// Put `name` in one seat of a team. If that player already sits somewhere else, the two players
/// trade places.
pub fn swap_player(
    tournament: &Tournament,
    team_id: TeamId,
    seat: usize,
    name: &str,
) -> Result<Tournament, TournamentError> {
    if seat > 1 {
        return Err(TournamentError::InvalidSeat(seat));
    }
    let incoming = resolve_player(tournament, name)?;
    let outgoing = tournament
        .get_team(team_id)
        .ok_or(TournamentError::TeamNotFound(team_id))?
        .players[seat]
        .clone();
    if outgoing == incoming {
        return Ok(tournament.clone());
    }

    let mut next = tournament.clone();
    if !incoming.is_bye() {
        let elsewhere = next.teams.iter().enumerate().find_map(|(t, team)| {
            team.players
                .iter()
                .position(|p| *p == incoming)
                .filter(|&s| !(team.id == team_id && s == seat))
                .map(|s| (t, s))
        });
        if let Some((t, s)) = elsewhere {
            next.teams[t].players[s] = outgoing;
        }
    }
    if let Some(team) = next.get_team_mut(team_id) {
        team.players[seat] = incoming;
    }
    next.check_invariants()?;
    Ok(next)
}

/// The roster's spelling of a name, or the bye partner.
fn resolve_player(tournament: &Tournament, name: &str) -> Result<Player, TournamentError> {
    if Player::new(name).same_name(BYE_PARTNER) {
        return Ok(Player::bye());
    }
    tournament
        .players
        .iter()
        .find(|p| p.same_name(name))
        .cloned()
        .ok_or_else(|| TournamentError::UnknownPlayer(name.trim().to_string()))
}
