//! Read-only views over a tournament: standings, the match on court, upcoming play order, and
//! which transitions happened between two snapshots.

use crate::logic::scheduling::order;
use crate::models::{
    GameMatch, MatchRecord, MatchType, Team, Tournament, TournamentError, TournamentFormat,
};
use serde::Serialize;
use std::cmp::Reverse;

/// Stage of play, for headings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    GroupStage,
    Semifinals,
    Finals,
    FirstLeg,
    SecondLeg,
    Finished,
}

/// Something a spectator should be told about after a change.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    SemifinalsCreated,
    SecondLegStarted,
    FinalCreated,
    Finished,
}

/// Teams by points, highest first. Equal points keep roster order.
pub fn standings(tournament: &Tournament) -> Vec<&Team> {
    let mut ranked: Vec<&Team> = tournament.teams.iter().collect();
    ranked.sort_by_key(|t| Reverse(t.points));
    ranked
}

pub fn phase(tournament: &Tournament) -> Phase {
    if tournament.is_finished() {
        return Phase::Finished;
    }
    match (tournament.format, tournament.current_round) {
        (TournamentFormat::League, 1) => Phase::FirstLeg,
        (TournamentFormat::League, _) => Phase::SecondLeg,
        (TournamentFormat::Cup, 1) => Phase::GroupStage,
        (TournamentFormat::Cup, _) => {
            if tournament.matches_of_type(MatchType::Final).next().is_some() {
                Phase::Finals
            } else {
                Phase::Semifinals
            }
        }
    }
}

/// Pending matches of the current round, in match order.
fn pending_in_round(tournament: &Tournament) -> impl Iterator<Item = &GameMatch> {
    tournament
        .matches_in_round(tournament.current_round)
        .filter(|m| m.is_pending())
}

/// The designated current match if it is still pending, otherwise the first pending match of
/// the round.
pub fn current_match(tournament: &Tournament) -> Option<&GameMatch> {
    let designated = tournament
        .current_match_id
        .and_then(|id| pending_in_round(tournament).find(|m| m.id == id));
    designated.or_else(|| pending_in_round(tournament).next())
}

/// The rest of the round's pending matches in fair play order.
pub fn upcoming_matches(tournament: &Tournament) -> Vec<&GameMatch> {
    let current = current_match(tournament).map(|m| m.id);
    let rest: Vec<&GameMatch> = pending_in_round(tournament)
        .filter(|m| Some(m.id) != current)
        .collect();
    order(&rest)
}

/// Cup: winner of the final. League: top of the table once finished.
pub fn champion(tournament: &Tournament) -> Option<&Team> {
    if !tournament.is_finished() {
        return None;
    }
    match tournament.format {
        TournamentFormat::Cup => tournament
            .matches_of_type(MatchType::Final)
            .find_map(|m| m.winner_id)
            .and_then(|id| tournament.get_team(id)),
        TournamentFormat::League => standings(tournament).first().copied(),
    }
}

/// Transitions that happened going from `before` to `after`.
pub fn transitions(before: &Tournament, after: &Tournament) -> Vec<Transition> {
    let count = |t: &Tournament, kind| t.matches_of_type(kind).count();
    let mut seen = Vec::new();
    if count(before, MatchType::Semifinal) == 0 && count(after, MatchType::Semifinal) > 0 {
        seen.push(Transition::SemifinalsCreated);
    }
    if after.format == TournamentFormat::League
        && before.current_round == 1
        && after.current_round == 2
    {
        seen.push(Transition::SecondLegStarted);
    }
    if count(before, MatchType::Final) == 0 && count(after, MatchType::Final) > 0 {
        seen.push(Transition::FinalCreated);
    }
    if !before.is_finished() && after.is_finished() {
        seen.push(Transition::Finished);
    }
    seen
}

/// Everything a scoreboard needs, with team snapshots resolved.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub phase: Phase,
    pub standings: Vec<Team>,
    pub current_match: Option<MatchRecord>,
    pub upcoming: Vec<MatchRecord>,
    pub champion: Option<Team>,
}

pub fn schedule(tournament: &Tournament) -> Result<Schedule, TournamentError> {
    let resolve = |m: &GameMatch| MatchRecord::from_match(m, tournament);
    Ok(Schedule {
        phase: phase(tournament),
        standings: standings(tournament).into_iter().cloned().collect(),
        current_match: current_match(tournament).map(resolve).transpose()?,
        upcoming: upcoming_matches(tournament)
            .into_iter()
            .map(resolve)
            .collect::<Result<_, _>>()?,
        champion: champion(tournament).cloned(),
    })
}
