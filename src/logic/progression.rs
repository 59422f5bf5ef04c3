//! Round progression: recording results, closing round 1 (cup semifinals or league second leg),
//! creating the cup final, and finishing the tournament.
//!
//! Every check runs immediately after the mutation that can trigger it and is guarded by the
//! state it creates, so running it again is a no-op.

use crate::logic::views::standings;
use crate::models::{
    GameMatch, MatchId, MatchType, TeamId, Tournament, TournamentError, TournamentFormat,
    TournamentStatus,
};

/// Teams that go through to the cup semifinals.
pub const SEMIFINAL_TEAMS: usize = 4;

/// Record the winner of a pending match of the current round, then run the progression checks.
///
/// Credits the winner 3 points. When the match was the current one, the next pending match of
/// the round (in match order) becomes current.
pub fn record_result(
    tournament: &Tournament,
    match_id: MatchId,
    winner_id: TeamId,
) -> Result<Tournament, TournamentError> {
    let mut next = tournament.clone();
    resolve_match(&mut next, match_id, winner_id)?;
    progress(&mut next)?;
    Ok(next)
}

fn resolve_match(
    t: &mut Tournament,
    match_id: MatchId,
    winner_id: TeamId,
) -> Result<(), TournamentError> {
    if t.is_finished() {
        return Err(TournamentError::TournamentFinished);
    }
    let current_round = t.current_round;
    let m = t
        .get_match(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.is_completed() {
        return Err(TournamentError::MatchAlreadyCompleted(match_id));
    }
    if m.round != current_round {
        return Err(TournamentError::MatchNotInCurrentRound(match_id));
    }
    if !m.involves(winner_id) {
        return Err(TournamentError::WinnerNotInMatch {
            match_id,
            team_id: winner_id,
        });
    }

    t.get_team_mut(winner_id)
        .ok_or(TournamentError::TeamNotFound(winner_id))?
        .credit_win();
    if let Some(m) = t.get_match_mut(match_id) {
        m.set_winner(Some(winner_id));
    }
    if t.current_match_id == Some(match_id) {
        t.current_match_id = t.first_pending_in_round(current_round);
    }
    Ok(())
}

/// Replace (or clear) the recorded winner of any match.
///
/// The previous winner loses its 3 points and the new one gains them; clearing puts the match
/// back to pending. Progression checks only run when the match belongs to the current round:
/// rounds that already closed are not re-evaluated, so correcting a semifinal after the final
/// exists leaves the final as it is. Clearing the result that finished the tournament reopens it
/// with that match on court.
pub fn correct_winner(
    tournament: &Tournament,
    match_id: MatchId,
    winner: Option<TeamId>,
) -> Result<Tournament, TournamentError> {
    let m = tournament
        .get_match(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if let Some(team_id) = winner {
        if !m.involves(team_id) {
            return Err(TournamentError::WinnerNotInMatch { match_id, team_id });
        }
    }
    let previous = m.winner_id;
    let round = m.round;
    if previous == winner {
        return Ok(tournament.clone());
    }

    let mut next = tournament.clone();
    if let Some(old) = previous {
        next.get_team_mut(old)
            .ok_or(TournamentError::TeamNotFound(old))?
            .revoke_win();
    }
    if let Some(new) = winner {
        next.get_team_mut(new)
            .ok_or(TournamentError::TeamNotFound(new))?
            .credit_win();
    }
    if let Some(m) = next.get_match_mut(match_id) {
        m.set_winner(winner);
    }
    log::info!(
        "Corrected match {} in tournament {}: {:?} -> {:?}",
        match_id,
        next.id,
        previous,
        winner
    );

    if round == next.current_round {
        if next.is_finished() && !finish_reached(&next) {
            next.status = TournamentStatus::Active;
            next.current_match_id = Some(match_id);
            log::info!("Tournament {} reopened: match {} needs a result", next.id, match_id);
        }
        if winner.is_some() && next.current_match_id == Some(match_id) {
            next.current_match_id = next.first_pending_in_round(round);
        }
        progress(&mut next)?;
    }
    Ok(next)
}

/// Pick which pending match of the current round is on court.
pub fn set_current_match(
    tournament: &Tournament,
    match_id: MatchId,
) -> Result<Tournament, TournamentError> {
    if tournament.is_finished() {
        return Err(TournamentError::TournamentFinished);
    }
    let m = tournament
        .get_match(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.is_completed() {
        return Err(TournamentError::MatchAlreadyCompleted(match_id));
    }
    if m.round != tournament.current_round {
        return Err(TournamentError::MatchNotInCurrentRound(match_id));
    }
    let mut next = tournament.clone();
    next.current_match_id = Some(match_id);
    Ok(next)
}

/// Run the progression checks on a snapshot. Returns an equal snapshot when nothing is due.
pub fn advance(tournament: &Tournament) -> Result<Tournament, TournamentError> {
    let mut next = tournament.clone();
    progress(&mut next)?;
    Ok(next)
}

fn progress(t: &mut Tournament) -> Result<(), TournamentError> {
    close_first_round(t)?;
    create_final(t);
    finish(t);
    Ok(())
}

/// Round 1 done: cup seeds the semifinals, league opens the second leg.
fn close_first_round(t: &mut Tournament) -> Result<(), TournamentError> {
    if t.current_round != 1 || !t.round_complete(1) {
        return Ok(());
    }

    match t.format {
        TournamentFormat::Cup => {
            if t.matches_of_type(MatchType::Semifinal).next().is_none() {
                let [first, second, third, fourth] = top_seeds(t)?;
                let semifinal_1 = GameMatch::new(2, MatchType::Semifinal, first, fourth);
                let semifinal_2 = GameMatch::new(2, MatchType::Semifinal, second, third);
                t.current_match_id = Some(semifinal_1.id);
                t.matches.push(semifinal_1);
                t.matches.push(semifinal_2);
                log::info!("Tournament {}: top {} advance to the semifinals", t.id, SEMIFINAL_TEAMS);
            } else {
                t.current_match_id = t.first_pending_in_round(2);
            }
        }
        TournamentFormat::League => {
            t.current_match_id = t.first_pending_in_round(2);
            log::info!("Tournament {}: second leg started", t.id);
        }
    }
    t.current_round = 2;
    Ok(())
}

/// Ids of the four best teams by points, stable on ties.
fn top_seeds(t: &Tournament) -> Result<[TeamId; SEMIFINAL_TEAMS], TournamentError> {
    let ranked = standings(t);
    if ranked.len() < SEMIFINAL_TEAMS {
        return Err(TournamentError::NotEnoughTeams {
            required: SEMIFINAL_TEAMS,
            found: ranked.len(),
        });
    }
    Ok([ranked[0].id, ranked[1].id, ranked[2].id, ranked[3].id])
}

/// Both semifinals done and no final yet: the two winners meet in the final.
fn create_final(t: &mut Tournament) {
    if t.format != TournamentFormat::Cup
        || t.current_round != 2
        || t.matches_of_type(MatchType::Final).next().is_some()
    {
        return;
    }
    let semifinals: Vec<&GameMatch> = t.matches_of_type(MatchType::Semifinal).collect();
    let winners: Vec<TeamId> = semifinals.iter().filter_map(|m| m.winner_id).collect();
    let [first, second] = winners.as_slice() else {
        return;
    };
    if semifinals.len() != 2 || !semifinals.iter().all(|m| m.is_completed()) {
        return;
    }

    let final_match = GameMatch::new(2, MatchType::Final, *first, *second);
    t.current_match_id = Some(final_match.id);
    t.matches.push(final_match);
    log::info!("Tournament {}: final created", t.id);
}

/// Cup ends with the final; league ends when the whole second leg is played.
fn finish_reached(t: &Tournament) -> bool {
    match t.format {
        TournamentFormat::Cup => t
            .matches_of_type(MatchType::Final)
            .any(GameMatch::is_completed),
        TournamentFormat::League => t.current_round == 2 && t.round_complete(2),
    }
}

fn finish(t: &mut Tournament) {
    if !t.is_finished() && finish_reached(t) {
        t.status = TournamentStatus::Finished;
        t.current_match_id = None;
        log::info!("Tournament {} finished", t.id);
    }
}
