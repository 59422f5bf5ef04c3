//! Setup: validate the roster, pair players into teams, and schedule the opening matches.

use crate::identity::OwnerIdentity;
use crate::logic::pairing::{all_pairs, generate_round_robin, second_leg, Pairing};
use crate::logic::progression::SEMIFINAL_TEAMS;
use crate::logic::scheduling::{interleave, order};
use crate::models::{
    GameMatch, MatchType, Player, Team, TeamId, Tournament, TournamentError, TournamentFormat,
    BYE_PARTNER,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Smallest roster a tournament can start with.
pub const MIN_PLAYERS: usize = 4;

/// Trim names and reject empty, reserved or duplicate (case-insensitive) ones.
pub fn validate_roster<S: AsRef<str>>(names: &[S]) -> Result<Vec<Player>, TournamentError> {
    let mut seen = HashSet::new();
    let mut players = Vec::with_capacity(names.len());
    for name in names {
        let player = Player::new(name.as_ref());
        if player.name().is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        if player.same_name(BYE_PARTNER) {
            return Err(TournamentError::ReservedName(player.name().to_string()));
        }
        if !seen.insert(player.name().to_ascii_lowercase()) {
            return Err(TournamentError::DuplicatePlayer(player.name().to_string()));
        }
        players.push(player);
    }
    Ok(players)
}

/// Shuffle the players and pair them off. The odd player out gets the bye partner.
pub fn build_teams<R: Rng + ?Sized>(players: &[Player], rng: &mut R) -> Vec<Team> {
    let mut shuffled = players.to_vec();
    shuffled.shuffle(rng);

    let mut pairs = shuffled.chunks_exact(2);
    let mut teams: Vec<Team> = pairs
        .by_ref()
        .map(|pair| Team::new(pair[0].clone(), pair[1].clone()))
        .collect();
    if let [odd] = pairs.remainder() {
        teams.push(Team::with_bye(odd.clone()));
    }
    teams
}

/// Opening schedule for the format.
///
/// Cup: every pair once, as round 1, in fair play order. League: both legs up front; leg 1 is
/// round 1 and leg 2 (sides swapped) is round 2, each woven across its round-robin rounds.
pub fn generate_matches(format: TournamentFormat, teams: &[Team]) -> Vec<GameMatch> {
    let ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
    match format {
        TournamentFormat::Cup => order(&all_pairs(&ids))
            .into_iter()
            .map(|p| GameMatch::new(1, MatchType::Group, p.team_a, p.team_b))
            .collect(),
        TournamentFormat::League => {
            let first_leg = generate_round_robin(&ids);
            let mut matches = leg_matches(1, &first_leg);
            matches.extend(leg_matches(2, &second_leg(&first_leg)));
            matches
        }
    }
}

fn leg_matches(round: u32, rounds: &[Vec<Pairing>]) -> Vec<GameMatch> {
    interleave(rounds)
        .into_iter()
        .map(|p| GameMatch::new(round, MatchType::Group, p.team_a, p.team_b))
        .collect()
}

/// Create a tournament from a list of player names.
///
/// Needs at least `MIN_PLAYERS` players; the cup format also needs enough teams to fill the
/// semifinals. The first pending round-1 match becomes the current match.
pub fn start_tournament<S, R>(
    names: &[S],
    format: TournamentFormat,
    identity: &dyn OwnerIdentity,
    rng: &mut R,
) -> Result<Tournament, TournamentError>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let players = validate_roster(names)?;
    if players.len() < MIN_PLAYERS {
        return Err(TournamentError::NotEnoughPlayers {
            required: MIN_PLAYERS,
            found: players.len(),
        });
    }

    let teams = build_teams(&players, rng);
    if format == TournamentFormat::Cup && teams.len() < SEMIFINAL_TEAMS {
        return Err(TournamentError::NotEnoughTeams {
            required: SEMIFINAL_TEAMS,
            found: teams.len(),
        });
    }

    let matches = generate_matches(format, &teams);
    let mut tournament = Tournament::new(format, players, teams);
    tournament.matches = matches;
    tournament.current_match_id = tournament.first_pending_in_round(1);
    tournament.owner_id = Some(identity.get_or_create_owner_id());
    tournament.created_at = Some(Utc::now());

    log::info!(
        "Created {:?} tournament {} with {} teams and {} matches",
        tournament.format,
        tournament.id,
        tournament.teams.len(),
        tournament.matches.len()
    );
    Ok(tournament)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("P{i}")).collect()
    }

    #[test]
    fn rejects_duplicate_names_case_insensitively() {
        assert_eq!(
            validate_roster(&["Ana", "Ben", "ana "]),
            Err(TournamentError::DuplicatePlayer("ana".to_string()))
        );
    }

    #[test]
    fn rejects_empty_and_reserved_names() {
        assert_eq!(
            validate_roster(&["Ana", "  "]),
            Err(TournamentError::EmptyPlayerName)
        );
        assert!(matches!(
            validate_roster(&["Ana", "Random"]),
            Err(TournamentError::ReservedName(_))
        ));
    }

    #[test]
    fn odd_roster_gets_one_bye_team() {
        let players = validate_roster(&names(7)).unwrap();
        let teams = build_teams(&players, &mut StdRng::seed_from_u64(7));
        assert_eq!(teams.len(), 4);
        assert_eq!(teams.iter().filter(|t| t.has_bye()).count(), 1);
        let members: usize = teams.iter().map(|t| t.members().count()).sum();
        assert_eq!(members, 7);
    }

    #[test]
    fn needs_minimum_players() {
        let err = start_tournament(
            &names(3),
            TournamentFormat::League,
            &FixedIdentity::new("owner"),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert_eq!(err, TournamentError::NotEnoughPlayers { required: 4, found: 3 });
    }

    #[test]
    fn cup_needs_four_teams() {
        let err = start_tournament(
            &names(6),
            TournamentFormat::Cup,
            &FixedIdentity::new("owner"),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert_eq!(err, TournamentError::NotEnoughTeams { required: 4, found: 3 });
    }

    #[test]
    fn start_sets_first_match_current_and_stamps_owner() {
        let t = start_tournament(
            &names(8),
            TournamentFormat::Cup,
            &FixedIdentity::new("owner-1"),
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap();
        assert_eq!(t.matches.len(), 6);
        assert_eq!(t.current_round, 1);
        assert_eq!(t.current_match_id, Some(t.matches[0].id));
        assert_eq!(t.owner_id.as_deref(), Some("owner-1"));
        assert!(t.updated_at.is_none());
        t.check_invariants().unwrap();
    }
}
