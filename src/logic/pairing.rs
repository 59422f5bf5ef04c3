//! Round-robin pairing (circle method) for the cup group stage and both league legs.

use crate::models::TeamId;

/// A matchup before it is scheduled. `team_a` is the home side.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Pairing {
    pub team_a: TeamId,
    pub team_b: TeamId,
}

impl Pairing {
    pub fn new(team_a: TeamId, team_b: TeamId) -> Self {
        Self { team_a, team_b }
    }

    /// Same teams, home and away reversed.
    pub fn swapped(self) -> Self {
        Self::new(self.team_b, self.team_a)
    }
}

/// Round-robin rounds by the circle method.
///
/// An odd roster gets one empty (bye) slot; the first team stays fixed while the others rotate
/// for `n - 1` rounds, and each round pairs slot `i` with slot `n - 1 - i`. Pairings that land on
/// the bye are dropped. Home and away alternate with round parity. Fewer than two teams yields
/// no rounds.
pub fn generate_round_robin(teams: &[TeamId]) -> Vec<Vec<Pairing>> {
    if teams.len() < 2 {
        return Vec::new();
    }

    let mut slots: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
    if slots.len() % 2 != 0 {
        slots.push(None);
    }
    let n = slots.len();

    let mut rounds = Vec::with_capacity(n - 1);
    for round in 0..n - 1 {
        let pairings = (0..n / 2)
            .filter_map(|i| match (slots[i], slots[n - 1 - i]) {
                (Some(home), Some(away)) if round % 2 == 0 => Some(Pairing::new(home, away)),
                (Some(home), Some(away)) => Some(Pairing::new(away, home)),
                _ => None,
            })
            .collect();
        rounds.push(pairings);

        // Keep slot 0 fixed; the last slot moves to position 1.
        slots[1..].rotate_right(1);
    }
    rounds
}

/// Every team against every later team in roster order: one cup group stage.
pub fn all_pairs(teams: &[TeamId]) -> Vec<Pairing> {
    teams
        .iter()
        .enumerate()
        .flat_map(|(i, &a)| teams[i + 1..].iter().map(move |&b| Pairing::new(a, b)))
        .collect()
}

/// Second league leg: the first leg's rounds with home and away swapped in every pairing.
pub fn second_leg(first_leg: &[Vec<Pairing>]) -> Vec<Vec<Pairing>> {
    first_leg
        .iter()
        .map(|round| round.iter().map(|p| p.swapped()).collect())
        .collect()
}
