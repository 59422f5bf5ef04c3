//! Play order: spreading a team's matches out so nobody plays twice in a row when it can be
//! avoided. Both orderings are greedy heuristics, not optimal schedules.

use crate::logic::pairing::Pairing;
use crate::models::{GameMatch, TeamId};
use std::collections::{HashMap, VecDeque};

/// Anything that puts two teams on court.
pub trait Fixture {
    fn teams(&self) -> (TeamId, TeamId);

    fn shares_team_with<F: Fixture + ?Sized>(&self, other: &F) -> bool {
        let (a, b) = self.teams();
        let (c, d) = other.teams();
        a == c || a == d || b == c || b == d
    }
}

impl Fixture for Pairing {
    fn teams(&self) -> (TeamId, TeamId) {
        (self.team_a, self.team_b)
    }
}

impl Fixture for GameMatch {
    fn teams(&self) -> (TeamId, TeamId) {
        (self.team_a, self.team_b)
    }
}

impl<T: Fixture + ?Sized> Fixture for &T {
    fn teams(&self) -> (TeamId, TeamId) {
        (**self).teams()
    }
}

/// Order one pool of fixtures.
///
/// Each step takes the fixture whose teams have waited longest (the smaller of the two waits
/// counts; a team that has not played yet has waited `emitted + 1` slots), first in pool order
/// on ties. Fixtures sharing a team with the previous pick are passed over while some other
/// fixture is still available; when none is, the best of the conflicting ones is taken.
pub fn order<T: Fixture + Clone>(fixtures: &[T]) -> Vec<T> {
    let mut remaining: Vec<T> = fixtures.to_vec();
    let mut ordered: Vec<T> = Vec::with_capacity(remaining.len());
    let mut last_played: HashMap<TeamId, usize> = HashMap::new();

    while !remaining.is_empty() {
        let emitted = ordered.len();
        let previous = ordered.last();
        let avoid_previous =
            previous.is_some_and(|prev| remaining.iter().any(|f| !f.shares_team_with(prev)));
        let wait = |team: TeamId| {
            last_played
                .get(&team)
                .map_or(emitted + 1, |&slot| emitted - slot)
        };

        let mut best: Option<(usize, usize)> = None;
        for (index, fixture) in remaining.iter().enumerate() {
            if avoid_previous && previous.is_some_and(|prev| fixture.shares_team_with(prev)) {
                continue;
            }
            let (a, b) = fixture.teams();
            let longest_wait = wait(a).min(wait(b));
            if best.map_or(true, |(_, w)| longest_wait > w) {
                best = Some((index, longest_wait));
            }
        }

        let index = best.map_or(0, |(index, _)| index);
        let picked = remaining.remove(index);
        let (a, b) = picked.teams();
        last_played.insert(a, emitted);
        last_played.insert(b, emitted);
        ordered.push(picked);
    }
    ordered
}

/// Weave several rounds into one sequence.
///
/// Each round is a FIFO queue. Every step scans the queues in round order and takes the first
/// fixture that shares no team with the one just emitted; if there is none, the head of the
/// first non-empty queue goes next.
pub fn interleave<T: Fixture + Clone>(rounds: &[Vec<T>]) -> Vec<T> {
    let mut queues: Vec<VecDeque<T>> = rounds
        .iter()
        .map(|round| round.iter().cloned().collect())
        .collect();
    let total: usize = queues.iter().map(VecDeque::len).sum();
    let mut woven: Vec<T> = Vec::with_capacity(total);

    while woven.len() < total {
        let last = woven.last();
        let fresh = queues.iter().enumerate().find_map(|(queue, fixtures)| {
            fixtures
                .iter()
                .position(|f| !last.is_some_and(|l| f.shares_team_with(l)))
                .map(|position| (queue, position))
        });
        let pick = fresh.or_else(|| queues.iter().position(|q| !q.is_empty()).map(|q| (q, 0)));

        let Some(fixture) = pick.and_then(|(queue, position)| queues[queue].remove(position))
        else {
            break;
        };
        woven.push(fixture);
    }
    woven
}
