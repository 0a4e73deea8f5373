//! Friend Graph
//!
//! Each agent gets a random set of distinct peers. The upper bound scales
//! with population size; both bounds are capped at the number of peers that
//! actually exist so sampling always terminates.

use rand::seq::SliceRandom;
use rand::Rng;

/// Inclusive range of friend counts for one population
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendBounds {
    pub min: usize,
    pub max: usize,
}

impl FriendBounds {
    /// Bounds for a population of `population` agents (self included).
    ///
    /// `max = floor(population * fraction)`, capped at `population - 1`.
    /// `min` is capped at `population - 1` too; if it still exceeds `max`,
    /// `max` is raised to `min`.
    pub fn for_population(population: usize, min_friends: usize, fraction: f64) -> Self {
        let peers = population.saturating_sub(1);
        let scaled = (population as f64 * fraction).floor() as usize;
        let min = min_friends.min(peers);
        let max = scaled.min(peers).max(min);
        Self { min, max }
    }

    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// Pick friends for `id` from `known` by rejection sampling: draw a target
/// count within `bounds`, then sample members of `known`, rejecting `id`
/// itself and anyone already chosen. `known` is expected to hold distinct ids.
pub fn pick_friends<R: Rng + ?Sized>(
    id: &str,
    known: &[String],
    bounds: FriendBounds,
    rng: &mut R,
) -> Vec<String> {
    let peers = known.iter().filter(|k| k.as_str() != id).count();
    let target = rng.gen_range(bounds.min..=bounds.max).min(peers);

    let mut friends: Vec<String> = Vec::with_capacity(target);
    while friends.len() < target {
        let Some(candidate) = known.choose(rng) else {
            break;
        };
        if candidate == id || friends.contains(candidate) {
            continue;
        }
        friends.push(candidate.clone());
    }
    friends
}
