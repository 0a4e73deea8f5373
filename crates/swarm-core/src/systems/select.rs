//! Weighted Selection
//!
//! A reusable weighted-choice primitive. Weights are turned into a cumulative
//! table once (rand's `WeightedIndex`) and every draw is a single uniform
//! sample located in that table.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Items paired with selection weights.
#[derive(Debug, Clone)]
pub struct WeightedChoice<T> {
    items: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T> WeightedChoice<T> {
    /// Builds a choice table. Returns `None` when there is nothing to pick:
    /// no items, all weights zero, or any weight negative or not finite.
    pub fn new(entries: impl IntoIterator<Item = (T, f64)>) -> Option<Self> {
        let (items, weights): (Vec<T>, Vec<f64>) = entries.into_iter().unzip();
        if weights.iter().any(|w| !w.is_finite()) {
            return None;
        }
        let index = WeightedIndex::new(weights).ok()?;
        Some(Self { items, index })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        &self.items[self.index.sample(rng)]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const DRAWS: usize = 100_000;
    const TOLERANCE: f64 = 0.01;

    fn frequencies(choice: &WeightedChoice<usize>, rng: &mut SmallRng) -> Vec<f64> {
        let mut counts = vec![0usize; choice.len()];
        for _ in 0..DRAWS {
            counts[*choice.sample(rng)] += 1;
        }
        counts.iter().map(|&c| c as f64 / DRAWS as f64).collect()
    }

    #[test]
    fn test_frequencies_converge_to_weights() {
        let mut rng = SmallRng::seed_from_u64(12345);
        let weights = [0.1, 0.3, 0.4, 0.2];
        let choice = WeightedChoice::new(weights.iter().copied().enumerate()).unwrap();

        let observed = frequencies(&choice, &mut rng);
        for (expected, actual) in weights.iter().zip(&observed) {
            assert!(
                (expected - actual).abs() < TOLERANCE,
                "expected {expected}, observed {actual}"
            );
        }
    }

    #[test]
    fn test_unnormalized_weights() {
        let mut rng = SmallRng::seed_from_u64(7);
        let choice = WeightedChoice::new(vec![(0, 1.0), (1, 3.0)]).unwrap();

        let observed = frequencies(&choice, &mut rng);
        assert!((observed[0] - 0.25).abs() < TOLERANCE);
        assert!((observed[1] - 0.75).abs() < TOLERANCE);
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let mut rng = SmallRng::seed_from_u64(42);
        let choice = WeightedChoice::new(vec![("never", 0.0), ("always", 1.0)]).unwrap();

        for _ in 0..1000 {
            assert_eq!(*choice.sample(&mut rng), "always");
        }
    }

    #[test]
    fn test_degenerate_tables() {
        assert!(WeightedChoice::<u8>::new(Vec::new()).is_none());
        assert!(WeightedChoice::new(vec![(1, 0.0), (2, 0.0)]).is_none());
        assert!(WeightedChoice::new(vec![(1, -1.0), (2, 2.0)]).is_none());
        assert!(WeightedChoice::new(vec![(1, f64::NAN)]).is_none());
    }
}
