//! Weighted single-pick sampling.

use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    /// Nothing to choose from, or every weight is zero.
    #[error("No valid option to choose from")]
    NoValidOption,
}

/// Picks one value with probability proportional to its integer weight.
///
/// Draws `r` uniformly from `[0, total)` and returns the first item whose
/// running weight exceeds `r`. Item order does not bias the result.
pub fn choose_weighted<T: Copy, R: Rng + ?Sized>(
    items: &[(T, u32)],
    rng: &mut R,
) -> Result<T, SelectionError> {
    let total: u64 = items.iter().map(|&(_, w)| u64::from(w)).sum();
    if total == 0 {
        return Err(SelectionError::NoValidOption);
    }
    let draw = rng.gen_range(0..total);
    let mut cumulative = 0u64;
    for &(value, weight) in items {
        cumulative += u64::from(weight);
        if cumulative > draw {
            return Ok(value);
        }
    }
    // cumulative == total > draw on the last item
    Err(SelectionError::NoValidOption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_weights_one_three_split() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = [("a", 1), ("b", 3)];
        let draws = 20_000;
        let hits = (0..draws)
            .filter(|_| choose_weighted(&items, &mut rng) == Ok("b"))
            .count();
        let freq = hits as f64 / draws as f64;
        assert!((freq - 0.75).abs() < 0.03, "frequency of b was {freq}");
    }

    #[test]
    fn test_empty_and_zero_weight_fail() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [(u8, u32); 0] = [];
        assert_eq!(
            choose_weighted(&empty, &mut rng),
            Err(SelectionError::NoValidOption)
        );
        assert_eq!(
            choose_weighted(&[(1u8, 0), (2u8, 0)], &mut rng),
            Err(SelectionError::NoValidOption)
        );
    }

    #[test]
    fn test_zero_weight_item_never_chosen() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            assert_eq!(choose_weighted(&[(0, 0), (1, 5), (2, 0)], &mut rng), Ok(1));
        }
    }

    proptest! {
        #[test]
        fn prop_result_has_positive_weight(
            weights in proptest::collection::vec(0u32..10, 1..12),
            seed in any::<u64>(),
        ) {
            let items: Vec<(usize, u32)> = weights.iter().copied().enumerate().collect();
            let mut rng = StdRng::seed_from_u64(seed);
            match choose_weighted(&items, &mut rng) {
                Ok(index) => prop_assert!(weights[index] > 0),
                Err(_) => prop_assert!(weights.iter().all(|&w| w == 0)),
            }
        }
    }
}
