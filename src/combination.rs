//! Seeded sampling of the piece multisets searched for each grid size.

use std::fmt;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashSet, FxHasher};

use crate::error::{Error, Result};
use crate::pieces::PieceKind;

/// A multiset of piece kinds, stored sorted by kind index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PieceCombination {
    kinds: Vec<PieceKind>,
}

impl PieceCombination {
    pub fn new(mut kinds: Vec<PieceKind>) -> Self {
        kinds.sort_by_key(|kind| kind.index());
        Self { kinds }
    }

    #[inline]
    pub fn kinds(&self) -> &[PieceKind] {
        &self.kinds
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn count(&self, kind: PieceKind) -> usize {
        self.kinds.iter().filter(|&&k| k == kind).count()
    }

    pub fn distinct_kinds(&self) -> usize {
        // sorted, so equal kinds are adjacent
        1 + self.kinds.windows(2).filter(|pair| pair[0] != pair[1]).count()
    }

    /// Checkpoint key: sorted kind indices joined by `,`.
    pub fn key(&self) -> String {
        self.kinds
            .iter()
            .map(|kind| kind.index().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// At most one straight piece, at most one square, at least three
    /// different kinds.
    pub fn is_acceptable(&self) -> bool {
        !self.is_empty()
            && self.count(PieceKind::I) <= 1
            && self.count(PieceKind::O) <= 1
            && self.distinct_kinds() >= 3
    }
}

impl fmt::Display for PieceCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in &self.kinds {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

/// Derives the RNG seed from a string seed.
pub fn seed_from_str(seed: &str) -> u64 {
    let mut hasher = FxHasher::default();
    seed.hash(&mut hasher);
    hasher.finish()
}

/// Draws `target` distinct acceptable combinations of `num_pieces` kinds
/// from `pool`, with replacement.
///
/// Deterministic for a given seed. Gives up with
/// [`Error::CombinationsExhausted`] after `max_attempts` draws.
pub fn sample_combinations(
    pool: &[PieceKind],
    num_pieces: usize,
    target: usize,
    seed: &str,
    max_attempts: usize,
) -> Result<Vec<PieceCombination>> {
    let mut rng = StdRng::seed_from_u64(seed_from_str(seed));
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut combinations = Vec::with_capacity(target);
    let mut attempts = 0;

    while combinations.len() < target {
        if attempts == max_attempts || pool.is_empty() {
            return Err(Error::CombinationsExhausted {
                requested: target,
                found: combinations.len(),
                attempts,
            });
        }
        attempts += 1;

        let kinds = (0..num_pieces)
            .map(|_| pool[rng.random_range(0..pool.len())])
            .collect();
        let combination = PieceCombination::new(kinds);
        if combination.is_acceptable() && seen.insert(combination.key()) {
            combinations.push(combination);
        }
    }

    Ok(combinations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceKind::{I, J, L, O, S, T, Z};

    #[test]
    fn test_key_is_sorted_indices() {
        let combination = PieceCombination::new(vec![J, I, L, O]);
        assert_eq!(combination.key(), "0,1,3,4");
        assert_eq!(combination.to_string(), "IOLJ");
        assert_eq!(combination.kinds(), &[I, O, L, J]);
    }

    #[test]
    fn test_acceptance_rules() {
        assert!(PieceCombination::new(vec![I, O, L, J]).is_acceptable());
        assert!(!PieceCombination::new(vec![I, I, L, J]).is_acceptable());
        assert!(!PieceCombination::new(vec![O, O, L, J]).is_acceptable());
        assert!(!PieceCombination::new(vec![T, T, L, L]).is_acceptable());
        assert!(PieceCombination::new(vec![T, T, S, Z, Z, L]).is_acceptable());
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let first = sample_combinations(&PieceKind::ALL, 6, 8, "tetrofill", 10_000).unwrap();
        let second = sample_combinations(&PieceKind::ALL, 6, 8, "tetrofill", 10_000).unwrap();
        assert_eq!(first, second);

        let keys: FxHashSet<String> = first.iter().map(PieceCombination::key).collect();
        assert_eq!(keys.len(), 8);
        for combination in &first {
            assert_eq!(combination.len(), 6);
            assert!(combination.is_acceptable(), "{combination}");
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let first = sample_combinations(&PieceKind::ALL, 9, 5, "alpha", 10_000).unwrap();
        let second = sample_combinations(&PieceKind::ALL, 9, 5, "beta", 10_000).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        // only I and O available: never three distinct kinds
        let result = sample_combinations(&[I, O], 4, 1, "seed", 50);
        assert!(matches!(
            result,
            Err(Error::CombinationsExhausted {
                requested: 1,
                found: 0,
                attempts: 50
            })
        ));

        // a 3-kind pool has few distinct acceptable 4-piece multisets
        let result = sample_combinations(&[T, L, J], 4, 1000, "seed", 2000);
        assert!(matches!(result, Err(Error::CombinationsExhausted { .. })));
    }
}
