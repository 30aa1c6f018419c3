//! Injectable randomness for candidate pools.
//!
//! Every source shuffles before capping so that a single popular tag or a
//! single busy category cannot dominate the pool, and repeated calls show
//! variety. Tests swap in [`IdentityShuffler`] or a seeded
//! [`RandomShuffler`] for reproducible ordering.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use suggest_types::TopicId;

/// Permutes candidate lists in place.
pub trait Shuffler: Send + Sync {
    /// Shuffle `tids` in place.
    fn shuffle(&self, tids: &mut [TopicId]);
}

/// Uniform random permutation backed by a [`StdRng`].
pub struct RandomShuffler {
    rng: Mutex<StdRng>,
}

impl RandomShuffler {
    /// Shuffler seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic shuffler for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seeded when `seed` is set, entropy-backed otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }
}

impl Default for RandomShuffler {
    fn default() -> Self {
        Self::new()
    }
}

impl Shuffler for RandomShuffler {
    fn shuffle(&self, tids: &mut [TopicId]) {
        // A poisoned lock still holds a usable rng.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        tids.shuffle(&mut *rng);
    }
}

/// Leaves order untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityShuffler;

impl Shuffler for IdentityShuffler {
    fn shuffle(&self, _tids: &mut [TopicId]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_keeps_order() {
        let mut tids = vec![3, 1, 2];
        IdentityShuffler.shuffle(&mut tids);
        assert_eq!(tids, vec![3, 1, 2]);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = RandomShuffler::seeded(99);
        let b = RandomShuffler::seeded(99);

        let mut left: Vec<TopicId> = (1..=20).collect();
        let mut right = left.clone();
        a.shuffle(&mut left);
        b.shuffle(&mut right);

        assert_eq!(left, right);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let shuffler = RandomShuffler::new();
        let mut tids: Vec<TopicId> = (1..=50).collect();
        shuffler.shuffle(&mut tids);

        let mut sorted = tids.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=50).collect::<Vec<_>>());
    }
}
