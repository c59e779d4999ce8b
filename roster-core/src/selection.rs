//! Reviewer selection
//!
//! Picks reviewers uniformly at random, without replacement, from a candidate
//! pool. The random source is owned by a [`ReviewerPicker`] so callers can fix
//! the seed and get repeatable assignments.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::model::User;

/// Number of reviewers assigned when a pull request is created
pub const REVIEWERS_PER_PR: usize = 2;

/// Select up to `count` distinct reviewer ids from `candidates`
///
/// Returns every candidate when the pool is no larger than `count`, and an empty
/// list when the pool is empty or `count` is zero.
pub fn select_reviewers<R: Rng + ?Sized>(
    candidates: &[User],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    if candidates.is_empty() || count == 0 {
        return Vec::new();
    }

    if candidates.len() <= count {
        return candidates.iter().map(|u| u.id.clone()).collect();
    }

    let mut pool: Vec<&User> = candidates.iter().collect();
    pool.shuffle(rng);
    pool.into_iter().take(count).map(|u| u.id.clone()).collect()
}

/// Shared, thread-safe random source for reviewer selection
pub struct ReviewerPicker {
    rng: Mutex<StdRng>,
}

impl ReviewerPicker {
    /// Deterministic picker for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Picker seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Seeded picker when a seed is configured, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Select up to `count` reviewers from `candidates`
    pub fn pick(&self, candidates: &[User], count: usize) -> Vec<String> {
        // A poisoned lock only means another pick panicked; the rng state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        select_reviewers(candidates, count, &mut *rng)
    }
}

impl Default for ReviewerPicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl std::fmt::Debug for ReviewerPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerPicker").finish_non_exhaustive()
    }
}
