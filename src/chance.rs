use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The single randomness seam of the engine.
///
/// Every probabilistic decision made during battle resolution (accuracy,
/// critical chance, escape rolls, enemy move selection, shuffles) flows
/// through one implementation of this trait, so a scripted implementation
/// makes a whole round fully deterministic under test.
pub trait ChanceService {
    /// Roll against a percentage in 0..=100. A `percent` of 100 always
    /// succeeds and 0 always fails.
    fn event_occurs(&mut self, percent: u8, reason: &str) -> bool;

    /// Pick one event from a list of percentage weights. Returns `None`
    /// when the roll lands beyond the cumulative total (i.e. no event).
    fn which_event_weighted(&mut self, weights: &[u8], reason: &str) -> Option<usize>;

    /// Pick one of `count` equally likely events. `count` must be nonzero.
    fn which_event(&mut self, count: usize, reason: &str) -> usize;

    /// Produce a permutation of `0..count` for shuffling a collection.
    fn shuffle(&mut self, count: usize) -> Vec<usize>;
}

/// Shuffle a vector through a chance service's permutation.
pub fn shuffle_items<T>(chance: &mut dyn ChanceService, items: Vec<T>) -> Vec<T> {
    let order = chance.shuffle(items.len());
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .into_iter()
        .map(|i| slots[i].take().expect("shuffle permutation repeated an index"))
        .collect()
}

/// Real randomness backed by a seedable PRNG.
#[derive(Debug)]
pub struct RandomChance {
    rng: StdRng,
}

impl RandomChance {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded construction for reproducible battles.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomChance {
    fn default() -> Self {
        Self::new()
    }
}

impl ChanceService for RandomChance {
    fn event_occurs(&mut self, percent: u8, _reason: &str) -> bool {
        if percent == 0 {
            return false;
        }
        self.rng.random_range(1..=100u32) <= percent as u32
    }

    fn which_event_weighted(&mut self, weights: &[u8], _reason: &str) -> Option<usize> {
        let roll = self.rng.random_range(1..=100u32);
        let mut cumulative = 0u32;
        for (index, weight) in weights.iter().enumerate() {
            cumulative += *weight as u32;
            if roll <= cumulative {
                return Some(index);
            }
        }
        None
    }

    fn which_event(&mut self, count: usize, _reason: &str) -> usize {
        assert!(count > 0, "which_event called with zero candidates");
        self.rng.random_range(0..count)
    }

    fn shuffle(&mut self, count: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..count).collect();
        // Fisher-Yates
        for i in (1..count).rev() {
            let j = self.rng.random_range(0..=i);
            order.swap(i, j);
        }
        order
    }
}

/// Scripted chance oracle for tests.
///
/// Holds a fixed sequence of percentile outcomes (1..=100) that are
/// consumed one at a time. Exhausting the script is a test bug and
/// panics with the reason of the roll that needed a value.
#[derive(Debug, Clone)]
pub struct ScriptedChance {
    outcomes: Vec<u8>,
    index: usize,
}

impl ScriptedChance {
    pub fn new(outcomes: Vec<u8>) -> Self {
        Self { outcomes, index: 0 }
    }

    fn next_outcome(&mut self, reason: &str) -> u8 {
        if self.index >= self.outcomes.len() {
            panic!(
                "ScriptedChance exhausted! Tried to get a value for: '{}'. Need more outcomes.",
                reason
            );
        }
        let outcome = self.outcomes[self.index];

        #[cfg(test)]
        println!("[chance] consumed {} for: {}", outcome, reason);

        self.index += 1;
        outcome
    }
}

impl ChanceService for ScriptedChance {
    fn event_occurs(&mut self, percent: u8, reason: &str) -> bool {
        if percent == 0 {
            return false;
        }
        if percent >= 100 {
            return true;
        }
        self.next_outcome(reason) <= percent
    }

    fn which_event_weighted(&mut self, weights: &[u8], reason: &str) -> Option<usize> {
        let roll = self.next_outcome(reason) as u32;
        let mut cumulative = 0u32;
        for (index, weight) in weights.iter().enumerate() {
            cumulative += *weight as u32;
            if roll <= cumulative {
                return Some(index);
            }
        }
        None
    }

    fn which_event(&mut self, count: usize, reason: &str) -> usize {
        assert!(count > 0, "which_event called with zero candidates");
        self.next_outcome(reason) as usize % count
    }

    fn shuffle(&mut self, count: usize) -> Vec<usize> {
        // Scripted runs keep the original order.
        (0..count).collect()
    }
}
