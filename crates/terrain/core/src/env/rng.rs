//! Deterministic random source shared by all peers.
//!
//! The engine never creates randomness of its own: every draw goes through a
//! caller-owned [`SyncRand`] stream, in a fixed order relative to all other
//! state-affecting calls of the same tick. Peers that start from the same
//! seed and issue the same sequence of engine calls end with identical grids.

/// Sequential, peer-synchronised integer generator.
pub trait SyncRand {
    /// Returns a value in `0..bound`. A `bound` of zero yields zero and must
    /// still advance the stream so call order stays aligned between peers.
    fn next_random(&mut self, bound: u32) -> u32;
}

/// Picks one element uniformly, consuming exactly one draw for a non-empty slice.
pub fn choose<'a, T>(rng: &mut dyn SyncRand, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let index = rng.next_random(items.len() as u32) as usize;
    items.get(index)
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output. Simple enough to
/// re-implement bit-for-bit on any peer.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PcgSyncRand {
    state: u64,
    draws: u64,
}

impl PcgSyncRand {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a stream from a game seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: Self::pcg_step(Self::mix_seed(seed)),
            draws: 0,
        }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::pcg_step(old);
        self.draws += 1;
        Self::pcg_output(old)
    }

    /// Advance the PCG state by one step.
    ///
    /// `state' = (state × multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Avalanche the seed so that nearby seeds start far apart.
    fn mix_seed(seed: u64) -> u64 {
        let mut hash = seed ^ 0x9e3779b97f4a7c15;
        hash ^= hash >> 33;
        hash = hash.wrapping_mul(0xff51afd7ed558ccd);
        hash ^= hash >> 33;
        hash
    }
}

impl SyncRand for PcgSyncRand {
    fn next_random(&mut self, bound: u32) -> u32 {
        let value = self.next_u32();
        if bound == 0 { 0 } else { value % bound }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = PcgSyncRand::new(42);
        let mut b = PcgSyncRand::new(42);
        for _ in 0..64 {
            assert_eq!(a.next_random(1000), b.next_random(1000));
        }
        assert_eq!(a.draws(), 64);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = PcgSyncRand::new(1);
        let mut b = PcgSyncRand::new(2);
        let a_values: Vec<_> = (0..8).map(|_| a.next_u32()).collect();
        let b_values: Vec<_> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(a_values, b_values);
    }

    #[test]
    fn values_stay_below_bound() {
        let mut rng = PcgSyncRand::new(7);
        for _ in 0..1000 {
            assert!(rng.next_random(5) < 5);
        }
    }

    #[test]
    fn zero_bound_still_advances() {
        let mut rng = PcgSyncRand::new(7);
        assert_eq!(rng.next_random(0), 0);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn choose_consumes_one_draw() {
        let mut rng = PcgSyncRand::new(3);
        let items = [10, 20, 30];
        let picked = *choose(&mut rng, &items).unwrap();
        assert!(items.contains(&picked));
        assert_eq!(rng.draws(), 1);
        assert_eq!(choose::<u32>(&mut rng, &[]), None);
        assert_eq!(rng.draws(), 1);
    }
}
