//! Deterministic per-mote and run-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each mote gets its own independent `SmallRng` seeded by:
//!
//!   seed = run_seed XOR (mote_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive mote ids uniformly across the seed space.
//! Mote-local draws (timer jitter, traffic destination) therefore never
//! depend on the order in which other motes consume randomness, while the
//! run-level `SimRng` drives the radio's delivery draws in dispatch order.
//! Both together make a run a pure function of its seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::MoteId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── MoteRng ───────────────────────────────────────────────────────────────────

/// Per-mote deterministic RNG.
pub struct MoteRng(SmallRng);

impl MoteRng {
    /// Seed deterministically from the run's seed and a mote id.
    pub fn new(run_seed: u64, mote: MoteId) -> Self {
        let seed = run_seed ^ u64::from(mote.0).wrapping_mul(MIXING_CONSTANT);
        MoteRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Scale `base` by a uniform factor in `[1 - spread, 1 + spread]`.
    ///
    /// `spread` is clamped to [0, 1]; a zero spread returns `base` unchanged.
    pub fn jitter(&mut self, base: f64, spread: f64) -> f64 {
        let spread = spread.clamp(0.0, 1.0);
        if spread == 0.0 {
            return base;
        }
        base * self.0.gen_range((1.0 - spread)..=(1.0 + spread))
    }

    /// Choose a random element from a slice; `None` if empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Run-level RNG for global draws (topology construction, frame delivery).
///
/// Used only from the single-threaded dispatch loop.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
