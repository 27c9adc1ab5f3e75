//! Seeded linear congruential generator
//!
//! Stateless: the caller threads the seed through `GameState`, so the same
//! seed and event sequence always produce the same bounces.

/// Multiplier
pub const LCG_A: u64 = 1_103_515_245;
/// Increment
pub const LCG_C: u64 = 12_345;
/// Modulus (2^31)
pub const LCG_M: u64 = 1 << 31;

/// Advance the seed: `(A * seed + C) mod M`
#[inline]
pub fn hash(seed: u32) -> u32 {
    ((LCG_A * u64::from(seed) + LCG_C) % LCG_M) as u32
}

/// Map a hash linearly onto `[-1, 1]`
#[inline]
pub fn scale(hash: u32) -> f32 {
    (2.0 * f64::from(hash) / (LCG_M - 1) as f64 - 1.0) as f32
}

/// Advance the seed once and return `(next_seed, value in [-1, 1])`
#[inline]
pub fn next(seed: u32) -> (u32, f32) {
    let next = hash(seed);
    (next, scale(next))
}
