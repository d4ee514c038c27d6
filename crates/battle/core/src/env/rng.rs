//! Deterministic dice for panic behavior, psi duels, and damage variance.
//!
//! Every roll in the engine derives from the battle seed plus an explicit
//! event nonce, so a replay of the same action sequence reproduces the same
//! battle bit for bit. Implementations must be pure functions of the seed.

/// Seed-indexed random source.
pub trait RngOracle: Send + Sync {
    /// Produces a random u32 for the given seed. Must be deterministic.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1..=100), the standard percentage die.
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }
}

/// PCG-XSH-RR generator: one LCG step followed by an xorshift and a random
/// rotate. Small state, fast, and statistically solid for game dice.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn advance(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn permute(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::permute(Self::advance(seed))
    }
}

/// Mixes the battle seed, event nonce, acting unit, and a per-event context
/// into a single seed. Distinct inputs must land on distinct seeds with
/// overwhelming probability; the constants are the usual SplitMix64 /
/// avalanche multipliers.
pub fn compute_seed(battle_seed: u64, nonce: u64, actor: u32, context: u32) -> u64 {
    let mut hash = battle_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(actor).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
