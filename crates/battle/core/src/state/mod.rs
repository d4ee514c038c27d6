//! Owned battle state: the unit roster plus battle-wide bookkeeping.
//!
//! Static terrain lives behind the [`MapOracle`](crate::env::MapOracle);
//! everything that mutates during a battle is here. All mutation flows
//! through the active action state, never through the orchestrator itself.

mod common;
mod unit;

pub use common::{Direction, Position, UnitId};
pub use unit::{MoveFlags, Side, UnitState, UnitStatus, UnitsState};

use crate::env::RngOracle;

/// Mutable battle-wide state shared by the action engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    pub units: UnitsState,
    /// Side whose units currently accept input.
    pub side_to_play: Side,
    /// Simulation tick counter, advanced once per orchestrator tick.
    pub tick: u64,
    /// Monotonic counter mixed into every RNG seed so repeated rolls within
    /// one battle never reuse a seed.
    pub nonce: u64,
    /// Base seed fixed at battle start; replays reuse it verbatim.
    pub seed: u64,
}

impl BattleState {
    pub fn new(seed: u64) -> Self {
        Self {
            units: UnitsState::default(),
            side_to_play: Side::Player,
            tick: 0,
            nonce: 0,
            seed,
        }
    }

    /// Turn-boundary bookkeeping: every surviving unit recovers, then
    /// control passes to the other side.
    pub fn end_turn(&mut self) {
        for unit in self.units.iter_mut() {
            if unit.is_active() {
                unit.refresh();
            }
        }
        self.side_to_play = match self.side_to_play {
            Side::Player => Side::Hostile,
            Side::Hostile | Side::Neutral => Side::Player,
        };
    }

    /// Draws one deterministic random number for `actor`, advancing the
    /// nonce. `context` distinguishes independent rolls inside one event.
    pub fn roll(&mut self, rng: &dyn RngOracle, actor: UnitId, context: u32) -> u32 {
        self.nonce += 1;
        let seed = crate::env::compute_seed(self.seed, self.nonce, u32::from(actor.0), context);
        rng.next_u32(seed)
    }

    /// Roll in `min..=max` inclusive.
    pub fn roll_range(
        &mut self,
        rng: &dyn RngOracle,
        actor: UnitId,
        context: u32,
        min: u32,
        max: u32,
    ) -> u32 {
        if min >= max {
            return min;
        }
        min + self.roll(rng, actor, context) % (max - min + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;

    #[test]
    fn rolls_advance_the_nonce() {
        let mut state = BattleState::new(7);
        let a = state.roll(&PcgRng, UnitId(1), 0);
        let b = state.roll(&PcgRng, UnitId(1), 0);
        assert_ne!(a, b, "consecutive rolls must use fresh seeds");
        assert_eq!(state.nonce, 2);
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut first = BattleState::new(99);
        let mut second = BattleState::new(99);
        for ctx in 0..8 {
            assert_eq!(
                first.roll(&PcgRng, UnitId(3), ctx),
                second.roll(&PcgRng, UnitId(3), ctx)
            );
        }
    }

    #[test]
    fn end_turn_refreshes_survivors_and_flips_control() {
        let mut state = BattleState::new(7);
        let mut weary = UnitState::new(UnitId(1), Position::ORIGIN, Side::Player);
        weary.time_units = 3;
        weary.energy = 10;
        state.units.insert(weary);
        let mut dead = UnitState::new(UnitId(2), Position::new(1, 0, 0), Side::Hostile);
        dead.apply_damage(30);
        dead.time_units = 0;
        state.units.insert(dead);

        state.end_turn();
        assert_eq!(state.side_to_play, Side::Hostile);
        let weary = state.units.unit(UnitId(1)).unwrap();
        assert_eq!(weary.time_units, UnitState::MAX_TIME_UNITS);
        assert_eq!(weary.energy, 35);
        assert_eq!(state.units.unit(UnitId(2)).unwrap().time_units, 0);

        state.end_turn();
        assert_eq!(state.side_to_play, Side::Player);
    }

    #[test]
    fn roll_range_is_inclusive_and_degenerate_safe() {
        let mut state = BattleState::new(1);
        for _ in 0..32 {
            let v = state.roll_range(&PcgRng, UnitId(0), 0, 2, 5);
            assert!((2..=5).contains(&v));
        }
        assert_eq!(state.roll_range(&PcgRng, UnitId(0), 0, 4, 4), 4);
    }
}
