//! Area damage resolution.
//!
//! Spawned by a landed throw or a primed charge. Damage is applied in one
//! shot during `init`: every active unit on the blast level within the
//! Chebyshev radius takes power scaled down linearly with distance, with a
//! per-victim variance roll. Survivors lose morale.

use crate::action::states::{Advance, StateCtx};
use crate::state::{Position, UnitId};

const ROLL_BLAST: u32 = 0x21;

pub struct ExplodeState {
    center: Position,
    power: u16,
    radius: u32,
}

impl ExplodeState {
    pub fn at(center: Position, power: u16, radius: u32) -> Self {
        Self {
            center,
            power,
            radius,
        }
    }

    pub(super) fn init(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        ctx.feedback.explosion(self.center, self.power);
        let victims: Vec<(UnitId, u32)> = ctx
            .state
            .units
            .iter()
            .filter(|u| u.is_active() && u.position.z == self.center.z)
            .filter_map(|u| {
                let distance = u.position.lateral_distance(self.center) as u32;
                (distance <= self.radius).then_some((u.id, distance))
            })
            .collect();

        for (victim, distance) in victims {
            let base = u32::from(self.power) * (self.radius + 1 - distance)
                / (self.radius + 1);
            let percent =
                ctx.state
                    .roll_range(ctx.env.rng(), victim, ROLL_BLAST, 50, 150);
            let damage = (base * percent / 100) as u16;
            if let Some(unit) = ctx.state.units.unit_mut(victim) {
                unit.apply_damage(damage);
                unit.change_morale(-20);
            }
        }
        Advance::Complete
    }

    pub(super) fn think(&mut self, _ctx: &mut StateCtx<'_, '_>) -> Advance {
        // All work happens in init; a think call means the orchestrator
        // deferred completion, so just confirm it.
        Advance::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::env::{BattleEnv, GridMap, MapOracle, NullFeedback, PcgRng};
    use crate::path::SearchContext;
    use crate::state::{BattleState, Side, UnitState};

    fn detonate(state: &mut BattleState, center: Position, power: u16, radius: u32) {
        let map = GridMap::open(12, 12, 2);
        let rng = PcgRng;
        let env = BattleEnv::new(&map, &rng);
        let mut search = SearchContext::new(map.dimensions(), 1);
        let mut feedback = NullFeedback;
        let config = BattleConfig::default();
        let mut ctx = StateCtx {
            state,
            env: &env,
            search: &mut search,
            feedback: &mut feedback,
            config: &config,
        };
        let mut explode = ExplodeState::at(center, power, radius);
        assert!(matches!(explode.init(&mut ctx), Advance::Complete));
    }

    #[test]
    fn units_inside_the_radius_take_damage() {
        let mut state = BattleState::new(3);
        state.units.insert(UnitState::new(
            UnitId(1),
            Position::new(5, 5, 0),
            Side::Hostile,
        ));
        state.units.insert(UnitState::new(
            UnitId(2),
            Position::new(7, 7, 0),
            Side::Hostile,
        ));
        detonate(&mut state, Position::new(5, 5, 0), 40, 3);

        assert!(state.units.unit(UnitId(1)).unwrap().health < 30);
        assert!(state.units.unit(UnitId(2)).unwrap().health < 30);
    }

    #[test]
    fn blast_falls_off_with_distance() {
        // Variance makes single runs noisy; fix it out by comparing the
        // same roll sequence across two separate battles.
        let mut near = BattleState::new(3);
        near.units.insert(UnitState::new(
            UnitId(1),
            Position::new(5, 5, 0),
            Side::Hostile,
        ));
        detonate(&mut near, Position::new(5, 5, 0), 40, 3);

        let mut far = BattleState::new(3);
        far.units.insert(UnitState::new(
            UnitId(1),
            Position::new(8, 5, 0),
            Side::Hostile,
        ));
        detonate(&mut far, Position::new(5, 5, 0), 40, 3);

        let near_health = near.units.unit(UnitId(1)).unwrap().health;
        let far_health = far.units.unit(UnitId(1)).unwrap().health;
        assert!(near_health < far_health);
    }

    #[test]
    fn units_outside_radius_or_level_are_untouched() {
        let mut state = BattleState::new(3);
        state.units.insert(UnitState::new(
            UnitId(1),
            Position::new(9, 5, 0),
            Side::Hostile,
        ));
        state.units.insert(UnitState::new(
            UnitId(2),
            Position::new(5, 5, 1),
            Side::Hostile,
        ));
        detonate(&mut state, Position::new(5, 5, 0), 40, 3);

        assert_eq!(state.units.unit(UnitId(1)).unwrap().health, 30);
        assert_eq!(state.units.unit(UnitId(2)).unwrap().health, 30);
        assert_eq!(state.units.unit(UnitId(1)).unwrap().morale, 100);
    }
}
