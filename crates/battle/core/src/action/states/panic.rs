//! Morale break behavior.
//!
//! Spawned by the engine when a unit's morale check fails, never requested
//! by an input source. The break takes one of two shapes, decided by a
//! deterministic roll at init: a freeze that burns the unit's remaining TU,
//! or a berserk fit that sprays unaimed snap shots at random nearby tiles.
//! Uninterruptible either way; the unit returns to normal control once the
//! fit has run its course.

use crate::action::states::{Advance, StateCtx, active_unit};
use crate::state::{Position, UnitId, UnitStatus};

const ROLL_SHAPE: u32 = 0x31;
const ROLL_SHOTS: u32 = 0x32;
const ROLL_AIM_X: u32 = 0x33;
const ROLL_AIM_Y: u32 = 0x34;
const ROLL_DAMAGE: u32 = 0x35;

/// How far a berserk shot can stray from the shooter, per axis.
const SPRAY_SPREAD: u32 = 4;

pub struct PanicState {
    actor: UnitId,
    berserk: bool,
    shots_left: u32,
    started: bool,
}

impl PanicState {
    pub fn new(actor: UnitId) -> Self {
        Self {
            actor,
            berserk: false,
            shots_left: 0,
            started: false,
        }
    }

    pub(super) fn init(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        if self.started {
            return Advance::Continue;
        }
        let Some(unit) = active_unit(ctx.state, self.actor) else {
            return Advance::Complete;
        };
        let has_ammo = unit.ammo > 0;
        self.berserk = has_ammo && ctx.state.roll(ctx.env.rng(), self.actor, ROLL_SHAPE) % 2 == 0;
        if self.berserk {
            self.shots_left = ctx.state.roll_range(
                ctx.env.rng(),
                self.actor,
                ROLL_SHOTS,
                ctx.config.berserk_shots_min,
                ctx.config.berserk_shots_max,
            );
        }
        if let Some(unit) = ctx.state.units.unit_mut(self.actor) {
            unit.status = if self.berserk {
                UnitStatus::Berserk
            } else {
                UnitStatus::Panicking
            };
        }
        ctx.feedback.unit_panics(self.actor, self.berserk);
        self.started = true;
        Advance::Continue
    }

    pub(super) fn think(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        let Some(unit) = active_unit(ctx.state, self.actor) else {
            return Advance::Complete;
        };
        if !self.berserk {
            // Freeze: the whole turn's TU evaporates in one shudder.
            if let Some(unit) = ctx.state.units.unit_mut(self.actor) {
                unit.time_units = 0;
            }
            return self.finish(ctx);
        }
        if self.shots_left == 0 || unit.ammo == 0 {
            return self.finish(ctx);
        }
        let from = unit.position;
        self.shots_left -= 1;
        if let Some(unit) = ctx.state.units.unit_mut(self.actor) {
            unit.ammo -= 1;
        }
        let aim = self.spray_target(ctx, from);
        ctx.feedback.shot_fired(self.actor, from, aim);
        let struck = ctx
            .state
            .units
            .unit_at(aim)
            .filter(|u| u.id != self.actor)
            .map(|u| u.id);
        if let Some(victim) = struck {
            ctx.feedback.projectile_hits(aim);
            let percent =
                ctx.state
                    .roll_range(ctx.env.rng(), self.actor, ROLL_DAMAGE, 50, 150);
            let damage = (u32::from(ctx.config.shot_damage) * percent / 100) as u16;
            if let Some(unit) = ctx.state.units.unit_mut(victim) {
                unit.apply_damage(damage);
                unit.change_morale(-10);
            }
        }
        Advance::Continue
    }

    fn spray_target(&self, ctx: &mut StateCtx<'_, '_>, from: Position) -> Position {
        let dx = ctx
            .state
            .roll_range(ctx.env.rng(), self.actor, ROLL_AIM_X, 0, SPRAY_SPREAD * 2)
            as i32
            - SPRAY_SPREAD as i32;
        let dy = ctx
            .state
            .roll_range(ctx.env.rng(), self.actor, ROLL_AIM_Y, 0, SPRAY_SPREAD * 2)
            as i32
            - SPRAY_SPREAD as i32;
        Position::new(from.x + dx, from.y + dy, from.z)
    }

    fn finish(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        if let Some(unit) = ctx.state.units.unit_mut(self.actor) {
            if unit.is_active() {
                unit.status = UnitStatus::Standing;
            }
        }
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

    fn run(state: &mut BattleState, actor: UnitId) {
        let map = GridMap::open(16, 16, 1);
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
        let mut panic = PanicState::new(actor);
        if matches!(panic.init(&mut ctx), Advance::Complete) {
            return;
        }
        for _ in 0..16 {
            if matches!(panic.think(&mut ctx), Advance::Complete) {
                return;
            }
        }
        unreachable!("panic fit never ended");
    }

    #[test]
    fn break_resolves_and_restores_control() {
        let mut state = BattleState::new(11);
        state.units.insert(UnitState::new(
            UnitId(1),
            Position::new(8, 8, 0),
            Side::Player,
        ));
        run(&mut state, UnitId(1));

        let unit = state.units.unit(UnitId(1)).unwrap();
        assert_eq!(unit.status, UnitStatus::Standing);
        // Either shape leaves a mark: a freeze drains TU, a berserk fit
        // spends ammo.
        assert!(unit.time_units == 0 || unit.ammo < 10);
    }

    #[test]
    fn empty_weapon_forces_the_freeze_shape() {
        let mut state = BattleState::new(11);
        let mut unit = UnitState::new(UnitId(1), Position::new(8, 8, 0), Side::Player);
        unit.ammo = 0;
        state.units.insert(unit);
        run(&mut state, UnitId(1));

        let unit = state.units.unit(UnitId(1)).unwrap();
        assert_eq!(unit.time_units, 0);
        assert_eq!(unit.ammo, 0);
    }

    #[test]
    fn identical_seeds_break_identically() {
        let fit = |seed: u64| {
            let mut state = BattleState::new(seed);
            state.units.insert(UnitState::new(
                UnitId(1),
                Position::new(8, 8, 0),
                Side::Player,
            ));
            run(&mut state, UnitId(1));
            let unit = state.units.unit(UnitId(1)).unwrap();
            (unit.time_units, unit.ammo, state.nonce)
        };
        assert_eq!(fit(77), fit(77));
    }

    #[test]
    fn dead_actor_completes_without_effect() {
        let mut state = BattleState::new(11);
        let mut unit = UnitState::new(UnitId(1), Position::new(8, 8, 0), Side::Player);
        unit.apply_damage(30);
        state.units.insert(unit);
        run(&mut state, UnitId(1));
        assert_eq!(state.nonce, 0);
    }
}
