//! Falling units.
//!
//! Collects every unit left unsupported (no floor under a non-flyer) and
//! drops them one level per tick until each lands. Landing after a drop of
//! more than one level hurts. A fall can cascade across several levels of
//! floorless tiles before the unit touches down.

use crate::action::states::{Advance, StateCtx};
use crate::state::{BattleState, Direction, Position, UnitId};
use crate::env::BattleEnv;

pub struct FallState {
    /// Units currently airborne, with levels dropped so far. Seeded at
    /// construction, re-swept at init.
    falling: Vec<(UnitId, u32)>,
}

impl FallState {
    /// A fall triggered for one specific unit (stepped over a ledge).
    pub fn for_unit(unit: UnitId) -> Self {
        Self {
            falling: vec![(unit, 0)],
        }
    }

    /// A sweep over the whole roster, used after explosions or other
    /// terrain changes that may have removed floors under several units.
    pub fn sweep() -> Self {
        Self {
            falling: Vec::new(),
        }
    }

    pub(super) fn init(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        for unit in ctx.state.units.iter() {
            if !unit.is_active() || unit.is_flying() {
                continue;
            }
            if supported(ctx.env, unit.position) {
                continue;
            }
            if !self.falling.iter().any(|&(id, _)| id == unit.id) {
                self.falling.push((unit.id, 0));
            }
        }
        // Seeded entries may have landed or died before we ran.
        retain_airborne(&mut self.falling, ctx.state, ctx.env);
        if self.falling.is_empty() {
            Advance::Complete
        } else {
            Advance::Continue
        }
    }

    pub(super) fn think(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        let airborne = std::mem::take(&mut self.falling);
        for (id, depth) in airborne {
            let Some(unit) = ctx.state.units.unit(id).filter(|u| u.is_active()) else {
                continue;
            };
            let from = unit.position;
            if supported(ctx.env, from) {
                land(ctx, id, depth);
                continue;
            }
            let to = from + Direction::Down.delta();
            if let Some(unit) = ctx.state.units.unit_mut(id) {
                unit.position = to;
            }
            ctx.feedback.unit_falls(id, from, to);
            let depth = depth + 1;
            if supported(ctx.env, to) {
                land(ctx, id, depth);
            } else {
                self.falling.push((id, depth));
            }
        }
        if self.falling.is_empty() {
            Advance::Complete
        } else {
            Advance::Continue
        }
    }
}

/// Ground level always catches; above it a tile supports a unit only when
/// it has a floor.
fn supported(env: &BattleEnv<'_>, position: Position) -> bool {
    position.z == 0
        || env
            .map()
            .tile(position)
            .is_some_and(|tile| tile.has_floor())
}

fn retain_airborne(falling: &mut Vec<(UnitId, u32)>, state: &BattleState, env: &BattleEnv<'_>) {
    falling.retain(|&(id, _)| {
        state
            .units
            .unit(id)
            .is_some_and(|u| u.is_active() && !u.is_flying() && !supported(env, u.position))
    });
}

fn land(ctx: &mut StateCtx<'_, '_>, id: UnitId, depth: u32) {
    if depth > 1 {
        let damage = ctx.config.fall_damage_per_level.saturating_mul((depth - 1) as u16);
        if let Some(unit) = ctx.state.units.unit_mut(id) {
            unit.apply_damage(damage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::states::StateCtx;
    use crate::config::BattleConfig;
    use crate::env::{BattleEnv, GridMap, MapOracle, NullFeedback, PcgRng, StaticTile};
    use crate::path::SearchContext;
    use crate::state::{Position, Side, UnitState};

    fn shaft_map() -> GridMap {
        // Three levels; the column at (2, 2) has no floor above ground.
        let mut map = GridMap::open(5, 5, 3);
        for z in 1..3 {
            map.set_tile(
                Position::new(2, 2, z),
                StaticTile::open().with_floor_cost(0),
            );
        }
        map
    }

    fn run_to_completion(map: &GridMap, state: &mut BattleState, fall: &mut FallState) {
        let rng = PcgRng;
        let env = BattleEnv::new(map, &rng);
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
        if matches!(fall.init(&mut ctx), Advance::Complete) {
            return;
        }
        for _ in 0..16 {
            if matches!(fall.think(&mut ctx), Advance::Complete) {
                return;
            }
        }
        panic!("fall never completed");
    }

    #[test]
    fn unsupported_unit_drops_to_ground() {
        let map = shaft_map();
        let mut state = BattleState::new(7);
        state
            .units
            .insert(UnitState::new(UnitId(1), Position::new(2, 2, 2), Side::Player));

        let mut fall = FallState::for_unit(UnitId(1));
        run_to_completion(&map, &mut state, &mut fall);

        let unit = state.units.unit(UnitId(1)).unwrap();
        assert_eq!(unit.position, Position::new(2, 2, 0));
        // Dropped two levels: one level of free fall past the first.
        assert_eq!(unit.health, 30 - BattleConfig::default().fall_damage_per_level);
    }

    #[test]
    fn one_level_drop_is_harmless() {
        let map = shaft_map();
        let mut state = BattleState::new(7);
        state
            .units
            .insert(UnitState::new(UnitId(1), Position::new(2, 2, 1), Side::Player));

        let mut fall = FallState::for_unit(UnitId(1));
        run_to_completion(&map, &mut state, &mut fall);

        let unit = state.units.unit(UnitId(1)).unwrap();
        assert_eq!(unit.position, Position::new(2, 2, 0));
        assert_eq!(unit.health, 30);
    }

    #[test]
    fn supported_unit_completes_immediately() {
        let map = shaft_map();
        let mut state = BattleState::new(7);
        state
            .units
            .insert(UnitState::new(UnitId(1), Position::new(0, 0, 1), Side::Player));

        let mut fall = FallState::for_unit(UnitId(1));
        run_to_completion(&map, &mut state, &mut fall);
        assert_eq!(
            state.units.unit(UnitId(1)).unwrap().position,
            Position::new(0, 0, 1)
        );
    }

    #[test]
    fn sweep_catches_every_unsupported_unit() {
        let map = shaft_map();
        let mut state = BattleState::new(7);
        state
            .units
            .insert(UnitState::new(UnitId(1), Position::new(2, 2, 2), Side::Player));
        state
            .units
            .insert(UnitState::new(UnitId(2), Position::new(0, 0, 1), Side::Player));

        let mut fall = FallState::sweep();
        run_to_completion(&map, &mut state, &mut fall);

        assert_eq!(
            state.units.unit(UnitId(1)).unwrap().position,
            Position::new(2, 2, 0)
        );
        assert_eq!(
            state.units.unit(UnitId(2)).unwrap().position,
            Position::new(0, 0, 1)
        );
    }

    #[test]
    fn flyers_do_not_fall() {
        let map = shaft_map();
        let mut state = BattleState::new(7);
        state.units.insert(
            UnitState::new(UnitId(1), Position::new(2, 2, 2), Side::Player)
                .with_flags(crate::state::MoveFlags::FLYING),
        );

        let mut fall = FallState::sweep();
        run_to_completion(&map, &mut state, &mut fall);
        assert_eq!(
            state.units.unit(UnitId(1)).unwrap().position,
            Position::new(2, 2, 2)
        );
    }
}
