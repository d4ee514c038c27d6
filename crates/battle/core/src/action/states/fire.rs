//! Projectile actions: snap shots and thrown charges.
//!
//! Both states commit their cost (TU, ammo) exactly once at init and then
//! fly the projectile a few tiles per tick along a trajectory priced in
//! missile mode, so walls block shots but units in the corridor do not
//! block planning; a unit standing in the corridor at flight time is hit
//! instead of the aim point. The commit flag keeps a repeated `init` after
//! a resume from double-charging.

use crate::action::states::{Advance, ExplodeState, StateCtx, active_unit};
use crate::action::{ActionError, ActionState, BattleAction};
use crate::path::{self, MoveProfile, PathResult};
use crate::state::Position;

/// Roll context tags, one per independent die inside a projectile event.
const ROLL_DAMAGE: u32 = 0x11;

pub struct FireState {
    action: BattleAction,
    /// Tile centers the projectile passes through, aim point last.
    trajectory: Vec<Position>,
    travelled: usize,
    committed: bool,
}

impl FireState {
    pub fn new(action: BattleAction) -> Self {
        Self {
            action,
            trajectory: Vec::new(),
            travelled: 0,
            committed: false,
        }
    }

    pub(super) fn init(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        if self.committed {
            // Resumed after a suspension; the shot is already in the air.
            return Advance::Continue;
        }
        let Some(unit) = active_unit(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        let from = unit.position;
        let tu = shot_cost(&self.action, ctx.config.snap_shot_tu_cost);
        if unit.time_units < tu {
            self.abort(
                ctx,
                ActionError::InsufficientTimeUnits {
                    needed: tu,
                    available: unit.time_units,
                },
            );
            return Advance::Complete;
        }
        if unit.ammo == 0 {
            self.abort(ctx, ActionError::NoAmmo);
            return Advance::Complete;
        }
        let Some(trajectory) = plot(ctx, from, self.action.target) else {
            self.abort(ctx, ActionError::NoLineOfFire);
            return Advance::Complete;
        };
        self.trajectory = trajectory;
        self.travelled = 0;
        if let Some(unit) = ctx.state.units.unit_mut(self.action.actor) {
            unit.spend_time_units(tu);
            unit.ammo -= 1;
        }
        self.committed = true;
        ctx.feedback
            .shot_fired(self.action.actor, from, self.action.target);
        Advance::Continue
    }

    pub(super) fn think(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        for _ in 0..ctx.config.projectile_speed {
            let Some(&tile) = self.trajectory.get(self.travelled) else {
                // Flew past the aim point without touching anything.
                return Advance::Complete;
            };
            self.travelled += 1;
            let occupant = ctx
                .state
                .units
                .unit_at(tile)
                .filter(|u| u.id != self.action.actor)
                .map(|u| u.id);
            let at_aim_point = self.travelled == self.trajectory.len();
            if occupant.is_some() || at_aim_point {
                return self.impact(ctx, tile);
            }
        }
        Advance::Continue
    }

    fn impact(&mut self, ctx: &mut StateCtx<'_, '_>, tile: Position) -> Advance {
        ctx.feedback.projectile_hits(tile);
        let struck = ctx
            .state
            .units
            .unit_at(tile)
            .filter(|u| u.id != self.action.actor)
            .map(|u| u.id);
        if let Some(victim) = struck {
            let percent = ctx.state.roll_range(
                ctx.env.rng(),
                self.action.actor,
                ROLL_DAMAGE,
                50,
                150,
            );
            let damage =
                (u32::from(ctx.config.shot_damage) * percent / 100) as u16;
            if let Some(unit) = ctx.state.units.unit_mut(victim) {
                unit.apply_damage(damage);
                unit.change_morale(-10);
            }
            self.action.outcome.hit = Some(victim);
        }
        Advance::Complete
    }

    fn abort(&mut self, ctx: &mut StateCtx<'_, '_>, error: ActionError) {
        self.action.outcome.aborted = Some(error);
        ctx.feedback.action_failed(self.action.actor, &error);
    }

    pub(super) fn deinit(&mut self) {
        self.trajectory.clear();
    }
}

pub struct ThrowState {
    action: BattleAction,
    trajectory: Vec<Position>,
    travelled: usize,
    committed: bool,
    detonated: bool,
}

impl ThrowState {
    pub fn new(action: BattleAction) -> Self {
        Self {
            action,
            trajectory: Vec::new(),
            travelled: 0,
            committed: false,
            detonated: false,
        }
    }

    pub(super) fn init(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        if self.detonated {
            // Resumed after the pushed explosion resolved.
            return Advance::Complete;
        }
        if self.committed {
            return Advance::Continue;
        }
        let Some(unit) = active_unit(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        let from = unit.position;
        let tu = shot_cost(&self.action, ctx.config.snap_shot_tu_cost);
        if unit.time_units < tu {
            self.abort(
                ctx,
                ActionError::InsufficientTimeUnits {
                    needed: tu,
                    available: unit.time_units,
                },
            );
            return Advance::Complete;
        }
        let Some(trajectory) = plot(ctx, from, self.action.target) else {
            self.abort(ctx, ActionError::NoLineOfFire);
            return Advance::Complete;
        };
        self.trajectory = trajectory;
        self.travelled = 0;
        if let Some(unit) = ctx.state.units.unit_mut(self.action.actor) {
            unit.spend_time_units(tu);
        }
        self.committed = true;
        ctx.feedback
            .shot_fired(self.action.actor, from, self.action.target);
        Advance::Continue
    }

    pub(super) fn think(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        if self.detonated {
            return Advance::Complete;
        }
        for _ in 0..ctx.config.projectile_speed {
            let Some(&tile) = self.trajectory.get(self.travelled) else {
                return self.land(ctx, self.action.target);
            };
            self.travelled += 1;
            if self.travelled == self.trajectory.len() {
                return self.land(ctx, tile);
            }
        }
        Advance::Continue
    }

    fn land(&mut self, ctx: &mut StateCtx<'_, '_>, tile: Position) -> Advance {
        ctx.feedback.projectile_hits(tile);
        self.detonated = true;
        Advance::Push(Box::new(ActionState::Explode(ExplodeState::at(
            tile,
            ctx.config.blast_power,
            ctx.config.blast_radius,
        ))))
    }

    fn abort(&mut self, ctx: &mut StateCtx<'_, '_>, error: ActionError) {
        self.action.outcome.aborted = Some(error);
        ctx.feedback.action_failed(self.action.actor, &error);
    }

    pub(super) fn deinit(&mut self) {
        self.trajectory.clear();
    }
}

fn shot_cost(action: &BattleAction, default: u16) -> u16 {
    if action.reserved_tu > 0 {
        action.reserved_tu
    } else {
        default
    }
}

/// Trajectory tile centers from shooter to aim point, aim point last, the
/// shooter's own tile excluded. Priced in missile mode so only terrain
/// blocks; `None` when walls make the aim point unreachable.
fn plot(ctx: &mut StateCtx<'_, '_>, from: Position, target: Position) -> Option<Vec<Position>> {
    if from == target {
        return None;
    }
    let profile = MoveProfile::missile();
    let route = match path::find_path(ctx.search, ctx.state, ctx.env, &profile, from, target, None)
    {
        PathResult::Route(route) => route,
        PathResult::NoPath => return None,
    };
    let mut tiles = Vec::with_capacity(route.steps.len());
    let mut at = from;
    for step in &route.steps {
        at = at + step.delta();
        tiles.push(at);
    }
    Some(tiles)
}
