//! Movement execution.
//!
//! `init` plans a route within the actor's TU budget; each `think`
//! executes exactly one tile step after re-pricing it against the live
//! battle state, so a door slammed or a tile occupied since planning is
//! caught before the unit moves. One mid-route re-plan is attempted before
//! giving up.

use crate::action::states::{Advance, FallState, StateCtx, active_unit, active_unit_mut};
use crate::action::{ActionError, ActionState, BattleAction};
use crate::path::{self, MoveProfile, PathResult, Route};
use crate::state::Position;

pub struct WalkState {
    action: BattleAction,
    route: Option<Route>,
    step: usize,
    cancelled: bool,
    replanned: bool,
}

impl WalkState {
    pub fn new(action: BattleAction) -> Self {
        Self {
            action,
            route: None,
            step: 0,
            cancelled: false,
            replanned: false,
        }
    }

    pub(super) fn init(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        let Some(unit) = active_unit(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        let profile = MoveProfile::for_unit(unit);
        let budget = u32::from(unit.time_units);
        let from = unit.position;
        match path::find_path(
            ctx.search,
            ctx.state,
            ctx.env,
            &profile,
            from,
            self.action.target,
            Some(budget),
        ) {
            PathResult::Route(route) if route.is_empty() => Advance::Complete,
            PathResult::Route(route) => {
                self.route = Some(route);
                self.step = 0;
                Advance::Continue
            }
            PathResult::NoPath => {
                self.abort(ctx, ActionError::NoPath);
                Advance::Complete
            }
        }
    }

    pub(super) fn think(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        if self.cancelled {
            // Each step commits whole tiles, so acknowledging here always
            // leaves the actor on a tile boundary.
            return Advance::Complete;
        }
        let Some(unit) = active_unit(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        let Some(direction) = self
            .route
            .as_ref()
            .and_then(|r| r.steps.get(self.step))
            .copied()
        else {
            return Advance::Complete;
        };

        let profile = MoveProfile::for_unit(unit);
        let from = unit.position;
        let flying = unit.is_flying();
        let (tu_available, energy_available) = (unit.time_units, unit.energy);

        let Some(cost) = path::step_cost(ctx.state, ctx.env, from, direction, &profile) else {
            return self.replan(ctx, from);
        };

        let tu = cost as u16;
        let energy = tu / 2;
        if tu_available < tu {
            self.abort(
                ctx,
                ActionError::InsufficientTimeUnits {
                    needed: tu,
                    available: tu_available,
                },
            );
            return Advance::Complete;
        }
        if energy_available < energy {
            self.abort(
                ctx,
                ActionError::InsufficientEnergy {
                    needed: energy,
                    available: energy_available,
                },
            );
            return Advance::Complete;
        }

        let to = from + direction.delta();
        let Some(unit) = active_unit_mut(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        unit.spend_time_units(tu);
        unit.spend_energy(energy);
        if !direction.is_vertical() {
            unit.facing = direction;
        }
        unit.position = to;
        ctx.feedback.unit_steps(self.action.actor, from, to);
        self.step += 1;

        // Stepping over a ledge: walkers drop into a fall instead of
        // standing on air.
        let unsupported = ctx
            .env
            .map()
            .tile(to)
            .is_some_and(|tile| !tile.has_floor());
        if unsupported && !flying {
            return Advance::Push(Box::new(ActionState::Fall(FallState::for_unit(
                self.action.actor,
            ))));
        }

        let finished = self
            .route
            .as_ref()
            .is_none_or(|route| self.step >= route.steps.len());
        if finished {
            Advance::Complete
        } else {
            Advance::Continue
        }
    }

    /// One re-plan from the current tile; a second blockage aborts.
    fn replan(&mut self, ctx: &mut StateCtx<'_, '_>, from: Position) -> Advance {
        if self.replanned {
            self.abort(ctx, ActionError::NoPath);
            return Advance::Complete;
        }
        self.replanned = true;
        let Some(unit) = active_unit(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        let profile = MoveProfile::for_unit(unit);
        let budget = u32::from(unit.time_units);
        match path::find_path(
            ctx.search,
            ctx.state,
            ctx.env,
            &profile,
            from,
            self.action.target,
            Some(budget),
        ) {
            PathResult::Route(route) if !route.is_empty() => {
                self.route = Some(route);
                self.step = 0;
                Advance::Continue
            }
            _ => {
                self.abort(ctx, ActionError::NoPath);
                Advance::Complete
            }
        }
    }

    fn abort(&mut self, ctx: &mut StateCtx<'_, '_>, error: ActionError) {
        self.action.outcome.aborted = Some(error);
        ctx.feedback.action_failed(self.action.actor, &error);
    }

    pub(super) fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub(super) fn deinit(&mut self) {
        // The route is the only transient resource; dropping it here keeps
        // deinit safe even after a partially failed init.
        self.route = None;
    }
}
