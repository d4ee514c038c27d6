//! Facing changes, one 45° step per tick.

use crate::action::states::{Advance, StateCtx, active_unit, active_unit_mut};
use crate::action::{ActionError, BattleAction};
use crate::state::Direction;

pub struct TurnState {
    action: BattleAction,
    goal: Option<Direction>,
    cancelled: bool,
}

impl TurnState {
    pub fn new(action: BattleAction) -> Self {
        Self {
            action,
            goal: None,
            cancelled: false,
        }
    }

    pub(super) fn init(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        let Some(unit) = active_unit(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        let Some(goal) = Direction::toward(unit.position, self.action.target) else {
            // Target on the actor's own tile; nothing to face.
            return Advance::Complete;
        };
        if unit.facing == goal {
            return Advance::Complete;
        }
        self.goal = Some(goal);
        Advance::Continue
    }

    pub(super) fn think(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        if self.cancelled {
            return Advance::Complete;
        }
        let Some(goal) = self.goal else {
            return Advance::Complete;
        };
        let Some(unit) = active_unit(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        if unit.facing == goal {
            return Advance::Complete;
        }
        let cost = ctx.config.turn_tu_cost;
        if unit.time_units < cost {
            let error = ActionError::InsufficientTimeUnits {
                needed: cost,
                available: unit.time_units,
            };
            self.action.outcome.aborted = Some(error);
            ctx.feedback.action_failed(self.action.actor, &error);
            return Advance::Complete;
        }
        let Some(unit) = active_unit_mut(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        unit.spend_time_units(cost);
        unit.facing = unit.facing.rotate_toward(goal);
        let facing = unit.facing;
        ctx.feedback.unit_turns(self.action.actor, facing);
        if facing == goal {
            Advance::Complete
        } else {
            Advance::Continue
        }
    }

    pub(super) fn cancel(&mut self) {
        self.cancelled = true;
    }
}
