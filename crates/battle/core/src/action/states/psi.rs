//! Psionic attacks.
//!
//! Resolution is instantaneous: the duel is rolled during `init` and the
//! target's state updated on the spot. The state then idles a couple of
//! ticks so the feedback sink's animation window matches other actions
//! before reporting completion.

use crate::action::states::{Advance, StateCtx, active_unit};
use crate::action::{ActionError, BattleAction};
use crate::state::UnitStatus;

const ROLL_DUEL: u32 = 0x41;

/// Ticks between resolution and completion.
const LINGER_TICKS: u32 = 2;

pub struct PsiAttackState {
    action: BattleAction,
    linger: u32,
}

impl PsiAttackState {
    pub fn new(action: BattleAction) -> Self {
        Self {
            action,
            linger: LINGER_TICKS,
        }
    }

    pub(super) fn init(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        let Some(attacker) = active_unit(ctx.state, self.action.actor) else {
            return Advance::Complete;
        };
        let Some(target_id) = self.action.target_unit else {
            return Advance::Complete;
        };
        if attacker.psi_skill == 0 {
            self.abort(ctx, ActionError::PsiUnavailable);
            return Advance::Complete;
        }
        let tu = ctx.config.psi_tu_cost;
        if attacker.time_units < tu {
            self.abort(
                ctx,
                ActionError::InsufficientTimeUnits {
                    needed: tu,
                    available: attacker.time_units,
                },
            );
            return Advance::Complete;
        }
        let (strength, skill, from) = (
            attacker.psi_strength,
            attacker.psi_skill,
            attacker.position,
        );
        let Some(target) = active_unit(ctx.state, target_id) else {
            self.abort(ctx, ActionError::TargetMissing(target_id));
            return Advance::Complete;
        };
        let distance = from.lateral_distance(target.position) as u32;
        let defense = u32::from(target.psi_strength) + distance * 2;

        if let Some(attacker) = ctx.state.units.unit_mut(self.action.actor) {
            attacker.spend_time_units(tu);
        }
        let attack = u32::from(strength) * u32::from(skill) / 50
            + ctx
                .state
                .roll_range(ctx.env.rng(), self.action.actor, ROLL_DUEL, 0, 55);
        let success = attack > defense;
        if success {
            if let Some(target) = ctx.state.units.unit_mut(target_id) {
                target.status = UnitStatus::Panicking;
                target.time_units = 0;
                target.change_morale(-30);
            }
            self.action.outcome.hit = Some(target_id);
        }
        ctx.feedback
            .psi_attack(self.action.actor, target_id, success);
        Advance::Continue
    }

    pub(super) fn think(&mut self, _ctx: &mut StateCtx<'_, '_>) -> Advance {
        if self.linger == 0 {
            return Advance::Complete;
        }
        self.linger -= 1;
        if self.linger == 0 {
            Advance::Complete
        } else {
            Advance::Continue
        }
    }

    fn abort(&mut self, ctx: &mut StateCtx<'_, '_>, error: ActionError) {
        self.action.outcome.aborted = Some(error);
        ctx.feedback.action_failed(self.action.actor, &error);
    }
}
