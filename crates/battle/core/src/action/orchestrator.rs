//! The action stack.
//!
//! Owns the in-flight [`ActionState`]s, top of the stack active. The stack
//! drives lifecycles and nothing else: every grid or unit mutation happens
//! inside the states. A push defers `init` to the next tick, matching the
//! deferred-start contract states rely on; popping re-arms the state below
//! so it re-inits before its next `think`, which lets a resumed walk
//! re-plan around whatever the interruption changed.

use crate::action::states::{ActionState, Advance, PanicState, StateCtx};
use crate::action::{ActionError, BattleAction};
use crate::state::{Side, UnitId, UnitStatus};

const ROLL_MORALE: u32 = 0x51;

/// Morale at or above this never breaks.
const MORALE_SAFE: u16 = 50;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Pushed or resumed; `init` runs on the next tick.
    Pending,
    /// `init` has run; `think` runs each tick.
    Active,
}

struct Entry {
    state: ActionState,
    phase: Phase,
}

#[derive(Default)]
pub struct ActionStack {
    stack: Vec<Entry>,
}

impl ActionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while any action is in flight. An idle stack accepts input.
    pub fn is_busy(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Name of the action currently on top, for logging.
    pub fn current(&self) -> Option<&'static str> {
        self.stack.last().map(|entry| entry.state.name())
    }

    /// Queues a requested action. It starts on the next tick.
    pub fn push_action(&mut self, action: BattleAction) {
        self.push_state(ActionState::for_action(action));
    }

    /// Queues an engine-spawned state (panic, fall sweep).
    pub fn push_state(&mut self, state: ActionState) {
        self.stack.push(Entry {
            state,
            phase: Phase::Pending,
        });
    }

    /// Asks the top state to wind down. Committed behavior refuses.
    pub fn cancel_current(&mut self) -> Result<(), ActionError> {
        let Some(entry) = self.stack.last_mut() else {
            return Ok(());
        };
        if !entry.state.interruptible() {
            return Err(ActionError::NotCancellable);
        }
        entry.state.cancel();
        Ok(())
    }

    /// Advances the top state by one lifecycle call, then drains any chain
    /// of synchronously resolving states, bounded so a misbehaving state
    /// cannot spin the loop forever. Returns whether work remains.
    pub fn tick(&mut self, ctx: &mut StateCtx<'_, '_>) -> bool {
        for _ in 0..ctx.config.max_drain_per_tick {
            let Some(top) = self.stack.last_mut() else {
                return false;
            };
            let advance = match top.phase {
                Phase::Pending => {
                    top.phase = Phase::Active;
                    top.state.init(ctx)
                }
                Phase::Active => top.state.think(ctx),
            };
            match advance {
                Advance::Continue => return true,
                Advance::Complete => self.pop(),
                Advance::Push(next) => self.push_state(*next),
            }
        }
        !self.stack.is_empty()
    }

    /// Turn-boundary reconciliation: refresh the roster, flip the side to
    /// play, and spawn a panic fit for every unit whose nerve fails.
    pub fn end_turn(&mut self, ctx: &mut StateCtx<'_, '_>) {
        debug_assert!(!self.is_busy(), "end_turn during an in-flight action");
        ctx.state.end_turn();

        let candidates: Vec<(UnitId, u16)> = ctx
            .state
            .units
            .iter()
            .filter(|u| u.is_active() && u.status == UnitStatus::Standing)
            .filter(|u| u.side != Side::Neutral && u.morale < MORALE_SAFE)
            .map(|u| (u.id, u.morale))
            .collect();
        for (unit, morale) in candidates {
            let roll = ctx.state.roll_range(ctx.env.rng(), unit, ROLL_MORALE, 1, 100);
            if roll as u16 > morale {
                self.push_state(ActionState::Panic(PanicState::new(unit)));
            }
        }
    }

    /// Pops the finished top state, running its `deinit`, and re-arms the
    /// state underneath for a fresh `init`.
    fn pop(&mut self) {
        if let Some(mut entry) = self.stack.pop() {
            entry.state.deinit();
        }
        if let Some(below) = self.stack.last_mut() {
            below.phase = Phase::Pending;
        }
    }
}
