//! Action state machines, one variant per action kind.
//!
//! Dispatch is a pattern match over a closed enum rather than virtual
//! calls: the kind set is fixed, and the match keeps every lifecycle hook
//! in one place. Each variant lives in its own module and owns only the
//! fields it needs.

mod explode;
mod fall;
mod fire;
mod panic;
mod psi;
mod turn;
mod walk;

pub use explode::ExplodeState;
pub use fall::FallState;
pub use fire::{FireState, ThrowState};
pub use panic::PanicState;
pub use psi::PsiAttackState;
pub use turn::TurnState;
pub use walk::WalkState;

use crate::action::{ActionKind, BattleAction};
use crate::config::BattleConfig;
use crate::env::{BattleEnv, FeedbackSink};
use crate::path::SearchContext;
use crate::state::{BattleState, UnitId, UnitState};

/// Everything a state may touch during one lifecycle call. Assembled by
/// the driver each tick; holding it across ticks is impossible by
/// construction.
pub struct StateCtx<'a, 'b> {
    pub state: &'a mut BattleState,
    pub env: &'a BattleEnv<'b>,
    pub search: &'a mut SearchContext,
    pub feedback: &'a mut dyn FeedbackSink,
    pub config: &'a BattleConfig,
}

/// What a lifecycle call asks of the orchestrator.
pub enum Advance {
    /// Stay active; call `think` again next tick.
    Continue,
    /// Done (normally or by abort); pop this state.
    Complete,
    /// Suspend this state and activate the pushed one. The current state
    /// resumes (with a fresh `init`) once the pushed state completes.
    Push(Box<ActionState>),
}

/// The closed set of action state machines.
pub enum ActionState {
    Walk(WalkState),
    Turn(TurnState),
    Fire(FireState),
    Throw(ThrowState),
    Psi(PsiAttackState),
    Panic(PanicState),
    Fall(FallState),
    Explode(ExplodeState),
    #[cfg(test)]
    Probe(probe::ProbeState),
}

impl ActionState {
    /// Materializes a requested action into its state machine.
    pub fn for_action(action: BattleAction) -> Self {
        match action.kind {
            ActionKind::Move => ActionState::Walk(WalkState::new(action)),
            ActionKind::Turn => ActionState::Turn(TurnState::new(action)),
            ActionKind::SnapShot => ActionState::Fire(FireState::new(action)),
            ActionKind::Throw => ActionState::Throw(ThrowState::new(action)),
            ActionKind::PsiAttack => ActionState::Psi(PsiAttackState::new(action)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionState::Walk(_) => "walk",
            ActionState::Turn(_) => "turn",
            ActionState::Fire(_) => "fire",
            ActionState::Throw(_) => "throw",
            ActionState::Psi(_) => "psi_attack",
            ActionState::Panic(_) => "panic",
            ActionState::Fall(_) => "fall",
            ActionState::Explode(_) => "explode",
            #[cfg(test)]
            ActionState::Probe(_) => "probe",
        }
    }

    /// Whether a cancel request can reach this state at all. Committed
    /// behavior (panic, a fired shot, a fall) ignores cancellation.
    pub fn interruptible(&self) -> bool {
        match self {
            ActionState::Walk(_) | ActionState::Turn(_) => true,
            #[cfg(test)]
            ActionState::Probe(_) => true,
            _ => false,
        }
    }

    pub(crate) fn init(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        match self {
            ActionState::Walk(s) => s.init(ctx),
            ActionState::Turn(s) => s.init(ctx),
            ActionState::Fire(s) => s.init(ctx),
            ActionState::Throw(s) => s.init(ctx),
            ActionState::Psi(s) => s.init(ctx),
            ActionState::Panic(s) => s.init(ctx),
            ActionState::Fall(s) => s.init(ctx),
            ActionState::Explode(s) => s.init(ctx),
            #[cfg(test)]
            ActionState::Probe(s) => s.init(),
        }
    }

    pub(crate) fn think(&mut self, ctx: &mut StateCtx<'_, '_>) -> Advance {
        match self {
            ActionState::Walk(s) => s.think(ctx),
            ActionState::Turn(s) => s.think(ctx),
            ActionState::Fire(s) => s.think(ctx),
            ActionState::Throw(s) => s.think(ctx),
            ActionState::Psi(s) => s.think(ctx),
            ActionState::Panic(s) => s.think(ctx),
            ActionState::Fall(s) => s.think(ctx),
            ActionState::Explode(s) => s.think(ctx),
            #[cfg(test)]
            ActionState::Probe(s) => s.think(),
        }
    }

    /// Requests cancellation. States acknowledge by completing on a later
    /// (or the same) tick; nothing is force-terminated.
    pub(crate) fn cancel(&mut self) {
        match self {
            ActionState::Walk(s) => s.cancel(),
            ActionState::Turn(s) => s.cancel(),
            // Uninterruptible kinds swallow the request.
            ActionState::Fire(_)
            | ActionState::Throw(_)
            | ActionState::Psi(_)
            | ActionState::Panic(_)
            | ActionState::Fall(_)
            | ActionState::Explode(_) => {}
            #[cfg(test)]
            ActionState::Probe(s) => s.cancel(),
        }
    }

    /// Releases transient resources. Runs exactly once, when the
    /// orchestrator pops the state, and must be safe after a partial
    /// `init`.
    pub(crate) fn deinit(&mut self) {
        match self {
            ActionState::Walk(s) => s.deinit(),
            ActionState::Fire(s) => s.deinit(),
            ActionState::Throw(s) => s.deinit(),
            ActionState::Turn(_)
            | ActionState::Psi(_)
            | ActionState::Panic(_)
            | ActionState::Fall(_)
            | ActionState::Explode(_) => {}
            #[cfg(test)]
            ActionState::Probe(s) => s.deinit(),
        }
    }
}

/// The acting unit, if it is still in the battle. Stale handles (actor
/// died or was removed out-of-band) read as `None`, which states treat as
/// normal completion.
pub(crate) fn active_unit(state: &BattleState, id: UnitId) -> Option<&UnitState> {
    state.units.unit(id).filter(|u| u.is_active())
}

pub(crate) fn active_unit_mut(state: &mut BattleState, id: UnitId) -> Option<&mut UnitState> {
    state.units.unit_mut(id).filter(|u| u.is_active())
}
