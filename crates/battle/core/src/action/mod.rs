//! Action domain: requested actions, their state machines, and the stack
//! orchestrator that drives them.
//!
//! A [`BattleAction`] is a value describing what a player or AI asked for.
//! The orchestrator materializes it into an [`ActionState`] variant and
//! drives that state's `{init, think, cancel, deinit}` lifecycle one tick
//! at a time. States mutate the battle only through
//! [`BattleState`](crate::state::BattleState); the orchestrator itself
//! never touches grid or unit data.

pub mod orchestrator;
pub mod states;

pub use orchestrator::ActionStack;
pub use states::{ActionState, StateCtx};

use crate::state::{Position, UnitId};

/// Action kinds an input source may request. Engine-internal states
/// (falling, panic, explosions) are spawned by the engine itself and have
/// no requestable kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    Move,
    Turn,
    SnapShot,
    Throw,
    PsiAttack,
}

/// One requested or in-flight action.
///
/// Passed by value into the acting state, which may mutate its private
/// copy (spending reserved TU, accumulating the outcome) but reaches
/// shared unit/tile data only through the battle state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleAction {
    pub actor: UnitId,
    pub kind: ActionKind,
    pub target: Position,
    pub target_unit: Option<UnitId>,
    /// TU set aside for this action; 0 means "use the configured cost."
    pub reserved_tu: u16,
    pub outcome: ActionOutcome,
}

impl BattleAction {
    pub fn new(actor: UnitId, kind: ActionKind, target: Position) -> Self {
        Self {
            actor,
            kind,
            target,
            target_unit: None,
            reserved_tu: 0,
            outcome: ActionOutcome::default(),
        }
    }

    pub fn with_target_unit(mut self, target: UnitId) -> Self {
        self.target_unit = Some(target);
        self
    }

    pub fn with_reserved_tu(mut self, tu: u16) -> Self {
        self.reserved_tu = tu;
        self
    }
}

/// What an action amounted to, accumulated by its state as it runs.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    /// Set when the action resolved without effect.
    pub aborted: Option<ActionError>,
    /// Unit struck by a shot or throw.
    pub hit: Option<UnitId>,
}

/// Reasons an action resolves without effect. These are recovered
/// conditions: the owning state completes normally and the reason is
/// surfaced through the feedback sink, never propagated as a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("needs {needed} TU, only {available} left")]
    InsufficientTimeUnits { needed: u16, available: u16 },

    #[error("needs {needed} energy, only {available} left")]
    InsufficientEnergy { needed: u16, available: u16 },

    #[error("weapon is empty")]
    NoAmmo,

    #[error("actor {0} is gone")]
    ActorMissing(UnitId),

    #[error("target {0} is gone")]
    TargetMissing(UnitId),

    #[error("no route to the destination")]
    NoPath,

    #[error("no line of fire to the target")]
    NoLineOfFire,

    #[error("actor has no psionic training")]
    PsiUnavailable,

    #[error("the action in progress cannot be interrupted")]
    NotCancellable,
}
