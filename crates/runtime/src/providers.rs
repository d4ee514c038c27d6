//! Abstraction for sourcing unit intent.
//!
//! Driver users plug in an [`ActionProvider`] so the simulation can run
//! with human input, scripted fixtures, or AI policies. The driver polls
//! the provider only while the action stack is idle, so a provider never
//! races an in-flight action.

use std::collections::VecDeque;

use battle_core::{BattleAction, BattleState};

/// Source of the next action for the side currently playing.
pub trait ActionProvider {
    /// The next action to run, or `None` to stay idle this tick.
    fn next_action(&mut self, state: &BattleState) -> Option<BattleAction>;
}

/// Provider that never acts. The fallback when input is wired up later.
#[derive(Default)]
pub struct IdleProvider;

impl ActionProvider for IdleProvider {
    fn next_action(&mut self, _state: &BattleState) -> Option<BattleAction> {
        None
    }
}

/// FIFO queue of scripted actions, drained one per idle tick. Doubles as
/// the player-input buffer: a UI pushes what the player clicked and the
/// driver picks it up when the engine is ready.
#[derive(Default)]
pub struct QueuedProvider {
    queue: VecDeque<BattleAction>,
}

impl QueuedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, action: BattleAction) {
        self.queue.push_back(action);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl ActionProvider for QueuedProvider {
    fn next_action(&mut self, _state: &BattleState) -> Option<BattleAction> {
        self.queue.pop_front()
    }
}
