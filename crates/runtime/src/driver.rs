//! The tick loop around the battle engine.

use battle_core::{
    ActionStack, BattleAction, BattleConfig, BattleEnv, BattleState, FeedbackSink, MapOracle,
    NullFeedback, RngOracle, SearchContext, StateCtx,
};

use crate::error::{Result, RuntimeError};
use crate::providers::{ActionProvider, IdleProvider};

/// Owns one battle end to end: the mutable state, the action stack, the
/// search scratch space, and the oracles everything reads through.
///
/// The driver is single-threaded on purpose. One `tick()` call advances
/// the simulation exactly one step, so embedders control pacing: a UI
/// ticks from its frame loop, a headless test ticks in a tight loop.
pub struct BattleDriver {
    map: Box<dyn MapOracle>,
    rng: Box<dyn RngOracle>,
    feedback: Box<dyn FeedbackSink>,
    provider: Box<dyn ActionProvider>,
    state: BattleState,
    stack: ActionStack,
    search: SearchContext,
    config: BattleConfig,
}

impl BattleDriver {
    pub fn new(map: Box<dyn MapOracle>, rng: Box<dyn RngOracle>, seed: u64) -> Self {
        let search = SearchContext::universal(map.dimensions());
        Self {
            map,
            rng,
            feedback: Box::new(NullFeedback),
            provider: Box::new(IdleProvider),
            state: BattleState::new(seed),
            stack: ActionStack::new(),
            search,
            config: BattleConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    pub fn with_feedback(mut self, feedback: impl FeedbackSink + 'static) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BattleState {
        &mut self.state
    }

    pub fn is_busy(&self) -> bool {
        self.stack.is_busy()
    }

    /// Name of the action currently executing, for display and logs.
    pub fn current_action(&self) -> Option<&'static str> {
        self.stack.current()
    }

    /// Queues an action directly, bypassing the provider. Refused while
    /// another action is in flight or when the actor is out of turn.
    pub fn request(&mut self, action: BattleAction) -> Result<()> {
        if self.stack.is_busy() {
            return Err(RuntimeError::Busy {
                current: self.stack.current().unwrap_or("unknown"),
            });
        }
        self.check_turn(&action)?;
        tracing::debug!(actor = %action.actor, kind = ?action.kind, "action queued");
        self.stack.push_action(action);
        Ok(())
    }

    /// Advances the simulation one tick. While idle, polls the provider
    /// for the next action first. Returns whether work remains.
    pub fn tick(&mut self) -> bool {
        self.state.tick += 1;
        let span = tracing::debug_span!("battle_tick", tick = self.state.tick).entered();

        if !self.stack.is_busy() {
            if let Some(action) = self.provider.next_action(&self.state) {
                match self.check_turn(&action) {
                    Ok(()) => {
                        tracing::debug!(actor = %action.actor, kind = ?action.kind, "action queued");
                        self.stack.push_action(action);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "provider action dropped");
                    }
                }
            }
        }

        let env = BattleEnv::new(self.map.as_ref(), self.rng.as_ref());
        let mut ctx = StateCtx {
            state: &mut self.state,
            env: &env,
            search: &mut self.search,
            feedback: self.feedback.as_mut(),
            config: &self.config,
        };
        let busy = self.stack.tick(&mut ctx);
        if let Some(current) = self.stack.current() {
            tracing::trace!(action = current, "in flight");
        }
        drop(span);
        busy
    }

    /// Asks the in-flight action to wind down at the next safe point.
    pub fn cancel(&mut self) -> Result<()> {
        self.stack.cancel_current()?;
        Ok(())
    }

    /// Closes the current side's turn: refreshes the roster, flips the
    /// side to play, and runs morale checks. Refused mid-action.
    pub fn end_turn(&mut self) -> Result<()> {
        if self.stack.is_busy() {
            return Err(RuntimeError::Busy {
                current: self.stack.current().unwrap_or("unknown"),
            });
        }
        let env = BattleEnv::new(self.map.as_ref(), self.rng.as_ref());
        let mut ctx = StateCtx {
            state: &mut self.state,
            env: &env,
            search: &mut self.search,
            feedback: self.feedback.as_mut(),
            config: &self.config,
        };
        self.stack.end_turn(&mut ctx);
        tracing::info!(side = ?self.state.side_to_play, "turn ended");
        Ok(())
    }

    fn check_turn(&self, action: &BattleAction) -> Result<()> {
        let Some(unit) = self.state.units.unit(action.actor) else {
            // Stale requests hit the normal completion path inside the
            // engine; the stack resolves them without effect.
            return Ok(());
        };
        if unit.side != self.state.side_to_play {
            return Err(RuntimeError::NotYourTurn { unit: action.actor });
        }
        Ok(())
    }
}
