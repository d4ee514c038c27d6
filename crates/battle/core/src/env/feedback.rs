use crate::action::ActionError;
use crate::state::{Direction, Position, UnitId};

/// Visual/audio intent sink.
///
/// Action states announce what is happening so a presentation layer can
/// animate it, but logical completion never waits for playback: every hook
/// must return immediately. The default bodies make implementors opt in to
/// only the events they care about.
pub trait FeedbackSink {
    fn unit_steps(&mut self, _unit: UnitId, _from: Position, _to: Position) {}
    fn unit_turns(&mut self, _unit: UnitId, _facing: Direction) {}
    fn unit_falls(&mut self, _unit: UnitId, _from: Position, _to: Position) {}
    fn unit_panics(&mut self, _unit: UnitId, _berserk: bool) {}
    fn shot_fired(&mut self, _unit: UnitId, _from: Position, _toward: Position) {}
    fn projectile_hits(&mut self, _position: Position) {}
    fn explosion(&mut self, _center: Position, _power: u16) {}
    fn psi_attack(&mut self, _attacker: UnitId, _target: UnitId, _success: bool) {}
    /// An action aborted before taking effect (no TU, no path, no ammo).
    fn action_failed(&mut self, _unit: UnitId, _error: &ActionError) {}
}

/// Sink that drops every notification; the default for headless runs and
/// tests that do not inspect feedback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {}
