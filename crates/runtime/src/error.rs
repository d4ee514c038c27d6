use battle_core::ActionError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors surfaced at the driver boundary. Everything inside the engine
/// resolves by completing the offending action; only misuse of the driver
/// API itself propagates here.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("an action is in progress ({current})")]
    Busy { current: &'static str },

    #[error("unit {unit} does not belong to the side to play")]
    NotYourTurn { unit: battle_core::UnitId },

    #[error(transparent)]
    Action(#[from] ActionError),
}
