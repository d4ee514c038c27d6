//! Runtime orchestration for the deterministic battle simulation.
//!
//! This crate wires an input source, the terrain and dice oracles, and a
//! feedback sink around the pure `battle-core` engine. Consumers embed
//! [`BattleDriver`] to advance ticks, queue actions while the engine is
//! idle, and hand control between sides.
//!
//! Modules are organized by responsibility:
//! - [`driver`] hosts the tick loop and owns the battle
//! - [`providers`] sources actions from players, scripts, or AI policies
//! - [`telemetry`] sets up tracing output
pub mod driver;
pub mod providers;
pub mod telemetry;

mod error;

pub use driver::BattleDriver;
pub use error::{Result, RuntimeError};
pub use providers::{ActionProvider, IdleProvider, QueuedProvider};
