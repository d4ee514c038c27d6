//! Deterministic battle logic: the action engine and A* pathfinder.
//!
//! `battle-core` defines the canonical combat rules. Everything here is
//! pure with respect to its inputs: terrain comes in through
//! [`env::MapOracle`], dice through [`env::RngOracle`], and presentation
//! goes out through [`env::FeedbackSink`]. All state mutation flows through
//! the action states driven by [`action::ActionStack`]; supporting crates
//! depend on the types re-exported here.
pub mod action;
pub mod config;
pub mod env;
pub mod path;
pub mod state;

pub use action::{
    ActionError, ActionKind, ActionOutcome, ActionStack, ActionState, BattleAction, StateCtx,
};
pub use config::BattleConfig;
pub use env::{
    BattleEnv, FeedbackSink, GridMap, MapDimensions, MapOracle, NullFeedback, PcgRng, RngOracle,
    StaticTile, VerticalFeature, WallBits, compute_seed,
};
pub use path::{MoveProfile, PathResult, Route, SearchContext, find_path, find_reachable, step_cost};
pub use state::{
    BattleState, Direction, MoveFlags, Position, Side, UnitId, UnitState, UnitStatus, UnitsState,
};
