//! Grid step-cost model.
//!
//! Pure queries against the map oracle and unit roster: given a source
//! tile, a candidate direction, and a mover profile, yield the TU cost of
//! the step or `None` for an impassable one. Both the pathfinder and the
//! walk state consult this, so a route that was affordable when planned is
//! re-priced identically when executed.

use crate::env::{BattleEnv, StaticTile, WallBits};
use crate::state::{BattleState, Direction, MoveFlags, Position, UnitId, UnitState};

/// Extra TU charged when climbing a level; descending is flat.
const CLIMB_SURCHARGE: u32 = 2;

/// Standard floor cost; sliders never pay more than this laterally.
const SMOOTH_FLOOR_COST: u32 = StaticTile::FLY_COST as u32;

/// Capabilities of the mover for one query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveProfile {
    pub flags: MoveFlags,
    /// Line-of-fire trajectory mode. Unit blocking is bypassed and floors
    /// are irrelevant; terrain walls still stop the query.
    pub missile: bool,
    /// The moving unit itself, exempted from occupancy blocking.
    pub actor: Option<UnitId>,
}

impl MoveProfile {
    pub fn walker() -> Self {
        Self {
            flags: MoveFlags::empty(),
            missile: false,
            actor: None,
        }
    }

    pub fn flyer() -> Self {
        Self {
            flags: MoveFlags::FLYING,
            missile: false,
            actor: None,
        }
    }

    /// Trajectory-test profile for line-of-fire checks.
    pub fn missile() -> Self {
        Self {
            flags: MoveFlags::FLYING,
            missile: true,
            actor: None,
        }
    }

    pub fn for_unit(unit: &UnitState) -> Self {
        Self {
            flags: unit.flags,
            missile: false,
            actor: Some(unit.id),
        }
    }

    pub fn with_actor(mut self, actor: UnitId) -> Self {
        self.actor = Some(actor);
        self
    }

    fn is_flying(&self) -> bool {
        self.flags.contains(MoveFlags::FLYING)
    }
}

/// TU cost of stepping from `from` in `direction`, or `None` if the step
/// is impassable for this profile. Never returns 0.
pub fn step_cost(
    state: &BattleState,
    env: &BattleEnv<'_>,
    from: Position,
    direction: Direction,
    profile: &MoveProfile,
) -> Option<u32> {
    let to = from + direction.delta();
    debug_assert_ne!(to, from, "direction must move off the start tile");

    let from_tile = env.map().tile(from)?;
    let to_tile = env.map().tile(to)?;

    if direction.is_vertical() {
        return vertical_cost(state, from_tile, to_tile, to, direction, profile);
    }

    if let Some((flank_a, flank_b)) = direction.flanks() {
        // Corner rule: a diagonal is off the table when either flanking
        // orthogonal cell is unreachable, even if the diagonal tile itself
        // is fine. Without this, units cut through wall corners.
        if flank_blocked(state, env, from, flank_a, profile)
            || flank_blocked(state, env, from, flank_b, profile)
        {
            return None;
        }
        if wall_blocks(from_tile, to_tile, flank_a) || wall_blocks(from_tile, to_tile, flank_b) {
            return None;
        }
    } else if wall_blocks(from_tile, to_tile, direction) {
        return None;
    }

    if !profile.missile {
        if !profile.is_flying() && !to_tile.has_floor() {
            return None;
        }
        if occupied_by_other(state, to, profile) {
            return None;
        }
    }

    let base = entry_cost(to_tile, profile);
    let cost = if direction.is_diagonal() {
        base + base / 2
    } else {
        base
    };
    Some(cost.max(1))
}

/// Base TU to enter a tile, before diagonal and climb adjustments.
fn entry_cost(tile: StaticTile, profile: &MoveProfile) -> u32 {
    if profile.missile || (profile.is_flying() && !tile.has_floor()) {
        return u32::from(StaticTile::FLY_COST);
    }
    let floor = u32::from(tile.floor_cost());
    if profile.flags.contains(MoveFlags::SLIDING) {
        floor.min(SMOOTH_FLOOR_COST)
    } else {
        floor
    }
}

fn vertical_cost(
    state: &BattleState,
    from_tile: StaticTile,
    to_tile: StaticTile,
    to: Position,
    direction: Direction,
    profile: &MoveProfile,
) -> Option<u32> {
    // Vertical steps need an explicit passage: stairs or a gravlift on the
    // lower of the two tiles, or flight. Free-fall descent is the Fall
    // state's job, never a route choice.
    let passage = match direction {
        Direction::Up => from_tile.climbable(),
        Direction::Down => to_tile.climbable(),
        _ => unreachable!(),
    };
    if !profile.missile && !profile.is_flying() && !passage {
        return None;
    }

    if !profile.missile {
        if !profile.is_flying() && !to_tile.has_floor() {
            return None;
        }
        if occupied_by_other(state, to, profile) {
            return None;
        }
    }

    let base = entry_cost(to_tile, profile);
    let cost = match direction {
        Direction::Up => base + CLIMB_SURCHARGE,
        _ => base,
    };
    Some(cost.max(1))
}

/// Whether the lateral wall segments between two adjacent tiles block the
/// orthogonal step `direction`.
fn wall_blocks(from_tile: StaticTile, to_tile: StaticTile, direction: Direction) -> bool {
    from_tile.walls().contains(wall_bit(direction))
        || to_tile.walls().contains(wall_bit(direction.reverse()))
}

/// A flanking orthogonal cell counts as blocked when its tile is missing,
/// a wall seals the step into it, or a unit stands on it. Missile paths
/// ignore the unit part but not the terrain part.
fn flank_blocked(
    state: &BattleState,
    env: &BattleEnv<'_>,
    from: Position,
    flank_dir: Direction,
    profile: &MoveProfile,
) -> bool {
    let flank = from + flank_dir.delta();
    let (Some(from_tile), Some(flank_tile)) = (env.map().tile(from), env.map().tile(flank)) else {
        return true;
    };
    if wall_blocks(from_tile, flank_tile, flank_dir) {
        return true;
    }
    !profile.missile && occupied_by_other(state, flank, profile)
}

fn occupied_by_other(state: &BattleState, position: Position, profile: &MoveProfile) -> bool {
    state
        .units
        .unit_at(position)
        .is_some_and(|u| Some(u.id) != profile.actor)
}

fn wall_bit(direction: Direction) -> WallBits {
    match direction {
        Direction::North => WallBits::NORTH,
        Direction::East => WallBits::EAST,
        Direction::South => WallBits::SOUTH,
        Direction::West => WallBits::WEST,
        _ => WallBits::empty(),
    }
}
