//! Cost-optimal route computation over the battle grid.
//!
//! A best-first search (A* with an admissible octile estimate) over the
//! [`cost`] model. The caller owns a [`SearchContext`] (node arena plus
//! frontier) that is reset, not reallocated, between queries; nested
//! what-if queries simply use a second context instead of sharing mutable
//! search state.

mod cost;
mod node;
mod open_set;

pub use cost::{MoveProfile, step_cost};

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::env::{BattleEnv, MapDimensions};
use crate::state::{BattleState, Direction, Position};
use node::{NodeArena, UNREACHED};
use open_set::OpenSet;

/// A computed route: one direction per step, first step first, plus the
/// exact TU total the route costs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub steps: Vec<Direction>,
    pub cost: u32,
}

impl Route {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Outcome of a path query. "No path" is a normal result the caller folds
/// into its own decision, never an error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathResult {
    Route(Route),
    NoPath,
}

impl PathResult {
    pub fn route(self) -> Option<Route> {
        match self {
            PathResult::Route(route) => Some(route),
            PathResult::NoPath => None,
        }
    }

    pub fn is_no_path(&self) -> bool {
        matches!(self, PathResult::NoPath)
    }
}

/// Reusable search storage sized to one map.
///
/// Create once per logical searcher and hand it to every query; each query
/// resets it. Concurrent logical searches (a what-if query issued while
/// another search's results are still being consumed) each need their own
/// context.
pub struct SearchContext {
    arena: NodeArena,
    open: OpenSet,
}

impl SearchContext {
    /// A context whose heuristic is scaled to `min_step_cost`, the
    /// cheapest TU a single step can cost on this map. Lower is always
    /// safe (admissible); higher prunes harder but must match the map.
    pub fn new(dims: MapDimensions, min_step_cost: u32) -> Self {
        Self {
            arena: NodeArena::new(dims, min_step_cost),
            open: OpenSet::new(dims.tile_count()),
        }
    }

    /// Conservative context usable with any tile costs.
    pub fn universal(dims: MapDimensions) -> Self {
        Self::new(dims, 1)
    }
}

/// Computes the cheapest route from `from` to `to` for the given mover.
///
/// `budget` switches on TU-budget mode: neighbors whose accumulated cost
/// would exceed it are pruned, and a goal only reachable over budget yields
/// `NoPath`, never a truncated route. `None` is the unconstrained mode
/// used for full routes, AI evaluation, and missile trajectories.
pub fn find_path(
    ctx: &mut SearchContext,
    state: &BattleState,
    env: &BattleEnv<'_>,
    profile: &MoveProfile,
    from: Position,
    to: Position,
    budget: Option<u32>,
) -> PathResult {
    if from == to {
        return PathResult::Route(Route {
            steps: Vec::new(),
            cost: 0,
        });
    }
    search(ctx, state, env, profile, from, Some(to), budget, |pos| {
        pos == to
    })
}

/// Open-destination mode: expands outward from `from` in pure cost order
/// (no heuristic) and returns the route to the first tile satisfying
/// `accept`. Because expansion is cost-ordered, the accepted tile is the
/// cheapest-reachable one, which is what "closest reachable tile to the
/// target" callers want.
pub fn find_reachable(
    ctx: &mut SearchContext,
    state: &BattleState,
    env: &BattleEnv<'_>,
    profile: &MoveProfile,
    from: Position,
    budget: Option<u32>,
    mut accept: impl FnMut(Position) -> bool,
) -> PathResult {
    if accept(from) {
        return PathResult::Route(Route {
            steps: Vec::new(),
            cost: 0,
        });
    }
    search(ctx, state, env, profile, from, None, budget, accept)
}

#[allow(clippy::too_many_arguments)]
fn search(
    ctx: &mut SearchContext,
    state: &BattleState,
    env: &BattleEnv<'_>,
    profile: &MoveProfile,
    from: Position,
    goal: Option<Position>,
    budget: Option<u32>,
    mut accept: impl FnMut(Position) -> bool,
) -> PathResult {
    let dims = ctx.arena.dimensions();
    ctx.arena.reset(goal);
    ctx.open.clear(dims.tile_count());

    let Some(start) = ctx.arena.index(from) else {
        return PathResult::NoPath;
    };
    {
        let node = ctx.arena.node_mut(start);
        node.tu_cost = 0;
        let key = node.total_cost();
        ctx.open.push(start, key);
    }

    while let Some((current, _)) = ctx.open.pop_min() {
        let position = ctx.arena.position_of(current);
        if accept(position) && current != start {
            return reconstruct(&ctx.arena, current);
        }
        ctx.arena.node_mut(current).visited = true;
        let current_cost = ctx.arena.node_mut(current).tu_cost;

        let mut expansions: ArrayVec<(usize, Direction, u32), { BattleConfig::MAX_NEIGHBORS }> =
            ArrayVec::new();
        for direction in Direction::ALL {
            let neighbor_pos = position + direction.delta();
            if neighbor_pos == from {
                // A step back onto the start tile can never improve a
                // route and would enqueue a zero-progress loop.
                continue;
            }
            let Some(neighbor) = ctx.arena.index(neighbor_pos) else {
                continue;
            };
            let Some(step) = step_cost(state, env, position, direction, profile) else {
                continue;
            };
            let candidate = current_cost + step;
            if budget.is_some_and(|limit| candidate > limit) {
                continue;
            }
            expansions.push((neighbor, direction, candidate));
        }

        for (neighbor, direction, candidate) in expansions {
            let node = ctx.arena.node_mut(neighbor);
            if node.visited || candidate >= node.tu_cost {
                continue;
            }
            let was_reached = node.tu_cost != UNREACHED;
            node.tu_cost = candidate;
            node.prev = Some(current);
            node.arrival = Some(direction);
            let key = node.total_cost();
            if was_reached && ctx.open.contains(neighbor) {
                ctx.open.decrease_key(neighbor, key);
            } else {
                ctx.open.push(neighbor, key);
            }
        }
    }

    PathResult::NoPath
}

/// Walks the predecessor chain from `last` back to the start, producing
/// the step list in travel order.
fn reconstruct(arena: &NodeArena, last: usize) -> PathResult {
    let Some(end) = arena.node(last) else {
        return PathResult::NoPath;
    };
    let cost = end.tu_cost;
    let mut steps = Vec::new();
    let mut cursor = Some(last);
    while let Some(index) = cursor {
        let Some(node) = arena.node(index) else {
            break;
        };
        match (node.arrival, node.prev) {
            (Some(direction), prev) => {
                steps.push(direction);
                cursor = prev;
            }
            (None, _) => break,
        }
    }
    steps.reverse();
    PathResult::Route(Route { steps, cost })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapOracle;
    use crate::env::{GridMap, PcgRng, StaticTile};
    use crate::state::{Side, UnitId, UnitState};

    fn ctx_for(map: &GridMap) -> SearchContext {
        SearchContext::new(map.dimensions(), 4)
    }

    fn env<'a>(map: &'a GridMap) -> BattleEnv<'a> {
        BattleEnv::new(map, &PcgRng)
    }

    fn route(
        map: &GridMap,
        state: &BattleState,
        from: Position,
        to: Position,
        budget: Option<u32>,
    ) -> PathResult {
        let mut ctx = ctx_for(map);
        find_path(
            &mut ctx,
            state,
            &env(map),
            &MoveProfile::walker(),
            from,
            to,
            budget,
        )
    }

    /// Exhaustive uniform-cost search used as the optimality reference.
    fn dijkstra_cost(
        map: &GridMap,
        state: &BattleState,
        from: Position,
        to: Position,
    ) -> Option<u32> {
        let dims = map.dimensions();
        let mut best = vec![u32::MAX; dims.tile_count()];
        let mut frontier = std::collections::BinaryHeap::new();
        let start = dims.tile_index(from)?;
        best[start] = 0;
        frontier.push(std::cmp::Reverse((0u32, start)));
        while let Some(std::cmp::Reverse((cost, index))) = frontier.pop() {
            if cost > best[index] {
                continue;
            }
            let position = dims.position_of(index);
            if position == to {
                return Some(cost);
            }
            for direction in Direction::ALL {
                let next_pos = position + direction.delta();
                let Some(next) = dims.tile_index(next_pos) else {
                    continue;
                };
                let Some(step) =
                    step_cost(state, &env(map), position, direction, &MoveProfile::walker())
                else {
                    continue;
                };
                let candidate = cost + step;
                if candidate < best[next] {
                    best[next] = candidate;
                    frontier.push(std::cmp::Reverse((candidate, next)));
                }
            }
        }
        None
    }

    /// Replays a route step by step and returns (end position, total cost).
    fn walk_route(
        map: &GridMap,
        state: &BattleState,
        from: Position,
        route: &Route,
    ) -> (Position, u32) {
        let mut at = from;
        let mut total = 0;
        for &step in &route.steps {
            let cost = step_cost(state, &env(map), at, step, &MoveProfile::walker())
                .expect("route steps must stay passable");
            total += cost;
            at = at + step.delta();
        }
        (at, total)
    }

    #[test]
    fn straight_line_on_open_ground() {
        let map = GridMap::open(8, 8, 1);
        let state = BattleState::new(0);
        let from = Position::new(1, 1, 0);
        let to = Position::new(6, 1, 0);
        let route = route(&map, &state, from, to, None).route().unwrap();
        assert_eq!(route.steps, vec![Direction::East; 5]);
        assert_eq!(route.cost, 20);
    }

    #[test]
    fn start_equals_goal_is_an_empty_route() {
        let map = GridMap::open(4, 4, 1);
        let state = BattleState::new(0);
        let at = Position::new(2, 2, 0);
        let route = route(&map, &state, at, at, None).route().unwrap();
        assert!(route.is_empty());
        assert_eq!(route.cost, 0);
    }

    #[test]
    fn routes_around_walls() {
        let mut map = GridMap::open(8, 8, 1);
        // Vertical wall with a gap at y = 6.
        for y in 0..6 {
            map.block(Position::new(4, y, 0));
        }
        let state = BattleState::new(0);
        let from = Position::new(2, 1, 0);
        let to = Position::new(6, 1, 0);
        let found = route(&map, &state, from, to, None).route().unwrap();
        let (end, total) = walk_route(&map, &state, from, &found);
        assert_eq!(end, to);
        assert_eq!(total, found.cost);
        assert_eq!(
            Some(found.cost),
            dijkstra_cost(&map, &state, from, to),
            "A* route must match the Dijkstra optimum"
        );
    }

    #[test]
    fn matches_dijkstra_on_varied_terrain() {
        let mut map = GridMap::open(10, 10, 1);
        // Deterministic pseudo-random scatter of rough and blocked tiles.
        for y in 0..10 {
            for x in 0..10 {
                match (x * 7 + y * 13) % 9 {
                    0 => map.block(Position::new(x, y, 0)),
                    1 => map.set_tile(
                        Position::new(x, y, 0),
                        StaticTile::open().with_floor_cost(9),
                    ),
                    _ => {}
                }
            }
        }
        let from = Position::new(1, 0, 0);
        map.set_tile(from, StaticTile::open());
        let state = BattleState::new(0);
        for to in [
            Position::new(9, 9, 0),
            Position::new(0, 9, 0),
            Position::new(9, 2, 0),
        ] {
            map.set_tile(to, StaticTile::open());
            let result = route(&map, &state, from, to, None);
            match dijkstra_cost(&map, &state, from, to) {
                Some(optimum) => {
                    let found = result.route().expect("reference search found a path");
                    assert_eq!(found.cost, optimum, "suboptimal route to {to}");
                    let (end, total) = walk_route(&map, &state, from, &found);
                    assert_eq!(end, to);
                    assert_eq!(total, optimum);
                }
                None => assert!(result.is_no_path()),
            }
        }
    }

    #[test]
    fn enclosed_goal_yields_no_path() {
        let mut map = GridMap::open(8, 8, 1);
        let goal = Position::new(5, 5, 0);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if (dx, dy) != (0, 0) {
                    map.block(Position::new(5 + dx, 5 + dy, 0));
                }
            }
        }
        let state = BattleState::new(0);
        assert!(route(&map, &state, Position::new(1, 1, 0), goal, None).is_no_path());
    }

    #[test]
    fn repeated_queries_are_identical() {
        let mut map = GridMap::open(12, 12, 1);
        for y in 2..10 {
            map.block(Position::new(6, y, 0));
        }
        let state = BattleState::new(0);
        let mut ctx = ctx_for(&map);
        let from = Position::new(2, 6, 0);
        let to = Position::new(10, 6, 0);
        let first = find_path(
            &mut ctx,
            &state,
            &env(&map),
            &MoveProfile::walker(),
            from,
            to,
            None,
        );
        for _ in 0..5 {
            let again = find_path(
                &mut ctx,
                &state,
                &env(&map),
                &MoveProfile::walker(),
                from,
                to,
                None,
            );
            assert_eq!(first, again, "same query must give the same steps");
        }
        // A fresh context agrees with the reused one.
        let fresh = find_path(
            &mut ctx_for(&map),
            &state,
            &env(&map),
            &MoveProfile::walker(),
            from,
            to,
            None,
        );
        assert_eq!(first, fresh);
    }

    #[test]
    fn budget_mode_prunes_expensive_routes() {
        let map = GridMap::open(8, 8, 1);
        let state = BattleState::new(0);
        let from = Position::new(0, 0, 0);
        let to = Position::new(5, 0, 0);
        // 5 lateral steps at 4 TU each.
        let exact = route(&map, &state, from, to, Some(20)).route().unwrap();
        assert_eq!(exact.cost, 20);
        assert!(route(&map, &state, from, to, Some(19)).is_no_path());
    }

    #[test]
    fn budgeted_routes_never_exceed_the_budget() {
        let mut map = GridMap::open(9, 9, 1);
        for y in 0..8 {
            map.block(Position::new(4, y, 0));
        }
        let state = BattleState::new(0);
        let from = Position::new(2, 2, 0);
        let to = Position::new(6, 2, 0);
        for budget in [20, 40, 60, 80] {
            match route(&map, &state, from, to, Some(budget)) {
                PathResult::Route(found) => {
                    assert!(found.cost <= budget);
                    let (_, total) = walk_route(&map, &state, from, &found);
                    assert!(total <= budget);
                }
                PathResult::NoPath => {}
            }
        }
    }

    #[test]
    fn ten_by_ten_walled_column_scenario() {
        // 10x10 single level, 4 TU floors, wall filling column x = 6,
        // start (0,0), goal (5,5), 40 TU budget. Under the 1.5x diagonal
        // rule the optimum is five diagonal steps at 6 TU each.
        let mut map = GridMap::open(10, 10, 1);
        for y in 0..10 {
            map.block(Position::new(6, y, 0));
        }
        let state = BattleState::new(0);
        let from = Position::new(0, 0, 0);
        let to = Position::new(5, 5, 0);
        let found = route(&map, &state, from, to, Some(40)).route().unwrap();
        assert_eq!(found.steps, vec![Direction::NorthEast; 5]);
        assert_eq!(found.cost, 30);
        let (end, total) = walk_route(&map, &state, from, &found);
        assert_eq!(end, to);
        assert_eq!(total, found.cost);
        // Below the optimum the goal is out of reach; anything across the
        // wall always is.
        assert!(route(&map, &state, from, to, Some(29)).is_no_path());
        assert!(route(&map, &state, from, Position::new(8, 5, 0), None).is_no_path());
    }

    #[test]
    fn occupied_goal_blocks_walkers_but_not_missiles() {
        let map = GridMap::open(6, 6, 1);
        let mut state = BattleState::new(0);
        let goal = Position::new(4, 4, 0);
        state
            .units
            .insert(UnitState::new(UnitId(3), goal, Side::Hostile));
        assert!(route(&map, &state, Position::new(1, 1, 0), goal, None).is_no_path());
        let mut ctx = ctx_for(&map);
        let missile = find_path(
            &mut ctx,
            &state,
            &env(&map),
            &MoveProfile::missile(),
            Position::new(1, 1, 0),
            goal,
            None,
        );
        assert!(missile.route().is_some());
    }

    #[test]
    fn find_reachable_returns_cheapest_acceptable_tile() {
        let mut map = GridMap::open(8, 8, 1);
        // The target stands behind a wall; ask for any tile adjacent to it.
        let target = Position::new(6, 3, 0);
        map.block(target);
        let state = BattleState::new(0);
        let from = Position::new(1, 3, 0);
        let mut ctx = ctx_for(&map);
        let found = find_reachable(
            &mut ctx,
            &state,
            &env(&map),
            &MoveProfile::walker(),
            from,
            None,
            |pos| pos.lateral_distance(target) <= 1 && pos != target,
        )
        .route()
        .unwrap();
        let (end, total) = walk_route(&map, &state, from, &found);
        assert!(end.lateral_distance(target) <= 1);
        assert_eq!(total, found.cost);
        // Cost-ordered expansion means no acceptable tile is cheaper.
        assert_eq!(found.cost, 16, "straight walk to (5,3) is cheapest");
    }
}
