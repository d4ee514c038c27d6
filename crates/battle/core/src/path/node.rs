//! Per-tile search records.
//!
//! One [`PathNode`] per tile, stored in a flat arena indexed by linearized
//! tile index. Nodes are revived lazily by stamping each with the epoch of
//! the search that last touched it; `reset` just bumps the epoch, so
//! repeated queries reuse the allocation instead of clearing tens of
//! thousands of records.

use crate::env::MapDimensions;
use crate::state::{Direction, Position};

/// Index into the node arena; identical to the linearized tile index.
pub(crate) type NodeIndex = usize;

/// Cost value representing "not reached yet."
pub(crate) const UNREACHED: u32 = u32::MAX;

/// Search bookkeeping for one tile.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PathNode {
    /// Search generation that last initialized this record.
    epoch: u32,
    /// Finalized: the cost below is the true minimum and is frozen.
    pub visited: bool,
    /// Cheapest accumulated TU cost found so far.
    pub tu_cost: u32,
    /// Admissible estimate to the goal, fixed for the life of one search.
    pub heuristic: u32,
    /// Backpointer for path reconstruction.
    pub prev: Option<NodeIndex>,
    /// Direction of the step that reached this node.
    pub arrival: Option<Direction>,
}

impl PathNode {
    const fn blank() -> Self {
        Self {
            epoch: 0,
            visited: false,
            tu_cost: UNREACHED,
            heuristic: 0,
            prev: None,
            arrival: None,
        }
    }

    pub fn total_cost(&self) -> u32 {
        self.tu_cost.saturating_add(self.heuristic)
    }
}

/// Arena of path nodes covering the whole grid, reused across searches.
pub(crate) struct NodeArena {
    dims: MapDimensions,
    nodes: Vec<PathNode>,
    epoch: u32,
    goal: Option<Position>,
    /// Scale of the heuristic; must not exceed the cheapest possible step
    /// cost or the estimate stops being admissible.
    min_step_cost: u32,
}

impl NodeArena {
    pub fn new(dims: MapDimensions, min_step_cost: u32) -> Self {
        Self {
            dims,
            nodes: vec![PathNode::blank(); dims.tile_count()],
            // Stored blanks carry epoch 0; starting at 1 makes them all stale.
            epoch: 1,
            goal: None,
            min_step_cost: min_step_cost.max(1),
        }
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dims
    }

    /// Invalidates every node and fixes the heuristic target for the next
    /// search. `None` turns the search into plain Dijkstra.
    pub fn reset(&mut self, goal: Option<Position>) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // Wrapped around: stored stamps could now collide, so pay the
            // one-off full clear.
            self.nodes.fill(PathNode::blank());
            self.epoch = 1;
        }
        self.goal = goal;
    }

    pub fn index(&self, position: Position) -> Option<NodeIndex> {
        self.dims.tile_index(position)
    }

    pub fn position_of(&self, index: NodeIndex) -> Position {
        self.dims.position_of(index)
    }

    /// Returns the node for `index`, reviving it with a fresh heuristic if
    /// this search has not touched it yet.
    pub fn node_mut(&mut self, index: NodeIndex) -> &mut PathNode {
        let goal = self.goal;
        let epoch = self.epoch;
        let min_step = self.min_step_cost;
        let position = self.dims.position_of(index);
        let node = &mut self.nodes[index];
        if node.epoch != epoch {
            *node = PathNode::blank();
            node.epoch = epoch;
            node.heuristic = goal
                .map(|g| estimate(position, g, min_step))
                .unwrap_or(0);
        }
        node
    }

    /// Read-only view; `None` if the node is stale for the current search.
    pub fn node(&self, index: NodeIndex) -> Option<&PathNode> {
        let node = &self.nodes[index];
        (node.epoch == self.epoch).then_some(node)
    }
}

/// Octile-style admissible estimate: lateral Chebyshev distance plus level
/// distance, scaled by the minimum per-step cost. Diagonals cover one
/// Chebyshev unit at >= the lateral step cost, so this never overestimates.
fn estimate(from: Position, goal: Position, min_step_cost: u32) -> u32 {
    let tiles = from.lateral_distance(goal) + from.level_distance(goal);
    tiles as u32 * min_step_cost
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> NodeArena {
        NodeArena::new(MapDimensions::new(8, 8, 2), 4)
    }

    #[test]
    fn nodes_start_unreached() {
        let mut arena = arena();
        arena.reset(Some(Position::new(7, 7, 0)));
        let idx = arena.index(Position::new(1, 1, 0)).unwrap();
        let node = arena.node_mut(idx);
        assert!(!node.visited);
        assert_eq!(node.tu_cost, UNREACHED);
        assert_eq!(node.prev, None);
    }

    #[test]
    fn heuristic_is_fixed_at_revival() {
        let mut arena = arena();
        arena.reset(Some(Position::new(4, 1, 0)));
        let idx = arena.index(Position::new(1, 1, 0)).unwrap();
        assert_eq!(arena.node_mut(idx).heuristic, 3 * 4);
        // Level distance counts too.
        arena.reset(Some(Position::new(1, 1, 1)));
        assert_eq!(arena.node_mut(idx).heuristic, 4);
    }

    #[test]
    fn reset_invalidates_without_reallocating() {
        let mut arena = arena();
        arena.reset(Some(Position::new(3, 3, 0)));
        let idx = arena.index(Position::new(2, 2, 0)).unwrap();
        {
            let node = arena.node_mut(idx);
            node.tu_cost = 12;
            node.visited = true;
        }
        arena.reset(Some(Position::new(3, 3, 0)));
        assert!(arena.node(idx).is_none(), "stale node must read as absent");
        let node = arena.node_mut(idx);
        assert_eq!(node.tu_cost, UNREACHED);
        assert!(!node.visited);
    }

    #[test]
    fn dijkstra_mode_has_zero_heuristic() {
        let mut arena = arena();
        arena.reset(None);
        let idx = arena.index(Position::new(0, 0, 0)).unwrap();
        assert_eq!(arena.node_mut(idx).heuristic, 0);
    }
}
