use crate::state::Position;

bitflags::bitflags! {
    /// Wall segments blocking lateral exit from a tile. A step also needs
    /// the matching entry side of the destination tile to be clear.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WallBits: u8 {
        const NORTH = 1 << 0;
        const EAST = 1 << 1;
        const SOUTH = 1 << 2;
        const WEST = 1 << 3;
    }
}

/// Vertical connectivity offered by a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalFeature {
    #[default]
    None,
    /// Connects to the tile directly above.
    Stairs,
    /// Connects both up and down.
    GravLift,
}

/// Static map oracle exposing immutable terrain for one battle map.
///
/// Read-only from the core's perspective; the Tile/Terrain provider owns
/// the data. Destructible terrain would surface as a new oracle snapshot,
/// not as in-place mutation.
pub trait MapOracle: Send + Sync {
    fn dimensions(&self) -> MapDimensions;
    fn tile(&self, position: Position) -> Option<StaticTile>;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
    pub levels: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32, levels: u32) -> Self {
        Self {
            width,
            height,
            levels,
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.z >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
            && position.z < self.levels as i32
    }

    pub fn tile_count(&self) -> usize {
        (self.width * self.height * self.levels) as usize
    }

    /// Linearized tile index used by the pathfinding node arena.
    pub fn tile_index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let layer = (self.width * self.height) as usize;
        Some(
            position.z as usize * layer
                + position.y as usize * self.width as usize
                + position.x as usize,
        )
    }

    pub fn position_of(&self, index: usize) -> Position {
        let layer = (self.width * self.height) as usize;
        let z = index / layer;
        let rem = index % layer;
        Position::new(
            (rem % self.width as usize) as i32,
            (rem / self.width as usize) as i32,
            z as i32,
        )
    }
}

/// Immutable descriptor for one tile of the static layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticTile {
    /// TU to enter this tile laterally on foot. 0 means the tile has no
    /// floor: walkers fall through, flyers hover at [`StaticTile::FLY_COST`].
    floor_cost: u8,
    walls: WallBits,
    feature: VerticalFeature,
}

impl StaticTile {
    /// Hover cost used where no floor sets a cost (flight, missile paths).
    pub const FLY_COST: u8 = 4;

    pub const fn new(floor_cost: u8, walls: WallBits, feature: VerticalFeature) -> Self {
        Self {
            floor_cost,
            walls,
            feature,
        }
    }

    /// Open floor with the standard walking cost.
    pub const fn open() -> Self {
        Self::new(4, WallBits::empty(), VerticalFeature::None)
    }

    /// Fully walled tile; nothing enters or leaves laterally.
    pub const fn solid() -> Self {
        Self::new(0, WallBits::all(), VerticalFeature::None)
    }

    pub const fn with_walls(mut self, walls: WallBits) -> Self {
        self.walls = walls;
        self
    }

    pub const fn with_feature(mut self, feature: VerticalFeature) -> Self {
        self.feature = feature;
        self
    }

    pub const fn with_floor_cost(mut self, cost: u8) -> Self {
        self.floor_cost = cost;
        self
    }

    pub fn has_floor(self) -> bool {
        self.floor_cost > 0
    }

    pub fn floor_cost(self) -> u8 {
        self.floor_cost
    }

    pub fn walls(self) -> WallBits {
        self.walls
    }

    pub fn feature(self) -> VerticalFeature {
        self.feature
    }

    /// Whether the tile offers a way to the level above.
    pub fn climbable(self) -> bool {
        matches!(self.feature, VerticalFeature::Stairs | VerticalFeature::GravLift)
    }
}

/// Flat in-memory map, the reference [`MapOracle`] implementation.
///
/// Battle maps are modest (tens of thousands of tiles), so a dense vector
/// wins over anything sparse.
#[derive(Clone, Debug)]
pub struct GridMap {
    dims: MapDimensions,
    tiles: Vec<StaticTile>,
}

impl GridMap {
    /// Creates a map filled with open floor tiles.
    pub fn open(width: u32, height: u32, levels: u32) -> Self {
        let dims = MapDimensions::new(width, height, levels);
        Self {
            tiles: vec![StaticTile::open(); dims.tile_count()],
            dims,
        }
    }

    pub fn set_tile(&mut self, position: Position, tile: StaticTile) {
        if let Some(index) = self.dims.tile_index(position) {
            self.tiles[index] = tile;
        }
    }

    /// Marks a tile as solid wall.
    pub fn block(&mut self, position: Position) {
        self.set_tile(position, StaticTile::solid());
    }
}

impl MapOracle for GridMap {
    fn dimensions(&self) -> MapDimensions {
        self.dims
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        self.dims.tile_index(position).map(|i| self.tiles[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_index_round_trips() {
        let dims = MapDimensions::new(10, 6, 3);
        for z in 0..3 {
            for y in 0..6 {
                for x in 0..10 {
                    let pos = Position::new(x, y, z);
                    let index = dims.tile_index(pos).unwrap();
                    assert_eq!(dims.position_of(index), pos);
                }
            }
        }
        assert_eq!(dims.tile_index(Position::new(10, 0, 0)), None);
        assert_eq!(dims.tile_index(Position::new(0, -1, 0)), None);
    }

    #[test]
    fn grid_map_reads_back_tiles() {
        let mut map = GridMap::open(4, 4, 1);
        map.block(Position::new(2, 2, 0));
        assert!(map.tile(Position::new(1, 1, 0)).unwrap().has_floor());
        let wall = map.tile(Position::new(2, 2, 0)).unwrap();
        assert!(!wall.has_floor());
        assert_eq!(wall.walls(), WallBits::all());
        assert_eq!(map.tile(Position::new(4, 0, 0)), None);
    }
}
