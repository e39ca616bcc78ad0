//! # Chunk Manager
//!
//! The spatial index of resident chunks: an O(1) map from 2D chunk coordinate
//! to chunk, plus the two corners of the resident rectangle.
//!
//! The manager does not validate coordinates. Keeping the map and the corners
//! in agreement (every coordinate inside the rectangle resident, nothing
//! outside it) is the job of whoever slides the window.

use std::collections::{hash_map, HashMap};

use cgmath::Point3;

use crate::core::MtResource;

use super::chunk::{Chunk, ChunkDimensions};

/// The position of a chunk in chunk units on the horizontal plane.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// X coordinate in chunks
    pub x: i32,
    /// Z coordinate in chunks
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// The chunk containing world block column `(world_x, world_z)`.
    pub fn from_world(world_x: i32, world_z: i32, dimensions: &ChunkDimensions) -> Self {
        ChunkCoord {
            x: world_x.div_euclid(dimensions.width as i32),
            z: world_z.div_euclid(dimensions.length as i32),
        }
    }

    /// The chunk containing a world-space position.
    pub fn from_position(position: Point3<f32>, dimensions: &ChunkDimensions) -> Self {
        ChunkCoord {
            x: (position.x / dimensions.width as f32).floor() as i32,
            z: (position.z / dimensions.length as f32).floor() as i32,
        }
    }

    /// The world block coordinate of this chunk's local origin.
    pub fn world_origin(&self, dimensions: &ChunkDimensions) -> Point3<i32> {
        Point3::new(
            self.x * dimensions.width as i32,
            0,
            self.z * dimensions.length as i32,
        )
    }

    /// The adjacent coordinate in the given direction.
    pub fn offset(&self, direction: CompassDirection) -> ChunkCoord {
        let (dx, dz) = direction.delta();
        ChunkCoord::new(self.x + dx, self.z + dz)
    }
}

/// The eight horizontal directions between chunks.
///
/// North is +Z and east is +X, so the south-west corner of a rectangle is its
/// minimum corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompassDirection {
    /// +Z
    North,
    /// -Z
    South,
    /// +X
    East,
    /// -X
    West,
    /// +X, +Z
    NorthEast,
    /// -X, +Z
    NorthWest,
    /// +X, -Z
    SouthEast,
    /// -X, -Z
    SouthWest,
}

impl CompassDirection {
    /// All eight directions, faces first.
    pub fn all() -> [CompassDirection; 8] {
        [
            CompassDirection::North,
            CompassDirection::South,
            CompassDirection::East,
            CompassDirection::West,
            CompassDirection::NorthEast,
            CompassDirection::NorthWest,
            CompassDirection::SouthEast,
            CompassDirection::SouthWest,
        ]
    }

    /// The `(dx, dz)` chunk step for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            CompassDirection::North => (0, 1),
            CompassDirection::South => (0, -1),
            CompassDirection::East => (1, 0),
            CompassDirection::West => (-1, 0),
            CompassDirection::NorthEast => (1, 1),
            CompassDirection::NorthWest => (-1, 1),
            CompassDirection::SouthEast => (1, -1),
            CompassDirection::SouthWest => (-1, -1),
        }
    }
}

/// The map of resident chunks.
pub struct ChunkManager {
    chunks: HashMap<ChunkCoord, MtResource<Chunk>>,
    /// Minimum corner of the resident rectangle
    pub south_west_edge: ChunkCoord,
    /// Maximum corner of the resident rectangle
    pub north_east_edge: ChunkCoord,
}

impl ChunkManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        ChunkManager {
            chunks: HashMap::new(),
            south_west_edge: ChunkCoord::default(),
            north_east_edge: ChunkCoord::default(),
        }
    }

    /// Returns a handle to the chunk at `coord`, if resident.
    pub fn get(&self, coord: ChunkCoord) -> Option<MtResource<Chunk>> {
        self.chunks.get(&coord).cloned()
    }

    /// Stores a chunk at `coord`, replacing any previous one.
    pub fn set(&mut self, coord: ChunkCoord, chunk: MtResource<Chunk>) {
        self.chunks.insert(coord, chunk);
    }

    /// Removes and returns the chunk at `coord`.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<MtResource<Chunk>> {
        self.chunks.remove(&coord)
    }

    /// Returns `true` if a chunk is resident at `coord`.
    pub fn contains_key(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// The number of resident chunks.
    pub fn count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if no chunk is resident.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All resident chunks, in no particular order.
    pub fn values(&self) -> hash_map::Values<'_, ChunkCoord, MtResource<Chunk>> {
        self.chunks.values()
    }

    /// All resident coordinates with their chunks, in no particular order.
    pub fn iter(&self) -> hash_map::Iter<'_, ChunkCoord, MtResource<Chunk>> {
        self.chunks.iter()
    }

    /// Looks up the chunk adjacent to `coord`.
    pub fn neighbor(
        &self,
        coord: ChunkCoord,
        direction: CompassDirection,
    ) -> Option<MtResource<Chunk>> {
        self.get(coord.offset(direction))
    }

    /// Returns `true` if `coord` lies inside the resident rectangle.
    pub fn in_window(&self, coord: ChunkCoord) -> bool {
        coord.x >= self.south_west_edge.x
            && coord.x <= self.north_east_edge.x
            && coord.z >= self.south_west_edge.z
            && coord.z <= self.north_east_edge.z
    }
}

impl Default for ChunkManager {
    fn default() -> Self {
        ChunkManager::new()
    }
}
