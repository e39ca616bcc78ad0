//! # World Module
//!
//! This module provides the `World` struct, the facade over the resident chunks.
//! It translates world block coordinates into chunk-local ones, guards every
//! access with the bounds of the resident window, and owns the sliding-window
//! bookkeeping that keeps the chunk map and its corners in agreement.
//!
//! ## Architecture
//!
//! The resident chunks form a `(2r+1) x (2r+1)` rectangle centred on the
//! observer, where `r` is the cache range. When the observer crosses into a new
//! chunk the rectangle slides one column or row at a time: chunks are created
//! on the advancing edge and disposed on the trailing edge, so the resident
//! count never changes.
//!
//! ## Thread Safety
//!
//! The world itself is shared as `MtResource<World>`. Block reads and writes
//! only need the read guard because every chunk carries its own lock. Sliding
//! the window needs the write guard, which is what keeps eviction from
//! interleaving with a chunk that is being generated or built.

use cgmath::Point3;
use log::debug;

use crate::core::{BoundingBox, MtResource};
use crate::engine_state::config::EngineConfig;

use super::block::Block;
use super::chunk::{Chunk, ChunkDimensions};
use super::chunk_manager::{ChunkCoord, ChunkManager, CompassDirection};

/// The chunks created and evicted by one slide of the resident window.
#[derive(Debug, Default, PartialEq)]
pub struct WindowSlide {
    /// Coordinates of the new chunks on the advancing edge
    pub added: Vec<ChunkCoord>,
    /// Coordinates of the disposed chunks on the trailing edge
    pub evicted: Vec<ChunkCoord>,
}

/// Represents the streamed voxel world around one observer.
///
/// # Examples
///
/// ```
/// use voxel_terrain::{Block, BlockType, ChunkCoord, EngineConfig, World};
///
/// let mut world = World::new(&EngineConfig::default());
/// world.populate_window(ChunkCoord::new(0, 0));
///
/// world.set_block(3, 50, -7, Block::new(BlockType::ROCK));
/// assert_eq!(world.block_at(3, 50, -7).get_type(), BlockType::ROCK);
///
/// // Outside the resident window every read is the empty block.
/// assert_eq!(world.block_at(10_000, 50, 0), Block::EMPTY);
/// ```
pub struct World {
    /// The resident chunks and the corners of their rectangle.
    pub chunks: ChunkManager,
    dimensions: ChunkDimensions,
    view_range: i32,
    resident_radius: i32,
    bounding_box: BoundingBox,
    infinite: bool,
}

impl World {
    /// Creates a new world with no resident chunks.
    pub fn new(config: &EngineConfig) -> Self {
        let origin = Point3::new(0.0, 0.0, 0.0);
        World {
            chunks: ChunkManager::new(),
            dimensions: config.chunk,
            view_range: config.view_range as i32,
            resident_radius: config.resident_radius(),
            bounding_box: BoundingBox::new(origin, origin),
            infinite: config.infinite_world,
        }
    }

    /// The size of every chunk in this world.
    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// Radius, in chunks, of the rendered window.
    pub fn view_range(&self) -> i32 {
        self.view_range
    }

    /// Radius, in chunks, of the resident window.
    pub fn resident_radius(&self) -> i32 {
        self.resident_radius
    }

    /// The world-space box covered by the resident window.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Returns `true` if the resident window follows the observer.
    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    /// Switches between a streamed and a fixed world.
    ///
    /// # Returns
    /// The new setting.
    pub fn toggle_infinite_world(&mut self) -> bool {
        self.infinite = !self.infinite;
        debug!("Infinite world {}", if self.infinite { "enabled" } else { "disabled" });
        self.infinite
    }

    /// Retrieves the chunk at the specified chunk coordinate.
    ///
    /// # Returns
    /// A clone of the chunk handle, or `None` if the chunk is not resident.
    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<MtResource<Chunk>> {
        self.chunks.get(coord)
    }

    /// Retrieves the chunk containing the world block column `(world_x, world_z)`.
    pub fn chunk_at_world(&self, world_x: i32, world_z: i32) -> Option<MtResource<Chunk>> {
        self.get_chunk(ChunkCoord::from_world(world_x, world_z, &self.dimensions))
    }

    /// Reads the block at a world coordinate.
    ///
    /// Returns `Block::EMPTY` for coordinates outside the resident window.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Block {
        let Some((chunk, local)) = self.locate(x, y, z) else {
            return Block::EMPTY;
        };
        let chunk = chunk.get();
        if chunk.is_disposed() {
            return Block::EMPTY;
        }
        chunk.block_at(local.x, local.y, local.z)
    }

    /// Writes the block at a world coordinate.
    ///
    /// The owning chunk is marked dirty, and so is every neighbour that shares
    /// a face with the written block. Writes outside the resident window are
    /// ignored.
    ///
    /// # Returns
    /// `true` if the block was written.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Block) -> bool {
        let Some((chunk, local)) = self.locate(x, y, z) else {
            return false;
        };

        let (coord, touched) = {
            let mut chunk = chunk.get_mut();
            if chunk.is_disposed() {
                return false;
            }
            let touched = chunk.set_block(local.x, local.y, local.z, block);
            (chunk.position, touched)
        };

        for direction in touched {
            if let Some(neighbor) = self.chunks.neighbor(coord, direction) {
                neighbor.get_mut().dirty = true;
            }
        }
        true
    }

    /// Adds a new, ungenerated chunk at the specified coordinate if one doesn't
    /// already exist.
    ///
    /// # Returns
    /// The handle of the resident chunk at `coord`.
    pub fn add_chunk_at(&mut self, coord: ChunkCoord) -> MtResource<Chunk> {
        if let Some(existing) = self.chunks.get(coord) {
            return existing;
        }
        let chunk = MtResource::new(Chunk::new(coord, self.dimensions));
        self.chunks.set(coord, chunk.clone());
        chunk
    }

    /// Removes the chunk at `coord` from the index and disposes it.
    pub fn evict_chunk(&mut self, coord: ChunkCoord) -> Option<MtResource<Chunk>> {
        let chunk = self.chunks.remove(coord)?;
        chunk.get_mut().dispose();
        Some(chunk)
    }

    /// Replaces the resident set with the full window centred on `center`.
    ///
    /// # Returns
    /// The coordinates of every chunk in the new window.
    pub fn populate_window(&mut self, center: ChunkCoord) -> Vec<ChunkCoord> {
        let stale: Vec<ChunkCoord> = self.chunks.iter().map(|(coord, _)| *coord).collect();
        for coord in stale {
            self.evict_chunk(coord);
        }

        let radius = self.resident_radius;
        self.chunks.south_west_edge = ChunkCoord::new(center.x - radius, center.z - radius);
        self.chunks.north_east_edge = ChunkCoord::new(center.x + radius, center.z + radius);

        let mut coords = Vec::with_capacity(self.window_side() * self.window_side());
        for x in (center.x - radius)..=(center.x + radius) {
            for z in (center.z - radius)..=(center.z + radius) {
                let coord = ChunkCoord::new(x, z);
                self.add_chunk_at(coord);
                coords.push(coord);
            }
        }

        self.recompute_bounding_box();
        coords
    }

    /// Slides the resident window one chunk in a face direction.
    ///
    /// A full column (or row) is created on the advancing edge and the opposite
    /// one is evicted, so the resident count is unchanged.
    ///
    /// # Panics
    /// Panics when given a diagonal direction; a diagonal move is two slides.
    pub fn slide_window(&mut self, direction: CompassDirection) -> WindowSlide {
        let sw = self.chunks.south_west_edge;
        let ne = self.chunks.north_east_edge;

        let (advancing, trailing): (Vec<ChunkCoord>, Vec<ChunkCoord>) = match direction {
            CompassDirection::East => (
                (sw.z..=ne.z).map(|z| ChunkCoord::new(ne.x + 1, z)).collect(),
                (sw.z..=ne.z).map(|z| ChunkCoord::new(sw.x, z)).collect(),
            ),
            CompassDirection::West => (
                (sw.z..=ne.z).map(|z| ChunkCoord::new(sw.x - 1, z)).collect(),
                (sw.z..=ne.z).map(|z| ChunkCoord::new(ne.x, z)).collect(),
            ),
            CompassDirection::North => (
                (sw.x..=ne.x).map(|x| ChunkCoord::new(x, ne.z + 1)).collect(),
                (sw.x..=ne.x).map(|x| ChunkCoord::new(x, sw.z)).collect(),
            ),
            CompassDirection::South => (
                (sw.x..=ne.x).map(|x| ChunkCoord::new(x, sw.z - 1)).collect(),
                (sw.x..=ne.x).map(|x| ChunkCoord::new(x, ne.z)).collect(),
            ),
            diagonal => panic!("cannot slide the window diagonally ({diagonal:?})"),
        };

        for coord in &advancing {
            self.add_chunk_at(*coord);
        }
        for coord in &trailing {
            self.evict_chunk(*coord);
        }

        let (dx, dz) = direction.delta();
        self.chunks.south_west_edge = ChunkCoord::new(sw.x + dx, sw.z + dz);
        self.chunks.north_east_edge = ChunkCoord::new(ne.x + dx, ne.z + dz);
        self.recompute_bounding_box();

        debug!(
            "Slid window {:?}: +{} -{} chunks, now {:?}..{:?}",
            direction,
            advancing.len(),
            trailing.len(),
            self.chunks.south_west_edge,
            self.chunks.north_east_edge
        );

        WindowSlide {
            added: advancing,
            evicted: trailing,
        }
    }

    /// Recomputes the world-space box from the corners of the resident window.
    pub fn recompute_bounding_box(&mut self) {
        let sw = self.chunks.south_west_edge.world_origin(&self.dimensions);
        let ne = self.chunks.north_east_edge.world_origin(&self.dimensions);
        self.bounding_box = BoundingBox::new(
            Point3::new(sw.x as f32, 0.0, sw.z as f32),
            Point3::new(
                (ne.x + self.dimensions.width as i32) as f32,
                self.dimensions.height as f32,
                (ne.z + self.dimensions.length as i32) as f32,
            ),
        );
    }

    /// The generated chunks within view range of `center`, for a renderer.
    pub fn visible_chunks(&self, center: ChunkCoord) -> Vec<MtResource<Chunk>> {
        self.chunks
            .iter()
            .filter(|(coord, _)| {
                (coord.x - center.x).abs() <= self.view_range
                    && (coord.z - center.z).abs() <= self.view_range
            })
            .filter(|(_, chunk)| chunk.get().generated)
            .map(|(_, chunk)| chunk.clone())
            .collect()
    }

    fn window_side(&self) -> usize {
        2 * self.resident_radius as usize + 1
    }

    /// Resolves a world coordinate to its resident chunk and local position.
    fn locate(&self, x: i32, y: i32, z: i32) -> Option<(MtResource<Chunk>, Point3<usize>)> {
        if !self.bounding_box.contains_block(x, y, z) {
            return None;
        }
        let chunk = self.chunk_at_world(x, z)?;
        let local = Point3::new(
            x.rem_euclid(self.dimensions.width as i32) as usize,
            y as usize,
            z.rem_euclid(self.dimensions.length as i32) as usize,
        );
        Some((chunk, local))
    }
}
