//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a dense, fixed-size 3D array of
//! blocks that is the unit of streaming, generation and lighting.
//!
//! ## Storage
//!
//! Blocks are kept in one flat vector indexed by `x * flatten_offset + z * height + y`,
//! where `flatten_offset = length * height`. A vertical column is therefore
//! contiguous in memory, which is the access pattern of both terrain generation
//! and the sunlight clear pass.
//!
//! ## Neighbours
//!
//! A chunk never stores references to its neighbours. `neighbor` and the compass
//! shortcuts look the adjacent coordinate up in the `ChunkManager`, so there are
//! no ownership cycles and an evicted neighbour simply stops being found.
//!
//! ## Lifecycle
//!
//! `New -> QueuedForGeneration -> Generated (dirty) -> QueuedForBuilding -> Built (clean)`.
//! `set_block` moves a built chunk back to dirty. Eviction calls `dispose`,
//! which is terminal from any state.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::core::{BoundingBox, MtResource};

use super::block::Block;
use super::chunk_manager::{ChunkCoord, ChunkManager, CompassDirection};

pub mod chunk_iteration;

use chunk_iteration::ChunkBlockIterator;

/// The size of a chunk in blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDimensions {
    /// Extent along X
    pub width: usize,
    /// Extent along Y
    pub height: usize,
    /// Extent along Z
    pub length: usize,
}

impl Default for ChunkDimensions {
    fn default() -> Self {
        ChunkDimensions {
            width: 16,
            height: 128,
            length: 16,
        }
    }
}

impl ChunkDimensions {
    /// The total number of blocks in a chunk.
    pub fn volume(&self) -> usize {
        self.width * self.height * self.length
    }

    /// The stride between two consecutive X slices in the block array.
    pub fn flatten_offset(&self) -> usize {
        self.length * self.height
    }

    /// The flat array index of a chunk-local coordinate.
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x * self.flatten_offset() + z * self.height + y
    }
}

/// A `width x height x length` column of blocks.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    pub position: ChunkCoord,

    /// The world-space block coordinate of local `(0, 0, 0)`.
    pub world_origin: Point3<i32>,

    /// The world-space box this chunk occupies.
    pub bounding_box: BoundingBox,

    dimensions: ChunkDimensions,

    blocks: Vec<Block>,

    /// Set once terrain generation has filled the chunk.
    pub generated: bool,

    /// Set whenever blocks changed since the last lighting and mesh build.
    pub dirty: bool,

    /// Set while a generation item for this chunk is outstanding.
    pub queued_for_generation: bool,

    /// Set while a build item for this chunk is outstanding.
    pub queued_for_building: bool,

    /// The highest Y that has ever held a solid block. Only ever rises.
    pub highest_solid_block_offset: usize,

    /// The lowest Y that has ever been written empty. Only ever falls.
    pub lowest_empty_block_offset: usize,

    disposed: bool,
}

impl Chunk {
    /// Creates a new, completely empty chunk at the given chunk coordinate.
    pub fn new(position: ChunkCoord, dimensions: ChunkDimensions) -> Self {
        let world_origin = position.world_origin(&dimensions);
        let min = Point3::new(
            world_origin.x as f32,
            world_origin.y as f32,
            world_origin.z as f32,
        );
        let max = Point3::new(
            min.x + dimensions.width as f32,
            min.y + dimensions.height as f32,
            min.z + dimensions.length as f32,
        );

        Chunk {
            position,
            world_origin,
            bounding_box: BoundingBox::new(min, max),
            dimensions,
            blocks: vec![Block::EMPTY; dimensions.volume()],
            generated: false,
            dirty: false,
            queued_for_generation: false,
            queued_for_building: false,
            highest_solid_block_offset: 0,
            lowest_empty_block_offset: dimensions.height - 1,
            disposed: false,
        }
    }

    /// The size of this chunk.
    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds or the chunk was disposed.
    pub fn block_at(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[self.dimensions.index(x, y, z)]
    }

    /// Mutable access to a block that does not touch the lifecycle flags.
    ///
    /// The lighting pass uses this: rewriting light values is part of building
    /// a chunk, not a change that makes it dirty.
    pub fn block_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Block {
        let index = self.dimensions.index(x, y, z);
        &mut self.blocks[index]
    }

    /// The raw block array in storage order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Writes a block and marks the chunk dirty.
    ///
    /// The height cache is updated monotonically. If the block sits on a
    /// vertical face of the chunk, the neighbour across that face has to rebuild
    /// its own geometry too; those directions are returned so the caller can
    /// dirty the neighbours once it has released this chunk's lock.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: Block) -> Vec<CompassDirection> {
        let index = self.dimensions.index(x, y, z);
        self.blocks[index] = block;

        if block.exists() {
            self.highest_solid_block_offset = self.highest_solid_block_offset.max(y);
        } else {
            self.lowest_empty_block_offset = self.lowest_empty_block_offset.min(y);
        }

        self.dirty = true;

        let mut touched = Vec::new();
        if x == 0 {
            touched.push(CompassDirection::West);
        }
        if x == self.dimensions.width - 1 {
            touched.push(CompassDirection::East);
        }
        if z == 0 {
            touched.push(CompassDirection::South);
        }
        if z == self.dimensions.length - 1 {
            touched.push(CompassDirection::North);
        }
        touched
    }

    /// Looks up the neighbouring chunk in the given direction.
    ///
    /// Returns `None` at the edge of the resident window.
    pub fn neighbor(
        &self,
        chunks: &ChunkManager,
        direction: CompassDirection,
    ) -> Option<MtResource<Chunk>> {
        chunks.neighbor(self.position, direction)
    }

    /// The chunk on the +Z side.
    pub fn north(&self, chunks: &ChunkManager) -> Option<MtResource<Chunk>> {
        self.neighbor(chunks, CompassDirection::North)
    }

    /// The chunk on the -Z side.
    pub fn south(&self, chunks: &ChunkManager) -> Option<MtResource<Chunk>> {
        self.neighbor(chunks, CompassDirection::South)
    }

    /// The chunk on the +X side.
    pub fn east(&self, chunks: &ChunkManager) -> Option<MtResource<Chunk>> {
        self.neighbor(chunks, CompassDirection::East)
    }

    /// The chunk on the -X side.
    pub fn west(&self, chunks: &ChunkManager) -> Option<MtResource<Chunk>> {
        self.neighbor(chunks, CompassDirection::West)
    }

    /// Iterates over every block with its chunk-local position.
    pub fn iter_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// Releases the block storage of an evicted chunk.
    ///
    /// Calling it again is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.blocks = Vec::new();
        self.disposed = true;
    }

    /// Returns `true` once `dispose` has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
