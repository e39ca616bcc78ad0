//! # Chunk Iteration Module
//!
//! This module provides an iterator over every block of a chunk together with
//! its chunk-local position, walking the block array in storage order
//! (Y fastest, then Z, then X).

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::{Chunk, ChunkDimensions};

/// An iterator over all blocks in a chunk.
///
/// The position is reconstructed from the flat index instead of being tracked
/// per axis, which keeps the iterator in lockstep with the storage layout.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Dimensions of the chunk, copied out for cheap access
    dimensions: ChunkDimensions,
    /// Next flat index to yield
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned at local `(0, 0, 0)`.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            dimensions: chunk_ref.dimensions(),
            current_offset: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, Block);

    fn next(&mut self) -> Option<Self::Item> {
        let block = *self.chunk_ref.blocks().get(self.current_offset)?;

        let offset = self.current_offset;
        let x = offset / self.dimensions.flatten_offset();
        let remainder = offset % self.dimensions.flatten_offset();
        let z = remainder / self.dimensions.height;
        let y = remainder % self.dimensions.height;

        self.current_offset += 1;
        Some((Point3::new(x, y, z), block))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chunk_ref.blocks().len().saturating_sub(self.current_offset);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::block_type::BlockType, chunk_manager::ChunkCoord,
    };

    #[test]
    fn positions_match_storage_layout() {
        let dims = ChunkDimensions {
            width: 2,
            height: 3,
            length: 4,
        };
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), dims);
        chunk.set_block(1, 2, 3, Block::new(BlockType::SAND));

        let all: Vec<_> = chunk.iter_blocks().collect();
        assert_eq!(all.len(), dims.volume());
        for (position, _) in &all {
            assert_eq!(
                chunk.blocks()[dims.index(position.x, position.y, position.z)],
                chunk.block_at(position.x, position.y, position.z)
            );
        }

        let solid: Vec<_> = all.iter().filter(|(_, block)| block.exists()).collect();
        assert_eq!(solid.len(), 1);
        assert_eq!(solid[0].0, Point3::new(1, 2, 3));
    }

    #[test]
    fn disposed_chunk_yields_nothing() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), ChunkDimensions::default());
        chunk.dispose();
        assert_eq!(chunk.iter_blocks().count(), 0);
    }
}
