//! # Rendering Seam
//!
//! Mesh construction lives outside this crate. The chunk builder hands every
//! clean, lit chunk to a `ChunkMeshBuilder` while it still holds the chunk's
//! write lock, so a consumer never sees a mesh built from a half-lit chunk, and
//! tells it when a chunk is evicted so its geometry can be dropped.
//!
//! `DiagnosticMeshBuilder` is the headless implementation: it counts the block
//! faces a mesher would emit and keeps simple counters for diagnostics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::trace;

use crate::core::MtResource;

use super::voxels::{
    block::block_side::BlockSide, chunk::Chunk, chunk_manager::ChunkCoord,
};

/// Consumer of built chunks.
pub trait ChunkMeshBuilder: Send + Sync {
    /// Builds geometry for a lit chunk.
    fn build_mesh(&self, chunk: &Chunk);

    /// Drops any geometry held for an evicted chunk.
    fn release_mesh(&self, _coord: ChunkCoord) {}
}

/// A mesh builder that records what it was asked to do.
#[derive(Default)]
pub struct DiagnosticMeshBuilder {
    builds: AtomicUsize,
    releases: AtomicUsize,
    faces: MtResource<HashMap<ChunkCoord, usize>>,
}

impl DiagnosticMeshBuilder {
    /// Creates a new diagnostic builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `build_mesh` calls so far.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Number of `release_mesh` calls so far.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Returns `true` if geometry is currently held for `coord`.
    pub fn is_chunk_meshed(&self, coord: ChunkCoord) -> bool {
        self.faces.get().contains_key(&coord)
    }

    /// Visible faces counted at the last build of `coord`.
    pub fn face_count(&self, coord: ChunkCoord) -> Option<usize> {
        self.faces.get().get(&coord).copied()
    }

    /// Number of chunks currently holding geometry.
    pub fn meshed_chunk_count(&self) -> usize {
        self.faces.get().len()
    }

    /// Counts faces of solid blocks that touch an empty block or the chunk edge.
    fn count_visible_faces(chunk: &Chunk) -> usize {
        let dims = chunk.dimensions();
        let mut faces = 0;
        for (position, block) in chunk.iter_blocks() {
            if !block.exists() {
                continue;
            }
            for side in BlockSide::all() {
                let offset = side.offset();
                let x = position.x as i32 + offset.x;
                let y = position.y as i32 + offset.y;
                let z = position.z as i32 + offset.z;
                let inside = x >= 0
                    && y >= 0
                    && z >= 0
                    && (x as usize) < dims.width
                    && (y as usize) < dims.height
                    && (z as usize) < dims.length;
                if !inside || !chunk.block_at(x as usize, y as usize, z as usize).exists() {
                    faces += 1;
                }
            }
        }
        faces
    }
}

impl ChunkMeshBuilder for DiagnosticMeshBuilder {
    fn build_mesh(&self, chunk: &Chunk) {
        let faces = Self::count_visible_faces(chunk);
        trace!("Meshed chunk {:?}: {} faces", chunk.position, faces);
        self.faces.get_mut().insert(chunk.position, faces);
        self.builds.fetch_add(1, Ordering::SeqCst);
    }

    fn release_mesh(&self, coord: ChunkCoord) {
        self.faces.get_mut().remove(&coord);
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::{block_type::BlockType, Block},
        chunk::ChunkDimensions,
    };

    #[test]
    fn a_lone_block_shows_six_faces() {
        let dims = ChunkDimensions {
            width: 4,
            height: 4,
            length: 4,
        };
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), dims);
        chunk.set_block(1, 1, 1, Block::new(BlockType::ROCK));
        chunk.set_block(2, 1, 1, Block::new(BlockType::ROCK));

        let builder = DiagnosticMeshBuilder::new();
        builder.build_mesh(&chunk);
        assert_eq!(builder.face_count(chunk.position), Some(10));
        assert_eq!(builder.build_count(), 1);
    }

    #[test]
    fn release_forgets_the_mesh() {
        let chunk = Chunk::new(ChunkCoord::new(3, 3), ChunkDimensions::default());
        let builder = DiagnosticMeshBuilder::new();
        builder.build_mesh(&chunk);
        assert!(builder.is_chunk_meshed(chunk.position));

        builder.release_mesh(chunk.position);
        assert!(!builder.is_chunk_meshed(chunk.position));
        assert_eq!(builder.release_count(), 1);
        assert_eq!(builder.meshed_chunk_count(), 0);
    }
}
