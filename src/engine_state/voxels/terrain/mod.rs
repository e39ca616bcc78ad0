//! # Terrain Generation
//!
//! Fills freshly created chunks with blocks. Every generator works column by
//! column: it decides a rock height and a dirt height for the world column
//! `(x, z)` and the shared `generate` fills the column from the top down.
//!
//! * `y > dirt` - empty
//! * `rock < y <= dirt` - dirt
//! * `y <= rock` - rock
//!
//! Heights are a pure function of world coordinates and the seed, so a chunk
//! that is evicted and later regenerated comes back identical.
//!
//! ## Generators
//!
//! * `NoiseTerrain` - layered Perlin noise, with `standard`, `mountainous` and
//!   `valley` profiles
//! * `FlatTerrain` - constant heights, for debugging and tests

use std::sync::Arc;

use log::debug;

use crate::engine_state::config::TerrainKind;

use super::block::{block_type::BlockType, Block};
use super::chunk::Chunk;

pub mod noise_terrain;

pub use noise_terrain::{NoiseTerrain, Octave, TerrainProfile};

/// Fills chunks with terrain.
///
/// Implementors provide the two height functions; `generate` is shared.
pub trait TerrainGenerator: Send + Sync {
    /// Highest Y of the rock layer in world column `(world_x, world_z)`.
    fn rock_height(&self, world_x: i32, world_z: i32) -> usize;

    /// Highest Y of the dirt layer in world column `(world_x, world_z)`.
    ///
    /// A result equal to `rock_height` means the column has no dirt.
    fn dirt_height(&self, world_x: i32, world_z: i32, rock_height: usize) -> usize;

    /// Fills an ungenerated chunk and marks it generated (and dirty).
    ///
    /// Does nothing for a chunk that is already generated or disposed.
    fn generate(&self, chunk: &mut Chunk) {
        if chunk.generated || chunk.is_disposed() {
            return;
        }

        let dims = chunk.dimensions();
        let top = dims.height - 1;
        let origin = chunk.world_origin;

        for x in 0..dims.width {
            for z in 0..dims.length {
                let world_x = origin.x + x as i32;
                let world_z = origin.z + z as i32;
                let rock = self.rock_height(world_x, world_z).min(top);
                let dirt = self.dirt_height(world_x, world_z, rock).clamp(rock, top);

                for y in (0..dims.height).rev() {
                    let block_type = if y > dirt {
                        BlockType::NONE
                    } else if y > rock {
                        BlockType::DIRT
                    } else {
                        BlockType::ROCK
                    };
                    chunk.set_block(x, y, z, Block::new(block_type));
                }
            }
        }

        chunk.generated = true;
        debug!("Generated chunk {:?}", chunk.position);
    }
}

/// A generator with the same heights in every column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FlatTerrain {
    /// Highest Y of rock
    pub rock_height: usize,
    /// Highest Y of dirt
    pub dirt_height: usize,
}

impl Default for FlatTerrain {
    fn default() -> Self {
        FlatTerrain {
            rock_height: 40,
            dirt_height: 44,
        }
    }
}

impl TerrainGenerator for FlatTerrain {
    fn rock_height(&self, _world_x: i32, _world_z: i32) -> usize {
        self.rock_height
    }

    fn dirt_height(&self, _world_x: i32, _world_z: i32, rock_height: usize) -> usize {
        self.dirt_height.max(rock_height)
    }
}

/// Builds the generator selected by the configuration.
pub fn create_generator(kind: TerrainKind, seed: u32) -> Arc<dyn TerrainGenerator> {
    match kind {
        TerrainKind::Flat => Arc::new(FlatTerrain::default()),
        TerrainKind::Standard => Arc::new(NoiseTerrain::new(seed, TerrainProfile::standard())),
        TerrainKind::Mountainous => {
            Arc::new(NoiseTerrain::new(seed, TerrainProfile::mountainous()))
        }
        TerrainKind::Valley => Arc::new(NoiseTerrain::new(seed, TerrainProfile::valley())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{chunk::ChunkDimensions, chunk_manager::ChunkCoord};

    #[test]
    fn flat_terrain_fills_layers() {
        let mut chunk = Chunk::new(ChunkCoord::new(2, -1), ChunkDimensions::default());
        FlatTerrain::default().generate(&mut chunk);

        assert!(chunk.generated);
        assert!(chunk.dirty);
        assert_eq!(chunk.block_at(3, 45, 3).get_type(), BlockType::NONE);
        assert_eq!(chunk.block_at(3, 44, 3).get_type(), BlockType::DIRT);
        assert_eq!(chunk.block_at(3, 41, 3).get_type(), BlockType::DIRT);
        assert_eq!(chunk.block_at(3, 40, 3).get_type(), BlockType::ROCK);
        assert_eq!(chunk.block_at(3, 0, 3).get_type(), BlockType::ROCK);
        assert_eq!(chunk.highest_solid_block_offset, 44);
    }

    #[test]
    fn generated_chunks_are_left_alone() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), ChunkDimensions::default());
        chunk.generated = true;
        FlatTerrain::default().generate(&mut chunk);
        assert!(!chunk.dirty);
        assert!(!chunk.block_at(0, 0, 0).exists());
    }

    #[test]
    fn heights_are_clamped_to_the_chunk() {
        let dims = ChunkDimensions {
            width: 2,
            height: 8,
            length: 2,
        };
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), dims);
        FlatTerrain {
            rock_height: 3,
            dirt_height: 50,
        }
        .generate(&mut chunk);
        assert_eq!(chunk.block_at(1, 7, 1).get_type(), BlockType::DIRT);
        assert_eq!(chunk.block_at(1, 3, 1).get_type(), BlockType::ROCK);
    }

    #[test]
    fn factory_honours_the_kind() {
        let flat = create_generator(TerrainKind::Flat, 7);
        assert_eq!(flat.rock_height(123, -456), FlatTerrain::default().rock_height);

        let standard = create_generator(TerrainKind::Standard, 7);
        let again = create_generator(TerrainKind::Standard, 7);
        assert_eq!(standard.rock_height(123, -456), again.rock_height(123, -456));
    }
}
