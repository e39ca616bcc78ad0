//! # Block Module
//!
//! This module provides the core block-related functionality for the terrain engine.
//! It includes block type definitions, block face directions, and the block value
//! itself: a type tag plus four light channels.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// The brightest value any light channel can hold.
pub const MAX_LIGHT: u8 = 16;

/// Represents a single voxel block in the world.
///
/// A block is a type tag plus four brightness channels: sunlight and three
/// independent colored channels. Every channel lies in `0..=MAX_LIGHT`.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute and the all-`u8` fields make the block `Pod`, so
/// a chunk's block array can be handed to a mesher as raw bytes.
///
/// The type tag is private: a block is built from a `BlockType`, or from a raw
/// tag through the checked `Block::from_tag`, so every stored tag decodes.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq)]
pub struct Block {
    block_type: BlockTypeSize,
    /// Sunlight level
    pub sun: u8,
    /// Red light level
    pub r: u8,
    /// Green light level
    pub g: u8,
    /// Blue light level
    pub b: u8,
}

impl Block {
    /// The empty block, returned for any coordinate outside the resident world.
    pub const EMPTY: Block = Block {
        block_type: BlockType::NONE as BlockTypeSize,
        sun: 0,
        r: 0,
        g: 0,
        b: 0,
    };

    /// Creates a new unlit block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
            ..Block::EMPTY
        }
    }

    /// Creates an unlit block from a raw type tag.
    ///
    /// # Returns
    /// `None` if `tag` names no `BlockType`.
    pub fn from_tag(tag: BlockTypeSize) -> Option<Self> {
        BlockType::from_tag(tag).map(Block::new)
    }

    /// The compact type tag stored in this block.
    pub fn type_tag(&self) -> BlockTypeSize {
        self.block_type
    }

    /// Returns the rich type of this block.
    pub fn get_type(&self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }

    /// Returns `true` unless this is the `NONE` sentinel.
    pub fn exists(&self) -> bool {
        self.block_type != BlockType::NONE as BlockTypeSize
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_does_not_exist() {
        assert!(!Block::EMPTY.exists());
        assert!(Block::new(BlockType::ROCK).exists());
        assert_eq!(Block::default(), Block::EMPTY);
    }

    #[test]
    fn raw_tags_are_checked() {
        assert_eq!(Block::from_tag(BlockType::SAND as u8), Some(Block::new(BlockType::SAND)));
        assert_eq!(Block::from_tag(200), None);
        assert_eq!(Block::new(BlockType::WATER).type_tag(), BlockType::WATER as u8);
    }

    #[test]
    fn block_is_five_bytes() {
        let blocks = [Block::new(BlockType::LAVA), Block::new(BlockType::DIRT)];
        let bytes: &[u8] = bytemuck::cast_slice(&blocks);
        assert_eq!(bytes.len(), 10);
        assert_eq!(bytes[0], BlockType::LAVA as u8);
        assert_eq!(bytes[5], BlockType::DIRT as u8);
    }
}
