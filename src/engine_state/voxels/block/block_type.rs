//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world, and
//! the per-type properties the lighting pass needs: whether sunlight passes
//! through a block and which colored light it emits.

use num_derive::FromPrimitive;

use super::{BlockTypeSize, MAX_LIGHT};

/// Enumerates all possible block types in the voxel world.
///
/// The `FromPrimitive` derive allows conversion from the compact `u8` tag
/// stored in each `Block`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// The empty sentinel. Transparent to all light.
    NONE,

    /// Soil layer above the rock.
    DIRT,

    /// Grass-topped dirt.
    GRASS,

    /// Bedrock and mountain cores.
    ROCK,

    /// Beach sand.
    SAND,

    /// Water. Sunlight passes through, colored light does not.
    WATER,

    /// Tree foliage.
    LEAVES,

    /// Molten rock, emits warm light.
    LAVA,

    /// Glowing crystal, emits cold light.
    CRYSTAL,
}

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Panics
    /// Panics if the input value doesn't correspond to a valid `BlockType`.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        let btype_option = Self::from_tag(btype);
        btype_option.unwrap()
    }

    /// Converts a `BlockTypeSize` to a `BlockType`, if it names one.
    pub fn from_tag(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Returns `true` if sunlight can flood into a block of this type.
    pub fn passes_sunlight(self) -> bool {
        matches!(self, BlockType::NONE | BlockType::WATER)
    }

    /// The `[r, g, b]` light a block of this type emits.
    ///
    /// Non-emissive types return `[0, 0, 0]`. The lighting pass restores these
    /// seed values on every clear, which is what makes a block a light source.
    pub fn emission(self) -> [u8; 3] {
        match self {
            BlockType::LAVA => [MAX_LIGHT, 6, 0],
            BlockType::CRYSTAL => [4, 8, MAX_LIGHT],
            _ => [0, 0, 0],
        }
    }
}
