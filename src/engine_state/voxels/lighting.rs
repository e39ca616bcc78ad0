//! # Lighting Module
//!
//! Per-block lighting: one sunlight channel and three independent colored
//! channels, all in `0..=MAX_LIGHT`.
//!
//! ## Algorithm
//!
//! `process` clears a chunk and refills it.
//!
//! * **Clear** walks every column top-down. Blocks above the first solid block
//!   see the sky and get full sunlight, everything from that block down gets
//!   none. Colored channels are reset to the block type's emission, so emissive
//!   blocks keep their seed value and everything else goes dark.
//! * **Fill** floods each channel outward from its sources: empty blocks with
//!   sunlight above 1, and any block with a non-zero colored value. Sunlight
//!   loses a tenth per step (integer truncation) and passes through empty blocks
//!   and water; colored light loses exactly 1 per step and only passes through
//!   empty blocks.
//!
//! A block only accepts light that is brighter than what it already holds. That
//! guard is the sole termination condition: each block can only be improved a
//! bounded number of times, so the flood ends even though adjacent chunks light
//! each other back and forth.
//!
//! ## Cross-chunk propagation
//!
//! The flood is a work list rather than recursion. Work is grouped by chunk
//! coordinate; a step off the X or Z face of a chunk is queued for the
//! neighbouring chunk, looked up in the `ChunkManager`, and handled after the
//! current chunk's work runs dry. Steps into a chunk that is not resident, or
//! whose terrain is not generated yet, are dropped: light stops at the edge of
//! the world and at the edge of what has been generated. Only one chunk
//! lock is held at any time, so two builds running on adjacent chunks cannot
//! deadlock each other.
//!
//! Light pushed into a neighbour is not reflected in the neighbour's dirty flag.
//! The neighbour's own next `process` starts with a clear and keeps only light
//! that its own flood, or a later flood from this chunk, puts back.

use std::collections::HashMap;

use cgmath::Point3;

use super::block::{block_side::BlockSide, Block, MAX_LIGHT};
use super::chunk::{Chunk, ChunkDimensions};
use super::chunk_manager::{ChunkCoord, ChunkManager, CompassDirection};

/// One of the four light channels stored in every block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LightChannel {
    /// Sunlight
    Sun,
    /// Red block light
    Red,
    /// Green block light
    Green,
    /// Blue block light
    Blue,
}

impl LightChannel {
    /// All channels, sunlight first.
    pub const ALL: [LightChannel; 4] = [
        LightChannel::Sun,
        LightChannel::Red,
        LightChannel::Green,
        LightChannel::Blue,
    ];

    /// Reads this channel from a block.
    pub fn read(self, block: &Block) -> u8 {
        match self {
            LightChannel::Sun => block.sun,
            LightChannel::Red => block.r,
            LightChannel::Green => block.g,
            LightChannel::Blue => block.b,
        }
    }

    fn write(self, block: &mut Block, light: u8) {
        match self {
            LightChannel::Sun => block.sun = light,
            LightChannel::Red => block.r = light,
            LightChannel::Green => block.g = light,
            LightChannel::Blue => block.b = light,
        }
    }

    /// The light a block passes on to its neighbours.
    pub fn attenuate(self, light: u8) -> u8 {
        match self {
            LightChannel::Sun => (light as u16 * 9 / 10) as u8,
            _ => light.saturating_sub(1),
        }
    }

    /// Returns `true` if light of this channel can flood into `block`.
    pub fn can_enter(self, block: &Block) -> bool {
        match self {
            LightChannel::Sun => block.get_type().passes_sunlight(),
            _ => !block.exists(),
        }
    }

    fn is_source(self, block: &Block) -> bool {
        match self {
            LightChannel::Sun => !block.exists() && block.sun > 1,
            _ => self.read(block) > 0,
        }
    }
}

/// A pending light write inside one chunk.
#[derive(Copy, Clone, Debug)]
struct LightNode {
    position: Point3<usize>,
    light: u8,
}

/// Outstanding flood work, grouped by the chunk it lands in.
#[derive(Default)]
struct Frontier {
    pending: HashMap<ChunkCoord, Vec<LightNode>>,
}

impl Frontier {
    fn push(&mut self, coord: ChunkCoord, node: LightNode) {
        self.pending.entry(coord).or_default().push(node);
    }

    fn take_next(&mut self) -> Option<(ChunkCoord, Vec<LightNode>)> {
        let coord = *self.pending.keys().next()?;
        let nodes = self.pending.remove(&coord)?;
        Some((coord, nodes))
    }
}

/// Recomputes chunk lighting.
#[derive(Clone, Copy, Debug, Default)]
pub struct LightingProcessor;

impl LightingProcessor {
    /// Creates a new lighting processor.
    pub fn new() -> Self {
        LightingProcessor
    }

    /// Clears and refills the lighting of the chunk at `coord`.
    ///
    /// Does nothing if the chunk is not resident or has been disposed.
    ///
    /// # Returns
    /// The number of light values written by the fill, across all chunks.
    pub fn process(&self, chunks: &ChunkManager, coord: ChunkCoord) -> usize {
        let Some(handle) = chunks.get(coord) else {
            return 0;
        };
        {
            let mut chunk = handle.get_mut();
            if chunk.is_disposed() {
                return 0;
            }
            Self::clear(&mut chunk);
        }
        self.fill(chunks, coord)
    }

    /// Resets a chunk's light to its sky exposure and block emission.
    pub fn clear(chunk: &mut Chunk) {
        if chunk.is_disposed() {
            return;
        }
        let dims = chunk.dimensions();
        for x in 0..dims.width {
            for z in 0..dims.length {
                let mut in_shade = false;
                for y in (0..dims.height).rev() {
                    let block = chunk.block_mut(x, y, z);
                    if block.exists() {
                        in_shade = true;
                    }
                    block.sun = if in_shade { 0 } else { MAX_LIGHT };
                    let [r, g, b] = block.get_type().emission();
                    block.r = r;
                    block.g = g;
                    block.b = b;
                }
            }
        }
    }

    /// Floods every channel outward from the sources in the chunk at `coord`.
    ///
    /// Light values only ever increase during a fill.
    ///
    /// # Returns
    /// The number of light values written, across all chunks.
    pub fn fill(&self, chunks: &ChunkManager, coord: ChunkCoord) -> usize {
        let mut writes = 0;
        for channel in LightChannel::ALL {
            let Some(frontier) = Self::seed(chunks, coord, channel) else {
                return writes;
            };
            writes += Self::flood(chunks, coord, channel, frontier);
        }
        writes
    }

    /// Collects the first step out of every source block of `channel`.
    fn seed(chunks: &ChunkManager, coord: ChunkCoord, channel: LightChannel) -> Option<Frontier> {
        let open = Self::generated_neighbours(chunks, coord);
        let handle = chunks.get(coord)?;
        let chunk = handle.get();
        if chunk.is_disposed() {
            return None;
        }
        let dims = chunk.dimensions();

        let mut frontier = Frontier::default();
        for (position, block) in chunk.iter_blocks() {
            if !channel.is_source(&block) {
                continue;
            }
            let light = channel.attenuate(channel.read(&block));
            if light == 0 {
                continue;
            }
            for side in BlockSide::all() {
                let Some((target, local)) = Self::step(&dims, coord, position, side) else {
                    continue;
                };
                if target == coord {
                    let neighbour = chunk.block_at(local.x, local.y, local.z);
                    if !channel.can_enter(&neighbour) || channel.read(&neighbour) >= light {
                        continue;
                    }
                } else if !open.contains(&target) {
                    continue;
                }
                frontier.push(target, LightNode { position: local, light });
            }
        }
        Some(frontier)
    }

    /// Face neighbours of `coord` that are resident and hold generated terrain.
    ///
    /// Each neighbour lock is released before the next is taken.
    fn generated_neighbours(chunks: &ChunkManager, coord: ChunkCoord) -> Vec<ChunkCoord> {
        [
            CompassDirection::North,
            CompassDirection::South,
            CompassDirection::East,
            CompassDirection::West,
        ]
        .into_iter()
        .filter(|direction| {
            chunks.neighbor(coord, *direction).is_some_and(|neighbour| {
                let neighbour = neighbour.get();
                neighbour.generated && !neighbour.is_disposed()
            })
        })
        .map(|direction| coord.offset(direction))
        .collect()
    }

    /// Drains the frontier one chunk at a time.
    ///
    /// The chunk being processed is always flooded; any other chunk only once
    /// its terrain has been generated.
    fn flood(
        chunks: &ChunkManager,
        origin: ChunkCoord,
        channel: LightChannel,
        mut frontier: Frontier,
    ) -> usize {
        let mut writes = 0;
        while let Some((coord, mut stack)) = frontier.take_next() {
            let Some(handle) = chunks.get(coord) else {
                continue;
            };
            let mut chunk = handle.get_mut();
            if chunk.is_disposed() || (coord != origin && !chunk.generated) {
                continue;
            }
            let dims = chunk.dimensions();

            while let Some(node) = stack.pop() {
                let block = chunk.block_mut(node.position.x, node.position.y, node.position.z);
                if !channel.can_enter(block) || node.light <= channel.read(block) {
                    continue;
                }
                channel.write(block, node.light);
                writes += 1;

                let next = channel.attenuate(node.light);
                if next == 0 {
                    continue;
                }
                for side in BlockSide::all() {
                    let Some((target, local)) = Self::step(&dims, coord, node.position, side) else {
                        continue;
                    };
                    let next_node = LightNode {
                        position: local,
                        light: next,
                    };
                    if target == coord {
                        stack.push(next_node);
                    } else if chunks.contains_key(target) {
                        frontier.push(target, next_node);
                    }
                }
            }
        }
        writes
    }

    /// Steps from a block across one face, wrapping into the neighbouring chunk
    /// on the X and Z faces. Returns `None` past the top or bottom of the world.
    fn step(
        dims: &ChunkDimensions,
        coord: ChunkCoord,
        position: Point3<usize>,
        side: BlockSide,
    ) -> Option<(ChunkCoord, Point3<usize>)> {
        let offset = side.offset();
        let y = position.y as i32 + offset.y;
        if y < 0 || y >= dims.height as i32 {
            return None;
        }

        let mut target = coord;
        let mut x = position.x as i32 + offset.x;
        let mut z = position.z as i32 + offset.z;
        if x < 0 {
            target = target.offset(CompassDirection::West);
            x = dims.width as i32 - 1;
        } else if x >= dims.width as i32 {
            target = target.offset(CompassDirection::East);
            x = 0;
        }
        if z < 0 {
            target = target.offset(CompassDirection::South);
            z = dims.length as i32 - 1;
        } else if z >= dims.length as i32 {
            target = target.offset(CompassDirection::North);
            z = 0;
        }

        Some((target, Point3::new(x as usize, y as usize, z as usize)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MtResource;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn small_dims() -> ChunkDimensions {
        ChunkDimensions {
            width: 4,
            height: 8,
            length: 4,
        }
    }

    #[test]
    fn sunlight_attenuates_by_a_tenth() {
        let chain: Vec<u8> = std::iter::successors(Some(MAX_LIGHT), |l| {
            Some(LightChannel::Sun.attenuate(*l)).filter(|l| *l > 0)
        })
        .collect();
        assert_eq!(chain, vec![16, 14, 12, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn colored_light_decays_linearly() {
        assert_eq!(LightChannel::Red.attenuate(16), 15);
        assert_eq!(LightChannel::Blue.attenuate(1), 0);
        assert_eq!(LightChannel::Green.attenuate(0), 0);
    }

    #[test]
    fn water_passes_sunlight_but_not_colored_light() {
        let water = Block::new(BlockType::WATER);
        assert!(LightChannel::Sun.can_enter(&water));
        assert!(!LightChannel::Red.can_enter(&water));
    }

    #[test]
    fn step_wraps_across_faces() {
        let dims = small_dims();
        let origin = ChunkCoord::new(0, 0);
        assert_eq!(
            LightingProcessor::step(&dims, origin, Point3::new(0, 2, 1), BlockSide::LEFT),
            Some((ChunkCoord::new(-1, 0), Point3::new(3, 2, 1)))
        );
        assert_eq!(
            LightingProcessor::step(&dims, origin, Point3::new(1, 2, 3), BlockSide::FRONT),
            Some((ChunkCoord::new(0, 1), Point3::new(1, 2, 0)))
        );
        assert_eq!(
            LightingProcessor::step(&dims, origin, Point3::new(1, 7, 1), BlockSide::TOP),
            None
        );
    }

    #[test]
    fn clear_restores_emission_and_sky_exposure() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), small_dims());
        chunk.set_block(1, 3, 1, Block::new(BlockType::LAVA));
        chunk.block_mut(2, 2, 2).r = 9;

        LightingProcessor::clear(&mut chunk);

        assert_eq!(chunk.block_at(1, 4, 1).sun, MAX_LIGHT);
        assert_eq!(chunk.block_at(1, 3, 1).sun, 0);
        assert_eq!(chunk.block_at(1, 0, 1).sun, 0);
        assert_eq!(chunk.block_at(1, 3, 1).r, MAX_LIGHT);
        assert_eq!(chunk.block_at(2, 2, 2).r, 0);
    }

    #[test]
    fn emissive_block_lights_a_sealed_room() {
        let dims = small_dims();
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = Chunk::new(coord, dims);
        // Solid roof at the top so the room below gets no sun.
        for x in 0..4 {
            for z in 0..4 {
                chunk.set_block(x, 7, z, Block::new(BlockType::ROCK));
            }
        }
        chunk.set_block(0, 0, 0, Block::new(BlockType::CRYSTAL));

        let mut chunks = ChunkManager::new();
        chunks.set(coord, MtResource::new(chunk));
        LightingProcessor::new().process(&chunks, coord);

        let chunk = chunks.get(coord).unwrap();
        let chunk = chunk.get();
        assert_eq!(chunk.block_at(1, 0, 0).b, 15);
        assert_eq!(chunk.block_at(1, 1, 0).b, 14);
        assert_eq!(chunk.block_at(3, 3, 3).b, MAX_LIGHT - 9);
        assert_eq!(chunk.block_at(3, 3, 3).sun, 0);
        // The roof itself never takes light.
        assert_eq!(chunk.block_at(0, 7, 1).b, 0);
    }

    #[test]
    fn missing_or_disposed_chunks_are_ignored() {
        let coord = ChunkCoord::new(0, 0);
        let mut chunks = ChunkManager::new();
        assert_eq!(LightingProcessor::new().process(&chunks, coord), 0);

        let mut chunk = Chunk::new(coord, small_dims());
        chunk.dispose();
        chunks.set(coord, MtResource::new(chunk));
        assert_eq!(LightingProcessor::new().process(&chunks, coord), 0);
    }
}
