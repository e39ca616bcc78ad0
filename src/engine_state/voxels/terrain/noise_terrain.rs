//! Layered Perlin noise terrain.
//!
//! Each height is a weighted sum of 2D Perlin octaves sampled at world
//! coordinates, normalised to `0..=1` and mapped onto `base + amplitude`.
//! Dirt depth is drawn from a second, offset sample of the same noise so the
//! two layers do not rise and fall together.

use noise::{NoiseFn, Perlin};

use super::TerrainGenerator;

/// Offset applied to world coordinates when sampling dirt depth.
const DIRT_SAMPLE_OFFSET: f64 = 1_000.5;

/// One layer of noise.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Octave {
    /// Scale applied to world coordinates
    pub frequency: f64,
    /// Contribution to the weighted sum
    pub weight: f64,
}

impl Octave {
    /// Creates a new octave.
    pub const fn new(frequency: f64, weight: f64) -> Self {
        Octave { frequency, weight }
    }
}

/// The shape of a noise terrain.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainProfile {
    /// Lowest rock height
    pub rock_base: f64,
    /// Rock height range above the base
    pub rock_amplitude: f64,
    /// Octaves of the rock height
    pub rock_octaves: Vec<Octave>,
    /// Thinnest dirt layer
    pub dirt_base: f64,
    /// Dirt depth range above the base
    pub dirt_amplitude: f64,
    /// Octaves of the dirt depth
    pub dirt_octaves: Vec<Octave>,
}

impl TerrainProfile {
    /// Rolling hills.
    pub fn standard() -> Self {
        TerrainProfile {
            rock_base: 32.0,
            rock_amplitude: 40.0,
            rock_octaves: vec![
                Octave::new(0.004, 1.0),
                Octave::new(0.02, 0.35),
                Octave::new(0.08, 0.08),
            ],
            dirt_base: 1.0,
            dirt_amplitude: 6.0,
            dirt_octaves: vec![Octave::new(0.03, 1.0), Octave::new(0.1, 0.25)],
        }
    }

    /// Tall, rough peaks with thin soil.
    pub fn mountainous() -> Self {
        TerrainProfile {
            rock_base: 30.0,
            rock_amplitude: 80.0,
            rock_octaves: vec![
                Octave::new(0.008, 1.0),
                Octave::new(0.035, 0.5),
                Octave::new(0.12, 0.15),
            ],
            dirt_base: 0.0,
            dirt_amplitude: 3.0,
            dirt_octaves: vec![Octave::new(0.05, 1.0)],
        }
    }

    /// Low, gentle ground with deep soil.
    pub fn valley() -> Self {
        TerrainProfile {
            rock_base: 20.0,
            rock_amplitude: 24.0,
            rock_octaves: vec![Octave::new(0.003, 1.0), Octave::new(0.015, 0.2)],
            dirt_base: 4.0,
            dirt_amplitude: 10.0,
            dirt_octaves: vec![Octave::new(0.02, 1.0), Octave::new(0.06, 0.3)],
        }
    }
}

/// A terrain generator driven by seeded Perlin noise.
pub struct NoiseTerrain {
    perlin: Perlin,
    profile: TerrainProfile,
}

impl NoiseTerrain {
    /// Creates a generator for `seed` with the given profile.
    pub fn new(seed: u32, profile: TerrainProfile) -> Self {
        NoiseTerrain {
            perlin: Perlin::new(seed),
            profile,
        }
    }

    /// The profile this generator was built with.
    pub fn profile(&self) -> &TerrainProfile {
        &self.profile
    }

    /// Weighted octave sum at `(x, z)`, mapped to `0..=1`.
    fn sample(&self, octaves: &[Octave], x: f64, z: f64) -> f64 {
        let total_weight: f64 = octaves.iter().map(|octave| octave.weight).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let sum: f64 = octaves
            .iter()
            .map(|octave| {
                octave.weight * self.perlin.get([x * octave.frequency, z * octave.frequency])
            })
            .sum();
        ((sum / total_weight + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

impl TerrainGenerator for NoiseTerrain {
    fn rock_height(&self, world_x: i32, world_z: i32) -> usize {
        let noise = self.sample(&self.profile.rock_octaves, world_x as f64, world_z as f64);
        (self.profile.rock_base + noise * self.profile.rock_amplitude).max(0.0) as usize
    }

    fn dirt_height(&self, world_x: i32, world_z: i32, rock_height: usize) -> usize {
        let noise = self.sample(
            &self.profile.dirt_octaves,
            world_x as f64 + DIRT_SAMPLE_OFFSET,
            world_z as f64 - DIRT_SAMPLE_OFFSET,
        );
        let depth = (self.profile.dirt_base + noise * self.profile.dirt_amplitude).max(0.0);
        rock_height + depth as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        chunk::{Chunk, ChunkDimensions},
        chunk_manager::ChunkCoord,
    };

    #[test]
    fn same_seed_same_chunk() {
        let first = NoiseTerrain::new(42, TerrainProfile::standard());
        let second = NoiseTerrain::new(42, TerrainProfile::standard());

        let coord = ChunkCoord::new(-3, 5);
        let mut a = Chunk::new(coord, ChunkDimensions::default());
        let mut b = Chunk::new(coord, ChunkDimensions::default());
        first.generate(&mut a);
        second.generate(&mut b);

        assert!(a.blocks() == b.blocks());
        assert_eq!(a.highest_solid_block_offset, b.highest_solid_block_offset);
    }

    #[test]
    fn heights_stay_within_profile() {
        for profile in [
            TerrainProfile::standard(),
            TerrainProfile::mountainous(),
            TerrainProfile::valley(),
        ] {
            let max_rock = (profile.rock_base + profile.rock_amplitude) as usize;
            let max_dirt = (profile.dirt_base + profile.dirt_amplitude) as usize;
            let min_rock = profile.rock_base as usize;
            let terrain = NoiseTerrain::new(9, profile);
            for i in -40..40 {
                let (x, z) = (i * 37, i * -91);
                let rock = terrain.rock_height(x, z);
                let dirt = terrain.dirt_height(x, z, rock);
                assert!((min_rock..=max_rock).contains(&rock));
                assert!(dirt >= rock && dirt - rock <= max_dirt);
            }
        }
    }

    #[test]
    fn terrain_varies_across_columns() {
        let terrain = NoiseTerrain::new(3, TerrainProfile::mountainous());
        let heights: Vec<usize> = (0..64).map(|i| terrain.rock_height(i * 13, i * 7)).collect();
        assert!(heights.iter().any(|h| *h != heights[0]));
    }
}
