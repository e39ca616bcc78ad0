//! # Voxel Terrain Demo
//!
//! Headless entry point. Spawns a player, walks it east for a few seconds while
//! the chunk builder streams terrain, and logs what the pipeline is doing.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! VOXEL_TERRAIN_CONFIG=terrain.json RUST_LOG=debug cargo run --release
//! ```

fn main() {
    voxel_terrain::run();
}
