#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! An infinite, streamed voxel terrain around a moving observer.
//!
//! The crate keeps a sliding window of chunks resident around the player,
//! fills new chunks from layered Perlin noise, and computes per-block lighting
//! (sunlight plus three colored channels) that floods correctly across chunk
//! borders. Drawing is left to an external mesh builder behind the
//! `ChunkMeshBuilder` trait.
//!
//! ## Key Modules
//!
//! * `core` - the shared-resource primitive and bounding boxes
//! * `engine_state` - configuration, the player, the voxel world and the
//!   background chunk builder
//!
//! ## Architecture
//!
//! * A `World` facade over a `ChunkManager` index of `MtResource<Chunk>`s
//! * A `ChunkBuilder` worker thread that recaches, generates and builds
//! * A `LightingProcessor` that floods light chunk by chunk, holding one chunk
//!   lock at a time
//! * An optional `TaskManager` pool for building several chunks at once
//!
//! ## Usage
//!
//! ```rust
//! use voxel_terrain::{EngineConfig, EngineState, TerrainKind};
//! use cgmath::{Point3, Vector3};
//!
//! let config = EngineConfig {
//!     view_range: 1,
//!     cache_range: 1,
//!     terrain: TerrainKind::Flat,
//!     ..EngineConfig::default()
//! };
//! let mut engine = EngineState::new(config).unwrap();
//! engine.spawn_player(Point3::new(8.0, 80.0, 8.0));
//! engine.start();
//! engine.move_player(Vector3::new(16.0, 0.0, 0.0));
//! engine.stop();
//! ```

use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::{error, info};

pub mod core;
pub mod engine_state;

pub use crate::core::{BoundingBox, MtResource};
pub use engine_state::{
    config::{BuildStrategy, ConfigError, EngineConfig, TerrainKind},
    player_state::PlayerState,
    rendering::{ChunkMeshBuilder, DiagnosticMeshBuilder},
    task_management::{
        task::{Task, TaskResult},
        TaskManager,
    },
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType, Block, MAX_LIGHT},
        chunk::{Chunk, ChunkDimensions},
        chunk_builder::{BuildPipeline, ChunkBuilder, StageOutcome, WorkItem, WorkQueues},
        chunk_manager::{ChunkCoord, ChunkManager, CompassDirection},
        lighting::{LightChannel, LightingProcessor},
        terrain::{create_generator, FlatTerrain, NoiseTerrain, TerrainGenerator, TerrainProfile},
        world::{WindowSlide, World},
    },
    EngineState,
};

/// Environment variable naming a JSON configuration file for `run`.
pub const CONFIG_ENV_VAR: &str = "VOXEL_TERRAIN_CONFIG";

/// How long the headless demo walks the player.
const DEMO_DURATION: Duration = Duration::from_secs(5);

/// Blocks per second the demo player walks east.
const DEMO_SPEED: f32 = 12.0;

/// Runs the headless demo: spawn, then walk east while the builder streams.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            EngineConfig::from_path(&path)
        }
        Err(_) => Ok(EngineConfig::default()),
    };

    let mut engine = match config.and_then(EngineState::new) {
        Ok(engine) => engine,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    engine.spawn_player(Point3::new(8.0, 90.0, 8.0));
    engine.start();

    let tick = Duration::from_millis(100);
    let start = web_time::Instant::now();
    while start.elapsed() < DEMO_DURATION {
        std::thread::sleep(tick);
        engine.move_player(Vector3::new(DEMO_SPEED * tick.as_secs_f32(), 0.0, 0.0));
        info!(
            "Player in chunk {:?}: {} generation and {} build items waiting",
            engine.current_chunk(),
            engine.chunk_builder.generation_queue_count(),
            engine.chunk_builder.building_queue_count()
        );
    }

    engine.stop();
    info!(
        "Finished with {} resident chunks",
        engine.world.get().chunks.count()
    );
}
