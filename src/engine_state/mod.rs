//! # Engine State Module
//!
//! The facade that wires the terrain subsystems together.
//!
//! ## Key Components
//!
//! * `EngineState` - owns the configuration and the shared handles
//! * `config` - startup configuration and its validation
//! * `player_state` - the observer the terrain streams around
//! * `rendering` - the seam to an external mesh builder
//! * `task_management` - the worker pool used by the tasked build strategy
//! * `voxels` - blocks, chunks, the world, terrain, lighting and the chunk builder
//!
//! ## Lifecycle
//!
//! 1. `EngineState::new` validates the configuration and builds an empty world
//! 2. `spawn_player` fills the window around the spawn point and generates and
//!    lights every resident chunk on the calling thread
//! 3. `start` hands streaming over to the chunk builder's worker
//! 4. Gameplay moves the player with `move_player` and edits with `World::set_block`
//! 5. `stop` (or dropping the state) joins the worker

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::info;

use crate::core::MtResource;
use config::{ConfigError, EngineConfig};
use player_state::PlayerState;
use rendering::{ChunkMeshBuilder, DiagnosticMeshBuilder};
use voxels::{chunk_builder::ChunkBuilder, chunk_manager::ChunkCoord, terrain, world::World};

pub mod config;
pub mod player_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container of the terrain engine.
///
/// # Examples
///
/// ```
/// use voxel_terrain::{EngineConfig, EngineState, TerrainKind};
/// use cgmath::Point3;
///
/// let config = EngineConfig {
///     view_range: 1,
///     cache_range: 1,
///     terrain: TerrainKind::Flat,
///     ..EngineConfig::default()
/// };
/// let mut engine = EngineState::new(config).unwrap();
/// engine.spawn_player(Point3::new(8.0, 80.0, 8.0));
/// assert_eq!(engine.world.get().chunks.count(), 9);
///
/// engine.start();
/// engine.stop();
/// ```
pub struct EngineState {
    /// The validated configuration
    pub config: EngineConfig,
    /// The seed the terrain was generated with
    pub seed: u32,
    /// The streamed world
    pub world: MtResource<World>,
    /// The observer
    pub player: MtResource<PlayerState>,
    /// The background pipeline
    pub chunk_builder: ChunkBuilder,
}

impl EngineState {
    /// Builds an engine with the headless `DiagnosticMeshBuilder`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_mesh_builder(config, Arc::new(DiagnosticMeshBuilder::new()))
    }

    /// Builds an engine that hands built chunks to `mesh_builder`.
    pub fn with_mesh_builder(
        config: EngineConfig,
        mesh_builder: Arc<dyn ChunkMeshBuilder>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.seed_or_random();
        info!(
            "Creating engine: {:?} terrain, seed {}, view range {}, cache range {}",
            config.terrain, seed, config.view_range, config.cache_range
        );

        let world = MtResource::new(World::new(&config));
        let player = MtResource::new(PlayerState::new(Point3::new(0.0, 0.0, 0.0), config.chunk));
        let chunk_builder = ChunkBuilder::new(
            world.clone(),
            player.clone(),
            terrain::create_generator(config.terrain, seed),
            mesh_builder,
            &config,
        );

        Ok(EngineState {
            config,
            seed,
            world,
            player,
            chunk_builder,
        })
    }

    /// Places the player and synchronously prepares the window around it.
    ///
    /// Every resident chunk is generated and lit before this returns, so the
    /// player never starts inside unresolved empty space. Call it before
    /// `start`, or with the builder stopped.
    ///
    /// # Returns
    /// The number of pipeline items run.
    pub fn spawn_player(&mut self, position: Point3<f32>) -> usize {
        let center = {
            let mut player = self.player.get_mut();
            player.spawn_at(position);
            player.current_chunk
        };
        let coords = self.world.get_mut().populate_window(center);
        info!("Spawned player at {:?}, populated {} chunks", position, coords.len());

        let start = web_time::Instant::now();
        let processed = self.chunk_builder.pipeline().settle();
        info!("Spawn window ready in {:?} ({} items)", start.elapsed(), processed);
        processed
    }

    /// Moves the player by `delta`.
    pub fn move_player(&self, delta: Vector3<f32>) {
        self.player.get_mut().walk(delta);
    }

    /// The chunk the resident window is currently centred on.
    pub fn current_chunk(&self) -> ChunkCoord {
        self.player.get().current_chunk
    }

    /// Starts the background chunk builder.
    pub fn start(&mut self) -> bool {
        self.chunk_builder.start()
    }

    /// Stops the background chunk builder.
    pub fn stop(&mut self) {
        self.chunk_builder.stop();
    }
}
