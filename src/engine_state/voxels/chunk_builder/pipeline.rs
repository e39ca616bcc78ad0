//! # Build Pipeline
//!
//! The stages the chunk builder runs: recache, scan, generate, build. A
//! `BuildPipeline` is a bundle of shared handles, so it is cheap to clone into
//! the builder thread and into every pool task.
//!
//! ## Locking
//!
//! Every stage that touches a chunk holds the world read guard for its whole
//! duration. `recache_chunks` takes the world write guard, so a chunk can never
//! be evicted and disposed while a stage is still working on it. Inside a stage
//! at most one chunk lock is held at a time.
//!
//! Lock order is player, then world, then chunk, then queues; no path takes
//! them the other way round.

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::core::MtResource;
use crate::engine_state::player_state::PlayerState;
use crate::engine_state::rendering::ChunkMeshBuilder;
use crate::engine_state::voxels::{
    chunk_manager::{ChunkCoord, CompassDirection},
    lighting::LightingProcessor,
    terrain::TerrainGenerator,
    world::{WindowSlide, World},
};

use super::work_queue::{WorkItem, WorkQueues};

/// What a stage did with the chunk it was given.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    /// The chunk was filled with terrain
    Generated,
    /// The chunk was relit and handed to the mesh builder
    Built,
    /// The chunk had nothing to do
    Clean,
    /// No chunk is resident at the coordinate any more
    Stale,
}

/// Shared state of the chunk pipeline.
#[derive(Clone)]
pub struct BuildPipeline {
    world: MtResource<World>,
    player: MtResource<PlayerState>,
    queues: MtResource<WorkQueues>,
    terrain: Arc<dyn TerrainGenerator>,
    lighting: LightingProcessor,
    mesh_builder: Arc<dyn ChunkMeshBuilder>,
}

impl BuildPipeline {
    /// Creates a pipeline with empty queues.
    pub fn new(
        world: MtResource<World>,
        player: MtResource<PlayerState>,
        terrain: Arc<dyn TerrainGenerator>,
        mesh_builder: Arc<dyn ChunkMeshBuilder>,
    ) -> Self {
        BuildPipeline {
            world,
            player,
            queues: MtResource::new(WorkQueues::new()),
            terrain,
            lighting: LightingProcessor::new(),
            mesh_builder,
        }
    }

    /// The world this pipeline streams.
    pub fn world(&self) -> &MtResource<World> {
        &self.world
    }

    /// The observer this pipeline follows.
    pub fn player(&self) -> &MtResource<PlayerState> {
        &self.player
    }

    /// Number of waiting generation items.
    pub fn generation_queue_count(&self) -> usize {
        self.queues.get().generation_count()
    }

    /// Number of waiting build items.
    pub fn building_queue_count(&self) -> usize {
        self.queues.get().build_count()
    }

    /// Takes the next item, generation first.
    pub fn take(&self) -> Option<WorkItem> {
        self.queues.get_mut().take()
    }

    /// Returns `true` if the world follows the player and the player has left
    /// the chunk the window is centred on.
    pub fn needs_recache(&self) -> bool {
        let infinite = self.world.get().is_infinite();
        infinite && !self.player.get().in_current_chunk()
    }

    /// One scheduling step: recache if the player moved, then scan.
    ///
    /// # Returns
    /// The number of items discovered by the scan.
    pub fn tick(&self) -> usize {
        if self.needs_recache() {
            self.recache_chunks();
        }
        self.queue_chunks()
    }

    /// Slides the resident window after the player's chunk.
    ///
    /// Chunks on the advancing edges are flagged and queued for generation;
    /// chunks on the trailing edges are disposed and their meshes released.
    pub fn recache_chunks(&self) -> WindowSlide {
        let (dx, dz, flying) = {
            let mut player = self.player.get_mut();
            let (dx, dz) = player.update_chunk();
            (dx, dz, player.flying)
        };
        if dx == 0 && dz == 0 {
            return WindowSlide::default();
        }
        if (dx.abs() > 1 || dz.abs() > 1) && !flying {
            warn!(
                "Player crossed ({}, {}) chunks in one tick without flying",
                dx, dz
            );
        }

        let mut slide = WindowSlide::default();
        let mut world = self.world.get_mut();

        let x_direction = if dx > 0 {
            CompassDirection::East
        } else {
            CompassDirection::West
        };
        for _ in 0..dx.abs() {
            let step = world.slide_window(x_direction);
            slide.added.extend(step.added);
            slide.evicted.extend(step.evicted);
        }

        let z_direction = if dz > 0 {
            CompassDirection::North
        } else {
            CompassDirection::South
        };
        for _ in 0..dz.abs() {
            let step = world.slide_window(z_direction);
            slide.added.extend(step.added);
            slide.evicted.extend(step.evicted);
        }

        // A chunk added by the X slide can already be gone after the Z slide.
        slide.added.retain(|coord| world.chunks.contains_key(*coord));
        slide.evicted.retain(|coord| !world.chunks.contains_key(*coord));

        for coord in &slide.added {
            if let Some(chunk) = world.get_chunk(*coord) {
                chunk.get_mut().queued_for_generation = true;
                self.queues.get_mut().push_generation(*coord);
            }
        }
        drop(world);

        for coord in &slide.evicted {
            self.mesh_builder.release_mesh(*coord);
        }

        debug!(
            "Recached by ({}, {}): {} chunks added, {} evicted",
            dx,
            dz,
            slide.added.len(),
            slide.evicted.len()
        );
        slide
    }

    /// Scans every resident chunk and queues the work it needs.
    ///
    /// An ungenerated chunk is queued for generation and a generated dirty one
    /// for building, each only if it is not queued already.
    ///
    /// # Returns
    /// The number of items queued.
    pub fn queue_chunks(&self) -> usize {
        let world = self.world.get();
        let mut queued = 0;
        for (coord, chunk) in world.chunks.iter() {
            let mut chunk = chunk.get_mut();
            if chunk.is_disposed() {
                continue;
            }
            if !chunk.generated {
                if !chunk.queued_for_generation {
                    chunk.queued_for_generation = true;
                    self.queues.get_mut().push_generation(*coord);
                    queued += 1;
                }
            } else if chunk.dirty && !chunk.queued_for_building {
                chunk.queued_for_building = true;
                self.queues.get_mut().push_build(*coord);
                queued += 1;
            }
        }
        queued
    }

    /// Takes one item and runs it.
    ///
    /// # Returns
    /// `None` if both queues were empty.
    pub fn process(&self) -> Option<StageOutcome> {
        let item = self.take()?;
        Some(self.process_item(item))
    }

    /// Takes and runs exactly as many items as are waiting right now.
    ///
    /// # Returns
    /// The number of items run.
    pub fn drain(&self) -> usize {
        let pending = self.queues.get().len();
        let mut processed = 0;
        for _ in 0..pending {
            if self.process().is_none() {
                break;
            }
            processed += 1;
        }
        processed
    }

    /// Runs the stage named by `item` on its chunk.
    ///
    /// A `Generate` item fills an ungenerated chunk and clears both queued
    /// flags. A `Build` item relights and meshes a generated chunk that is
    /// queued for building, then clears its build flag. The dirty flag is
    /// cleared before lighting starts, so an edit made while the chunk is being
    /// lit marks it dirty again.
    ///
    /// An item whose chunk is gone, disposed, or no longer in the state the item
    /// was created for is `Stale`. That happens when a chunk is evicted and a new
    /// one is created at the same coordinate while the old item is waiting.
    pub fn process_item(&self, item: WorkItem) -> StageOutcome {
        let coord = item.coord();
        let world = self.world.get();
        let Some(handle) = world.get_chunk(coord) else {
            debug!("Dropping {:?} for evicted chunk", item);
            return StageOutcome::Stale;
        };

        {
            let mut chunk = handle.get_mut();
            if chunk.is_disposed() {
                debug!("Dropping {:?} for disposed chunk", item);
                return StageOutcome::Stale;
            }
            match item {
                WorkItem::Generate(_) => {
                    if chunk.generated {
                        debug!("Dropping {:?}, chunk already generated", item);
                        return StageOutcome::Stale;
                    }
                    let start = web_time::Instant::now();
                    self.terrain.generate(&mut chunk);
                    chunk.queued_for_generation = false;
                    chunk.queued_for_building = false;
                    trace!("Generated {:?} in {:?}", coord, start.elapsed());
                    return StageOutcome::Generated;
                }
                WorkItem::Build(_) => {
                    if !chunk.generated || !chunk.queued_for_building {
                        debug!("Dropping {:?}, chunk is not queued for building", item);
                        return StageOutcome::Stale;
                    }
                    if !chunk.dirty {
                        chunk.queued_for_building = false;
                        return StageOutcome::Clean;
                    }
                    chunk.dirty = false;
                }
            }
        }

        let start = web_time::Instant::now();
        let writes = self.lighting.process(&world.chunks, coord);

        let mut chunk = handle.get_mut();
        if !chunk.is_disposed() {
            self.mesh_builder.build_mesh(&chunk);
        }
        chunk.queued_for_building = false;
        trace!(
            "Built {:?} in {:?} ({} light writes)",
            coord,
            start.elapsed(),
            writes
        );
        StageOutcome::Built
    }

    /// Marks a freshly generated chunk as queued for building.
    ///
    /// # Returns
    /// `true` if the caller now owns the chunk's single outstanding build.
    pub fn claim_build(&self, coord: ChunkCoord) -> bool {
        let world = self.world.get();
        let Some(handle) = world.get_chunk(coord) else {
            return false;
        };
        let mut chunk = handle.get_mut();
        if chunk.is_disposed() || !chunk.generated || !chunk.dirty || chunk.queued_for_building {
            return false;
        }
        chunk.queued_for_building = true;
        true
    }

    /// Runs the scan and drain until nothing is left to do.
    ///
    /// Used at spawn, before the builder thread starts, so every resident chunk
    /// is generated and lit when the player appears.
    ///
    /// # Returns
    /// The number of items run.
    pub fn settle(&self) -> usize {
        let mut processed = 0;
        while self.queue_chunks() > 0 || !self.queues.get().is_empty() {
            processed += self.drain();
        }
        processed
    }
}
