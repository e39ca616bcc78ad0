//! # Chunk Builder
//!
//! The background pipeline that keeps the resident window streamed and built.
//!
//! ## Worker Loop
//!
//! `start` spawns one long-running thread. Every tick it
//!
//! 1. recaches if the world is infinite and the player left the chunk the
//!    window is centred on,
//! 2. scans the resident chunks and queues what they need,
//! 3. runs the queued work according to the configured `BuildStrategy`,
//!
//! then sleeps for `worker_idle_millis`. `stop` clears the `active` flag and
//! joins the thread; work already taken finishes, nothing new is taken.
//!
//! ## Strategies
//!
//! * `Queued` - the builder thread drains exactly the items that were waiting
//!   after the scan, one at a time. Simple and deterministic; one core.
//! * `Tasked` - every item becomes a task on a `TaskManager` pool. A finished
//!   generation hands back a build task for the same chunk. Several chunks
//!   build at once, and the builder thread only schedules.
//!
//! In both strategies a chunk has at most one outstanding item: the queued
//! flags are set when an item is created and cleared when it completes.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};

use crate::core::MtResource;
use crate::engine_state::config::{BuildStrategy, EngineConfig};
use crate::engine_state::player_state::PlayerState;
use crate::engine_state::rendering::ChunkMeshBuilder;
use crate::engine_state::task_management::TaskManager;

use super::tasks::task_for;
use super::terrain::TerrainGenerator;
use super::world::{WindowSlide, World};

pub mod pipeline;
pub mod work_queue;

pub use pipeline::{BuildPipeline, StageOutcome};
pub use work_queue::{WorkItem, WorkQueues};

/// Owns the pipeline and its background worker.
pub struct ChunkBuilder {
    pipeline: BuildPipeline,
    strategy: BuildStrategy,
    idle: Duration,
    active: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ChunkBuilder {
    /// Creates a stopped builder.
    pub fn new(
        world: MtResource<World>,
        player: MtResource<PlayerState>,
        terrain: Arc<dyn TerrainGenerator>,
        mesh_builder: Arc<dyn ChunkMeshBuilder>,
        config: &EngineConfig,
    ) -> Self {
        ChunkBuilder {
            pipeline: BuildPipeline::new(world, player, terrain, mesh_builder),
            strategy: config.build_strategy,
            idle: Duration::from_millis(config.worker_idle_millis),
            active: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// The shared pipeline stages.
    pub fn pipeline(&self) -> &BuildPipeline {
        &self.pipeline
    }

    /// Returns `true` while the worker thread is running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Spawns the worker thread.
    ///
    /// # Returns
    /// `false` if the builder was already running.
    pub fn start(&mut self) -> bool {
        if self.active.swap(true, Ordering::SeqCst) {
            return false;
        }

        let pipeline = self.pipeline.clone();
        let active = self.active.clone();
        let idle = self.idle;
        let strategy = self.strategy;

        info!("Starting chunk builder ({:?})", strategy);
        self.worker = Some(thread::spawn(move || match strategy {
            BuildStrategy::Queued => run_queued(pipeline, active, idle),
            BuildStrategy::Tasked { workers } => run_tasked(pipeline, active, idle, workers),
        }));
        true
    }

    /// Stops the worker thread and waits for it to exit.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Chunk builder thread panicked");
            } else {
                info!("Chunk builder stopped");
            }
        }
    }

    /// One tick of the `Queued` strategy on the calling thread.
    ///
    /// # Returns
    /// The number of items run.
    pub fn run_once(&self) -> usize {
        self.pipeline.tick();
        self.pipeline.drain()
    }

    /// Slides the window after the player. See `BuildPipeline::recache_chunks`.
    pub fn recache_chunks(&self) -> WindowSlide {
        self.pipeline.recache_chunks()
    }

    /// Scans for work. See `BuildPipeline::queue_chunks`.
    pub fn queue_chunks(&self) -> usize {
        self.pipeline.queue_chunks()
    }

    /// Runs one item. See `BuildPipeline::process`.
    pub fn process(&self) -> Option<StageOutcome> {
        self.pipeline.process()
    }

    /// Number of waiting generation items.
    pub fn generation_queue_count(&self) -> usize {
        self.pipeline.generation_queue_count()
    }

    /// Number of waiting build items.
    pub fn building_queue_count(&self) -> usize {
        self.pipeline.building_queue_count()
    }
}

impl Drop for ChunkBuilder {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_queued(pipeline: BuildPipeline, active: Arc<AtomicBool>, idle: Duration) {
    while active.load(Ordering::SeqCst) {
        pipeline.tick();
        pipeline.drain();
        thread::sleep(idle);
    }
}

fn run_tasked(pipeline: BuildPipeline, active: Arc<AtomicBool>, idle: Duration, workers: usize) {
    let mut task_manager = TaskManager::new(workers);
    while active.load(Ordering::SeqCst) {
        pipeline.tick();
        while let Some(item) = pipeline.take() {
            task_manager.publish_task(task_for(item, pipeline.clone()));
        }
        task_manager.process_completed_tasks();
        task_manager.process_queued_tasks();
        thread::sleep(idle);
    }

    // Every item taken from the queues holds its chunk's queued flag, so the
    // pool runs dry before it is dropped: waiting tasks and follow-up builds too.
    while !task_manager.is_idle() {
        task_manager.process_completed_tasks();
        task_manager.process_queued_tasks();
        thread::sleep(idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::DiagnosticMeshBuilder;
    use crate::engine_state::voxels::{chunk_manager::ChunkCoord, terrain::FlatTerrain};
    use cgmath::Point3;

    fn builder(config: &EngineConfig) -> (ChunkBuilder, Arc<DiagnosticMeshBuilder>) {
        let mut world = World::new(config);
        world.populate_window(ChunkCoord::new(0, 0));
        let player = PlayerState::new(Point3::new(8.0, 80.0, 8.0), config.chunk);
        let meshes = Arc::new(DiagnosticMeshBuilder::new());
        let builder = ChunkBuilder::new(
            MtResource::new(world),
            MtResource::new(player),
            Arc::new(FlatTerrain::default()),
            meshes.clone(),
            config,
        );
        (builder, meshes)
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            view_range: 1,
            cache_range: 1,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn queued_ticks_generate_then_build() {
        let (builder, meshes) = builder(&small_config());

        assert_eq!(builder.run_once(), 9);
        assert_eq!(meshes.build_count(), 0);
        assert_eq!(builder.run_once(), 9);
        assert_eq!(meshes.build_count(), 9);
        assert_eq!(builder.run_once(), 0);
    }

    #[test]
    fn scan_queues_each_chunk_once() {
        let (builder, _) = builder(&small_config());
        assert_eq!(builder.queue_chunks(), 9);
        assert_eq!(builder.queue_chunks(), 0);
        assert_eq!(builder.generation_queue_count(), 9);
        assert_eq!(builder.building_queue_count(), 0);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let (mut builder, _) = builder(&small_config());
        assert!(builder.start());
        assert!(!builder.start());
        assert!(builder.is_active());
        builder.stop();
        builder.stop();
        assert!(!builder.is_active());
    }
}
