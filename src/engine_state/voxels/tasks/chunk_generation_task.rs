//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, which fills one chunk with
//! terrain on a pool worker and, if it generated anything, schedules the
//! chunk's first build.

use crate::engine_state::{
    task_management::task::{Task, TaskResult},
    voxels::{
        chunk_builder::{BuildPipeline, StageOutcome, WorkItem},
        chunk_manager::ChunkCoord,
    },
};

use super::chunk_build_task::ChunkBuildTask;

/// A task that generates chunk data asynchronously.
///
/// This task is responsible for:
/// 1. Generating the chunk at the specified coordinate, if it is still resident
/// 2. Claiming the chunk's build so no second build item can be queued for it
/// 3. Handing back the build as a follow-up task
pub struct ChunkGenerationTask {
    /// The pipeline whose stages run the work
    pipeline: BuildPipeline,
    /// The coordinate of the chunk to generate
    coord: ChunkCoord,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    pub fn new(pipeline: BuildPipeline, coord: ChunkCoord) -> Self {
        ChunkGenerationTask { pipeline, coord }
    }
}

impl Task for ChunkGenerationTask {
    /// Generates the chunk and claims its follow-up build.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let outcome = self.pipeline.process_item(WorkItem::Generate(self.coord));
        let follow_up = (outcome == StageOutcome::Generated
            && self.pipeline.claim_build(self.coord))
        .then(|| ChunkBuildTask::new(self.pipeline.clone(), self.coord));

        Box::new(ChunkGenerationTaskResult { outcome, follow_up })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    /// What the generation stage did
    pub outcome: StageOutcome,
    /// The build claimed for the freshly generated chunk
    follow_up: Option<ChunkBuildTask>,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Schedules the claimed build, if any.
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>> {
        match self.follow_up {
            Some(task) => vec![Box::new(task)],
            None => Vec::new(),
        }
    }
}
