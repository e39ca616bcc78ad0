//! Task that relights a chunk and hands it to the mesh builder.

use log::trace;

use crate::engine_state::{
    task_management::task::{Task, TaskResult},
    voxels::{
        chunk_builder::{BuildPipeline, StageOutcome, WorkItem},
        chunk_manager::ChunkCoord,
    },
};

/// Builds one chunk on a pool worker.
pub struct ChunkBuildTask {
    pipeline: BuildPipeline,
    coord: ChunkCoord,
}

impl ChunkBuildTask {
    /// Creates a new chunk build task.
    pub fn new(pipeline: BuildPipeline, coord: ChunkCoord) -> Self {
        ChunkBuildTask { pipeline, coord }
    }
}

impl Task for ChunkBuildTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let outcome = self.pipeline.process_item(WorkItem::Build(self.coord));
        Box::new(ChunkBuildTaskResult {
            coord: self.coord,
            outcome,
        })
    }
}

/// The result of a chunk build task.
pub struct ChunkBuildTaskResult {
    coord: ChunkCoord,
    /// What the build stage did
    pub outcome: StageOutcome,
}

impl TaskResult for ChunkBuildTaskResult {
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>> {
        trace!("Build task for {:?} finished: {:?}", self.coord, self.outcome);
        Vec::new()
    }
}
