//! # Voxel Task System
//!
//! Pool tasks that run chunk pipeline stages off the builder thread. They are
//! used by the `Tasked` build strategy; each task carries a clone of the
//! `BuildPipeline` and the coordinate of its chunk.

use crate::engine_state::task_management::task::Task;

use super::chunk_builder::{BuildPipeline, WorkItem};

pub mod chunk_build_task;
pub mod chunk_generation_task;

use chunk_build_task::ChunkBuildTask;
use chunk_generation_task::ChunkGenerationTask;

/// Wraps a work item in the task that runs it.
pub fn task_for(item: WorkItem, pipeline: BuildPipeline) -> Box<dyn Task + Send> {
    match item {
        WorkItem::Generate(coord) => Box::new(ChunkGenerationTask::new(pipeline, coord)),
        WorkItem::Build(coord) => Box::new(ChunkBuildTask::new(pipeline, coord)),
    }
}
