//! The two work queues of the chunk builder.
//!
//! Items are chunk coordinates, never chunk handles. By the time an item is
//! taken its chunk may have been evicted; whoever runs the item looks the
//! coordinate up again and drops it if nothing is resident there.

use std::collections::VecDeque;

use crate::engine_state::voxels::chunk_manager::ChunkCoord;

/// One unit of pipeline work.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorkItem {
    /// Fill the chunk with terrain
    Generate(ChunkCoord),
    /// Relight the chunk and rebuild its mesh
    Build(ChunkCoord),
}

impl WorkItem {
    /// The chunk this item is for.
    pub fn coord(&self) -> ChunkCoord {
        match self {
            WorkItem::Generate(coord) | WorkItem::Build(coord) => *coord,
        }
    }
}

/// FIFO generation and build queues, drained generation first.
#[derive(Debug, Default)]
pub struct WorkQueues {
    generation: VecDeque<ChunkCoord>,
    build: VecDeque<ChunkCoord>,
}

impl WorkQueues {
    /// Creates empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a generation item.
    pub fn push_generation(&mut self, coord: ChunkCoord) {
        self.generation.push_back(coord);
    }

    /// Appends a build item.
    pub fn push_build(&mut self, coord: ChunkCoord) {
        self.build.push_back(coord);
    }

    /// Takes the oldest generation item, or failing that the oldest build item.
    pub fn take(&mut self) -> Option<WorkItem> {
        if let Some(coord) = self.generation.pop_front() {
            return Some(WorkItem::Generate(coord));
        }
        self.build.pop_front().map(WorkItem::Build)
    }

    /// Number of waiting generation items.
    pub fn generation_count(&self) -> usize {
        self.generation.len()
    }

    /// Number of waiting build items.
    pub fn build_count(&self) -> usize {
        self.build.len()
    }

    /// Number of waiting items in both queues.
    pub fn len(&self) -> usize {
        self.generation.len() + self.build.len()
    }

    /// Returns `true` if both queues are empty.
    pub fn is_empty(&self) -> bool {
        self.generation.is_empty() && self.build.is_empty()
    }
}
