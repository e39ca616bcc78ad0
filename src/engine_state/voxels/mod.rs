//! # Voxel Terrain Core
//!
//! This module contains the data model and the pipeline of the streamed
//! terrain.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: the voxel value type, its material and four light channels
//! * **Chunk**: a dense `width x height x length` array of blocks and its lifecycle flags
//! * **ChunkManager**: the coordinate index of resident chunks
//! * **World**: bounds-checked block access and the sliding resident window
//! * **Terrain**: noise-driven generators that fill new chunks
//! * **Lighting**: sunlight and colored light flood fill across chunk borders
//! * **ChunkBuilder**: the background pipeline tying the above together
//! * **Tasks**: pool tasks for the parallel build strategy
//!
//! ## Data Flow
//!
//! 1. The player crosses into a new chunk
//! 2. The chunk builder slides the window: new chunks on the advancing edge, evictions on the trailing edge
//! 3. New chunks are generated, which leaves them dirty
//! 4. Dirty chunks are relit and handed to the mesh builder
//! 5. `World::set_block` makes a chunk (and any neighbour sharing the face) dirty again
//!
//! ## Thread Safety
//!
//! * Every chunk lives in its own `MtResource`
//! * The world is shared as `MtResource<World>`; pipeline stages hold its read
//!   guard, sliding the window needs its write guard
//! * Lighting holds one chunk lock at a time

pub mod block;
pub mod chunk;
pub mod chunk_builder;
pub mod chunk_manager;
pub mod lighting;
pub mod tasks;
pub mod terrain;
pub mod world;
