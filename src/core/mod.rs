//! # Core Module
//!
//! This module provides the fundamental concurrency primitive and geometry types
//! used throughout the terrain engine.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking.
//!   Chunks, the world and the player state are all shared through it.
//! - `BoundingBox`: Axis-aligned box used for chunk and world bounds
//!
//! ## Usage
//! ```rust
//! use voxel_terrain::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod bounding_box;
pub mod mt_resource;

pub use bounding_box::BoundingBox;
pub use mt_resource::MtResource;
