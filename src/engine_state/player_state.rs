//! # Player State
//!
//! The observer the terrain streams around. Gameplay code moves it; the chunk
//! builder's worker watches it and slides the resident window when it leaves
//! the chunk it was last seen in.
//!
//! The two chunk fields are only advanced by `update_chunk`, which the builder
//! calls when it recaches. Between recaches `current_chunk` is where the
//! window is centred, not necessarily where the player is.

use cgmath::{Point3, Vector3};

use crate::core::BoundingBox;

use super::voxels::{chunk::ChunkDimensions, chunk_manager::ChunkCoord};

/// Position and chunk tracking of the observer.
#[derive(Clone, Debug)]
pub struct PlayerState {
    /// World-space position
    pub position: Point3<f32>,
    /// The chunk the resident window is centred on
    pub current_chunk: ChunkCoord,
    /// The chunk the window was centred on before the last recache
    pub last_chunk: ChunkCoord,
    /// While flying the player may cross more than one chunk per builder tick
    pub flying: bool,
    dimensions: ChunkDimensions,
}

impl PlayerState {
    /// Creates a player at `position`, centred on the chunk containing it.
    pub fn new(position: Point3<f32>, dimensions: ChunkDimensions) -> Self {
        let chunk = ChunkCoord::from_position(position, &dimensions);
        PlayerState {
            position,
            current_chunk: chunk,
            last_chunk: chunk,
            flying: false,
            dimensions,
        }
    }

    /// Teleports the player and re-centres both chunk fields on the new position.
    pub fn spawn_at(&mut self, position: Point3<f32>) {
        *self = PlayerState {
            flying: self.flying,
            ..PlayerState::new(position, self.dimensions)
        };
    }

    /// Moves the player by `delta`.
    pub fn walk(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    /// Toggles flying.
    ///
    /// # Returns
    /// The new setting.
    pub fn toggle_flying(&mut self) -> bool {
        self.flying = !self.flying;
        self.flying
    }

    /// The chunk the player is actually standing in.
    pub fn position_chunk(&self) -> ChunkCoord {
        ChunkCoord::from_position(self.position, &self.dimensions)
    }

    /// The world-space box of `current_chunk`.
    pub fn current_chunk_bounds(&self) -> BoundingBox {
        let origin = self.current_chunk.world_origin(&self.dimensions);
        let min = Point3::new(origin.x as f32, 0.0, origin.z as f32);
        BoundingBox::new(
            min,
            Point3::new(
                min.x + self.dimensions.width as f32,
                self.dimensions.height as f32,
                min.z + self.dimensions.length as f32,
            ),
        )
    }

    /// Returns `true` while the player is horizontally inside `current_chunk`.
    ///
    /// Height is ignored, so jumping above the world never triggers a recache.
    pub fn in_current_chunk(&self) -> bool {
        self.current_chunk_bounds().contains_horizontal(self.position)
    }

    /// Moves `current_chunk` to the player's chunk, remembering the old one.
    ///
    /// # Returns
    /// The `(dx, dz)` displacement in chunks.
    pub fn update_chunk(&mut self) -> (i32, i32) {
        self.last_chunk = self.current_chunk;
        self.current_chunk = self.position_chunk();
        (
            self.current_chunk.x - self.last_chunk.x,
            self.current_chunk.z - self.last_chunk.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaving_the_chunk_is_detected_horizontally() {
        let mut player = PlayerState::new(Point3::new(8.0, 60.0, 8.0), ChunkDimensions::default());
        assert!(player.in_current_chunk());

        player.walk(Vector3::new(0.0, 500.0, 0.0));
        assert!(player.in_current_chunk());

        player.walk(Vector3::new(8.5, 0.0, 0.0));
        assert!(!player.in_current_chunk());
        assert_eq!(player.position_chunk(), ChunkCoord::new(1, 0));
    }

    #[test]
    fn update_chunk_reports_displacement() {
        let mut player = PlayerState::new(Point3::new(1.0, 60.0, 1.0), ChunkDimensions::default());
        player.walk(Vector3::new(-20.0, 0.0, 40.0));

        assert_eq!(player.update_chunk(), (-2, 2));
        assert_eq!(player.last_chunk, ChunkCoord::new(0, 0));
        assert_eq!(player.current_chunk, ChunkCoord::new(-2, 2));
        assert!(player.in_current_chunk());
        assert_eq!(player.update_chunk(), (0, 0));
    }

    #[test]
    fn spawn_keeps_flying() {
        let mut player = PlayerState::new(Point3::new(1.0, 60.0, 1.0), ChunkDimensions::default());
        player.toggle_flying();
        player.spawn_at(Point3::new(100.0, 60.0, -100.0));
        assert!(player.flying);
        assert_eq!(player.current_chunk, ChunkCoord::new(6, -7));
        assert_eq!(player.last_chunk, player.current_chunk);
    }
}
