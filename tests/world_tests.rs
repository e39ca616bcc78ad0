//! # World Integration Tests
//!
//! Block access through the `World` facade and the engine lifecycle from
//! spawn to streaming.

use cgmath::{Point3, Vector3};
use voxel_terrain::{
    Block, BlockType, ChunkCoord, ConfigError, EngineConfig, EngineState, TerrainKind, World,
    MAX_LIGHT,
};

fn flat_config(view_range: u32, cache_range: u32) -> EngineConfig {
    EngineConfig {
        view_range,
        cache_range,
        cache_extra_chunks: cache_range > view_range,
        terrain: TerrainKind::Flat,
        seed: Some(7),
        ..EngineConfig::default()
    }
}

fn dirty_chunks(world: &World) -> Vec<ChunkCoord> {
    let mut dirty: Vec<ChunkCoord> = world
        .chunks
        .iter()
        .filter(|(_, chunk)| chunk.get().dirty)
        .map(|(coord, _)| *coord)
        .collect();
    dirty.sort_by_key(|coord| (coord.x, coord.z));
    dirty
}

#[test]
fn border_edits_dirty_the_neighbour_that_shares_the_face() {
    let mut world = World::new(&flat_config(1, 1));
    world.populate_window(ChunkCoord::new(0, 0));
    assert!(dirty_chunks(&world).is_empty());

    assert!(world.set_block(0, 50, 5, Block::new(BlockType::ROCK)));
    assert_eq!(
        dirty_chunks(&world),
        vec![ChunkCoord::new(-1, 0), ChunkCoord::new(0, 0)]
    );

    assert!(world.set_block(5, 50, 15, Block::new(BlockType::ROCK)));
    assert_eq!(
        dirty_chunks(&world),
        vec![ChunkCoord::new(-1, 0), ChunkCoord::new(0, 0), ChunkCoord::new(0, 1)]
    );
}

#[test]
fn corner_edits_dirty_both_neighbours() {
    let mut world = World::new(&flat_config(1, 1));
    world.populate_window(ChunkCoord::new(0, 0));

    assert!(world.set_block(-1, 20, -1, Block::new(BlockType::SAND)));
    assert_eq!(
        dirty_chunks(&world),
        vec![ChunkCoord::new(-1, -1), ChunkCoord::new(-1, 0), ChunkCoord::new(0, -1)]
    );
}

#[test]
fn access_outside_the_window_is_ignored() {
    let mut world = World::new(&flat_config(1, 1));
    world.populate_window(ChunkCoord::new(0, 0));
    let rock = Block::new(BlockType::ROCK);

    assert!(!world.set_block(32, 10, 0, rock));
    assert!(!world.set_block(0, 10, -17, rock));
    assert!(!world.set_block(0, -1, 0, rock));
    assert!(!world.set_block(0, 128, 0, rock));
    assert_eq!(world.block_at(32, 10, 0), Block::EMPTY);
    assert_eq!(world.block_at(0, 128, 0), Block::EMPTY);
    assert!(dirty_chunks(&world).is_empty());

    assert!(world.set_block(31, 127, -16, rock));
    assert_eq!(world.block_at(31, 127, -16).get_type(), BlockType::ROCK);
}

#[test]
fn spawn_prepares_a_lit_window() {
    let mut engine = EngineState::new(flat_config(1, 1)).unwrap();
    let processed = engine.spawn_player(Point3::new(8.0, 80.0, 8.0));

    // One generation and one build per resident chunk.
    assert_eq!(processed, 18);
    assert_eq!(engine.current_chunk(), ChunkCoord::new(0, 0));

    let world = engine.world.get();
    assert_eq!(world.chunks.count(), 9);
    assert!(world.chunks.values().all(|chunk| {
        let chunk = chunk.get();
        chunk.generated && !chunk.dirty && !chunk.queued_for_building
    }));

    assert_eq!(world.block_at(8, 44, 8).get_type(), BlockType::DIRT);
    assert_eq!(world.block_at(8, 40, 8).get_type(), BlockType::ROCK);
    assert_eq!(world.block_at(8, 45, 8).get_type(), BlockType::NONE);
    assert_eq!(world.block_at(8, 60, 8).sun, MAX_LIGHT);
    assert_eq!(world.block_at(-9, 45, 20).sun, MAX_LIGHT);
    assert_eq!(world.block_at(8, 30, 8).sun, 0);
}

#[test]
fn spawn_far_from_the_origin_moves_the_window() {
    let mut engine = EngineState::new(flat_config(1, 1)).unwrap();
    engine.spawn_player(Point3::new(-100.0, 80.0, 300.0));

    assert_eq!(engine.current_chunk(), ChunkCoord::new(-7, 18));
    let world = engine.world.get();
    assert_eq!(world.chunks.south_west_edge, ChunkCoord::new(-8, 17));
    assert_eq!(world.chunks.north_east_edge, ChunkCoord::new(-6, 19));
    assert_eq!(world.block_at(-100, 60, 300).sun, MAX_LIGHT);
    assert_eq!(world.block_at(8, 60, 8), Block::EMPTY);
}

#[test]
fn edits_are_relit_on_the_next_tick() {
    let mut engine = EngineState::new(flat_config(1, 1)).unwrap();
    engine.spawn_player(Point3::new(8.0, 80.0, 8.0));

    // Dig out the dirt above one rock column and drop lava into the pit.
    {
        let world = engine.world.get();
        for y in 41..=44 {
            assert!(world.set_block(8, y, 8, Block::EMPTY));
        }
        assert!(world.set_block(8, 41, 8, Block::new(BlockType::LAVA)));
    }

    assert_eq!(engine.chunk_builder.run_once(), 1);

    let world = engine.world.get();
    assert_eq!(world.block_at(8, 44, 8).sun, MAX_LIGHT);
    assert_eq!(world.block_at(8, 42, 8).sun, MAX_LIGHT);
    assert_eq!(world.block_at(8, 42, 8).r, MAX_LIGHT - 1);
    assert_eq!(world.block_at(8, 45, 9).r, MAX_LIGHT - 5);
    assert!(world
        .chunks
        .values()
        .all(|chunk| !chunk.get().dirty));
}

#[test]
fn fixed_world_keeps_its_window() {
    let mut engine = EngineState::new(flat_config(1, 1)).unwrap();
    engine.spawn_player(Point3::new(8.0, 80.0, 8.0));
    assert!(!engine.world.get_mut().toggle_infinite_world());

    engine.move_player(Vector3::new(40.0, 0.0, 0.0));
    engine.chunk_builder.run_once();

    assert_eq!(engine.current_chunk(), ChunkCoord::new(0, 0));
    assert_eq!(
        engine.world.get().chunks.south_west_edge,
        ChunkCoord::new(-1, -1)
    );
}

#[test]
fn only_chunks_in_view_range_are_visible() {
    let mut engine = EngineState::new(flat_config(1, 2)).unwrap();
    engine.spawn_player(Point3::new(8.0, 80.0, 8.0));

    let world = engine.world.get();
    assert_eq!(world.chunks.count(), 25);
    let visible = world.visible_chunks(engine.current_chunk());
    assert_eq!(visible.len(), 9);
    assert!(visible
        .iter()
        .all(|chunk| chunk.get().position.x.abs() <= 1 && chunk.get().position.z.abs() <= 1));
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = EngineConfig {
        view_range: 4,
        cache_range: 3,
        ..EngineConfig::default()
    };
    assert!(matches!(
        EngineState::new(config),
        Err(ConfigError::ViewRangeExceedsCacheRange {
            view_range: 4,
            cache_range: 3
        })
    ));
}
