use tile_collisions_core::{PixelPoint, TileCode};
use tile_collisions_world::{query, LevelConfig, World};

const HILLS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../levels/hills.toml");

#[test]
fn bundled_level_loads_with_tuning_overrides() {
    let level = LevelConfig::load(HILLS).expect("hills level");

    assert_eq!(level.columns, 12);
    assert_eq!(level.start_position(), PixelPoint::new(16, 16));
    assert_eq!(level.actor.move_speed, 1.5);
    assert_eq!(level.actor.gravity, 0.5);
    assert_eq!(level.actor.width, 16);

    let world = World::from_level(&level).expect("valid world");
    let map = query::tile_map(&world);
    assert_eq!((map.columns(), map.rows()), (12, 7));
    assert_eq!(map.tile_at(4, 2), TileCode::PLATFORM);
    assert_eq!(map.tile_at(1, 5), TileCode::new(2));
}

#[test]
fn missing_level_file_reports_path() {
    let error = LevelConfig::load("no/such/level.toml").expect_err("missing file");

    assert!(error.to_string().contains("no/such/level.toml"));
}
