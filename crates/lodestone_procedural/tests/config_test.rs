//! # Configuration Tests
//!
//! TOML loading, layering over presets, and validation failures.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use lodestone_procedural::{
    CarverVariant, ChunkCoord, ChunkGenerator, Dimension, GenerationError, GeneratorConfig, Material, OriginCount,
    WorldSeed,
};

fn temp_config_path() -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("test_lodestone_config_{}_{id}.toml", std::process::id()))
}

/// Test: A config written to disk loads back identically.
#[test]
fn test_file_round_trip() {
    let path = temp_config_path();
    let config = GeneratorConfig::hell().with_sea_level(50);

    std::fs::write(&path, config.to_toml_string().expect("config serializes")).expect("temp dir is writable");
    let loaded = GeneratorConfig::from_toml_file(&path).expect("written config loads");
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, config);
}

/// Test: A missing file reports the path.
#[test]
fn test_missing_file() {
    let path = temp_config_path();
    match GeneratorConfig::from_toml_file(&path) {
        Err(GenerationError::ConfigIo { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected ConfigIo, got {other:?}"),
    }
}

/// Test: Carver lists are replaced whole, not merged element-wise.
#[test]
fn test_carver_list_replaced() {
    let config = GeneratorConfig::from_toml_str(
        r#"
        [[carvers]]
        name = "wide_canyon"
        range_chunks = 4
        rarity = 3
        room_chance = 0
        room_radius_min = 1.0
        room_radius_spread = 6.0
        room_vertical_scale = 0.5
        thickness_scale = 1.5
        thickness_bias = 2.0
        vertical_scale = 4.0
        steep_chance = 6
        pitch_decay = 0.7
        steep_pitch_decay = 0.92
        pitch_drift_decay = 0.5
        yaw_drift_decay = 0.5
        skip_chance = 4
        branch_min_thickness = 1.0
        carvable = ["stone", "dirt", "grass"]
        guarded_liquids = ["water"]
        require_lava_nearby = false
        origin_count = { mode = "one" }
        origin_height = { mode = "uniform", max = 60 }
        "#,
    )
    .expect("carver override parses");

    assert_eq!(config.carvers.len(), 1);
    let carver = &config.carvers[0];
    assert_eq!(carver.name, "wide_canyon");
    assert_eq!(carver.origin_count, OriginCount::One);
    assert_eq!(carver.lava_below, None);
    assert_eq!(carver.carvable, vec![Material::Stone, Material::Dirt, Material::Grass]);
}

/// Test: Empty input is the overworld preset.
#[test]
fn test_empty_is_overworld() {
    let config = GeneratorConfig::from_toml_str("").expect("empty config parses");
    assert_eq!(config, GeneratorConfig::overworld());
    assert_eq!(config.dimension, Dimension::Overworld);
}

/// Test: Nested overrides keep untouched siblings from the preset.
#[test]
fn test_nested_override_keeps_siblings() {
    let config = GeneratorConfig::from_toml_str(
        r#"
        dimension = "hell"

        [octaves]
        landmass = 8

        [terrain]
        vertical_scale = 1000.0
        "#,
    )
    .expect("nested override parses");

    let preset = GeneratorConfig::hell();
    assert_eq!(config.octaves.landmass, 8);
    assert_eq!(config.octaves.selector, preset.octaves.selector);
    assert!((config.terrain.vertical_scale - 1000.0).abs() < f64::EPSILON);
    assert!((config.terrain.horizontal_scale - preset.terrain.horizontal_scale).abs() < f64::EPSILON);
    assert_eq!(config.surface, preset.surface);
}

/// Test: Each validation rule names its field.
#[test]
fn test_validation_fields() {
    let cases = [
        ("world_height = 300", "world_height"),
        ("sea_level = 128", "sea_level"),
        ("liquid_level = 129", "liquid_level"),
        ("[octaves]\ndepth = 40", "octaves.depth"),
        ("[terrain]\nhorizontal_scale = 0.0", "terrain.horizontal_scale"),
        ("[surface]\npatch_frequency = -1.0", "surface.patch_frequency"),
        ("[terrain]\nceiling_taper_layers = 17", "terrain.ceiling_taper_layers"),
    ];

    for (text, expected) in cases {
        match GeneratorConfig::from_toml_str(text) {
            Err(GenerationError::InvalidConfig { field, .. }) => assert_eq!(field, expected, "for `{text}`"),
            other => panic!("`{text}` should fail on {expected}, got {other:?}"),
        }
    }
}

/// Test: Carver validation rejects a zero region radius.
#[test]
fn test_carver_validation() {
    let mut cave = CarverVariant::cave();
    cave.range_chunks = 0;
    let config = GeneratorConfig::overworld().with_carvers(vec![cave]);
    assert!(matches!(
        config.validate(),
        Err(GenerationError::InvalidConfig { field: "carvers.range_chunks", .. })
    ));

    let mut canyon = CarverVariant::canyon();
    canyon.vertical_scale = 0.0;
    let config = GeneratorConfig::overworld().with_carvers(vec![canyon]);
    assert!(config.validate().is_err());
}

/// Test: A loaded config drives generation.
#[test]
fn test_loaded_config_generates() {
    let config = GeneratorConfig::from_toml_str(
        r#"
        sea_level = 40
        liquid_level = 40

        [surface]
        floor_layers = 1
        "#,
    )
    .expect("override parses");

    let mut generator = ChunkGenerator::with_default_biomes(WorldSeed::new(10), config).expect("config is valid");
    let volume = generator.generate(ChunkCoord::new(0, 0)).expect("generation succeeds");

    for x in 0..16 {
        for z in 0..16 {
            assert_eq!(volume.get(x, 0, z), Material::Bedrock);
            assert_ne!(volume.get(x, 1, z), Material::Bedrock, "single floor layer");
            for y in 40..volume.height() {
                assert!(!volume.get(x, y, z).is_liquid());
            }
        }
    }
}
