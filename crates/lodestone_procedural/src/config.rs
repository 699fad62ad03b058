//! # Generator Configuration
//!
//! Every tunable of the pipeline, loaded once at world creation.
//!
//! Two presets exist, [`GeneratorConfig::overworld`] and [`GeneratorConfig::hell`].
//! A TOML file only needs the fields it changes: it is layered over the
//! preset named by its `dimension` key (overworld when absent).
//!
//! ```toml
//! dimension = "overworld"
//! sea_level = 63
//!
//! [surface]
//! floor_layers = 3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunk::Material;
use crate::error::{GenerationError, GenerationResult};

/// Largest supported world height.
pub const MAX_WORLD_HEIGHT: u32 = 256;

/// Blocks per vertical density lattice cell.
pub const VERTICAL_STRIDE: u32 = 8;

/// Which world the generator builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Open sky, water oceans, humidity-shaped hills.
    #[default]
    Overworld,
    /// Enclosed caverns between two bedrock shells over a lava sea.
    Hell,
}

/// Octave count per noise purpose. More octaves add detail and cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseOctaves {
    /// Each of the two landmass fields.
    pub landmass: u32,
    /// The landmass selector field.
    pub selector: u32,
    /// Sand and gravel patch fields.
    pub patches: u32,
    /// Soil thickness field.
    pub soil_depth: u32,
    /// Per-column roughness ("scale") field.
    pub scale: u32,
    /// Per-column midline ("depth") field.
    pub depth: u32,
}

impl Default for NoiseOctaves {
    fn default() -> Self {
        Self {
            landmass: 16,
            selector: 8,
            patches: 4,
            soil_depth: 4,
            scale: 10,
            depth: 16,
        }
    }
}

/// Density lattice shaping constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Landmass frequency along X and Z, per lattice cell.
    pub horizontal_scale: f64,
    /// Landmass frequency along Y, per lattice cell.
    pub vertical_scale: f64,
    /// Selector frequency divisors for X, Y, Z (applied to the landmass scales).
    pub selector_divisor: [f64; 3],
    /// Divisor bringing landmass samples into density units.
    pub landmass_divisor: f64,
    /// Roughness field frequency (overworld).
    pub scale_frequency: f64,
    /// Midline field frequency (overworld).
    pub depth_frequency: f64,
    /// Density change per lattice layer away from the midline (overworld).
    pub falloff_steepness: f64,
    /// Extra falloff multiplier below the midline (overworld).
    pub below_midline_factor: f64,
    /// Lattice layers at the top that taper toward `ceiling_density`.
    pub ceiling_taper_layers: u32,
    /// Density the ceiling taper blends toward.
    pub ceiling_density: f64,
}

impl TerrainConfig {
    /// Overworld shaping.
    #[must_use]
    pub const fn overworld() -> Self {
        Self {
            horizontal_scale: 684.412,
            vertical_scale: 684.412,
            selector_divisor: [80.0, 160.0, 80.0],
            landmass_divisor: 512.0,
            scale_frequency: 1.121,
            depth_frequency: 200.0,
            falloff_steepness: 12.0,
            below_midline_factor: 4.0,
            ceiling_taper_layers: 3,
            ceiling_density: -10.0,
        }
    }

    /// Hell shaping: tall vertical frequency, no column bias.
    #[must_use]
    pub const fn hell() -> Self {
        Self {
            vertical_scale: 2053.236,
            selector_divisor: [80.0, 60.0, 80.0],
            scale_frequency: 1.0,
            depth_frequency: 100.0,
            ..Self::overworld()
        }
    }
}

/// Surface pass materials and thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Base rock the density stage writes.
    pub rock: Material,
    /// Liquid below the liquid level.
    pub liquid: Material,
    /// Indestructible boundary material.
    pub boundary: Material,
    /// Randomized boundary layers at the floor (0 disables).
    pub floor_layers: u32,
    /// Randomized boundary layers at the ceiling (0 disables).
    pub ceiling_layers: u32,
    /// Patch field frequency (blocks⁻¹, finest octave).
    pub patch_frequency: f64,
    /// Soil thickness field frequency (blocks⁻¹, finest octave).
    pub soil_depth_frequency: f64,
    /// Random jitter added to patch samples.
    pub patch_jitter: f64,
    /// Sand patch when the jittered sample exceeds this.
    pub sand_threshold: f64,
    /// Gravel patch when the jittered sample exceeds this.
    pub gravel_threshold: f64,
    /// Top and filler inside a sand patch.
    pub sand_material: Material,
    /// Top inside a gravel patch.
    pub gravel_top: Material,
    /// Filler inside a gravel patch.
    pub gravel_filler: Material,
    /// Constant added to the soil thickness sample.
    pub soil_depth_bias: f64,
    /// Random jitter scale of the soil thickness.
    pub soil_depth_jitter: f64,
    /// Layers below sea level where patches apply.
    pub patch_band_below: u32,
    /// Layers above sea level where patches apply.
    pub patch_band_above: u32,
    /// Columns colder than this freeze their top liquid layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freeze_temperature: Option<f64>,
}

impl SurfaceConfig {
    /// Overworld palette.
    #[must_use]
    pub fn overworld() -> Self {
        Self {
            rock: Material::Stone,
            liquid: Material::Water,
            boundary: Material::Bedrock,
            floor_layers: 5,
            ceiling_layers: 0,
            patch_frequency: 1.0 / 32.0,
            soil_depth_frequency: 1.0 / 16.0,
            patch_jitter: 0.2,
            sand_threshold: 0.0,
            gravel_threshold: 3.0,
            sand_material: Material::Sand,
            gravel_top: Material::Air,
            gravel_filler: Material::Gravel,
            soil_depth_bias: 3.0,
            soil_depth_jitter: 0.25,
            patch_band_below: 4,
            patch_band_above: 1,
            freeze_temperature: Some(0.5),
        }
    }

    /// Hell palette.
    #[must_use]
    pub fn hell() -> Self {
        Self {
            rock: Material::Netherrack,
            liquid: Material::Lava,
            ceiling_layers: 5,
            gravel_threshold: 0.0,
            sand_material: Material::SoulSand,
            gravel_top: Material::Gravel,
            gravel_filler: Material::Netherrack,
            freeze_temperature: None,
            ..Self::overworld()
        }
    }
}

/// How many carve origins one chunk spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OriginCount {
    /// `rand(rand(rand(max) + 1) + 1)`: usually a few, occasionally many.
    Nested {
        /// Upper bound of the innermost draw.
        max: i32,
    },
    /// Exactly one origin.
    One,
}

/// How origin heights are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OriginHeight {
    /// `rand(rand(max) + 8)`: biased toward the bottom.
    Biased {
        /// Upper bound of the inner draw.
        max: i32,
    },
    /// `rand(max)`.
    Uniform {
        /// Exclusive upper bound.
        max: i32,
    },
}

/// Knobs for one worm carving pass. Caves, canyons and hell caves are
/// all values of this type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarverVariant {
    /// Name used in logs.
    pub name: String,
    /// Chunks scanned for origins around the target, per axis.
    pub range_chunks: i32,
    /// A chunk spawns origins with probability `1 / rarity`.
    pub rarity: i32,
    /// A origin adds a room with probability `1 / room_chance` (0 never).
    pub room_chance: i32,
    /// Smallest room radius.
    pub room_radius_min: f64,
    /// Random extra room radius.
    pub room_radius_spread: f64,
    /// Vertical radius multiplier for rooms.
    pub room_vertical_scale: f64,
    /// Multiplier on the tunnel thickness draw `rand * 2 + rand`.
    pub thickness_scale: f64,
    /// Added to the tunnel thickness after scaling.
    pub thickness_bias: f64,
    /// Vertical radius multiplier for tunnels.
    pub vertical_scale: f64,
    /// Tunnels are steep with probability `1 / steep_chance`.
    pub steep_chance: i32,
    /// Per-step pitch decay for ordinary tunnels.
    pub pitch_decay: f64,
    /// Per-step pitch decay for steep tunnels.
    pub steep_pitch_decay: f64,
    /// Per-step decay of the pitch drift term.
    pub pitch_drift_decay: f64,
    /// Per-step decay of the yaw drift term.
    pub yaw_drift_decay: f64,
    /// Non-room steps are skipped with probability `1 / skip_chance`.
    pub skip_chance: i32,
    /// Seed tunnels thicker than this branch.
    pub branch_min_thickness: f64,
    /// Materials a carve may remove.
    pub carvable: Vec<Material>,
    /// Liquids whose presence in a segment box blocks carving.
    pub guarded_liquids: Vec<Material>,
    /// Carved voxels below this Y become lava instead of air.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lava_below: Option<i32>,
    /// Abandon a tunnel whose first in-range segment finds no lava nearby.
    pub require_lava_nearby: bool,
    /// Origin count distribution.
    pub origin_count: OriginCount,
    /// Origin height distribution.
    pub origin_height: OriginHeight,
}

impl CarverVariant {
    /// Overworld caves: frequent, narrow, with rooms.
    #[must_use]
    pub fn cave() -> Self {
        Self {
            name: "cave".to_owned(),
            range_chunks: 8,
            rarity: 15,
            origin_count: OriginCount::Nested { max: 40 },
            origin_height: OriginHeight::Biased { max: 120 },
            room_chance: 4,
            room_radius_min: 1.0,
            room_radius_spread: 6.0,
            room_vertical_scale: 0.5,
            thickness_scale: 1.0,
            thickness_bias: 0.0,
            vertical_scale: 1.0,
            steep_chance: 6,
            pitch_decay: 0.7,
            steep_pitch_decay: 0.92,
            pitch_drift_decay: 0.9,
            yaw_drift_decay: 0.75,
            skip_chance: 4,
            branch_min_thickness: 1.0,
            carvable: vec![Material::Stone, Material::Dirt, Material::Grass],
            guarded_liquids: vec![Material::Water],
            lava_below: Some(10),
            require_lava_nearby: false,
        }
    }

    /// Canyons: one tall, straight cut that must meet existing lava.
    #[must_use]
    pub fn canyon() -> Self {
        Self {
            name: "canyon".to_owned(),
            origin_count: OriginCount::One,
            room_chance: 0,
            thickness_bias: 1.0,
            vertical_scale: 5.0,
            pitch_drift_decay: 0.5,
            yaw_drift_decay: 0.5,
            require_lava_nearby: true,
            ..Self::cave()
        }
    }

    /// Hell caves: fatter tunnels through netherrack, guarded against lava.
    #[must_use]
    pub fn hell_cave() -> Self {
        Self {
            name: "hell_cave".to_owned(),
            rarity: 5,
            origin_count: OriginCount::Nested { max: 10 },
            origin_height: OriginHeight::Uniform { max: 128 },
            thickness_scale: 2.0,
            carvable: vec![Material::Netherrack, Material::Dirt, Material::Grass],
            guarded_liquids: vec![Material::Lava],
            ..Self::cave()
        }
    }
}

/// Complete generator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Dimension profile.
    pub dimension: Dimension,
    /// Number of vertical layers; a multiple of [`VERTICAL_STRIDE`].
    pub world_height: u32,
    /// Sea level: centre of the patch band and the underwater topsoil rule.
    pub sea_level: u32,
    /// Layers below this are filled with liquid where the density is empty.
    pub liquid_level: u32,
    /// Octaves per noise purpose.
    pub octaves: NoiseOctaves,
    /// Lattice shaping.
    pub terrain: TerrainConfig,
    /// Surface palette.
    pub surface: SurfaceConfig,
    /// Carving passes, applied in order.
    pub carvers: Vec<CarverVariant>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::overworld()
    }
}

impl GeneratorConfig {
    /// Overworld preset: caves and canyons, sea level 64.
    #[must_use]
    pub fn overworld() -> Self {
        Self {
            dimension: Dimension::Overworld,
            world_height: 128,
            sea_level: 64,
            liquid_level: 64,
            octaves: NoiseOctaves::default(),
            terrain: TerrainConfig::overworld(),
            surface: SurfaceConfig::overworld(),
            carvers: vec![CarverVariant::cave(), CarverVariant::canyon()],
        }
    }

    /// Hell preset: lava sea below 32, bedrock floor and ceiling.
    #[must_use]
    pub fn hell() -> Self {
        Self {
            dimension: Dimension::Hell,
            liquid_level: 32,
            terrain: TerrainConfig::hell(),
            surface: SurfaceConfig::hell(),
            carvers: vec![CarverVariant::hell_cave()],
            ..Self::overworld()
        }
    }

    /// Preset for a dimension.
    #[must_use]
    pub fn for_dimension(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Overworld => Self::overworld(),
            Dimension::Hell => Self::hell(),
        }
    }

    /// Sets the sea level. In the overworld the liquid level follows it.
    #[must_use]
    pub fn with_sea_level(mut self, level: u32) -> Self {
        self.sea_level = level;
        if self.dimension == Dimension::Overworld {
            self.liquid_level = level;
        }
        self
    }

    /// Replaces the carving passes.
    #[must_use]
    pub fn with_carvers(mut self, carvers: Vec<CarverVariant>) -> Self {
        self.carvers = carvers;
        self
    }

    /// Number of vertical lattice points.
    #[inline]
    #[must_use]
    pub const fn lattice_height(&self) -> usize {
        (self.world_height / VERTICAL_STRIDE) as usize + 1
    }

    /// Parses TOML layered over the preset for its `dimension` key.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, does not match the
    /// config schema, or fails [`GeneratorConfig::validate`].
    pub fn from_toml_str(text: &str) -> GenerationResult<Self> {
        let overrides: toml::Table = text.parse()?;

        let dimension = match overrides.get("dimension") {
            Some(value) => value.clone().try_into::<Dimension>()?,
            None => Dimension::Overworld,
        };

        let mut merged: toml::Table = toml::to_string(&Self::for_dimension(dimension))?.parse()?;
        merge_tables(&mut merged, overrides);

        let config: Self = toml::Value::Table(merged).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> GenerationResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GenerationError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Renders the full config as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> GenerationResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks ranges the pipeline depends on.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> GenerationResult<()> {
        fn invalid(field: &'static str, reason: String) -> GenerationResult<()> {
            Err(GenerationError::InvalidConfig { field, reason })
        }

        if self.world_height < 2 * VERTICAL_STRIDE
            || self.world_height > MAX_WORLD_HEIGHT
            || self.world_height % VERTICAL_STRIDE != 0
        {
            return invalid(
                "world_height",
                format!(
                    "{} must be a multiple of {VERTICAL_STRIDE} in {}..={MAX_WORLD_HEIGHT}",
                    self.world_height,
                    2 * VERTICAL_STRIDE
                ),
            );
        }
        if self.sea_level >= self.world_height {
            return invalid("sea_level", format!("{} is outside the world", self.sea_level));
        }
        if self.liquid_level > self.world_height {
            return invalid("liquid_level", format!("{} is outside the world", self.liquid_level));
        }

        let octaves = [
            ("octaves.landmass", self.octaves.landmass),
            ("octaves.selector", self.octaves.selector),
            ("octaves.patches", self.octaves.patches),
            ("octaves.soil_depth", self.octaves.soil_depth),
            ("octaves.scale", self.octaves.scale),
            ("octaves.depth", self.octaves.depth),
        ];
        for (field, count) in octaves {
            if !(1..=32).contains(&count) {
                return invalid(field, format!("{count} octaves, expected 1..=32"));
            }
        }

        let t = &self.terrain;
        let positive = [
            ("terrain.horizontal_scale", t.horizontal_scale),
            ("terrain.vertical_scale", t.vertical_scale),
            ("terrain.selector_divisor", t.selector_divisor[0].min(t.selector_divisor[1]).min(t.selector_divisor[2])),
            ("terrain.landmass_divisor", t.landmass_divisor),
            ("terrain.scale_frequency", t.scale_frequency),
            ("terrain.depth_frequency", t.depth_frequency),
            ("surface.patch_frequency", self.surface.patch_frequency),
            ("surface.soil_depth_frequency", self.surface.soil_depth_frequency),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return invalid(field, format!("{value} must be positive"));
            }
        }
        if t.ceiling_taper_layers as usize >= self.lattice_height() {
            return invalid(
                "terrain.ceiling_taper_layers",
                format!("{} exceeds the lattice height", t.ceiling_taper_layers),
            );
        }
        if self.surface.floor_layers > 16 || self.surface.ceiling_layers > 16 {
            return invalid("surface.floor_layers", "boundary layers are limited to 16".to_owned());
        }

        for carver in &self.carvers {
            if !(1..=32).contains(&carver.range_chunks) {
                return invalid("carvers.range_chunks", format!("{} for `{}`", carver.range_chunks, carver.name));
            }
            if carver.rarity < 1 || carver.steep_chance < 1 || carver.skip_chance < 1 || carver.room_chance < 0 {
                return invalid("carvers.rarity", format!("chances must be at least 1 for `{}`", carver.name));
            }
            let height_bound = match carver.origin_height {
                OriginHeight::Biased { max } | OriginHeight::Uniform { max } => max,
            };
            let bound = match carver.origin_count {
                OriginCount::Nested { max } => max.min(height_bound),
                OriginCount::One => height_bound,
            };
            if bound < 1 {
                return invalid("carvers.origin", format!("origin bounds must be positive for `{}`", carver.name));
            }
            if !(carver.vertical_scale > 0.0 && carver.room_vertical_scale > 0.0) {
                return invalid("carvers.vertical_scale", format!("must be positive for `{}`", carver.name));
            }
        }

        Ok(())
    }
}

/// Recursively overlays `overrides` onto `base`. Arrays are replaced whole.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        GeneratorConfig::overworld().validate().expect("overworld preset is valid");
        GeneratorConfig::hell().validate().expect("hell preset is valid");
    }

    #[test]
    fn test_partial_toml_layers_over_preset() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            sea_level = 63

            [surface]
            floor_layers = 2
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.sea_level, 63);
        assert_eq!(config.surface.floor_layers, 2);
        assert_eq!(config.surface.rock, Material::Stone);
        assert_eq!(config.carvers.len(), 2);
    }

    #[test]
    fn test_hell_dimension_key_selects_hell_preset() {
        let config = GeneratorConfig::from_toml_str("dimension = \"hell\"").expect("hell config parses");
        assert_eq!(config, GeneratorConfig::hell());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let original = GeneratorConfig::overworld().with_sea_level(60);
        let text = original.to_toml_string().expect("config serializes");
        let parsed = GeneratorConfig::from_toml_str(&text).expect("rendered config parses");
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_rejects_bad_height() {
        let err = GeneratorConfig::from_toml_str("world_height = 100").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidConfig { field: "world_height", .. }));
    }

    #[test]
    fn test_rejects_zero_octaves() {
        let mut config = GeneratorConfig::overworld();
        config.octaves.selector = 0;
        assert!(matches!(
            config.validate(),
            Err(GenerationError::InvalidConfig { field: "octaves.selector", .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_material() {
        let err = GeneratorConfig::from_toml_str("[surface]\nrock = \"cheese\"").unwrap_err();
        assert!(matches!(err, GenerationError::ConfigParse(_)));
    }

    #[test]
    fn test_with_sea_level_moves_liquid_in_overworld_only() {
        assert_eq!(GeneratorConfig::overworld().with_sea_level(63).liquid_level, 63);
        assert_eq!(GeneratorConfig::hell().with_sea_level(63).liquid_level, 32);
    }

    #[test]
    fn test_lattice_height() {
        assert_eq!(GeneratorConfig::overworld().lattice_height(), 17);
    }
}
