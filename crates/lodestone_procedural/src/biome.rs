//! # Biome Sources
//!
//! The generator does not decide biomes itself; it asks a [`BiomeSource`]
//! collaborator for per-column biome, temperature and downfall.
//!
//! Two sources ship with the crate:
//! - [`ClimateBiomeSource`]: temperature and downfall from seeded simplex
//!   noise, mapped onto biomes through a 64x64 lookup table
//! - [`UniformBiomeSource`]: one biome everywhere (hell, tests, previews)

use serde::{Deserialize, Serialize};

use crate::chunk::{Material, CHUNK_SIZE, COLUMNS_PER_CHUNK};
use crate::error::GenerationResult;
use crate::noise::SimplexNoise;
use crate::random::GenRandom;
use crate::seed::{purpose, WorldSeed};

/// Biome types in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    /// Hot and very wet.
    RainForest = 0,
    /// Warm marshland.
    Swampland = 1,
    /// Warm, moderately wet.
    SeasonalForest = 2,
    /// Temperate forest.
    Forest = 3,
    /// Warm and dry grassland.
    Savanna = 4,
    /// Temperate and dry.
    Shrubland = 5,
    /// Cold forest.
    Taiga = 6,
    /// Hot and dry sand.
    Desert = 7,
    /// Open grassland.
    #[default]
    Plains = 8,
    /// Frozen sand.
    IceDesert = 9,
    /// Frozen plains.
    Tundra = 10,
    /// The underworld.
    Hell = 11,
}

impl Biome {
    /// Material placed on the exposed top layer.
    #[must_use]
    pub const fn top_material(self) -> Material {
        match self {
            Self::Desert | Self::IceDesert => Material::Sand,
            Self::Hell => Material::Netherrack,
            _ => Material::Grass,
        }
    }

    /// Material placed under the top layer, down to the soil depth.
    #[must_use]
    pub const fn filler_material(self) -> Material {
        match self {
            Self::Desert | Self::IceDesert => Material::Sand,
            Self::Hell => Material::Netherrack,
            _ => Material::Dirt,
        }
    }

    /// Representative `(temperature, downfall)` for uniform sources.
    #[must_use]
    pub const fn default_climate(self) -> (f64, f64) {
        match self {
            Self::RainForest => (1.0, 0.95),
            Self::Swampland => (0.6, 0.9),
            Self::SeasonalForest => (0.98, 0.7),
            Self::Forest => (0.8, 0.6),
            Self::Savanna => (0.8, 0.1),
            Self::Shrubland => (0.9, 0.3),
            Self::Taiga => (0.3, 0.6),
            Self::Desert | Self::Hell => (1.0, 0.0),
            Self::Plains => (1.0, 0.4),
            Self::IceDesert => (0.0, 0.0),
            Self::Tundra => (0.05, 0.3),
        }
    }

    /// Looks up a biome from temperature and downfall, both in `[0, 1]`.
    ///
    /// Downfall is weighted by temperature first: cold air holds less water.
    #[must_use]
    pub fn from_climate(temperature: f64, downfall: f64) -> Self {
        let t = temperature;
        let h = downfall * temperature;

        if t < 0.1 {
            Self::Tundra
        } else if h < 0.2 {
            if t < 0.5 {
                Self::Tundra
            } else if t < 0.95 {
                Self::Savanna
            } else {
                Self::Desert
            }
        } else if h > 0.5 && t < 0.7 {
            Self::Swampland
        } else if t < 0.5 {
            Self::Taiga
        } else if t < 0.97 {
            if h < 0.35 {
                Self::Shrubland
            } else {
                Self::Forest
            }
        } else if h < 0.45 {
            Self::Plains
        } else if h < 0.9 {
            Self::SeasonalForest
        } else {
            Self::RainForest
        }
    }
}

/// Per-column climate for one chunk, indexed `x * 16 + z`.
#[derive(Clone, Debug)]
pub struct ChunkClimate {
    /// Biome per column.
    pub biomes: [Biome; COLUMNS_PER_CHUNK],
    /// Temperature per column, `[0, 1]`.
    pub temperatures: [f64; COLUMNS_PER_CHUNK],
    /// Downfall per column, `[0, 1]`.
    pub downfalls: [f64; COLUMNS_PER_CHUNK],
}

impl ChunkClimate {
    /// Column index for local `(x, z)`.
    #[inline]
    #[must_use]
    pub const fn index(x: usize, z: usize) -> usize {
        x * CHUNK_SIZE + z
    }

    /// Biome of one column.
    #[inline]
    #[must_use]
    pub fn biome(&self, x: usize, z: usize) -> Biome {
        self.biomes[Self::index(x, z)]
    }

    /// Temperature of one column.
    #[inline]
    #[must_use]
    pub fn temperature(&self, x: usize, z: usize) -> f64 {
        self.temperatures[Self::index(x, z)]
    }

    /// Downfall of one column.
    #[inline]
    #[must_use]
    pub fn downfall(&self, x: usize, z: usize) -> f64 {
        self.downfalls[Self::index(x, z)]
    }
}

impl Default for ChunkClimate {
    fn default() -> Self {
        Self {
            biomes: [Biome::default(); COLUMNS_PER_CHUNK],
            temperatures: [0.5; COLUMNS_PER_CHUNK],
            downfalls: [0.5; COLUMNS_PER_CHUNK],
        }
    }
}

/// Supplies biome and climate lookups to the generator.
///
/// Faults (a remote service being down, a misconfigured map) are returned
/// as errors and propagate out of generation unchanged.
pub trait BiomeSource: Send + Sync {
    /// Biome at a world column.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot answer.
    fn biome_at(&self, x: i32, z: i32) -> GenerationResult<Biome>;

    /// Temperature at a world column, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot answer.
    fn temperature_at(&self, x: i32, z: i32) -> GenerationResult<f64>;

    /// Downfall at a world column, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot answer.
    fn downfall_at(&self, x: i32, z: i32) -> GenerationResult<f64>;

    /// Fills the 16x16 area whose minimum corner is `(origin_x, origin_z)`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a per-column query.
    fn fill_columns(&self, origin_x: i32, origin_z: i32, out: &mut ChunkClimate) -> GenerationResult<()> {
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let wx = origin_x.wrapping_add(x as i32);
                let wz = origin_z.wrapping_add(z as i32);
                let i = ChunkClimate::index(x, z);
                out.biomes[i] = self.biome_at(wx, wz)?;
                out.temperatures[i] = self.temperature_at(wx, wz)?;
                out.downfalls[i] = self.downfall_at(wx, wz)?;
            }
        }
        Ok(())
    }
}

/// Noise-driven climate with a biome lookup table.
pub struct ClimateBiomeSource {
    /// Temperature noise
    temperature_noise: SimplexNoise,
    /// Downfall noise
    downfall_noise: SimplexNoise,
    /// Small-scale jitter shared by both channels
    detail_noise: SimplexNoise,
    /// Biome per `(temperature, downfall)` cell, 64x64
    lookup: Box<[Biome]>,
}

impl ClimateBiomeSource {
    /// Lookup table resolution per axis.
    const TABLE_SIZE: usize = 64;
    /// Temperature frequency (blocks⁻¹).
    const TEMPERATURE_FREQ: f64 = 0.025;
    /// Downfall frequency.
    const DOWNFALL_FREQ: f64 = 0.05;
    /// Jitter frequency.
    const DETAIL_FREQ: f64 = 0.25;

    /// Creates a climate source from the world seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        let lookup = (0..Self::TABLE_SIZE * Self::TABLE_SIZE)
            .map(|i| {
                let last = (Self::TABLE_SIZE - 1) as f64;
                let t = (i % Self::TABLE_SIZE) as f64 / last;
                let h = (i / Self::TABLE_SIZE) as f64 / last;
                Biome::from_climate(t, h)
            })
            .collect();

        Self {
            temperature_noise: SimplexNoise::new(&mut GenRandom::new(seed.derive(purpose::TEMPERATURE).value())),
            downfall_noise: SimplexNoise::new(&mut GenRandom::new(seed.derive(purpose::DOWNFALL).value())),
            detail_noise: SimplexNoise::new(&mut GenRandom::new(seed.derive(purpose::DOWNFALL ^ 1).value())),
            lookup,
        }
    }

    /// `(temperature, downfall)` at a world column.
    #[must_use]
    pub fn climate_at(&self, x: i32, z: i32) -> (f64, f64) {
        let (x, z) = (f64::from(x), f64::from(z));
        let jitter = self.detail_noise.octaved(x * Self::DETAIL_FREQ, z * Self::DETAIL_FREQ, 2, 0.5, 2.0) * 1.1 + 0.5;

        let t = self.temperature_noise.octaved(x * Self::TEMPERATURE_FREQ, z * Self::TEMPERATURE_FREQ, 4, 0.5, 2.0);
        let t = (t * 0.5 + 0.5) * 0.99 + jitter * 0.01;
        // Skew toward warm
        let t = 1.0 - (1.0 - t) * (1.0 - t);

        let h = self.downfall_noise.octaved(x * Self::DOWNFALL_FREQ, z * Self::DOWNFALL_FREQ, 4, 0.5, 2.0);
        let h = (h * 0.5 + 0.5) * 0.998 + jitter * 0.002;

        (t.clamp(0.0, 1.0), h.clamp(0.0, 1.0))
    }

    fn lookup(&self, temperature: f64, downfall: f64) -> Biome {
        let last = (Self::TABLE_SIZE - 1) as f64;
        let ti = (temperature * last) as usize;
        let hi = (downfall * last) as usize;
        self.lookup[ti + hi * Self::TABLE_SIZE]
    }
}

impl BiomeSource for ClimateBiomeSource {
    fn biome_at(&self, x: i32, z: i32) -> GenerationResult<Biome> {
        let (t, h) = self.climate_at(x, z);
        Ok(self.lookup(t, h))
    }

    fn temperature_at(&self, x: i32, z: i32) -> GenerationResult<f64> {
        Ok(self.climate_at(x, z).0)
    }

    fn downfall_at(&self, x: i32, z: i32) -> GenerationResult<f64> {
        Ok(self.climate_at(x, z).1)
    }

    fn fill_columns(&self, origin_x: i32, origin_z: i32, out: &mut ChunkClimate) -> GenerationResult<()> {
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let (t, h) = self.climate_at(origin_x.wrapping_add(x as i32), origin_z.wrapping_add(z as i32));
                let i = ChunkClimate::index(x, z);
                out.biomes[i] = self.lookup(t, h);
                out.temperatures[i] = t;
                out.downfalls[i] = h;
            }
        }
        Ok(())
    }
}

/// One biome and one climate everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformBiomeSource {
    biome: Biome,
    temperature: f64,
    downfall: f64,
}

impl UniformBiomeSource {
    /// Uses the biome's representative climate.
    #[must_use]
    pub const fn new(biome: Biome) -> Self {
        let (temperature, downfall) = biome.default_climate();
        Self {
            biome,
            temperature,
            downfall,
        }
    }

    /// Overrides the reported climate.
    #[must_use]
    pub const fn with_climate(mut self, temperature: f64, downfall: f64) -> Self {
        self.temperature = temperature;
        self.downfall = downfall;
        self
    }
}

impl BiomeSource for UniformBiomeSource {
    fn biome_at(&self, _x: i32, _z: i32) -> GenerationResult<Biome> {
        Ok(self.biome)
    }

    fn temperature_at(&self, _x: i32, _z: i32) -> GenerationResult<f64> {
        Ok(self.temperature)
    }

    fn downfall_at(&self, _x: i32, _z: i32) -> GenerationResult<f64> {
        Ok(self.downfall)
    }

    fn fill_columns(&self, _origin_x: i32, _origin_z: i32, out: &mut ChunkClimate) -> GenerationResult<()> {
        out.biomes.fill(self.biome);
        out.temperatures.fill(self.temperature);
        out.downfalls.fill(self.downfall);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_extremes() {
        assert_eq!(Biome::from_climate(0.0, 0.0), Biome::Tundra);
        assert_eq!(Biome::from_climate(1.0, 0.0), Biome::Desert);
        assert_eq!(Biome::from_climate(1.0, 1.0), Biome::RainForest);
        assert_eq!(Biome::from_climate(0.6, 0.95), Biome::Swampland);
    }

    #[test]
    fn test_desert_is_sand_all_the_way_down() {
        assert_eq!(Biome::Desert.top_material(), Material::Sand);
        assert_eq!(Biome::Desert.filler_material(), Material::Sand);
        assert_eq!(Biome::Forest.top_material(), Material::Grass);
        assert_eq!(Biome::Forest.filler_material(), Material::Dirt);
    }

    #[test]
    fn test_climate_source_is_deterministic_and_bounded() {
        let a = ClimateBiomeSource::new(WorldSeed::new(42));
        let b = ClimateBiomeSource::new(WorldSeed::new(42));

        for i in 0..500 {
            let (x, z) = (i * 37 - 9000, i * -53 + 400);
            let (t, h) = a.climate_at(x, z);
            assert!((0.0..=1.0).contains(&t));
            assert!((0.0..=1.0).contains(&h));
            assert_eq!(a.biome_at(x, z).ok(), b.biome_at(x, z).ok());
        }
    }

    #[test]
    fn test_bulk_fill_matches_point_queries() {
        let source = ClimateBiomeSource::new(WorldSeed::new(7));
        let mut climate = ChunkClimate::default();
        source.fill_columns(-32, 48, &mut climate).expect("climate source is infallible");

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let (wx, wz) = (-32 + x as i32, 48 + z as i32);
                assert_eq!(Some(climate.biome(x, z)), source.biome_at(wx, wz).ok());
                assert_eq!(Some(climate.temperature(x, z)), source.temperature_at(wx, wz).ok());
            }
        }
    }

    #[test]
    fn test_climate_varies_over_distance() {
        let source = ClimateBiomeSource::new(WorldSeed::new(3));
        let mut biomes = std::collections::HashSet::new();
        for i in 0..400 {
            biomes.insert(source.biome_at(i * 97, i * 61).ok());
        }
        assert!(biomes.len() >= 3, "only saw {biomes:?}");
    }

    #[test]
    fn test_uniform_source() {
        let source = UniformBiomeSource::new(Biome::Desert).with_climate(0.9, 0.1);
        let mut climate = ChunkClimate::default();
        source.fill_columns(0, 0, &mut climate).expect("uniform source is infallible");
        assert!(climate.biomes.iter().all(|&b| b == Biome::Desert));
        assert!(climate.temperatures.iter().all(|&t| (t - 0.9).abs() < 1e-12));
    }
}
