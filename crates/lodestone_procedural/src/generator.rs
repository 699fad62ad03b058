//! # Chunk Generator
//!
//! Runs the full pipeline for one chunk:
//!
//! ```text
//! reseed(chunk) ──► biomes ──► density ──► surface ──► carvers ──► BlockVolume
//! ```
//!
//! Noise fields are built once per generator from the world seed. The
//! per-chunk random stream and scratch buffers live inside the instance,
//! so `generate` takes `&mut self`: use one generator per thread, or wrap
//! one in a [`SharedGenerator`].

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::biome::{Biome, BiomeSource, ChunkClimate, ClimateBiomeSource, UniformBiomeSource};
use crate::carver::{CarveStats, CaveCarver};
use crate::chunk::{BlockVolume, ChunkCoord, MaterialCounts};
use crate::config::{Dimension, GeneratorConfig};
use crate::density::DensityFieldBuilder;
use crate::error::GenerationResult;
use crate::random::GenRandom;
use crate::seed::{purpose, WorldSeed};
use crate::surface::SurfaceBuilder;

/// Diagnostics for one generated chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkStats {
    /// Summed counters of every carve pass.
    pub carve: CarveStats,
    /// Final air/liquid/solid tallies.
    pub counts: MaterialCounts,
}

/// Deterministic chunk generator.
pub struct ChunkGenerator {
    seed: WorldSeed,
    config: GeneratorConfig,
    biomes: Arc<dyn BiomeSource>,
    density: DensityFieldBuilder,
    surface: SurfaceBuilder,
    carvers: Vec<CaveCarver>,
    climate: ChunkClimate,
    rng: GenRandom,
}

impl std::fmt::Debug for ChunkGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkGenerator")
            .field("seed", &self.seed)
            .field("dimension", &self.config.dimension)
            .field("carvers", &self.carvers.len())
            .finish_non_exhaustive()
    }
}

impl ChunkGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](crate::GenerationError::InvalidConfig) if
    /// `config` fails validation.
    pub fn new(seed: WorldSeed, config: GeneratorConfig, biomes: Arc<dyn BiomeSource>) -> GenerationResult<Self> {
        config.validate()?;

        let mut terrain_rng = GenRandom::new(seed.derive(purpose::TERRAIN).value());
        let density = DensityFieldBuilder::new(&mut terrain_rng, &config);
        let surface = SurfaceBuilder::new(&mut terrain_rng, &config);
        let carvers = config
            .carvers
            .iter()
            .enumerate()
            .map(|(index, variant)| CaveCarver::new(seed, index, variant.clone(), config.world_height))
            .collect();

        info!(
            "Chunk generator ready: seed {:#018x}, {:?}, {} carver pass(es)",
            seed.value(),
            config.dimension,
            config.carvers.len()
        );

        Ok(Self {
            seed,
            config,
            biomes,
            density,
            surface,
            carvers,
            climate: ChunkClimate::default(),
            rng: GenRandom::new(seed.value()),
        })
    }

    /// Creates a generator with the dimension's built-in biome source:
    /// seeded climate noise for the overworld, uniform hell otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_default_biomes(seed: WorldSeed, config: GeneratorConfig) -> GenerationResult<Self> {
        let biomes = default_biome_source(seed, config.dimension);
        Self::new(seed, config, biomes)
    }

    /// World seed.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates one chunk.
    ///
    /// # Errors
    ///
    /// Propagates a biome source failure unchanged.
    pub fn generate(&mut self, coord: ChunkCoord) -> GenerationResult<BlockVolume> {
        self.generate_with_stats(coord).map(|(volume, _)| volume)
    }

    /// Generates one chunk and reports carve and material counters.
    ///
    /// # Errors
    ///
    /// Propagates a biome source failure unchanged.
    pub fn generate_with_stats(&mut self, coord: ChunkCoord) -> GenerationResult<(BlockVolume, ChunkStats)> {
        let started = Instant::now();

        self.rng.reseed(self.seed.for_chunk(coord));
        self.biomes
            .fill_columns(coord.world_x(), coord.world_z(), &mut self.climate)?;

        let mut volume = BlockVolume::new(coord, self.config.world_height as usize);
        self.density.shape(coord, &self.climate, &mut volume);
        self.surface.build(coord, &self.climate, &mut volume, &mut self.rng);

        let mut stats = ChunkStats::default();
        for carver in &mut self.carvers {
            stats.carve.merge(&carver.carve(&mut volume));
        }
        stats.counts = volume.material_counts();

        debug!(
            "Chunk {} generated in {:?}: {} solid, {} liquid, {} carved",
            coord,
            started.elapsed(),
            stats.counts.solid,
            stats.counts.liquid,
            stats.carve.carved
        );

        Ok((volume, stats))
    }
}

/// Built-in biome source for a dimension.
#[must_use]
pub fn default_biome_source(seed: WorldSeed, dimension: Dimension) -> Arc<dyn BiomeSource> {
    match dimension {
        Dimension::Overworld => Arc::new(ClimateBiomeSource::new(seed)),
        Dimension::Hell => Arc::new(UniformBiomeSource::new(Biome::Hell)),
    }
}

/// A [`ChunkGenerator`] behind a mutex, for callers that share one instance.
#[derive(Debug)]
pub struct SharedGenerator {
    inner: Mutex<ChunkGenerator>,
}

impl SharedGenerator {
    /// Wraps a generator.
    #[must_use]
    pub fn new(generator: ChunkGenerator) -> Self {
        Self {
            inner: Mutex::new(generator),
        }
    }

    /// Generates one chunk, holding the lock for the whole call.
    ///
    /// # Errors
    ///
    /// Propagates a biome source failure unchanged.
    pub fn generate(&self, coord: ChunkCoord) -> GenerationResult<BlockVolume> {
        self.inner.lock().generate(coord)
    }

    /// Like [`generate`](Self::generate), with counters.
    ///
    /// # Errors
    ///
    /// Propagates a biome source failure unchanged.
    pub fn generate_with_stats(&self, coord: ChunkCoord) -> GenerationResult<(BlockVolume, ChunkStats)> {
        self.inner.lock().generate_with_stats(coord)
    }

    /// Unwraps the generator.
    #[must_use]
    pub fn into_inner(self) -> ChunkGenerator {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Material, CHUNK_SIZE};
    use crate::error::GenerationError;

    struct FailingSource;

    impl BiomeSource for FailingSource {
        fn biome_at(&self, _x: i32, _z: i32) -> GenerationResult<Biome> {
            Err(GenerationError::BiomeSource {
                reason: "climate service offline".to_owned(),
            })
        }

        fn temperature_at(&self, _x: i32, _z: i32) -> GenerationResult<f64> {
            Ok(0.5)
        }

        fn downfall_at(&self, _x: i32, _z: i32) -> GenerationResult<f64> {
            Ok(0.5)
        }
    }

    fn overworld(seed: u64) -> ChunkGenerator {
        ChunkGenerator::with_default_biomes(WorldSeed::new(seed), GeneratorConfig::overworld())
            .expect("preset is valid")
    }

    #[test]
    fn test_chunk_generation_determinism() {
        let mut a = overworld(12345);
        let mut b = overworld(12345);

        let coord = ChunkCoord::new(5, -3);
        let first = a.generate(coord).expect("generation succeeds");
        let second = b.generate(coord).expect("generation succeeds");
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_independence() {
        let mut fresh = overworld(77);
        let mut warmed = overworld(77);
        for x in -2..2 {
            warmed.generate(ChunkCoord::new(x, 9)).expect("generation succeeds");
        }

        let coord = ChunkCoord::new(1, 1);
        assert_eq!(
            fresh.generate(coord).expect("generation succeeds"),
            warmed.generate(coord).expect("generation succeeds")
        );
    }

    #[test]
    fn test_chunk_has_terrain() {
        let mut generator = overworld(42);
        let (volume, stats) = generator
            .generate_with_stats(ChunkCoord::new(0, 0))
            .expect("generation succeeds");

        assert!(stats.counts.solid > 0);
        assert!(stats.counts.air > 0);
        assert_eq!(
            stats.counts.solid + stats.counts.liquid + stats.counts.air,
            CHUNK_SIZE * CHUNK_SIZE * 128
        );
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                assert_eq!(volume.get(x, 0, z), Material::Bedrock);
            }
        }
    }

    #[test]
    fn test_biome_failure_propagates() {
        let mut generator =
            ChunkGenerator::new(WorldSeed::new(1), GeneratorConfig::overworld(), Arc::new(FailingSource))
                .expect("preset is valid");
        let err = generator.generate(ChunkCoord::new(0, 0)).unwrap_err();
        assert!(matches!(err, GenerationError::BiomeSource { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GeneratorConfig::overworld();
        config.world_height = 12;
        assert!(ChunkGenerator::with_default_biomes(WorldSeed::new(1), config).is_err());
    }

    #[test]
    fn test_shared_generator_matches_owned() {
        let shared = SharedGenerator::new(overworld(9));
        let mut owned = overworld(9);
        let coord = ChunkCoord::new(-4, 2);
        assert_eq!(
            shared.generate(coord).expect("generation succeeds"),
            owned.generate(coord).expect("generation succeeds")
        );
    }

    #[test]
    fn test_hell_has_two_shells_and_lava_sea() {
        let mut generator =
            ChunkGenerator::with_default_biomes(WorldSeed::new(3), GeneratorConfig::hell()).expect("preset is valid");
        let volume = generator.generate(ChunkCoord::new(2, 2)).expect("generation succeeds");

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                assert_eq!(volume.get(x, 0, z), Material::Bedrock);
                assert_eq!(volume.get(x, 127, z), Material::Bedrock);
            }
        }
        assert_eq!(volume.count(Material::Water), 0);
        assert!(volume.count(Material::Netherrack) > 0);
    }
}
