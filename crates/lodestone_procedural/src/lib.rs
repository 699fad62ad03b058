//! # Lodestone Procedural Generation
//!
//! Deterministic voxel terrain: a seed and a chunk coordinate go in, a
//! 16 x H x 16 block volume comes out.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same seed and coordinate, same blocks, in any order
//! 2. **Chunked**: each chunk depends only on its coordinate and the seed
//! 3. **Owned scratch**: a generator reuses its buffers; one per thread
//! 4. **Collaborators at the edges**: biomes come in through [`BiomeSource`],
//!    blocks leave as a [`BlockVolume`]
//!
//! ## Pipeline
//!
//! - [`FractalNoise`]: octave sums of seeded gradient noise
//! - [`DensityFieldBuilder`]: coarse density lattice, interpolated to blocks
//! - [`SurfaceBuilder`]: topsoil, filler, patches and the bedrock shell
//! - [`CaveCarver`]: worm tunnels, rooms and canyons
//! - [`ChunkGenerator`]: runs the stages in order
//!
//! ## Example
//!
//! ```rust,no_run
//! use lodestone_procedural::{ChunkCoord, ChunkGenerator, GeneratorConfig, WorldSeed};
//!
//! let mut generator =
//!     ChunkGenerator::with_default_biomes(WorldSeed::new(12345), GeneratorConfig::overworld())?;
//! let volume = generator.generate(ChunkCoord::new(0, 0))?;
//! assert!(volume.surface_height(8, 8).is_some());
//! # Ok::<(), lodestone_procedural::GenerationError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod biome;
pub mod carver;
pub mod chunk;
pub mod config;
pub mod density;
pub mod error;
pub mod generator;
pub mod noise;
pub mod random;
pub mod seed;
pub mod surface;
pub mod worker;

pub use biome::{Biome, BiomeSource, ChunkClimate, ClimateBiomeSource, UniformBiomeSource};
pub use carver::{CarveStats, CaveCarver, TunnelKind, TunnelSegment};
pub use chunk::{BlockVolume, ChunkCoord, Material, MaterialCounts, NibbleArray, CHUNK_SIZE};
pub use config::{
    CarverVariant, Dimension, GeneratorConfig, NoiseOctaves, OriginCount, OriginHeight, SurfaceConfig,
    TerrainConfig,
};
pub use density::{DensityFieldBuilder, DensityLattice};
pub use error::{GenerationError, GenerationResult};
pub use generator::{default_biome_source, ChunkGenerator, ChunkStats, SharedGenerator};
pub use noise::{FractalNoise, GradientNoise, SimplexNoise};
pub use random::GenRandom;
pub use seed::WorldSeed;
pub use surface::SurfaceBuilder;
pub use worker::{GeneratorPool, PoolOutput};
