//! # Density Field
//!
//! Terrain shape is decided on a coarse lattice (one point every 4 blocks
//! horizontally and every 8 blocks vertically) and then interpolated up to
//! block resolution. Positive density is rock, everything else is air or,
//! below the liquid level, liquid.
//!
//! ## Lattice Value
//!
//! ```text
//! density(x, y, z) = clampedLerp(selector, landmassA, landmassB) - falloff(column, y)
//! ```
//!
//! Two independently seeded landmass fields are blended by a third selector
//! field, so regions switch character without either field dominating. The
//! falloff term depends on the dimension:
//!
//! - **Overworld**: each column gets a midline height (from the depth field)
//!   and a roughness (from the scale field, biased by humidity). Density
//!   drops linearly away from the midline, four times faster below it.
//! - **Hell**: a fixed cosine profile over height, with a cubic penalty in
//!   the four lattice layers nearest the floor and the ceiling.
//!
//! In both, the top lattice layers blend toward a strongly negative value
//! so terrain never touches the ceiling.

use lodestone_core::math::{clamped_lerp, lerp};
use lodestone_core::ScratchBuffer;

use crate::biome::ChunkClimate;
use crate::chunk::{BlockVolume, ChunkCoord, Material, CHUNK_SIZE};
use crate::config::{Dimension, GeneratorConfig, TerrainConfig, VERTICAL_STRIDE};
use crate::noise::{region_index, FractalNoise};
use crate::random::GenRandom;

/// Blocks per horizontal lattice cell.
pub const HORIZONTAL_STRIDE: usize = 4;

/// Lattice points per horizontal axis.
pub const LATTICE_WIDTH: usize = CHUNK_SIZE / HORIZONTAL_STRIDE + 1;

/// Blocks per vertical lattice cell.
const VERTICAL: usize = VERTICAL_STRIDE as usize;

/// Coarse density samples for one chunk.
#[derive(Clone, Debug)]
pub struct DensityLattice {
    values: ScratchBuffer<f64>,
    height: usize,
}

impl DensityLattice {
    /// Creates a zeroed lattice with `height` vertical points.
    #[must_use]
    pub fn new(height: usize) -> Self {
        Self {
            values: ScratchBuffer::new(LATTICE_WIDTH * height * LATTICE_WIDTH),
            height,
        }
    }

    /// Vertical lattice points.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Value at a lattice point.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f64 {
        self.values[region_index(x, y, z, self.height, LATTICE_WIDTH)]
    }

    /// Interpolated density at a local block position.
    ///
    /// Interpolates along Y first, then X, then Z. `by` must be below the
    /// world height covered by the lattice.
    #[must_use]
    pub fn interpolate(&self, bx: usize, by: usize, bz: usize) -> f64 {
        let (cx, sx) = (bx / HORIZONTAL_STRIDE, bx % HORIZONTAL_STRIDE);
        let (cy, sy) = (by / VERTICAL, by % VERTICAL);
        let (cz, sz) = (bz / HORIZONTAL_STRIDE, bz % HORIZONTAL_STRIDE);

        let ty = sy as f64 / VERTICAL as f64;
        let tx = sx as f64 / HORIZONTAL_STRIDE as f64;
        let tz = sz as f64 / HORIZONTAL_STRIDE as f64;

        let d00 = lerp(ty, self.get(cx, cy, cz), self.get(cx, cy + 1, cz));
        let d10 = lerp(ty, self.get(cx + 1, cy, cz), self.get(cx + 1, cy + 1, cz));
        let d01 = lerp(ty, self.get(cx, cy, cz + 1), self.get(cx, cy + 1, cz + 1));
        let d11 = lerp(ty, self.get(cx + 1, cy, cz + 1), self.get(cx + 1, cy + 1, cz + 1));

        let d0 = lerp(tx, d00, d10);
        let d1 = lerp(tx, d01, d11);
        lerp(tz, d0, d1)
    }

    fn set(&mut self, x: usize, y: usize, z: usize, value: f64) {
        let index = region_index(x, y, z, self.height, LATTICE_WIDTH);
        self.values[index] = value;
    }
}

/// Overworld per-column noise: roughness ("scale") and midline ("depth").
#[derive(Clone, Debug)]
struct ColumnBias {
    scale: FractalNoise,
    depth: FractalNoise,
    scale_buf: ScratchBuffer<f64>,
    depth_buf: ScratchBuffer<f64>,
}

/// Builds the density lattice and expands it into a block volume.
///
/// Owns its noise fields and scratch buffers; not for concurrent use.
#[derive(Clone, Debug)]
pub struct DensityFieldBuilder {
    landmass_a: FractalNoise,
    landmass_b: FractalNoise,
    selector: FractalNoise,
    column_bias: Option<ColumnBias>,
    terrain: TerrainConfig,
    world_height: usize,
    liquid_level: usize,
    rock: Material,
    liquid: Material,
    freeze_temperature: Option<f64>,
    landmass_a_buf: ScratchBuffer<f64>,
    landmass_b_buf: ScratchBuffer<f64>,
    selector_buf: ScratchBuffer<f64>,
    /// Per-layer falloff for the hell profile.
    layer_falloff: Vec<f64>,
    lattice: DensityLattice,
}

impl DensityFieldBuilder {
    /// Draws the landmass, selector and (overworld) column fields from `rng`, in that order.
    #[must_use]
    pub fn new(rng: &mut GenRandom, config: &GeneratorConfig) -> Self {
        let octaves = &config.octaves;
        let ly = config.lattice_height();
        let lattice_len = LATTICE_WIDTH * ly * LATTICE_WIDTH;
        let column_len = LATTICE_WIDTH * LATTICE_WIDTH;

        let landmass_a = FractalNoise::new(rng, octaves.landmass);
        let landmass_b = FractalNoise::new(rng, octaves.landmass);
        let selector = FractalNoise::new(rng, octaves.selector);
        let column_bias = (config.dimension == Dimension::Overworld).then(|| ColumnBias {
            scale: FractalNoise::new(rng, octaves.scale),
            depth: FractalNoise::new(rng, octaves.depth),
            scale_buf: ScratchBuffer::new(column_len),
            depth_buf: ScratchBuffer::new(column_len),
        });

        Self {
            landmass_a,
            landmass_b,
            selector,
            column_bias,
            terrain: config.terrain,
            world_height: config.world_height as usize,
            liquid_level: config.liquid_level as usize,
            rock: config.surface.rock,
            liquid: config.surface.liquid,
            freeze_temperature: config.surface.freeze_temperature,
            landmass_a_buf: ScratchBuffer::new(lattice_len),
            landmass_b_buf: ScratchBuffer::new(lattice_len),
            selector_buf: ScratchBuffer::new(lattice_len),
            layer_falloff: hell_falloff(ly),
            lattice: DensityLattice::new(ly),
        }
    }

    /// The lattice from the last [`build_lattice`](Self::build_lattice) call.
    #[inline]
    #[must_use]
    pub fn lattice(&self) -> &DensityLattice {
        &self.lattice
    }

    /// Computes the coarse lattice for one chunk.
    pub fn build_lattice(&mut self, coord: ChunkCoord, climate: &ChunkClimate) -> &DensityLattice {
        let ly = self.lattice.height();
        let t = self.terrain;
        let origin = [
            f64::from(coord.x) * (LATTICE_WIDTH - 1) as f64,
            0.0,
            f64::from(coord.z) * (LATTICE_WIDTH - 1) as f64,
        ];
        let size = [LATTICE_WIDTH, ly, LATTICE_WIDTH];

        self.landmass_a_buf.reset();
        self.landmass_b_buf.reset();
        self.selector_buf.reset();
        self.lattice.values.reset();

        let landmass_freq = [t.horizontal_scale, t.vertical_scale, t.horizontal_scale];
        let selector_freq = [
            t.horizontal_scale / t.selector_divisor[0],
            t.vertical_scale / t.selector_divisor[1],
            t.horizontal_scale / t.selector_divisor[2],
        ];
        self.landmass_a.fill_region_from_finest(&mut self.landmass_a_buf, origin, size, landmass_freq);
        self.landmass_b.fill_region_from_finest(&mut self.landmass_b_buf, origin, size, landmass_freq);
        self.selector.fill_region_from_finest(&mut self.selector_buf, origin, size, selector_freq);

        if let Some(bias) = self.column_bias.as_mut() {
            let column_size = [LATTICE_WIDTH, 1, LATTICE_WIDTH];
            bias.scale_buf.reset();
            bias.depth_buf.reset();
            bias.scale.fill_region_from_finest(
                &mut bias.scale_buf,
                origin,
                column_size,
                [t.scale_frequency, 1.0, t.scale_frequency],
            );
            bias.depth.fill_region_from_finest(
                &mut bias.depth_buf,
                origin,
                column_size,
                [t.depth_frequency, 1.0, t.depth_frequency],
            );
        }

        for x in 0..LATTICE_WIDTH {
            for z in 0..LATTICE_WIDTH {
                let column = self.column_shape(x, z, climate);
                for y in 0..ly {
                    let index = region_index(x, y, z, ly, LATTICE_WIDTH);
                    let a = self.landmass_a_buf[index] / t.landmass_divisor;
                    let b = self.landmass_b_buf[index] / t.landmass_divisor;
                    let selector = (self.selector_buf[index] / 10.0 + 1.0) / 2.0;

                    let falloff = match column {
                        Some((midline, scale)) => {
                            let falloff = (y as f64 - midline) * t.falloff_steepness / scale;
                            if falloff < 0.0 {
                                falloff * t.below_midline_factor
                            } else {
                                falloff
                            }
                        }
                        None => self.layer_falloff[y],
                    };

                    let mut density = clamped_lerp(selector, a, b) - falloff;

                    let taper_start = ly - 1 - t.ceiling_taper_layers as usize;
                    if y > taper_start {
                        let blend = (y - taper_start) as f64 / f64::from(t.ceiling_taper_layers);
                        density = density * (1.0 - blend) + t.ceiling_density * blend;
                    }

                    self.lattice.set(x, y, z, density);
                }
            }
        }

        &self.lattice
    }

    /// Builds the lattice and writes rock, liquid and air into `volume`.
    pub fn shape(&mut self, coord: ChunkCoord, climate: &ChunkClimate, volume: &mut BlockVolume) {
        self.build_lattice(coord, climate);

        let height = self.world_height.min(volume.height());
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let frozen = self
                    .freeze_temperature
                    .is_some_and(|limit| climate.temperature(x, z) < limit);
                for y in 0..height {
                    let material = if self.lattice.interpolate(x, y, z) > 0.0 {
                        self.rock
                    } else if y < self.liquid_level {
                        if frozen && y + 1 == self.liquid_level {
                            Material::Ice
                        } else {
                            self.liquid
                        }
                    } else {
                        Material::Air
                    };
                    volume.set(x, y, z, material);
                }
            }
        }
    }

    /// Midline and roughness of one overworld lattice column.
    fn column_shape(&self, x: usize, z: usize, climate: &ChunkClimate) -> Option<(f64, f64)> {
        let bias = self.column_bias.as_ref()?;

        let ly = self.lattice.height() as f64;
        let index = x * LATTICE_WIDTH + z;

        // Climate at the block nearest the lattice column
        let step = CHUNK_SIZE / LATTICE_WIDTH;
        let (bx, bz) = (x * step + step / 2, z * step + step / 2);
        let wetness = (climate.downfall(bx, bz) * climate.temperature(bx, bz)).clamp(0.0, 1.0);
        let roughness = 1.0 - wetness.powi(4);

        let mut scale = ((bias.scale_buf[index] + 256.0) / 512.0 * roughness).min(1.0);

        let mut depth = bias.depth_buf[index] / 8000.0;
        if depth < 0.0 {
            depth = -depth * 0.3;
        }
        depth = depth * 3.0 - 2.0;
        if depth < 0.0 {
            // Ocean floor: flatten and pin the roughness
            depth = (depth / 2.0).max(-1.0) / 1.4 / 2.0;
            scale = 0.0;
        } else {
            depth = depth.min(1.0) / 8.0;
        }
        let scale = scale.max(0.0) + 0.5;

        let depth = depth * ly / 16.0;
        let midline = ly / 2.0 + depth * 4.0;
        Some((midline, scale))
    }
}

/// Per-layer hell falloff: cosine bands plus cubic floor and ceiling walls.
fn hell_falloff(ly: usize) -> Vec<f64> {
    (0..ly)
        .map(|y| {
            let mut falloff = (y as f64 * std::f64::consts::PI * 6.0 / ly as f64).cos() * 2.0;
            let edge = if y > ly / 2 { ly - 1 - y } else { y };
            if edge < 4 {
                let penetration = (4 - edge) as f64;
                falloff -= penetration * penetration * penetration * 10.0;
            }
            falloff
        })
        .collect()
}
