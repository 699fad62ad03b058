//! Surface materials: boundary shells, topsoil, filler and patch overrides.
//!
//! Each column is scanned top-down. Crossing from air into rock starts a
//! soil run of the column's thickness; the run ends at the first rock after
//! the budget is spent and does not restart until air is seen again.

use lodestone_core::ScratchBuffer;

use crate::biome::ChunkClimate;
use crate::chunk::{BlockVolume, ChunkCoord, Material, CHUNK_SIZE, COLUMNS_PER_CHUNK};
use crate::config::{GeneratorConfig, SurfaceConfig};
use crate::noise::FractalNoise;
use crate::random::GenRandom;

/// Y offset of the gravel patch slice through the shared patch field.
const GRAVEL_SLICE_Y: f64 = 109.0134;

/// Applies the surface pass to density-shaped volumes.
#[derive(Clone, Debug)]
pub struct SurfaceBuilder {
    patches: FractalNoise,
    soil_depth: FractalNoise,
    config: SurfaceConfig,
    sea_level: i32,
    sand_buf: ScratchBuffer<f64>,
    gravel_buf: ScratchBuffer<f64>,
    soil_buf: ScratchBuffer<f64>,
}

impl SurfaceBuilder {
    /// Draws the patch field, then the soil depth field, from `rng`.
    #[must_use]
    pub fn new(rng: &mut GenRandom, config: &GeneratorConfig) -> Self {
        let patches = FractalNoise::new(rng, config.octaves.patches);
        let soil_depth = FractalNoise::new(rng, config.octaves.soil_depth);

        Self {
            patches,
            soil_depth,
            config: config.surface.clone(),
            sea_level: config.sea_level as i32,
            sand_buf: ScratchBuffer::new(COLUMNS_PER_CHUNK),
            gravel_buf: ScratchBuffer::new(COLUMNS_PER_CHUNK),
            soil_buf: ScratchBuffer::new(COLUMNS_PER_CHUNK),
        }
    }

    /// Replaces rock near the surface with soil and caps the world with
    /// the boundary material.
    ///
    /// `rng` is the chunk stream; per-column draws happen in column order.
    pub fn build(&mut self, coord: ChunkCoord, climate: &ChunkClimate, volume: &mut BlockVolume, rng: &mut GenRandom) {
        let wx = f64::from(coord.world_x());
        let wz = f64::from(coord.world_z());
        let pf = self.config.patch_frequency;
        let sf = self.config.soil_depth_frequency;

        self.sand_buf.reset();
        self.gravel_buf.reset();
        self.soil_buf.reset();

        // All three fields are indexed x * 16 + z
        self.patches
            .fill_region_from_finest(&mut self.sand_buf, [wx, wz, 0.0], [CHUNK_SIZE, CHUNK_SIZE, 1], [pf, pf, 1.0]);
        self.patches.fill_region_from_finest(
            &mut self.gravel_buf,
            [wx, GRAVEL_SLICE_Y, wz],
            [CHUNK_SIZE, 1, CHUNK_SIZE],
            [pf, 1.0, pf],
        );
        self.soil_depth
            .fill_region_from_finest(&mut self.soil_buf, [wx, wz, 0.0], [CHUNK_SIZE, CHUNK_SIZE, 1], [sf, sf, sf]);

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let i = ChunkClimate::index(x, z);
                let biome = climate.biomes[i];
                let column = ColumnSoil {
                    sand: self.sand_buf[i] + rng.next_f64() * self.config.patch_jitter > self.config.sand_threshold,
                    gravel: self.gravel_buf[i] + rng.next_f64() * self.config.patch_jitter
                        > self.config.gravel_threshold,
                    thickness: ((self.soil_buf[i] / 3.0
                        + self.config.soil_depth_bias
                        + rng.next_f64() * self.config.soil_depth_jitter) as i32)
                        .max(0),
                    top: biome.top_material(),
                    filler: biome.filler_material(),
                };
                let floor = self.boundary_limit(self.config.floor_layers, rng);
                let ceiling = self.boundary_limit(self.config.ceiling_layers, rng);

                self.build_column(volume.column_mut(x, z), column, floor, ceiling);
            }
        }
    }

    /// Per-column boundary depth, or `None` when the shell is disabled.
    fn boundary_limit(&self, layers: u32, rng: &mut GenRandom) -> Option<i32> {
        (layers > 0).then(|| rng.next_bounded(layers as i32))
    }

    fn build_column(&self, column: &mut [Material], soil: ColumnSoil, floor: Option<i32>, ceiling: Option<i32>) {
        let cfg = &self.config;
        let top_y = column.len() as i32 - 1;
        let band = (self.sea_level - cfg.patch_band_below as i32)..=(self.sea_level + cfg.patch_band_above as i32);

        let mut top = soil.top;
        let mut filler = soil.filler;
        let mut remaining = -1;

        for y in (0..=top_y).rev() {
            let voxel = &mut column[y as usize];

            let in_floor = floor.is_some_and(|depth| y <= depth);
            let in_ceiling = ceiling.is_some_and(|depth| y >= top_y - depth);
            if in_floor || in_ceiling {
                *voxel = cfg.boundary;
                continue;
            }

            let current = *voxel;
            if current.is_air() {
                remaining = -1;
            } else if current != cfg.rock {
                // Liquids neither start nor end a soil run
            } else if remaining == -1 {
                if soil.thickness <= 0 {
                    top = Material::Air;
                    filler = cfg.rock;
                } else if band.contains(&y) {
                    top = soil.top;
                    filler = soil.filler;
                    if soil.gravel {
                        top = cfg.gravel_top;
                        filler = cfg.gravel_filler;
                    }
                    if soil.sand {
                        top = cfg.sand_material;
                        filler = cfg.sand_material;
                    }
                }

                if y < self.sea_level && top.is_air() {
                    top = cfg.liquid;
                }

                remaining = soil.thickness;
                *voxel = if y >= self.sea_level - 1 { top } else { filler };
            } else if remaining > 0 {
                remaining -= 1;
                *voxel = filler;
            }
        }
    }
}

/// Per-column draws for one surface pass.
#[derive(Clone, Copy, Debug)]
struct ColumnSoil {
    sand: bool,
    gravel: bool,
    thickness: i32,
    top: Material,
    filler: Material,
}
