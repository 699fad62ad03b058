//! # Worm Carving
//!
//! Caves, canyons and hell caves are all one algorithm driven by a
//! [`CarverVariant`]. Tunnels are wandering paths whose cross-section is an
//! ellipsoid that swells and tapers over the path; every voxel of the
//! target chunk inside an ellipsoid is replaced with air (or lava near the
//! world floor).
//!
//! ## Origins
//!
//! A tunnel may start up to `range_chunks` chunks away and still reach the
//! target, so every chunk in that square is visited. Each source chunk
//! reseeds the origin stream from its own coordinate, which makes a tunnel
//! identical no matter which neighbouring chunk is being carved.
//!
//! ## Work-list
//!
//! Segments live on an explicit stack. A seed tunnel that reaches its
//! branch step pushes two [`TunnelKind::Branch`] segments and ends there.
//! Each segment owns a private random stream seeded when it was pushed, so
//! processing order never changes the result.
//!
//! ## Safety
//!
//! A step whose box (plus a one-voxel margin) holds a guarded liquid is
//! skipped whole; a blocked room walks on until it reaches clear rock. Only
//! materials listed as carvable are ever replaced, so liquids and the
//! boundary shell survive every carve.

use std::f64::consts::PI;

use tracing::trace;

use crate::chunk::{BlockVolume, ChunkCoord, Material, CHUNK_SIZE};
use crate::config::{CarverVariant, OriginCount, OriginHeight};
use crate::random::GenRandom;
use crate::seed::{purpose, WorldSeed};

/// Distance travelled per step, in blocks.
const STEP_LENGTH: f64 = 1.0;

/// Extra rooms spawn this many additional tunnels at most (exclusive).
const ROOM_EXTRA_TUNNELS: i32 = 4;

/// Ellipsoid floor cut: flattens the bottom of every cross-section.
const FLOOR_CUT: f64 = -0.7;

/// Blocks kept uncarved under the world ceiling.
const CEILING_MARGIN: i32 = 8;

/// What a segment is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TunnelKind {
    /// A single bulb: starts at the path midpoint, carves once, never branches.
    Room,
    /// A fresh tunnel from an origin; may split into two branches.
    Seed,
    /// Spawned by a seed tunnel; never branches again.
    Branch,
}

/// One pending tunnel on the work-list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TunnelSegment {
    /// Seed of the segment's private random stream.
    pub seed: u64,
    /// Start position in world block coordinates.
    pub origin: [f64; 3],
    /// Base radius multiplier.
    pub thickness: f64,
    /// Heading around the Y axis, radians.
    pub yaw: f64,
    /// Heading above the horizon, radians.
    pub pitch: f64,
    /// First step index. Ignored for rooms, which start at the midpoint.
    pub start_step: i32,
    /// Step count; drawn from the variant's range when `None`.
    pub step_budget: Option<i32>,
    /// Vertical radius multiplier.
    pub vertical_scale: f64,
    /// Segment behaviour.
    pub kind: TunnelKind,
}

impl TunnelSegment {
    /// A room bulb at `origin`.
    #[must_use]
    pub const fn room(seed: u64, origin: [f64; 3], thickness: f64, vertical_scale: f64) -> Self {
        Self {
            seed,
            origin,
            thickness,
            yaw: 0.0,
            pitch: 0.0,
            start_step: 0,
            step_budget: None,
            vertical_scale,
            kind: TunnelKind::Room,
        }
    }

    /// A seed tunnel starting at step 0.
    #[must_use]
    pub const fn tunnel(
        seed: u64,
        origin: [f64; 3],
        thickness: f64,
        yaw: f64,
        pitch: f64,
        vertical_scale: f64,
    ) -> Self {
        Self {
            seed,
            origin,
            thickness,
            yaw,
            pitch,
            start_step: 0,
            step_budget: None,
            vertical_scale,
            kind: TunnelKind::Seed,
        }
    }
}

/// Counters from one carve pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CarveStats {
    /// Origins spawned by the scanned source chunks.
    pub origins: usize,
    /// Segments taken off the work-list.
    pub segments: usize,
    /// Branch segments spawned.
    pub branches: usize,
    /// Segments that wandered out of reach or found no lava.
    pub aborted: usize,
    /// Steps skipped because a guarded liquid was in the box.
    pub liquid_skips: usize,
    /// Voxels replaced.
    pub carved: usize,
}

impl CarveStats {
    /// Adds another pass's counters.
    pub fn merge(&mut self, other: &Self) {
        self.origins += other.origins;
        self.segments += other.segments;
        self.branches += other.branches;
        self.aborted += other.aborted;
        self.liquid_skips += other.liquid_skips;
        self.carved += other.carved;
    }
}

/// Runs one carver variant against generated chunks.
#[derive(Clone, Debug)]
pub struct CaveCarver {
    variant: CarverVariant,
    seed: u64,
    x_scale: i64,
    z_scale: i64,
    world_height: i32,
    origin_rng: GenRandom,
    stack: Vec<TunnelSegment>,
}

impl CaveCarver {
    /// Creates the carver for the `index`-th pass of a world.
    #[must_use]
    pub fn new(seed: WorldSeed, index: usize, variant: CarverVariant, world_height: u32) -> Self {
        let seed = seed.derive(purpose::CARVER.wrapping_add(index as u64)).value();
        let mut origin_rng = GenRandom::new(seed);
        // Odd scales keep the per-chunk mix a bijection in each axis
        let x_scale = origin_rng.next_i64() / 2 * 2 + 1;
        let z_scale = origin_rng.next_i64() / 2 * 2 + 1;

        Self {
            variant,
            seed,
            x_scale,
            z_scale,
            world_height: world_height as i32,
            origin_rng,
            stack: Vec::new(),
        }
    }

    /// The variant this carver runs.
    #[must_use]
    pub fn variant(&self) -> &CarverVariant {
        &self.variant
    }

    /// Carves every tunnel that can reach `volume`'s chunk.
    pub fn carve(&mut self, volume: &mut BlockVolume) -> CarveStats {
        let target = volume.coord();
        let range = self.variant.range_chunks;
        let mut stats = CarveStats::default();

        self.stack.clear();
        // Coordinates wrap at the i32 edge like block positions do
        for dx in -range..=range {
            for dz in -range..=range {
                let source = ChunkCoord::new(target.x.wrapping_add(dx), target.z.wrapping_add(dz));
                stats.origins += self.spawn_origins(source);
            }
        }
        trace!(
            carver = %self.variant.name,
            chunk = %target,
            origins = stats.origins,
            segments = self.stack.len(),
            "carve origins collected"
        );

        self.drain(volume, &mut stats);
        stats
    }

    /// Carves the given segments (and any branches they spawn) into `volume`.
    pub fn carve_segments(
        &mut self,
        volume: &mut BlockVolume,
        segments: impl IntoIterator<Item = TunnelSegment>,
    ) -> CarveStats {
        let mut stats = CarveStats::default();
        self.stack.clear();
        self.stack.extend(segments);
        self.drain(volume, &mut stats);
        stats
    }

    fn drain(&mut self, volume: &mut BlockVolume, stats: &mut CarveStats) {
        while let Some(segment) = self.stack.pop() {
            stats.segments += 1;
            self.run_segment(segment, volume, stats);
        }
    }

    /// Pushes the origins of one source chunk; returns how many it had.
    fn spawn_origins(&mut self, source: ChunkCoord) -> usize {
        let v = &self.variant;
        let rng = &mut self.origin_rng;

        let mix = i64::from(source.x)
            .wrapping_mul(self.x_scale)
            .wrapping_add(i64::from(source.z).wrapping_mul(self.z_scale));
        rng.reseed(mix as u64 ^ self.seed);

        let count = match v.origin_count {
            OriginCount::Nested { max } => {
                let inner = rng.next_bounded(max) + 1;
                let middle = rng.next_bounded(inner) + 1;
                rng.next_bounded(middle)
            }
            OriginCount::One => 1,
        };
        if rng.next_bounded(v.rarity) != 0 {
            return 0;
        }

        for _ in 0..count {
            let x = f64::from(source.world_x()) + f64::from(rng.next_bounded(CHUNK_SIZE as i32));
            let y = f64::from(match v.origin_height {
                OriginHeight::Biased { max } => {
                    let bound = rng.next_bounded(max) + 8;
                    rng.next_bounded(bound)
                }
                OriginHeight::Uniform { max } => rng.next_bounded(max),
            });
            let z = f64::from(source.world_z()) + f64::from(rng.next_bounded(CHUNK_SIZE as i32));
            let origin = [x, y, z];

            let mut tunnels = 1;
            if v.room_chance > 0 && rng.next_bounded(v.room_chance) == 0 {
                let seed = rng.next_u64();
                let radius = v.room_radius_min + rng.next_f64() * v.room_radius_spread;
                self.stack
                    .push(TunnelSegment::room(seed, origin, radius, v.room_vertical_scale));
                tunnels += rng.next_bounded(ROOM_EXTRA_TUNNELS);
            }

            for _ in 0..tunnels {
                let yaw = rng.next_f64() * PI * 2.0;
                let pitch = (rng.next_f64() - 0.5) * 2.0 / 8.0;
                let thickness = (rng.next_f64() * 2.0 + rng.next_f64()) * v.thickness_scale + v.thickness_bias;
                let seed = rng.next_u64();
                self.stack.push(TunnelSegment::tunnel(
                    seed,
                    origin,
                    thickness,
                    yaw,
                    pitch,
                    v.vertical_scale,
                ));
            }
        }

        count.max(0) as usize
    }

    /// Longest path a segment may take.
    fn max_budget(&self) -> i32 {
        self.variant.range_chunks * CHUNK_SIZE as i32 - CHUNK_SIZE as i32
    }

    fn run_segment(&mut self, segment: TunnelSegment, volume: &mut BlockVolume, stats: &mut CarveStats) {
        let target = volume.coord();
        let center_x = f64::from(target.world_x()) + 8.0;
        let center_z = f64::from(target.world_z()) + 8.0;

        let mut rng = GenRandom::new(segment.seed);
        let budget = segment.step_budget.unwrap_or_else(|| {
            let max = self.max_budget();
            max - rng.next_bounded(max / 4)
        });
        let start = match segment.kind {
            TunnelKind::Room => budget / 2,
            TunnelKind::Seed => 0,
            TunnelKind::Branch => segment.start_step,
        };
        let branch_step = rng.next_bounded(budget / 2) + budget / 4;
        let steep = rng.next_bounded(self.variant.steep_chance) == 0;
        let room = segment.kind == TunnelKind::Room;

        let [mut x, mut y, mut z] = segment.origin;
        let mut yaw = segment.yaw;
        let mut pitch = segment.pitch;
        let mut yaw_drift = 0.0;
        let mut pitch_drift = 0.0;
        let mut checked_lava = false;

        for step in start..budget {
            let radius = 1.5 + (f64::from(step) * PI / f64::from(budget)).sin() * segment.thickness;
            let radius_y = radius * segment.vertical_scale;

            let horizontal = pitch.cos();
            x += yaw.cos() * horizontal * STEP_LENGTH;
            y += pitch.sin() * STEP_LENGTH;
            z += yaw.sin() * horizontal * STEP_LENGTH;

            pitch *= if steep {
                self.variant.steep_pitch_decay
            } else {
                self.variant.pitch_decay
            };
            pitch += pitch_drift * 0.1;
            yaw += yaw_drift * 0.1;
            pitch_drift *= self.variant.pitch_drift_decay;
            yaw_drift *= self.variant.yaw_drift_decay;
            pitch_drift += (rng.next_f64() - rng.next_f64()) * rng.next_f64() * 2.0;
            yaw_drift += (rng.next_f64() - rng.next_f64()) * rng.next_f64() * 4.0;

            if segment.kind == TunnelKind::Seed
                && step == branch_step
                && segment.thickness > self.variant.branch_min_thickness
            {
                for side in [-1.0, 1.0] {
                    let child = TunnelSegment {
                        seed: rng.next_u64(),
                        origin: [x, y, z],
                        thickness: rng.next_f64() * 0.5 + 0.5,
                        yaw: yaw + side * PI / 2.0,
                        pitch: pitch / 3.0,
                        start_step: step,
                        step_budget: Some(budget),
                        vertical_scale: 1.0,
                        kind: TunnelKind::Branch,
                    };
                    self.stack.push(child);
                    stats.branches += 1;
                }
                return;
            }

            if !room && rng.next_bounded(self.variant.skip_chance) == 0 {
                continue;
            }

            let dx = x - center_x;
            let dz = z - center_z;
            let remaining = f64::from(budget - step);
            let reach = segment.thickness + 2.0 + 16.0;
            if dx * dx + dz * dz - remaining * remaining > reach * reach {
                stats.aborted += 1;
                return;
            }

            let margin = 16.0 + radius * 2.0;
            if x < center_x - margin || z < center_z - margin || x > center_x + margin || z > center_z + margin {
                continue;
            }

            let bounds = self.step_bounds(target, [x, y, z], radius, radius_y);

            // Only a box inside the target chunk can see its lava
            if self.variant.require_lava_nearby && !checked_lava && bounds.overlaps_chunk() {
                checked_lava = true;
                if !scan_box(volume, &bounds, |m| m == Material::Lava) {
                    stats.aborted += 1;
                    return;
                }
            }

            let guarded = &self.variant.guarded_liquids;
            if scan_box(volume, &bounds, |m| guarded.contains(&m)) {
                stats.liquid_skips += 1;
                continue;
            }

            stats.carved += self.carve_ellipsoid(volume, &bounds, [x, y, z], radius, radius_y);
            if room {
                break;
            }
        }
    }

    /// Local box touched by one step, clamped to the chunk and the vertical range.
    fn step_bounds(&self, target: ChunkCoord, center: [f64; 3], radius: f64, radius_y: f64) -> StepBounds {
        let local = |value: f64, r: f64, base: i32| {
            let base = i64::from(base);
            let lo = (value - r).floor() as i64 - base - 1;
            let hi = (value + r).floor() as i64 - base + 1;
            let size = CHUNK_SIZE as i64;
            (lo.clamp(0, size) as i32, hi.clamp(0, size) as i32)
        };
        let (x0, x1) = local(center[0], radius, target.world_x());
        let (z0, z1) = local(center[2], radius, target.world_z());

        let y_max = self.world_height - CEILING_MARGIN;
        let y0 = ((center[1] - radius_y).floor() as i32 - 1).clamp(1, y_max);
        let y1 = ((center[1] + radius_y).floor() as i32 + 1).clamp(1, y_max);

        StepBounds { x0, x1, y0, y1, z0, z1 }
    }

    /// Replaces carvable voxels inside the ellipsoid; returns how many.
    fn carve_ellipsoid(
        &self,
        volume: &mut BlockVolume,
        bounds: &StepBounds,
        center: [f64; 3],
        radius: f64,
        radius_y: f64,
    ) -> usize {
        let base_x = f64::from(volume.coord().world_x());
        let base_z = f64::from(volume.coord().world_z());
        let lava_below = self.variant.lava_below;
        let mut carved = 0;

        for lx in bounds.x0..bounds.x1 {
            let nx = (base_x + f64::from(lx) + 0.5 - center[0]) / radius;
            for lz in bounds.z0..bounds.z1 {
                let nz = (base_z + f64::from(lz) + 0.5 - center[2]) / radius;
                if nx * nx + nz * nz >= 1.0 {
                    continue;
                }

                let (ux, uz) = (lx as usize, lz as usize);
                let mut exposed_grass = false;
                for ly in (bounds.y0..bounds.y1).rev() {
                    let ny = (f64::from(ly) + 0.5 - center[1]) / radius_y;
                    if ny <= FLOOR_CUT || nx * nx + ny * ny + nz * nz >= 1.0 {
                        continue;
                    }

                    let uy = ly as usize;
                    let current = volume.get(ux, uy, uz);
                    if current == Material::Grass {
                        exposed_grass = true;
                    }
                    if !self.variant.carvable.contains(&current) {
                        continue;
                    }

                    if lava_below.is_some_and(|level| ly < level) {
                        volume.set(ux, uy, uz, Material::Lava);
                    } else {
                        volume.set(ux, uy, uz, Material::Air);
                        if exposed_grass && uy > 0 && volume.get(ux, uy - 1, uz) == Material::Dirt {
                            volume.set(ux, uy - 1, uz, Material::Grass);
                        }
                    }
                    carved += 1;
                }
            }
        }

        carved
    }
}

/// Half-open local box `[x0, x1) x [y0, y1) x [z0, z1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StepBounds {
    x0: i32,
    x1: i32,
    y0: i32,
    y1: i32,
    z0: i32,
    z1: i32,
}

impl StepBounds {
    /// Whether the box covers at least one column of the chunk.
    const fn overlaps_chunk(&self) -> bool {
        self.x0 < self.x1 && self.z0 < self.z1
    }
}

/// Whether any voxel in the box, widened by one layer above and below, matches.
fn scan_box(volume: &BlockVolume, bounds: &StepBounds, mut hit: impl FnMut(Material) -> bool) -> bool {
    let y_lo = (bounds.y0 - 1).max(0) as usize;
    let y_hi = ((bounds.y1 + 1) as usize).min(volume.height().saturating_sub(1));

    for x in bounds.x0 as usize..bounds.x1 as usize {
        for z in bounds.z0 as usize..bounds.z1 as usize {
            let column = volume.column(x, z);
            if column[y_lo..=y_hi].iter().any(|&m| hit(m)) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone_volume(coord: ChunkCoord) -> BlockVolume {
        let mut volume = BlockVolume::new(coord, 128);
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                volume.column_mut(x, z)[..100].fill(Material::Stone);
            }
        }
        volume
    }

    fn carver(variant: CarverVariant) -> CaveCarver {
        CaveCarver::new(WorldSeed::new(1234), 0, variant, 128)
    }

    #[test]
    fn test_scales_are_odd() {
        let carver = carver(CarverVariant::cave());
        assert_eq!(carver.x_scale & 1, 1);
        assert_eq!(carver.z_scale & 1, 1);
    }

    #[test]
    fn test_step_budget_range() {
        let carver = carver(CarverVariant::cave());
        let max = carver.max_budget();
        assert_eq!(max, 112);

        for seed in 0..200 {
            let mut rng = GenRandom::new(seed);
            let budget = max - rng.next_bounded(max / 4);
            assert!(budget > max - max / 4 && budget <= max, "budget {budget}");
        }
    }

    #[test]
    fn test_room_carves_once() {
        let mut carver = carver(CarverVariant::cave());
        let coord = ChunkCoord::new(0, 0);
        let mut volume = stone_volume(coord);

        let room = TunnelSegment::room(7, [2.0, 40.0, 8.0], 4.0, 0.5);
        let stats = carver.carve_segments(&mut volume, [room]);

        assert_eq!(stats.segments, 1);
        assert_eq!(stats.branches, 0);
        assert!(stats.carved > 0);
        // Rooms start at the midpoint and advance one block before carving
        assert!(volume.get(3, 40, 8).is_air());
        // One bulb of radius 5.5 cannot reach 9 blocks along the heading
        assert_eq!(volume.get(12, 40, 8), Material::Stone);
    }

    #[test]
    fn test_distant_tunnel_aborts_immediately() {
        let mut carver = carver(CarverVariant::cave());
        let coord = ChunkCoord::new(0, 0);
        let mut volume = stone_volume(coord);

        let far = TunnelSegment {
            step_budget: Some(20),
            kind: TunnelKind::Branch,
            ..TunnelSegment::tunnel(3, [5000.0, 40.0, 5000.0], 2.0, 0.0, 0.0, 1.0)
        };
        let stats = carver.carve_segments(&mut volume, [far]);

        assert_eq!(stats.carved, 0);
        assert!(stats.aborted <= 1);
        assert_eq!(volume, stone_volume(coord));
    }

    #[test]
    fn test_seed_tunnel_branches_and_stops() {
        let mut carver = carver(CarverVariant::cave());
        let coord = ChunkCoord::new(0, 0);
        let mut volume = stone_volume(coord);

        let tunnel = TunnelSegment {
            step_budget: Some(20),
            ..TunnelSegment::tunnel(99, [8.0, 50.0, 8.0], 2.5, 0.3, 0.0, 1.0)
        };
        let stats = carver.carve_segments(&mut volume, [tunnel]);

        assert_eq!(stats.branches, 2);
        assert_eq!(stats.segments, 3);
        assert!(stats.carved > 0);
    }

    #[test]
    fn test_thin_seed_tunnel_never_branches() {
        let mut carver = carver(CarverVariant::cave());
        let coord = ChunkCoord::new(0, 0);
        let mut volume = stone_volume(coord);

        let tunnel = TunnelSegment::tunnel(5, [8.0, 50.0, 8.0], 0.8, 1.0, 0.0, 1.0);
        let stats = carver.carve_segments(&mut volume, [tunnel]);

        assert_eq!(stats.branches, 0);
        assert_eq!(stats.segments, 1);
    }

    #[test]
    fn test_blocked_room_walks_on() {
        let mut carver = carver(CarverVariant::cave());
        let coord = ChunkCoord::new(0, 0);
        let mut volume = stone_volume(coord);
        volume.set(3, 40, 8, Material::Water);

        let room = TunnelSegment::room(7, [2.0, 40.0, 8.0], 4.0, 0.5);
        let stats = carver.carve_segments(&mut volume, [room]);

        // The first bulb sees the water, a later one opens clear rock
        assert!(stats.liquid_skips >= 1);
        assert!(stats.carved > 0);
        assert_eq!(volume.get(3, 40, 8), Material::Water);
        assert_eq!(volume.get(4, 40, 8), Material::Stone);
    }

    #[test]
    fn test_lava_floor_and_grass_reflag() {
        let mut carver = carver(CarverVariant::cave());
        let coord = ChunkCoord::new(0, 0);
        let mut volume = stone_volume(coord);
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let column = volume.column_mut(x, z);
                column[..3].fill(Material::Bedrock);
                column[20] = Material::Grass;
                column[16..20].fill(Material::Dirt);
                column[21..].fill(Material::Air);
            }
        }

        let low = TunnelSegment::room(11, [7.0, 8.0, 8.0], 4.0, 1.0);
        let high = TunnelSegment::room(12, [7.0, 19.0, 8.0], 2.0, 1.0);
        carver.carve_segments(&mut volume, [low, high]);

        assert_eq!(volume.get(8, 8, 8), Material::Lava, "carved below y=10 becomes lava");
        assert_eq!(volume.get(8, 2, 8), Material::Bedrock, "bedrock is never carved");
        assert!(volume.get(8, 20, 8).is_air());
        let below = (16..20).rev().find(|&y| !volume.get(8, y, 8).is_air());
        assert_eq!(below.map(|y| volume.get(8, y, 8)), Some(Material::Grass));
    }

    #[test]
    fn test_canyon_requires_lava() {
        let mut carver = carver(CarverVariant::canyon());
        let coord = ChunkCoord::new(0, 0);
        let mut volume = stone_volume(coord);
        let segment = TunnelSegment {
            kind: TunnelKind::Branch,
            ..TunnelSegment::tunnel(4, [8.0, 30.0, 8.0], 3.0, 0.0, 0.0, 5.0)
        };

        let stats = carver.carve_segments(&mut volume, [segment]);
        assert_eq!(stats.carved, 0);
        assert_eq!(stats.aborted, 1);
    }

    #[test]
    fn test_region_carve_is_deterministic() {
        let coord = ChunkCoord::new(3, -5);
        let mut a = stone_volume(coord);
        let mut b = stone_volume(coord);

        let stats_a = carver(CarverVariant::cave()).carve(&mut a);
        let stats_b = carver(CarverVariant::cave()).carve(&mut b);

        assert_eq!(stats_a, stats_b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stats_merge() {
        let mut total = CarveStats {
            origins: 1,
            carved: 10,
            ..CarveStats::default()
        };
        total.merge(&CarveStats {
            origins: 2,
            segments: 4,
            carved: 5,
            ..CarveStats::default()
        });
        assert_eq!(total.origins, 3);
        assert_eq!(total.segments, 4);
        assert_eq!(total.carved, 15);
    }
}
