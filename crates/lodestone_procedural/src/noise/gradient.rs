//! # Gradient Noise
//!
//! Single-octave 3-D gradient noise with quintic interpolation.
//!
//! Lattice corners are hashed through a seeded [`PermutationTable`]; each
//! corner contributes the dot product of one of 16 fixed gradient vectors
//! (low 4 bits of the hash) with the corner-to-point offset. The eight
//! contributions are blended with the quintic fade curve.

use lodestone_core::math::{fade, lattice_cell, lerp};

use super::{region_index, PermutationTable};
use crate::random::GenRandom;

/// One octave of 3-D gradient noise.
///
/// Output is continuous and roughly within `[-1, 1]`.
///
/// # Example
///
/// ```rust
/// use lodestone_procedural::noise::GradientNoise;
/// use lodestone_procedural::random::GenRandom;
///
/// let noise = GradientNoise::new(&mut GenRandom::new(42));
/// let value = noise.sample(12.5, 64.0, -3.25);
/// assert!(value.abs() <= 1.1);
/// ```
#[derive(Clone, Debug)]
pub struct GradientNoise {
    /// The permutation table.
    perm: PermutationTable,
    /// Per-axis coordinate shift in `[0, 256)`.
    offset: [f64; 3],
}

impl GradientNoise {
    /// Builds a generator, drawing the axis offsets and then the permutation from `rng`.
    #[must_use]
    pub fn new(rng: &mut GenRandom) -> Self {
        // Shifting keeps sample(0, 0, 0) off an integer lattice point
        let offset = [
            rng.next_f64() * 256.0,
            rng.next_f64() * 256.0,
            rng.next_f64() * 256.0,
        ];
        let perm = PermutationTable::shuffled(rng);
        Self { perm, offset }
    }

    /// Samples the noise at a point.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise_at(x + self.offset[0], y + self.offset[1], z + self.offset[2])
    }

    /// Samples the 2-D slice at `z = 0`.
    #[inline]
    #[must_use]
    pub fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y, 0.0)
    }

    /// Adds `amplitude * noise` for every point of a region into `buffer`.
    ///
    /// Point `(i, j, k)` is sampled at `((origin[0] + i) * freq[0], ...)` and
    /// accumulated at [`region_index`]. Existing buffer contents are kept,
    /// which is what lets octaves stack without a second buffer.
    ///
    /// # Panics
    ///
    /// Panics if `buffer` holds fewer than `size[0] * size[1] * size[2]` values.
    pub fn fill_region(
        &self,
        buffer: &mut [f64],
        origin: [f64; 3],
        size: [usize; 3],
        freq: [f64; 3],
        amplitude: f64,
    ) {
        let [size_x, size_y, size_z] = size;
        assert!(
            buffer.len() >= size_x * size_y * size_z,
            "region buffer too small: {} < {}",
            buffer.len(),
            size_x * size_y * size_z
        );

        for x in 0..size_x {
            let px = (origin[0] + x as f64) * freq[0] + self.offset[0];
            for z in 0..size_z {
                let pz = (origin[2] + z as f64) * freq[2] + self.offset[2];
                for y in 0..size_y {
                    let py = (origin[1] + y as f64) * freq[1] + self.offset[1];
                    buffer[region_index(x, y, z, size_y, size_z)] +=
                        self.noise_at(px, py, pz) * amplitude;
                }
            }
        }
    }

    /// Evaluates the noise at already-offset coordinates.
    #[inline]
    fn noise_at(&self, x: f64, y: f64, z: f64) -> f64 {
        let (cx, fx) = lattice_cell(x);
        let (cy, fy) = lattice_cell(y);
        let (cz, fz) = lattice_cell(z);

        let u = fade(fx);
        let v = fade(fy);
        let w = fade(fz);

        let p = &self.perm;
        let a = p.get(cx) + cy;
        let aa = p.get(a) + cz;
        let ab = p.get(a + 1) + cz;
        let b = p.get(cx + 1) + cy;
        let ba = p.get(b) + cz;
        let bb = p.get(b + 1) + cz;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p.get(aa), fx, fy, fz), grad(p.get(ba), fx - 1.0, fy, fz)),
                lerp(
                    u,
                    grad(p.get(ab), fx, fy - 1.0, fz),
                    grad(p.get(bb), fx - 1.0, fy - 1.0, fz),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p.get(aa + 1), fx, fy, fz - 1.0),
                    grad(p.get(ba + 1), fx - 1.0, fy, fz - 1.0),
                ),
                lerp(
                    u,
                    grad(p.get(ab + 1), fx, fy - 1.0, fz - 1.0),
                    grad(p.get(bb + 1), fx - 1.0, fy - 1.0, fz - 1.0),
                ),
            ),
        )
    }
}

/// Dot product of the hashed gradient with the corner offset.
#[inline]
fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let noise1 = GradientNoise::new(&mut GenRandom::new(12345));
        let noise2 = GradientNoise::new(&mut GenRandom::new(12345));

        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let y = f64::from(i) * 0.17;
            let z = f64::from(i) * -0.23;
            assert_eq!(noise1.sample(x, y, z), noise2.sample(x, y, z), "Noise should be deterministic");
        }
    }

    #[test]
    fn test_different_seeds_different_results() {
        let noise1 = GradientNoise::new(&mut GenRandom::new(1));
        let noise2 = GradientNoise::new(&mut GenRandom::new(2));

        assert_ne!(noise1.sample(100.3, 7.1, 100.9), noise2.sample(100.3, 7.1, 100.9));
    }

    #[test]
    fn test_origin_not_degenerate() {
        // Without the axis offsets every octave would return exactly 0 here
        let nonzero = (0..8)
            .map(|seed| GradientNoise::new(&mut GenRandom::new(seed)).sample(0.0, 0.0, 0.0))
            .filter(|v| v.abs() > 1e-9)
            .count();
        assert!(nonzero >= 6, "origin samples were degenerate for {} seeds", 8 - nonzero);
    }

    #[test]
    fn test_range() {
        let noise = GradientNoise::new(&mut GenRandom::new(42));
        for i in 0..10_000 {
            let x = f64::from(i) * 0.1 - 500.0;
            let y = f64::from(i) * 0.031;
            let z = f64::from(i) * 0.13 - 650.0;
            let value = noise.sample(x, y, z);
            assert!(value.abs() <= 1.1, "Value {value} out of range at ({x}, {y}, {z})");
        }
    }

    #[test]
    fn test_continuity() {
        let noise = GradientNoise::new(&mut GenRandom::new(42));
        let delta = 0.001;

        // Straddle integer lattice boundaries, where an indexing bug would show
        for i in -20..20 {
            let x = f64::from(i) - delta / 2.0;
            let y = f64::from(i) * 0.5;
            let z = f64::from(-i) + 0.25;
            let v1 = noise.sample(x, y, z);
            let v2 = noise.sample(x + delta, y, z);
            let v3 = noise.sample(x, y + delta, z);
            let v4 = noise.sample(x, y, z + delta);
            assert!((v1 - v2).abs() < 0.01, "discontinuity along x at {x}");
            assert!((v1 - v3).abs() < 0.01, "discontinuity along y at {y}");
            assert!((v1 - v4).abs() < 0.01, "discontinuity along z at {z}");
        }
    }

    #[test]
    fn test_2d_is_z_zero_slice() {
        let noise = GradientNoise::new(&mut GenRandom::new(5));
        assert_eq!(noise.sample_2d(3.7, -1.2), noise.sample(3.7, -1.2, 0.0));
    }

    #[test]
    fn test_fill_region_matches_samples_and_accumulates() {
        let noise = GradientNoise::new(&mut GenRandom::new(9));
        let size = [3, 4, 2];
        let freq = [0.3, 0.7, 0.11];
        let origin = [10.0, -2.0, 5.0];
        let mut buffer = vec![1.0; 24];

        noise.fill_region(&mut buffer, origin, size, freq, 0.5);

        for x in 0..3 {
            for y in 0..4 {
                for z in 0..2 {
                    let expected = 1.0
                        + 0.5
                            * noise.sample(
                                (origin[0] + x as f64) * freq[0],
                                (origin[1] + y as f64) * freq[1],
                                (origin[2] + z as f64) * freq[2],
                            );
                    let got = buffer[region_index(x, y, z, 4, 2)];
                    assert!((got - expected).abs() < 1e-12, "mismatch at ({x}, {y}, {z})");
                }
            }
        }
    }
}
