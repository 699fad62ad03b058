//! # Simplex Noise
//!
//! 2-D simplex noise for slowly varying climate fields (temperature, downfall).
//!
//! Simplex lattices have fewer directional artifacts than square gradient
//! lattices, which matters for fields that are read at block resolution
//! over large distances.


use super::PermutationTable;
use crate::random::GenRandom;

/// 12 gradient vectors for 2D simplex, pointing at the vertices of a 12-gon.
const GRADIENTS: [[f64; 2]; 12] = [
    [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [-1.0, 1.0],
    [-1.0, 0.0], [-1.0, -1.0], [0.0, -1.0], [1.0, -1.0],
    [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0],
];

/// 2D Simplex noise generator.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
///
/// # Example
///
/// ```rust
/// use lodestone_procedural::noise::SimplexNoise;
/// use lodestone_procedural::random::GenRandom;
///
/// let noise = SimplexNoise::new(&mut GenRandom::new(42));
/// let value = noise.sample(100.5, 200.3);
/// assert!((-1.0..=1.0).contains(&value));
///
/// let climate = noise.octaved(100.5, 200.3, 4, 0.5, 2.0);
/// assert!(climate.abs() <= 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    /// The permutation table.
    perm: PermutationTable,
    /// Coordinate shift in `[0, 256)` per axis.
    offset: [f64; 2],
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid, `(sqrt(3) - 1) / 2`.
    const F2: f64 = 0.366_025_403_784_438_6;
    /// Unskewing factor for 2D simplex grid, `(3 - sqrt(3)) / 6`.
    const G2: f64 = 0.211_324_865_405_187_1;

    /// Creates a generator, drawing offsets and the permutation from `rng`.
    #[must_use]
    pub fn new(rng: &mut GenRandom) -> Self {
        let offset = [rng.next_f64() * 256.0, rng.next_f64() * 256.0];
        let perm = PermutationTable::shuffled(rng);
        Self { perm, offset }
    }

    /// Samples 2D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x = x + self.offset[0];
        let y = y + self.offset[1];

        // Skew input coordinates to simplex grid
        let skew = (x + y) * Self::F2;
        let i = (x + skew).floor();
        let j = (y + skew).floor();

        // Unskew to get first corner in simplex
        let unskew = (i + j) * Self::G2;
        let x0 = x - (i - unskew);
        let y0 = y - (j - unskew);

        // Upper or lower triangle
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        // Offsets for second and third corners
        let x1 = x0 - f64::from(i1) + Self::G2;
        let y1 = y0 - f64::from(j1) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = i.rem_euclid(256.0) as usize;
        let jj = j.rem_euclid(256.0) as usize;
        let i1 = i1 as usize;
        let j1 = j1 as usize;

        let gi0 = self.perm.get(ii + self.perm.get(jj));
        let gi1 = self.perm.get(ii + i1 + self.perm.get(jj + j1));
        let gi2 = self.perm.get(ii + 1 + self.perm.get(jj + 1));

        let n0 = Self::contribution(x0, y0, gi0);
        let n1 = Self::contribution(x1, y1, gi1);
        let n2 = Self::contribution(x2, y2, gi2);

        // 70.0 normalizes the sum to [-1, 1]
        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    /// Calculates the contribution from one corner of the simplex.
    #[inline]
    fn contribution(x: f64, y: f64, gradient_index: usize) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let grad = GRADIENTS[gradient_index % 12];
            let t2 = t * t;
            t2 * t2 * (x * grad[0] + y * grad[1])
        }
    }

    /// Generates octaved (fractal) noise, normalized to [-1, 1].
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Coordinates
    /// * `octaves` - Number of noise layers (typically 4-8)
    /// * `persistence` - Amplitude decay per octave (typically 0.5)
    /// * `lacunarity` - Frequency increase per octave (typically 2.0)
    #[must_use]
    pub fn octaved(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves.max(1) {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        total / max_amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let noise1 = SimplexNoise::new(&mut GenRandom::new(12345));
        let noise2 = SimplexNoise::new(&mut GenRandom::new(12345));

        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let y = f64::from(i) * 0.17;
            assert_eq!(noise1.sample(x, y), noise2.sample(x, y), "Noise should be deterministic");
        }
    }

    #[test]
    fn test_range() {
        let noise = SimplexNoise::new(&mut GenRandom::new(42));

        for i in 0..10_000 {
            let x = f64::from(i) * 0.1 - 500.0;
            let y = f64::from(i) * 0.13 - 650.0;
            let value = noise.sample(x, y);
            assert!((-1.0..=1.0).contains(&value), "Value {value} out of range at ({x}, {y})");
        }
    }

    #[test]
    fn test_continuity() {
        let noise = SimplexNoise::new(&mut GenRandom::new(42));
        let delta = 0.001;

        let v1 = noise.sample(100.0, 100.0);
        let v2 = noise.sample(100.0 + delta, 100.0);
        let v3 = noise.sample(100.0, 100.0 + delta);

        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
        assert!((v1 - v3).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_octaved_noise() {
        let noise = SimplexNoise::new(&mut GenRandom::new(42));
        let value = noise.octaved(100.0, 100.0, 6, 0.5, 2.0);
        assert!((-1.0..=1.0).contains(&value), "Octaved value {value} out of expected range");
    }
}
