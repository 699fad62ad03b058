//! # Fractal Noise
//!
//! Sums `L` octaves of [`GradientNoise`]; octave `l` is sampled at `2^l`
//! times the base frequency and weighted by `1 / 2^l`.

use super::GradientNoise;
use crate::random::GenRandom;

/// A 1/f sum of independently seeded gradient octaves.
///
/// Output amplitude grows with the octave count (at most about 2). Callers
/// rescale into the domain they need.
///
/// # Example
///
/// ```rust
/// use lodestone_procedural::noise::FractalNoise;
/// use lodestone_procedural::random::GenRandom;
///
/// let noise = FractalNoise::new(&mut GenRandom::new(42), 4);
/// let mut buffer = vec![0.0; 16 * 16];
/// noise.fill_region(&mut buffer, [0.0, 0.0, 0.0], [16, 1, 16], [0.03, 1.0, 0.03], 1.0);
/// assert!(buffer.iter().any(|v| *v != 0.0));
/// ```
#[derive(Clone, Debug)]
pub struct FractalNoise {
    octaves: Vec<GradientNoise>,
}

impl FractalNoise {
    /// Builds `levels` octaves, each drawing its own state from `rng` in order.
    #[must_use]
    pub fn new(rng: &mut GenRandom, levels: u32) -> Self {
        let octaves = (0..levels).map(|_| GradientNoise::new(rng)).collect();
        Self { octaves }
    }

    /// Number of octaves.
    #[inline]
    #[must_use]
    pub fn levels(&self) -> usize {
        self.octaves.len()
    }

    /// Weight of the coarsest octave relative to the finest, `2^(L-1)`.
    #[inline]
    #[must_use]
    pub fn octave_span(&self) -> f64 {
        let top = self.octaves.len().saturating_sub(1) as i32;
        2f64.powi(top)
    }

    /// Samples the fractal sum at a point.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut scale = 1.0;
        for octave in &self.octaves {
            total += octave.sample(x * scale, y * scale, z * scale) / scale;
            scale *= 2.0;
        }
        total
    }

    /// Samples the 2-D slice at `z = 0`.
    #[inline]
    #[must_use]
    pub fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y, 0.0)
    }

    /// Overwrites the region with the fractal sum scaled by `amplitude`.
    ///
    /// The first `size[0] * size[1] * size[2]` values are zeroed, then every
    /// octave accumulates into them in place.
    ///
    /// # Panics
    ///
    /// Panics if `buffer` is smaller than the region.
    pub fn fill_region(
        &self,
        buffer: &mut [f64],
        origin: [f64; 3],
        size: [usize; 3],
        freq: [f64; 3],
        amplitude: f64,
    ) {
        let len = size[0] * size[1] * size[2];
        buffer[..len].fill(0.0);

        let mut scale = 1.0;
        for octave in &self.octaves {
            octave.fill_region(
                buffer,
                origin,
                size,
                [freq[0] * scale, freq[1] * scale, freq[2] * scale],
                amplitude / scale,
            );
            scale *= 2.0;
        }
    }

    /// Fills the region so that `freq` is the frequency of the finest octave.
    ///
    /// The finest octave has unit weight and each coarser one halves the
    /// frequency and doubles the weight, so the field spans roughly
    /// `±2^L`. Terrain constants such as the `/512` landmass divisor and the
    /// `/8000` depth divisor are calibrated against this range.
    pub fn fill_region_from_finest(
        &self,
        buffer: &mut [f64],
        origin: [f64; 3],
        size: [usize; 3],
        freq: [f64; 3],
    ) {
        let span = self.octave_span();
        self.fill_region(
            buffer,
            origin,
            size,
            [freq[0] / span, freq[1] / span, freq[2] / span],
            span,
        );
    }
}
