//! # Noise Synthesis
//!
//! Deterministic noise used by every generation stage.
//!
//! - [`GradientNoise`]: one octave of 3-D quintic gradient noise
//! - [`FractalNoise`]: a 1/f sum of gradient octaves, the unit every stage consumes
//! - [`SimplexNoise`]: 2-D simplex noise for smooth climate fields
//!
//! ## Region Layout
//!
//! Region fills write a flat buffer indexed `(x * size_z + z) * size_y + y`,
//! so a vertical column is contiguous.
//!
//! ## Determinism Guarantee
//!
//! Generators are built from a [`GenRandom`](crate::random::GenRandom) stream and are
//! immutable afterwards. The same stream state always yields the same noise.

mod fractal;
mod gradient;
mod permutation;
mod simplex;

pub use fractal::FractalNoise;
pub use gradient::GradientNoise;
pub use permutation::PermutationTable;
pub use simplex::SimplexNoise;

/// Flat index of a lattice point inside a region buffer.
#[inline]
#[must_use]
pub const fn region_index(x: usize, y: usize, z: usize, size_y: usize, size_z: usize) -> usize {
    (x * size_z + z) * size_y + y
}
