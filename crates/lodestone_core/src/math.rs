//! # Interpolation Math
//!
//! Scalar helpers shared by the noise and density code. All functions are
//! pure and branch-light so they inline into the hot loops.

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
///
/// Has zero first and second derivatives at `t = 0` and `t = 1`, which is
/// what keeps gradient noise smooth across lattice cells.
#[inline]
#[must_use]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Linear interpolation from `a` (at `t = 0`) to `b` (at `t = 1`).
#[inline]
#[must_use]
pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Linear interpolation that returns `a` below `t = 0` and `b` above `t = 1`.
#[inline]
#[must_use]
pub fn clamped_lerp(t: f64, a: f64, b: f64) -> f64 {
    if t < 0.0 {
        a
    } else if t > 1.0 {
        b
    } else {
        lerp(t, a, b)
    }
}

/// Splits `x` into its lattice cell (modulo 256) and the offset inside that cell.
///
/// Total over every finite input, so far-out coordinates still land on the lattice.
#[inline]
#[must_use]
pub fn lattice_cell(x: f64) -> (usize, f64) {
    let floor = x.floor();
    (floor.rem_euclid(256.0) as usize, x - floor)
}
