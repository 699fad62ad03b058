//! # Lodestone Core
//!
//! Engine-agnostic pieces shared by the world generator:
//! - Scratch buffers that are allocated once and reset per chunk
//! - Interpolation, fade and flooring helpers used by noise and density code
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations per chunk** - scratch memory is sized at construction
//! 2. **Single owner** - scratch buffers are plain owned data, one set per generator
//!
//! ## Example
//!
//! ```rust
//! use lodestone_core::{math, ScratchBuffer};
//!
//! let mut lattice = ScratchBuffer::<f64>::new(5 * 17 * 5);
//! lattice[0] = math::lerp(0.5, -1.0, 1.0);
//! lattice.reset();
//! assert_eq!(lattice[0], 0.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod math;
pub mod memory;

pub use memory::ScratchBuffer;
