//! # Memory Management
//!
//! Pre-allocated scratch memory for per-chunk work.
//!
//! ## Design Philosophy
//!
//! All scratch memory is allocated once when a generator is built. Per chunk:
//! - No heap allocations
//! - Buffers are reset in place, never reallocated
//! - Predictable, flat latency

mod arena;

pub use arena::ScratchBuffer;
