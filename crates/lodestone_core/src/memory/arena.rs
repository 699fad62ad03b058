//! # Scratch Buffers
//!
//! Fixed-size buffers that are filled during one chunk and reset before the next.

use std::ops::{Deref, DerefMut};

/// A fixed-length buffer reused across chunk generations.
///
/// The length is chosen once at construction. [`ScratchBuffer::reset`] writes
/// `T::default()` over every element without touching the allocation.
///
/// # Thread Safety
///
/// A scratch buffer is plain owned memory. Generators keep their buffers
/// behind `&mut self`, so one generator (and its buffers) serves one thread
/// at a time. Use one generator per worker thread.
///
/// # Example
///
/// ```rust
/// use lodestone_core::ScratchBuffer;
///
/// let mut noise = ScratchBuffer::<f64>::new(16 * 16);
/// noise[3] += 1.5;
/// assert_eq!(noise.resets(), 0);
///
/// noise.reset();
/// assert_eq!(noise[3], 0.0);
/// assert_eq!(noise.resets(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ScratchBuffer<T> {
    /// The backing storage.
    data: Box<[T]>,
    /// How many times the buffer has been reset.
    resets: u64,
}

impl<T: Copy + Default> ScratchBuffer<T> {
    /// Creates a buffer of `len` default-initialized elements.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![T::default(); len].into_boxed_slice(),
            resets: 0,
        }
    }

    /// Returns the fixed element count.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns how many times this buffer has been reset.
    #[inline]
    #[must_use]
    pub const fn resets(&self) -> u64 {
        self.resets
    }

    /// Overwrites every element with `T::default()`.
    ///
    /// No memory is freed or reallocated.
    #[inline]
    pub fn reset(&mut self) {
        self.data.fill(T::default());
        self.resets += 1;
    }

    /// Overwrites every element with `value`.
    #[inline]
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Returns the contents as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the contents as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: bytemuck::Pod> ScratchBuffer<T> {
    /// Views the buffer as raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<T> Deref for ScratchBuffer<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for ScratchBuffer<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}
