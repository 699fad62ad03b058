//! Seeded permutation table shared by the gradient and simplex generators.

use crate::random::GenRandom;

/// A 512-entry permutation table.
///
/// The lower half is a random shuffle of `0..=255`; the upper half repeats it,
/// so a lookup of `table[i] + j` with `i, j <= 255` never needs wrapping.
#[derive(Clone)]
pub struct PermutationTable {
    perm: [u8; 512],
}

impl PermutationTable {
    /// Shuffles `0..=255` with `rng` and duplicates it into the upper half.
    #[must_use]
    pub fn shuffled(rng: &mut GenRandom) -> Self {
        let mut perm = [0u8; 512];

        // Initialize with identity permutation
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates from the front
        for i in 0..256 {
            let j = rng.next_bounded(256 - i as i32) as usize + i;
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        perm.copy_within(0..256, 256);

        Self { perm }
    }

    /// Gets a permutation value. `index` must be below 512.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index])
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}
