//! # World Seeds
//!
//! Every random stream in the generator is derived from one 64-bit world seed.
//! Noise generators draw from purpose-derived streams at construction time;
//! per-chunk work reseeds from the chunk coordinate.

use crate::chunk::ChunkCoord;

/// X multiplier for per-chunk stream mixing.
const CHUNK_MIX_X: i64 = 341_873_128_713;
/// Z multiplier for per-chunk stream mixing.
const CHUNK_MIX_Z: i64 = 132_897_987_541;

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., climate noise).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // FNV-1a style mixing
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }

    /// Returns the stream seed for one chunk.
    ///
    /// Mixes the coordinate with two large odd multipliers so neighbouring
    /// chunks land on decorrelated streams, then folds in the world seed.
    #[inline]
    #[must_use]
    pub const fn for_chunk(self, coord: ChunkCoord) -> u64 {
        let mix = (coord.x as i64)
            .wrapping_mul(CHUNK_MIX_X)
            .wrapping_add((coord.z as i64).wrapping_mul(CHUNK_MIX_Z));
        self.0 ^ mix as u64
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

/// Purpose keys for [`WorldSeed::derive`].
pub mod purpose {
    /// Terrain shape and surface noise.
    pub const TERRAIN: u64 = 0x7465_7272_6169_6e00;
    /// Temperature noise of the climate biome source.
    pub const TEMPERATURE: u64 = 0x7465_6d70_0000_0001;
    /// Downfall noise of the climate biome source.
    pub const DOWNFALL: u64 = 0x6475_6666_0000_0002;
    /// Carver origin scales. Each carver variant adds its index.
    pub const CARVER: u64 = 0x6361_7276_6500_0000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        let derived1 = base.derive(1);
        let derived2 = base.derive(2);
        let derived1_again = base.derive(1);

        assert_ne!(derived1, derived2, "Different purposes should give different seeds");
        assert_eq!(derived1, derived1_again, "Same purpose should give same seed");
        assert_ne!(derived1, base, "Derived seed should differ from base");
    }

    #[test]
    fn test_chunk_streams_decorrelated() {
        let seed = WorldSeed::new(0);
        let a = seed.for_chunk(ChunkCoord::new(0, 1));
        let b = seed.for_chunk(ChunkCoord::new(1, 0));
        let c = seed.for_chunk(ChunkCoord::new(-1, 0));

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(seed.for_chunk(ChunkCoord::new(0, 0)), 0);
    }

    #[test]
    fn test_chunk_stream_depends_on_world_seed() {
        let coord = ChunkCoord::new(5, -3);
        assert_ne!(
            WorldSeed::new(1).for_chunk(coord),
            WorldSeed::new(2).for_chunk(coord)
        );
    }
}
