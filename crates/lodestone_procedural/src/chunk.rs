//! # Chunk Volumes
//!
//! World data is organized into 16-wide vertical chunks. The generator
//! fills one [`BlockVolume`] per call and hands it to the storage
//! collaborator.
//!
//! ## Volume Format
//!
//! Voxels are stored column-major: index `(x * 16 + z) * height + y`, so a
//! vertical column is one contiguous slice. Each voxel holds a [`Material`]
//! (one byte) plus a 4-bit auxiliary value packed two per byte.

use bytemuck::{CheckedBitPattern, NoUninit};
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};

/// Chunk width/depth in blocks.
pub const CHUNK_SIZE: usize = 16;

/// Number of columns per chunk.
pub const COLUMNS_PER_CHUNK: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE as i32),
            z: block_z.div_euclid(CHUNK_SIZE as i32),
        }
    }

    /// Returns the world X coordinate of the chunk's origin (corner).
    ///
    /// Wraps past the `i32` block range, so every chunk coordinate is valid.
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.x.wrapping_mul(CHUNK_SIZE as i32)
    }

    /// Returns the world Z coordinate of the chunk's origin.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i32 {
        self.z.wrapping_mul(CHUNK_SIZE as i32)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

/// Block materials produced by the generator.
///
/// Discriminants are the stable on-disk ids handed to storage.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, NoUninit, CheckedBitPattern, Serialize, Deserialize,
)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Empty space.
    #[default]
    Air = 0,
    /// Overworld base rock.
    Stone = 1,
    /// Exposed topsoil.
    Grass = 2,
    /// Soil filler.
    Dirt = 3,
    /// Indestructible boundary material.
    Bedrock = 7,
    /// Still water.
    Water = 9,
    /// Still lava.
    Lava = 11,
    /// Sand patches and desert soil.
    Sand = 12,
    /// Gravel patches.
    Gravel = 13,
    /// Frozen water surface.
    Ice = 79,
    /// Hell base rock.
    Netherrack = 87,
    /// Hell sand patches.
    SoulSand = 88,
}

impl Material {
    /// All materials, in id order.
    pub const ALL: [Self; 12] = [
        Self::Air,
        Self::Stone,
        Self::Grass,
        Self::Dirt,
        Self::Bedrock,
        Self::Water,
        Self::Lava,
        Self::Sand,
        Self::Gravel,
        Self::Ice,
        Self::Netherrack,
        Self::SoulSand,
    ];

    /// Returns the storage id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks up a material by storage id.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Self::Air,
            1 => Self::Stone,
            2 => Self::Grass,
            3 => Self::Dirt,
            7 => Self::Bedrock,
            9 => Self::Water,
            11 => Self::Lava,
            12 => Self::Sand,
            13 => Self::Gravel,
            79 => Self::Ice,
            87 => Self::Netherrack,
            88 => Self::SoulSand,
            _ => return None,
        })
    }

    /// Returns true for empty space.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        matches!(self, Self::Air)
    }

    /// Returns true for water and lava.
    #[inline]
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        matches!(self, Self::Water | Self::Lava)
    }

    /// Returns true for anything that is neither air nor liquid.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !self.is_air() && !self.is_liquid()
    }
}

/// Packed 4-bit values, two per byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NibbleArray {
    data: Box<[u8]>,
    len: usize,
}

impl NibbleArray {
    /// Creates `len` zeroed nibbles.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![0u8; len.div_ceil(2)].into_boxed_slice(),
            len,
        }
    }

    /// Number of nibbles.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the array holds no nibbles.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads nibble `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u8 {
        let byte = self.data[index >> 1];
        if index & 1 == 0 {
            byte & 0x0F
        } else {
            byte >> 4
        }
    }

    /// Writes the low 4 bits of `value` to nibble `index`.
    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        let slot = &mut self.data[index >> 1];
        let value = value & 0x0F;
        if index & 1 == 0 {
            *slot = (*slot & 0xF0) | value;
        } else {
            *slot = (*slot & 0x0F) | (value << 4);
        }
    }

    /// Raw packed bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Voxel tallies for a volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterialCounts {
    /// Empty voxels.
    pub air: usize,
    /// Water and lava voxels.
    pub liquid: usize,
    /// Everything else.
    pub solid: usize,
}

/// One chunk's generated blocks.
///
/// Produced once per generation call; ownership passes to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockVolume {
    /// Chunk this volume belongs to.
    coord: ChunkCoord,
    /// Number of vertical layers.
    height: usize,
    /// Column-major materials.
    materials: Box<[Material]>,
    /// Auxiliary 4-bit value per voxel.
    data: NibbleArray,
}

impl BlockVolume {
    /// Creates an all-air volume.
    #[must_use]
    pub fn new(coord: ChunkCoord, height: usize) -> Self {
        let len = COLUMNS_PER_CHUNK * height;
        Self {
            coord,
            height,
            materials: vec![Material::Air; len].into_boxed_slice(),
            data: NibbleArray::new(len),
        }
    }

    /// Rebuilds a volume from storage bytes (one material id per voxel).
    ///
    /// # Errors
    ///
    /// [`GenerationError::VolumeSize`] if the length is not `16 * 16 * height`,
    /// [`GenerationError::UnknownMaterial`] if any byte is not a material id.
    pub fn from_raw(coord: ChunkCoord, height: usize, ids: &[u8]) -> GenerationResult<Self> {
        let expected = COLUMNS_PER_CHUNK * height;
        if ids.len() != expected {
            return Err(GenerationError::VolumeSize {
                expected,
                actual: ids.len(),
            });
        }

        let materials: &[Material] = bytemuck::checked::try_cast_slice(ids).map_err(|_| {
            let id = ids
                .iter()
                .copied()
                .find(|&id| Material::from_id(id).is_none())
                .unwrap_or_default();
            GenerationError::UnknownMaterial { id }
        })?;

        Ok(Self {
            coord,
            height,
            materials: materials.into(),
            data: NibbleArray::new(expected),
        })
    }

    /// Chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Number of vertical layers.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Flat voxel index.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * CHUNK_SIZE + z) * self.height + y
    }

    /// Material at a local position.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Material {
        self.materials[self.index(x, y, z)]
    }

    /// Sets the material at a local position.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, material: Material) {
        let index = self.index(x, y, z);
        self.materials[index] = material;
    }

    /// Auxiliary value at a local position.
    #[inline]
    #[must_use]
    pub fn data(&self, x: usize, y: usize, z: usize) -> u8 {
        self.data.get(self.index(x, y, z))
    }

    /// Sets the auxiliary value (low 4 bits) at a local position.
    #[inline]
    pub fn set_data(&mut self, x: usize, y: usize, z: usize, value: u8) {
        let index = self.index(x, y, z);
        self.data.set(index, value);
    }

    /// One vertical column, bottom to top.
    #[inline]
    #[must_use]
    pub fn column(&self, x: usize, z: usize) -> &[Material] {
        let start = self.index(x, 0, z);
        &self.materials[start..start + self.height]
    }

    /// One vertical column, bottom to top, mutable.
    #[inline]
    pub fn column_mut(&mut self, x: usize, z: usize) -> &mut [Material] {
        let start = self.index(x, 0, z);
        &mut self.materials[start..start + self.height]
    }

    /// All materials in storage order.
    #[inline]
    #[must_use]
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Material ids as bytes, for the storage collaborator. No copy.
    #[inline]
    #[must_use]
    pub fn material_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.materials)
    }

    /// Packed auxiliary nibbles.
    #[inline]
    #[must_use]
    pub fn data_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Y of the topmost non-air voxel in a column.
    #[must_use]
    pub fn surface_height(&self, x: usize, z: usize) -> Option<usize> {
        self.column(x, z).iter().rposition(|m| !m.is_air())
    }

    /// Y of the topmost solid voxel in a column.
    #[must_use]
    pub fn solid_height(&self, x: usize, z: usize) -> Option<usize> {
        self.column(x, z).iter().rposition(|m| m.is_solid())
    }

    /// Number of voxels of one material.
    #[must_use]
    pub fn count(&self, material: Material) -> usize {
        self.materials.iter().filter(|&&m| m == material).count()
    }

    /// Air/liquid/solid tallies.
    #[must_use]
    pub fn material_counts(&self) -> MaterialCounts {
        let mut counts = MaterialCounts::default();
        for m in self.materials.iter() {
            if m.is_air() {
                counts.air += 1;
            } else if m.is_liquid() {
                counts.liquid += 1;
            } else {
                counts.solid += 1;
            }
        }
        counts
    }
}
