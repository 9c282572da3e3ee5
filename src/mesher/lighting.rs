//! Per-vertex light sampling and the packed extra-data channel.
//!
//! Light values are on the 0-15 block-light scale.

use super::ao::{lerp, mask_index};
use crate::types::CullDirection;

/// Light input of one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightSamples {
    /// Light at the 8 cell corners, index `x + (z << 1) + (y << 2)`.
    Corners([f32; 8]),
    /// Neighbour light in the order up, down, north, south, east, west,
    /// followed by the block's own light.
    Faces([f32; 7]),
}

impl LightSamples {
    /// The same light everywhere.
    pub fn uniform(light: f32) -> Self {
        LightSamples::Corners([light; 8])
    }

    /// Light of a vertex at `pos` (unit-cube coordinates) on a face
    /// pointing `dir`.
    pub fn vertex_light(&self, dir: CullDirection, pos: [f32; 3]) -> f32 {
        match self {
            LightSamples::Corners(corners) => corner_light(corners, pos),
            LightSamples::Faces(faces) => face_light(faces, dir),
        }
    }
}

impl Default for LightSamples {
    fn default() -> Self {
        Self::uniform(15.0)
    }
}

/// Trilinear interpolation of the 8 corner samples.
pub fn corner_light(corners: &[f32; 8], pos: [f32; 3]) -> f32 {
    let [x, y, z] = pos;
    let column = |i: usize| lerp(corners[i], corners[i + 4], y);
    lerp(lerp(column(0), column(1), x), lerp(column(2), column(3), x), z)
}

/// The brighter of the neighbour the face looks at and the block itself.
pub fn face_light(faces: &[f32; 7], dir: CullDirection) -> f32 {
    let neighbour = match dir {
        CullDirection::Up => faces[0],
        CullDirection::Down => faces[1],
        CullDirection::North => faces[2],
        CullDirection::South => faces[3],
        CullDirection::East => faces[4],
        CullDirection::West => faces[5],
        CullDirection::None => faces[6],
    };
    neighbour.max(faces[6])
}

/// What goes in the fourth colour channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraVertexFormat {
    /// The light value as is.
    #[default]
    Light,
    /// Light plus per-vertex outward bits, for foliage.
    LightBlockNormal,
    /// Light with every outward bit set, for cross-shaped plants.
    LightCrossNormal,
}

/// Outward bits meaning every direction.
pub const CROSS_NORMAL_BITS: u32 = 0x3F;

/// Outward bits of a vertex: for each axis, the side it sits close to,
/// provided the neighbour there is empty.
///
/// Bits: 0b1 south, 0b10 north, 0b100 up, 0b1000 down, 0b10000 east,
/// 0b100000 west.
pub fn block_normal_bits(pos: [f32; 3], mask: u32) -> u32 {
    let empty = |dx, dy, dz| mask & (1 << mask_index(dx, dy, dz)) == 0;
    let [x, y, z] = pos;
    let mut bits = 0;

    if z > 0.6 && empty(0, 0, 1) {
        bits |= 0b000001;
    } else if z < 0.4 && empty(0, 0, -1) {
        bits |= 0b000010;
    }

    if y > 0.6 && empty(0, 1, 0) {
        bits |= 0b000100;
    } else if y < 0.4 && empty(0, -1, 0) {
        bits |= 0b001000;
    }

    if x > 0.6 && empty(1, 0, 0) {
        bits |= 0b010000;
    } else if x < 0.4 && empty(-1, 0, 0) {
        bits |= 0b100000;
    }

    bits
}

/// Pack outward bits above an 8-bit light value (0-15 scaled to 0-255).
///
/// The result stays below 2^24, so it is exact as an `f32`.
pub fn pack_extra(light: f32, normal_bits: u32) -> f32 {
    let low = (light * 17.0).round().clamp(0.0, 255.0) as u32;
    ((normal_bits << 8) | low) as f32
}

/// Split a packed value back into (light byte, outward bits).
pub fn unpack_extra(packed: f32) -> (u32, u32) {
    let packed = packed as u32;
    (packed & 0xFF, packed >> 8)
}
