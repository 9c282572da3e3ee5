//! Full-cube fast path: one texture on all six sides, no model data.

use super::buffer::VertexBuffer;
use super::compiler::{element_corners, face_corners};
use crate::atlas::TextureAtlas;
use crate::types::{CullDirection, ResourceLocation};

/// Vertices [`emit_cube`] writes for a cull-flag mask.
pub fn cube_vertex_count(cull_flags: u8) -> usize {
    (cull_flags & 0b111111).count_ones() as usize * 4
}

/// Write the visible sides of a unit cube at `offset`.
///
/// `color` is written as is, the extra channel is 0.
pub fn emit_cube(
    atlas: &TextureAtlas,
    texture: &ResourceLocation,
    offset: [f32; 3],
    cull_flags: u8,
    color: [f32; 3],
    buffer: &mut VertexBuffer,
    vertex_offset: usize,
) -> usize {
    let corners = element_corners([0.0; 3], [16.0; 3]);
    let (uvs, anim) = atlas.get_uvs(texture, [0.0, 0.0, 16.0, 16.0], 0);
    let [r, g, b] = color;

    buffer.ensure_len(vertex_offset + cube_vertex_count(cull_flags));
    let mut cursor = vertex_offset;

    for dir in CullDirection::DIRECTIONAL {
        let (Some(bit), Some(face)) = (dir.flag(), dir.to_direction()) else {
            continue;
        };
        if cull_flags & bit == 0 {
            continue;
        }
        for (corner, uv) in face_corners(face).iter().zip(uvs) {
            let [x, y, z] = corners[*corner];
            buffer.write(
                cursor,
                [x + offset[0], y + offset[1], z + offset[2]],
                uv,
                anim,
                [r, g, b, 0.0],
            );
            cursor += 1;
        }
    }

    cursor
}
