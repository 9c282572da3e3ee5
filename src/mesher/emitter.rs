//! Mesh emission: expand compiled geometry into a vertex buffer.

use super::ao::{face_corner_ao, in_block_corner_ao, sample_vertex_ao};
use super::buffer::VertexBuffer;
use super::geometry::{CompiledGeometry, GeometryBucket};
use super::lighting::{block_normal_bits, pack_extra, ExtraVertexFormat, LightSamples, CROSS_NORMAL_BITS};
use crate::atlas::mipmap::srgb_to_linear;
use crate::types::CullDirection;

/// Colour of untinted vertices.
pub const DEFAULT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Per-block inputs of one emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitContext {
    /// Added to every position.
    pub offset: [f32; 3],
    /// Bit `i` enables the directional bucket `i + 1`.
    pub cull_flags: u8,
    /// 27-cell occlusion mask, see [`super::ao::mask_index`].
    pub occlusion_mask: u32,
    /// 0 disables AO.
    pub ao_intensity: f32,
    pub lights: LightSamples,
    /// sRGB colour for tinted faces.
    pub tint: [f32; 3],
    pub format: ExtraVertexFormat,
}

impl Default for EmitContext {
    fn default() -> Self {
        Self {
            offset: [0.0; 3],
            cull_flags: 0b111111,
            occlusion_mask: 0,
            ao_intensity: 0.0,
            lights: LightSamples::default(),
            tint: DEFAULT_COLOR,
            format: ExtraVertexFormat::Light,
        }
    }
}

impl EmitContext {
    pub fn at(offset: [f32; 3]) -> Self {
        Self {
            offset,
            ..Default::default()
        }
    }

    pub fn with_cull_flags(mut self, cull_flags: u8) -> Self {
        self.cull_flags = cull_flags;
        self
    }

    pub fn with_occlusion(mut self, mask: u32, intensity: f32) -> Self {
        self.occlusion_mask = mask;
        self.ao_intensity = intensity;
        self
    }

    pub fn with_lights(mut self, lights: LightSamples) -> Self {
        self.lights = lights;
        self
    }

    pub fn with_tint(mut self, tint: [f32; 3]) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_format(mut self, format: ExtraVertexFormat) -> Self {
        self.format = format;
        self
    }
}

/// Write a block's vertices starting at `vertex_offset`, returning the
/// offset past the last one. The buffer grows if it is too short.
///
/// The never-culled bucket is always written, then each directional bucket
/// whose flag is set.
pub fn emit(
    geometry: &CompiledGeometry,
    ctx: &EmitContext,
    buffer: &mut VertexBuffer,
    vertex_offset: usize,
) -> usize {
    buffer.ensure_len(vertex_offset + geometry.vertex_count(ctx.cull_flags));
    let mut cursor = vertex_offset;

    let none = geometry.bucket(CullDirection::None);
    for (quad, facing) in geometry.no_cull_dirs().iter().enumerate() {
        let corners = in_block_corner_ao(*facing, ctx.occlusion_mask, ctx.ao_intensity);
        for i in quad * 4..(quad * 4 + 4).min(none.len()) {
            write_vertex(none, i, *facing, CullDirection::None, corners, ctx, buffer, cursor);
            cursor += 1;
        }
    }

    for dir in CullDirection::DIRECTIONAL {
        if !dir.flag().is_some_and(|bit| ctx.cull_flags & bit != 0) {
            continue;
        }
        let bucket = geometry.bucket(dir);
        if bucket.is_empty() {
            continue;
        }
        let corners = face_corner_ao(dir, ctx.occlusion_mask, ctx.ao_intensity);
        for i in 0..bucket.len() {
            write_vertex(bucket, i, dir, dir, corners, ctx, buffer, cursor);
            cursor += 1;
        }
    }

    cursor
}

#[allow(clippy::too_many_arguments)]
fn write_vertex(
    bucket: &GeometryBucket,
    i: usize,
    ao_dir: CullDirection,
    light_dir: CullDirection,
    ao_corners: [f32; 4],
    ctx: &EmitContext,
    buffer: &mut VertexBuffer,
    index: usize,
) {
    let pos = bucket.positions[i];
    let light = ctx.lights.vertex_light(light_dir, pos);

    let base = if bucket.tints[i] >= 0 { ctx.tint } else { DEFAULT_COLOR };
    let ao = if ctx.ao_intensity > 0.0 {
        sample_vertex_ao(ao_dir, ao_corners, pos, light)
    } else {
        1.0
    };
    let [r, g, b] = base.map(|c| srgb_to_linear(c) * ao);

    let extra = match ctx.format {
        ExtraVertexFormat::Light => light,
        ExtraVertexFormat::LightBlockNormal => pack_extra(light, block_normal_bits(pos, ctx.occlusion_mask)),
        ExtraVertexFormat::LightCrossNormal => pack_extra(light, CROSS_NORMAL_BITS),
    };

    buffer.write(
        index,
        add(pos, ctx.offset),
        bucket.uvs[i],
        bucket.uv_anims[i],
        [r, g, b, extra],
    );
}

/// Positions only, for collision meshes. Same bucket selection as [`emit`].
pub fn emit_collider(
    geometry: &CompiledGeometry,
    offset: [f32; 3],
    cull_flags: u8,
    positions: &mut Vec<[f32; 3]>,
    vertex_offset: usize,
) -> usize {
    let end = vertex_offset + geometry.vertex_count(cull_flags);
    if positions.len() < end {
        positions.resize(end, [0.0; 3]);
    }

    let mut cursor = vertex_offset;
    for dir in CullDirection::ALL {
        if !dir.flag().map_or(true, |bit| cull_flags & bit != 0) {
            continue;
        }
        for pos in &geometry.bucket(dir).positions {
            positions[cursor] = add(*pos, offset);
            cursor += 1;
        }
    }
    cursor
}

/// [`emit`] followed by copying the new positions into a collider array.
pub fn emit_with_collider(
    geometry: &CompiledGeometry,
    ctx: &EmitContext,
    buffer: &mut VertexBuffer,
    vertex_offset: usize,
    collider: &mut Vec<[f32; 3]>,
    collider_offset: usize,
) -> (usize, usize) {
    let end = emit(geometry, ctx, buffer, vertex_offset);
    let count = end - vertex_offset;

    if collider.len() < collider_offset + count {
        collider.resize(collider_offset + count, [0.0; 3]);
    }
    collider[collider_offset..collider_offset + count].copy_from_slice(&buffer.positions[vertex_offset..end]);

    (end, collider_offset + count)
}

fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}
