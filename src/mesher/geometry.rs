//! Compiled, cull-bucketed block geometry.

use crate::atlas::UvAnimation;
use crate::types::CullDirection;

/// Parallel per-vertex arrays of one cull bucket. Vertices come in quads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBucket {
    pub positions: Vec<[f32; 3]>,
    /// Atlas UVs, page index in the third component.
    pub uvs: Vec<[f32; 3]>,
    pub uv_anims: Vec<UvAnimation>,
    /// Tint index per vertex, -1 = untinted.
    pub tints: Vec<i32>,
}

impl GeometryBucket {
    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn push_quad(&mut self, positions: [[f32; 3]; 4], uvs: [[f32; 3]; 4], anim: UvAnimation, tint: i32) {
        self.positions.extend_from_slice(&positions);
        self.uvs.extend_from_slice(&uvs);
        self.uv_anims.extend_from_slice(&[anim; 4]);
        self.tints.extend_from_slice(&[tint; 4]);
    }
}

/// Geometry of one (model, orientation) pair, split by cull direction.
///
/// Never mutated after [`GeometryBuilder::build`], so it is shared by `Arc`
/// between every state that resolves to the same pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledGeometry {
    buckets: [GeometryBucket; 7],
    /// Effective face direction of each quad in the `None` bucket.
    no_cull_dirs: Vec<CullDirection>,
}

impl CompiledGeometry {
    /// Geometry with no vertices at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bucket(&self, dir: CullDirection) -> &GeometryBucket {
        &self.buckets[dir.index()]
    }

    pub fn buckets(&self) -> &[GeometryBucket; 7] {
        &self.buckets
    }

    /// Face direction per quad of the never-culled bucket.
    pub fn no_cull_dirs(&self) -> &[CullDirection] {
        &self.no_cull_dirs
    }

    /// Vertices emitted for a cull-flag mask; the `None` bucket always counts.
    pub fn vertex_count(&self, cull_flags: u8) -> usize {
        CullDirection::ALL
            .iter()
            .filter(|dir| dir.flag().map_or(true, |bit| cull_flags & bit != 0))
            .map(|dir| self.buckets[dir.index()].len())
            .sum()
    }

    /// Every vertex in every bucket.
    pub fn total_vertices(&self) -> usize {
        self.buckets.iter().map(GeometryBucket::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(GeometryBucket::is_empty)
    }
}

/// Accumulates quads into buckets.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    geometry: CompiledGeometry,
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one quad.
    ///
    /// `face` is the direction the quad faces after orientation; it is only
    /// recorded when the quad lands in the `None` bucket.
    pub fn push_quad(
        &mut self,
        cull: CullDirection,
        face: CullDirection,
        positions: [[f32; 3]; 4],
        uvs: [[f32; 3]; 4],
        anim: UvAnimation,
        tint: i32,
    ) {
        if cull == CullDirection::None {
            self.geometry.no_cull_dirs.push(face);
        }
        self.geometry.buckets[cull.index()].push_quad(positions, uvs, anim, tint);
    }

    pub fn build(self) -> CompiledGeometry {
        self.geometry
    }
}
