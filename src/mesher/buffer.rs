//! Destination vertex buffer shared by every emitter.

use crate::atlas::UvAnimation;

/// Structure-of-arrays vertex buffer.
///
/// `colors` holds linear RGB in `xyz` and the packed extra-data channel
/// (light, or light plus normal bits) in `w`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBuffer {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 3]>,
    pub uv_anims: Vec<UvAnimation>,
    pub colors: Vec<[f32; 4]>,
}

impl VertexBuffer {
    /// A zero-filled buffer of `vertex_count` vertices.
    pub fn new(vertex_count: usize) -> Self {
        let mut buffer = Self::default();
        buffer.ensure_len(vertex_count);
        buffer
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Grow every array to at least `len` vertices.
    pub fn ensure_len(&mut self, len: usize) {
        if self.positions.len() < len {
            self.positions.resize(len, [0.0; 3]);
            self.uvs.resize(len, [0.0; 3]);
            self.uv_anims.resize(len, [0.0; 4]);
            self.colors.resize(len, [0.0; 4]);
        }
    }

    /// Write one vertex at `index`, growing the buffer if needed.
    pub fn write(&mut self, index: usize, position: [f32; 3], uv: [f32; 3], anim: UvAnimation, color: [f32; 4]) {
        self.ensure_len(index + 1);
        self.positions[index] = position;
        self.uvs[index] = uv;
        self.uv_anims[index] = anim;
        self.colors[index] = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_grows() {
        let mut buffer = VertexBuffer::new(2);
        assert_eq!(buffer.len(), 2);
        buffer.write(4, [1.0, 2.0, 3.0], [0.5, 0.5, 1.0], [0.0; 4], [1.0; 4]);
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.positions[4], [1.0, 2.0, 3.0]);
        assert_eq!(buffer.colors[3], [0.0; 4]);
    }
}
