//! Item geometry: flattened quads plus display transforms.
//!
//! Generated items (flat sprites) get procedural elements: a thin slab per
//! texture layer, and one stripe per pixel column and row carrying the side
//! faces so the sprite has visible thickness.

use super::buffer::VertexBuffer;
use super::compiler::compile;
use super::emitter::DEFAULT_COLOR;
use crate::atlas::{TextureAtlas, UvAnimation};
use crate::resource_pack::{DisplayPosition, Element, Face, Model, TextureReference};
use crate::types::{CullDirection, Direction, Orientation};
use glam::Mat3;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Default pixel columns per generated sprite.
pub const DEFAULT_PRECISION: u32 = 16;

/// Default sprite thickness in model units.
pub const DEFAULT_THICKNESS: u32 = 1;

/// Number of contiguous `layer0`, `layer1`, ... slots of a model.
pub fn layer_count(model: &Model) -> u32 {
    (0..)
        .take_while(|n| model.textures.contains_key(&format!("layer{}", n)))
        .count() as u32
}

/// Key of the generated element cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratedKey {
    pub layers: u32,
    pub precision: u32,
    pub thickness: u32,
    pub tintable: bool,
}

/// Memoized generated elements. Pure output, so a racing double build is
/// harmless; the first insert wins.
#[derive(Debug, Default)]
pub struct GeneratedElementCache {
    cache: RwLock<HashMap<GeneratedKey, Arc<Vec<Element>>>>,
}

impl GeneratedElementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    pub fn get(&self, key: GeneratedKey) -> Arc<Vec<Element>> {
        if let Some(elements) = self.cache.read().get(&key) {
            return elements.clone();
        }
        let elements = Arc::new(generated_elements(key));
        self.cache.write().entry(key).or_insert(elements).clone()
    }
}

fn sprite_face(layer: u32, uv: [f32; 4], tint_index: i32) -> Face {
    Face {
        uv,
        texture: TextureReference::Pointer(format!("layer{}", layer)),
        cull: CullDirection::None,
        rotation: 0,
        tint_index,
    }
}

fn sprite_element(a: [f32; 3], b: [f32; 3], faces: Vec<(Direction, Face)>) -> Element {
    Element {
        from: [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])],
        to: [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        rotation: None,
        shade: true,
        faces,
    }
}

/// Build the elements of a generated sprite. Per layer, the stripes come
/// first and the slab last.
pub fn generated_elements(key: GeneratedKey) -> Vec<Element> {
    let precision = key.precision.max(1);
    let step = 16.0 / precision as f32;
    let half = key.thickness as f32 / 2.0;
    let (near, far) = (8.0 - half, 8.0 + half);

    let mut elements = Vec::with_capacity((key.layers * (precision * 2 + 1)) as usize);

    for layer in 0..key.layers {
        let tint = if key.tintable { layer as i32 } else { -1 };

        for i in 0..precision {
            let left1 = i as f32 * step;
            let right1 = (i + 1) as f32 * step;
            let left2 = (precision - i) as f32 * step;
            let right2 = (precision - i - 1) as f32 * step;

            elements.push(sprite_element(
                [left2, 0.0, near],
                [right2, 16.0, far],
                vec![
                    (Direction::West, sprite_face(layer, [right2, 0.0, left2, 16.0], tint)),
                    (Direction::East, sprite_face(layer, [16.0 - right1, 0.0, 16.0 - left1, 16.0], tint)),
                ],
            ));
            elements.push(sprite_element(
                [0.0, left2, near],
                [16.0, right2, far],
                vec![
                    (Direction::Down, sprite_face(layer, [0.0, 16.0 - left2, 16.0, 16.0 - right2], tint)),
                    (Direction::Up, sprite_face(layer, [0.0, left1, 16.0, right1], tint)),
                ],
            ));
        }

        elements.push(sprite_element(
            [0.0, 0.0, near],
            [16.0, 16.0, far],
            vec![
                (Direction::North, sprite_face(layer, [16.0, 0.0, 0.0, 16.0], tint)),
                (Direction::South, sprite_face(layer, [0.0, 0.0, 16.0, 16.0], tint)),
            ],
        ));
    }

    elements
}

/// Flattened item geometry. Items are never culled, so every bucket of the
/// compiled form is concatenated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemGeometry {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 3]>,
    pub uv_anims: Vec<UvAnimation>,
    pub tints: Vec<i32>,
    /// Columns are rotation (degrees), translation and scale.
    pub display: BTreeMap<DisplayPosition, Mat3>,
}

impl ItemGeometry {
    /// Compile a model's elements as an item.
    pub fn build(model: &Model, atlas: &TextureAtlas) -> Self {
        let compiled = compile(model, Orientation::IDENTITY, atlas);
        let mut geometry = ItemGeometry {
            display: model
                .display
                .iter()
                .map(|(position, transform)| (*position, transform.to_mat3()))
                .collect(),
            ..Default::default()
        };

        for bucket in compiled.buckets() {
            geometry.positions.extend_from_slice(&bucket.positions);
            geometry.uvs.extend_from_slice(&bucket.uvs);
            geometry.uv_anims.extend_from_slice(&bucket.uv_anims);
            geometry.tints.extend_from_slice(&bucket.tints);
        }

        geometry
    }

    /// Compile a generated sprite: the model's textures on procedural
    /// elements.
    pub fn build_generated(
        model: &Model,
        elements: &[Element],
        atlas: &TextureAtlas,
    ) -> Self {
        let sprite = Model {
            textures: model.textures.clone(),
            elements: elements.to_vec(),
            display: model.display.clone(),
        };
        Self::build(&sprite, atlas)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Write the item at `offset`. Tint index `n` takes `palette[n]`;
    /// untinted vertices and indices past the palette are white. Colours
    /// are written as given, alpha 1.
    pub fn emit(
        &self,
        offset: [f32; 3],
        palette: &[[f32; 3]],
        buffer: &mut VertexBuffer,
        vertex_offset: usize,
    ) -> usize {
        buffer.ensure_len(vertex_offset + self.vertex_count());

        for (i, pos) in self.positions.iter().enumerate() {
            let [r, g, b] = usize::try_from(self.tints[i])
                .ok()
                .and_then(|index| palette.get(index))
                .copied()
                .unwrap_or(DEFAULT_COLOR);
            buffer.write(
                vertex_offset + i,
                [pos[0] + offset[0], pos[1] + offset[1], pos[2] + offset[2]],
                self.uvs[i],
                self.uv_anims[i],
                [r, g, b, 1.0],
            );
        }

        vertex_offset + self.vertex_count()
    }
}
