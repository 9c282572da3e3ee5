//! Block and item model documents.
//!
//! A [`ModelDocument`] is the typed view of one `models/*.json` file, exactly
//! as authored. A [`Model`] is the merged, inheritance-resolved result the
//! geometry compiler consumes.

use crate::resolver::chain::{follow_chain, ChainError, Step};
use crate::types::{Axis, CullDirection, Direction, ElementRotation, ResourceLocation};
use glam::{Mat3, Vec3};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Maximum length of a texture pointer chain.
pub const MAX_TEXTURE_DEPTH: usize = 50;

/// One model file as written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelDocument {
    /// Parent model to inherit from.
    #[serde(default)]
    pub parent: Option<String>,

    /// Texture variable definitions.
    #[serde(default)]
    pub textures: Option<HashMap<String, String>>,

    /// Model elements. `Some(vec![])` still replaces the parent's elements.
    #[serde(default)]
    pub elements: Option<Vec<ElementDocument>>,

    /// Display transforms keyed by position name.
    #[serde(default)]
    pub display: Option<serde_json::Map<String, serde_json::Value>>,

    /// Item override rules.
    #[serde(default)]
    pub overrides: Option<Vec<OverrideDocument>>,
}

impl ModelDocument {
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Parent identifier, if any.
    pub fn parent_location(&self) -> Option<ResourceLocation> {
        self.parent.as_deref().map(ResourceLocation::parse)
    }

    /// Terminal texture ids named directly by this document.
    pub fn direct_textures(&self) -> impl Iterator<Item = ResourceLocation> + '_ {
        self.textures
            .iter()
            .flat_map(|t| t.values())
            .filter(|v| !v.starts_with('#'))
            .map(|v| ResourceLocation::parse(v))
    }
}

/// A cuboid as written in a model file.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementDocument {
    #[serde(default)]
    pub from: [f32; 3],
    #[serde(default = "default_to")]
    pub to: [f32; 3],
    #[serde(default)]
    pub rotation: Option<RotationDocument>,
    #[serde(default = "default_shade")]
    pub shade: bool,
    #[serde(default)]
    pub faces: BTreeMap<Direction, FaceDocument>,
}

fn default_to() -> [f32; 3] {
    [16.0, 16.0, 16.0]
}

fn default_shade() -> bool {
    true
}

/// Element rotation in either the single-axis or the per-axis form.
#[derive(Debug, Clone, Deserialize)]
pub struct RotationDocument {
    #[serde(default = "default_origin")]
    pub origin: [f32; 3],
    #[serde(default)]
    pub axis: Option<Axis>,
    #[serde(default)]
    pub angle: Option<f32>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub z: Option<f32>,
    #[serde(default)]
    pub rescale: bool,
}

fn default_origin() -> [f32; 3] {
    [8.0, 8.0, 8.0]
}

impl RotationDocument {
    /// Convert to a rotation, or `None` if the two forms are mixed or
    /// neither is complete.
    pub fn to_rotation(&self) -> Option<ElementRotation> {
        let has_compound = self.x.is_some() || self.y.is_some() || self.z.is_some();
        match (self.axis, self.angle, has_compound) {
            (Some(axis), Some(angle), false) => Some(ElementRotation::Single {
                origin: self.origin,
                axis,
                angle,
                rescale: self.rescale,
            }),
            (None, None, true) => Some(ElementRotation::Compound {
                origin: self.origin,
                angles: [
                    self.x.unwrap_or(0.0),
                    self.y.unwrap_or(0.0),
                    self.z.unwrap_or(0.0),
                ],
                rescale: self.rescale,
            }),
            _ => None,
        }
    }
}

/// A face as written in a model file.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceDocument {
    #[serde(default)]
    pub uv: Option<[f32; 4]>,
    pub texture: String,
    #[serde(default)]
    pub cullface: Option<String>,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default = "default_tint_index")]
    pub tintindex: i32,
}

fn default_tint_index() -> i32 {
    -1
}

/// `{"predicate": {...}, "model": "..."}` entry of an item model.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideDocument {
    #[serde(default)]
    pub predicate: HashMap<String, f32>,
    pub model: String,
}

/// A texture slot value: either another slot or a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureReference {
    /// `#name`, stored without the `#`.
    Pointer(String),
    Texture(ResourceLocation),
}

impl TextureReference {
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix('#') {
            Some(slot) => TextureReference::Pointer(slot.to_string()),
            None => TextureReference::Texture(ResourceLocation::parse(value)),
        }
    }
}

/// Item display contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DisplayPosition {
    ThirdPersonRightHand,
    ThirdPersonLeftHand,
    FirstPersonRightHand,
    FirstPersonLeftHand,
    Gui,
    Head,
    Ground,
    Fixed,
    OnShelf,
}

impl DisplayPosition {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "thirdperson_righthand" => Some(DisplayPosition::ThirdPersonRightHand),
            "thirdperson_lefthand" => Some(DisplayPosition::ThirdPersonLeftHand),
            "firstperson_righthand" => Some(DisplayPosition::FirstPersonRightHand),
            "firstperson_lefthand" => Some(DisplayPosition::FirstPersonLeftHand),
            "gui" => Some(DisplayPosition::Gui),
            "head" => Some(DisplayPosition::Head),
            "ground" => Some(DisplayPosition::Ground),
            "fixed" => Some(DisplayPosition::Fixed),
            "on_shelf" => Some(DisplayPosition::OnShelf),
            _ => None,
        }
    }
}

/// Rotation (degrees), translation and scale of one display context.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DisplayTransform {
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl DisplayTransform {
    /// Packed as a 3×3 matrix whose columns are rotation, translation, scale.
    pub fn to_mat3(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::from(self.rotation),
            Vec3::from(self.translation),
            Vec3::from(self.scale),
        )
    }
}

/// A resolved face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// UV rectangle `[u1, v1, u2, v2]` in 0-16 units.
    pub uv: [f32; 4],
    pub texture: TextureReference,
    pub cull: CullDirection,
    /// Authored UV rotation in quarter turns.
    pub rotation: u8,
    /// Tint index, -1 = untinted.
    pub tint_index: i32,
}

/// A resolved cuboid, corners ordered so that `from <= to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub from: [f32; 3],
    pub to: [f32; 3],
    pub rotation: Option<ElementRotation>,
    pub shade: bool,
    /// Faces in [`Direction::ALL`] order.
    pub faces: Vec<(Direction, Face)>,
}

impl Element {
    pub fn from_document(doc: &ElementDocument) -> Self {
        let mut from = [0.0; 3];
        let mut to = [0.0; 3];
        for i in 0..3 {
            from[i] = doc.from[i].min(doc.to[i]);
            to[i] = doc.from[i].max(doc.to[i]);
        }

        let rotation = match &doc.rotation {
            Some(rot) => {
                let parsed = rot.to_rotation();
                if parsed.is_none() {
                    log::warn!("Invalid element rotation {:?}, ignoring", rot);
                }
                parsed
            }
            None => None,
        };

        let faces = doc
            .faces
            .iter()
            .map(|(dir, face)| {
                let cull = face
                    .cullface
                    .as_deref()
                    .map_or_else(|| dir.to_cull(), CullDirection::from_name);
                let rotation = if face.rotation % 90 == 0 {
                    (face.rotation / 90).rem_euclid(4) as u8
                } else {
                    0
                };
                (
                    *dir,
                    Face {
                        uv: face.uv.unwrap_or_else(|| default_uv(*dir, from, to)),
                        texture: TextureReference::parse(&face.texture),
                        cull,
                        rotation,
                        tint_index: face.tintindex,
                    },
                )
            })
            .collect();

        Self {
            from,
            to,
            rotation,
            shade: doc.shade,
            faces,
        }
    }
}

/// UVs a face gets when none are written: the element's own projection.
fn default_uv(dir: Direction, from: [f32; 3], to: [f32; 3]) -> [f32; 4] {
    match dir {
        Direction::Down => [from[0], 16.0 - to[2], to[0], 16.0 - from[2]],
        Direction::Up => [from[0], from[2], to[0], to[2]],
        Direction::North => [16.0 - to[0], 16.0 - to[1], 16.0 - from[0], 16.0 - from[1]],
        Direction::South => [from[0], 16.0 - to[1], to[0], 16.0 - from[1]],
        Direction::West => [from[2], 16.0 - to[1], to[2], 16.0 - from[1]],
        Direction::East => [16.0 - to[2], 16.0 - to[1], 16.0 - from[2], 16.0 - from[1]],
    }
}

/// A fully resolved model. Immutable once inheritance is done.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub textures: HashMap<String, TextureReference>,
    pub elements: Vec<Element>,
    pub display: BTreeMap<DisplayPosition, DisplayTransform>,
}

impl Model {
    /// Overlay a document's own declarations onto this model.
    ///
    /// Textures and display transforms override by key; declared elements
    /// replace the inherited ones wholesale.
    pub fn apply_document(&mut self, doc: &ModelDocument, id: &ResourceLocation) {
        if let Some(textures) = &doc.textures {
            for (slot, value) in textures {
                self.textures
                    .insert(slot.clone(), TextureReference::parse(value));
            }
        }

        if let Some(elements) = &doc.elements {
            self.elements = elements.iter().map(Element::from_document).collect();
        }

        if let Some(display) = &doc.display {
            for (key, value) in display {
                let Some(position) = DisplayPosition::from_name(key) else {
                    log::warn!("Unknown display position {} in {}, skipping", key, id);
                    continue;
                };
                match serde_json::from_value::<DisplayTransform>(value.clone()) {
                    Ok(transform) => {
                        self.display.insert(position, transform);
                    }
                    Err(e) => log::warn!("Invalid display transform {} in {}: {}", key, id, e),
                }
            }
        }
    }

    /// Resolve a slot name to a texture, following `#` pointers.
    ///
    /// Missing slots and cycles yield [`ResourceLocation::missing_texture`].
    pub fn resolve_texture(&self, slot: &str) -> ResourceLocation {
        let outcome = follow_chain(slot.to_string(), MAX_TEXTURE_DEPTH, |name| {
            match self.textures.get(name) {
                Some(TextureReference::Pointer(next)) => Step::Next(next.clone()),
                Some(TextureReference::Texture(id)) => Step::Done(id.clone()),
                None => Step::Missing,
            }
        });
        match outcome {
            Ok(id) => id,
            Err(ChainError::TooDeep) => {
                log::warn!("Texture reference #{} does not terminate", slot);
                ResourceLocation::missing_texture()
            }
            Err(ChainError::Missing) => ResourceLocation::missing_texture(),
        }
    }

    /// Resolve a face or slot reference.
    pub fn resolve_reference(&self, reference: &TextureReference) -> ResourceLocation {
        match reference {
            TextureReference::Texture(id) => id.clone(),
            TextureReference::Pointer(slot) => self.resolve_texture(slot),
        }
    }

    /// Whether the model has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Every texture the slots and faces resolve to, sentinel excluded.
    pub fn texture_ids(&self) -> BTreeSet<ResourceLocation> {
        let missing = ResourceLocation::missing_texture();
        self.textures
            .keys()
            .map(|slot| self.resolve_texture(slot))
            .chain(
                self.elements
                    .iter()
                    .flat_map(|e| e.faces.iter())
                    .map(|(_, face)| self.resolve_reference(&face.texture)),
            )
            .filter(|id| *id != missing)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_from(json: &str) -> Model {
        let doc: ModelDocument = serde_json::from_str(json).unwrap();
        let mut model = Model::default();
        model.apply_document(&doc, &ResourceLocation::parse("block/test"));
        model
    }

    #[test]
    fn test_parse_simple_model() {
        let doc: ModelDocument = serde_json::from_str(
            r#"{
                "parent": "block/cube_all",
                "textures": { "all": "block/stone" }
            }"#,
        )
        .unwrap();
        assert_eq!(doc.parent_location(), Some(ResourceLocation::parse("block/cube_all")));
        assert!(doc.elements.is_none());
        assert_eq!(
            doc.direct_textures().collect::<Vec<_>>(),
            vec![ResourceLocation::parse("block/stone")]
        );
    }

    #[test]
    fn test_empty_elements_are_declared() {
        let doc: ModelDocument = serde_json::from_str(r#"{ "elements": [] }"#).unwrap();
        assert_eq!(doc.elements.map(|e| e.len()), Some(0));
    }

    #[test]
    fn test_element_corners_are_ordered() {
        let model = model_from(
            r##"{ "elements": [ { "from": [16, 0, 4], "to": [0, 8, 2], "faces": {} } ] }"##,
        );
        let element = &model.elements[0];
        assert_eq!(element.from, [0.0, 0.0, 2.0]);
        assert_eq!(element.to, [16.0, 8.0, 4.0]);
    }

    #[test]
    fn test_face_defaults() {
        let model = model_from(
            r##"{ "elements": [ {
                "from": [0, 0, 0], "to": [16, 8, 16],
                "faces": {
                    "up":    { "texture": "#top" },
                    "down":  { "texture": "#bottom" },
                    "north": { "texture": "#side", "cullface": "south", "rotation": 270, "tintindex": 0 },
                    "east":  { "texture": "block/stone", "rotation": 45 }
                }
            } ] }"##,
        );
        let faces: HashMap<_, _> = model.elements[0].faces.iter().cloned().collect();

        // Without a cullface, a face culls against its own direction.
        assert_eq!(faces[&Direction::Up].cull, CullDirection::Up);
        assert_eq!(faces[&Direction::Down].cull, CullDirection::Down);
        assert_eq!(faces[&Direction::North].cull, CullDirection::South);
        assert_eq!(faces[&Direction::North].rotation, 3);
        assert_eq!(faces[&Direction::North].tint_index, 0);
        assert_eq!(faces[&Direction::East].rotation, 0);
        assert_eq!(faces[&Direction::Up].tint_index, -1);
        assert_eq!(faces[&Direction::North].uv, [0.0, 8.0, 16.0, 16.0]);
        assert_eq!(
            faces[&Direction::East].texture,
            TextureReference::Texture(ResourceLocation::parse("block/stone"))
        );
    }

    #[test]
    fn test_faces_follow_direction_order() {
        let model = model_from(
            r##"{ "elements": [ { "from": [0,0,0], "to": [16,16,16], "faces": {
                "east": { "texture": "#a" }, "down": { "texture": "#a" }, "north": { "texture": "#a" }
            } } ] }"##,
        );
        let dirs: Vec<_> = model.elements[0].faces.iter().map(|(d, _)| *d).collect();
        assert_eq!(dirs, vec![Direction::Down, Direction::North, Direction::East]);
    }

    #[test]
    fn test_rotation_forms() {
        let single: RotationDocument =
            serde_json::from_str(r#"{ "origin": [8, 8, 8], "axis": "y", "angle": 45, "rescale": true }"#)
                .unwrap();
        assert!(matches!(
            single.to_rotation(),
            Some(ElementRotation::Single { axis: Axis::Y, rescale: true, .. })
        ));

        let compound: RotationDocument = serde_json::from_str(r#"{ "x": 22.5, "z": -45 }"#).unwrap();
        assert!(matches!(
            compound.to_rotation(),
            Some(ElementRotation::Compound { angles, .. }) if angles == [22.5, 0.0, -45.0]
        ));

        let mixed: RotationDocument =
            serde_json::from_str(r#"{ "axis": "x", "angle": 45, "y": 10 }"#).unwrap();
        assert!(mixed.to_rotation().is_none());
    }

    #[test]
    fn test_resolve_texture_chain() {
        let model = model_from(
            r##"{ "textures": { "all": "block/stone", "side": "#all", "particle": "#side" } }"##,
        );
        assert_eq!(model.resolve_texture("particle"), ResourceLocation::parse("block/stone"));
        assert_eq!(model.resolve_texture("nothing"), ResourceLocation::missing_texture());
    }

    #[test]
    fn test_self_reference_yields_missing() {
        let model = model_from(r##"{ "textures": { "loop": "#loop", "a": "#b", "b": "#a" } }"##);
        assert_eq!(model.resolve_texture("loop"), ResourceLocation::missing_texture());
        assert_eq!(model.resolve_texture("a"), ResourceLocation::missing_texture());
    }

    #[test]
    fn test_unknown_display_position_is_skipped() {
        let model = model_from(
            r#"{ "display": {
                "gui": { "rotation": [30, 225, 0], "scale": [0.625, 0.625, 0.625] },
                "somewhere": { "rotation": [0, 0, 0] }
            } }"#,
        );
        assert_eq!(model.display.len(), 1);
        let gui = model.display[&DisplayPosition::Gui];
        assert_eq!(gui.translation, [0.0, 0.0, 0.0]);
        assert_eq!(gui.to_mat3().col(2), Vec3::splat(0.625));
    }
}
