//! Geometry compiler: resolved model plus orientation to bucketed quads.

use super::geometry::{CompiledGeometry, GeometryBuilder};
use crate::atlas::TextureAtlas;
use crate::resource_pack::{Element, Model};
use crate::types::rotation::{remap_cull, uv_lock_rotation};
use crate::types::{Axis, Direction, ElementRotation, Orientation};
use glam::{Mat3, Vec3};

/// Corners of an element, index `x * 4 + y * 2 + z` where each bit picks
/// `to` over `from`. Unit-cube coordinates.
pub fn element_corners(from: [f32; 3], to: [f32; 3]) -> [[f32; 3]; 8] {
    std::array::from_fn(|i| {
        let pick = |bit: usize, axis: usize| (if i & bit != 0 { to[axis] } else { from[axis] }) / 16.0;
        [pick(4, 0), pick(2, 1), pick(1, 2)]
    })
}

/// Corner indices of a face, ordered top-left, top-right, bottom-left,
/// bottom-right as seen from outside. Triangles are (0, 2, 1), (1, 2, 3).
pub fn face_corners(dir: Direction) -> [usize; 4] {
    match dir {
        Direction::Up => [2, 6, 3, 7],
        Direction::Down => [1, 5, 0, 4],
        Direction::South => [3, 7, 1, 5],
        Direction::North => [6, 2, 4, 0],
        Direction::East => [7, 6, 5, 4],
        Direction::West => [2, 3, 0, 1],
    }
}

/// Compile every element of a model at one orientation.
///
/// Output order follows element order, then face order, so the same input
/// always produces identical arrays.
pub fn compile(model: &Model, orientation: Orientation, atlas: &TextureAtlas) -> CompiledGeometry {
    let mut builder = GeometryBuilder::new();
    for element in &model.elements {
        append_element(&mut builder, model, element, orientation, atlas);
    }
    builder.build()
}

fn append_element(
    builder: &mut GeometryBuilder,
    model: &Model,
    element: &Element,
    orientation: Orientation,
    atlas: &TextureAtlas,
) {
    let mut corners = element_corners(element.from, element.to);

    if let Some(rotation) = &element.rotation {
        apply_element_rotation(&mut corners, rotation);
    }

    if !orientation.is_identity() {
        for corner in corners.iter_mut() {
            *corner = orientation.rotate_point(*corner);
        }
    }

    for (dir, face) in &element.faces {
        let cull = remap_cull(orientation, face.cull);
        let facing = remap_cull(orientation, dir.to_cull());
        let positions = face_corners(*dir).map(|i| corners[i]);

        let texture = model.resolve_reference(&face.texture);
        let (uvs, anim) = atlas.get_uvs(&texture, face.uv, uv_lock_rotation(orientation, *dir));

        builder.push_quad(cull, facing, positions, rotate_face_uvs(uvs, face.rotation), anim, face.tint_index);
    }
}

/// Reassign resolved UV corners for a face's own rotation. The sampled
/// area is unchanged, only which vertex gets which corner.
pub fn rotate_face_uvs<T: Copy>(uvs: [T; 4], quarter_turns: u8) -> [T; 4] {
    let order = match quarter_turns % 4 {
        1 => [2, 0, 3, 1],
        2 => [3, 2, 1, 0],
        3 => [1, 3, 0, 2],
        _ => [0, 1, 2, 3],
    };
    order.map(|i| uvs[i])
}

/// Rotate corners about the element pivot, one axis at a time.
fn apply_element_rotation(corners: &mut [[f32; 3]; 8], rotation: &ElementRotation) {
    let origin = Vec3::from(rotation.normalized_origin());

    for (axis, angle) in rotation.axis_steps() {
        let matrix = match axis {
            Axis::X => Mat3::from_rotation_x(angle),
            Axis::Y => Mat3::from_rotation_y(angle),
            Axis::Z => Mat3::from_rotation_z(angle),
        };

        let scale = if rotation.rescale() && angle.cos().abs() > 1e-4 {
            crate::types::rescale_factor(angle)
        } else {
            1.0
        };
        let stretch = match axis {
            Axis::X => Vec3::new(1.0, scale, scale),
            Axis::Y => Vec3::new(scale, 1.0, scale),
            Axis::Z => Vec3::new(scale, scale, 1.0),
        };

        for corner in corners.iter_mut() {
            let rotated = matrix * (Vec3::from(*corner) - origin) * stretch;
            *corner = (rotated + origin).to_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_pack::ModelDocument;
    use crate::types::{CullDirection, ResourceLocation};

    const CUBE: &str = r##"{
        "textures": { "all": "block/stone" },
        "elements": [{
            "from": [0, 0, 0], "to": [16, 16, 16],
            "faces": {
                "down":  { "texture": "#all", "cullface": "down" },
                "up":    { "texture": "#all", "cullface": "up" },
                "north": { "texture": "#all", "cullface": "north" },
                "south": { "texture": "#all", "cullface": "south" },
                "west":  { "texture": "#all", "cullface": "west" },
                "east":  { "texture": "#all", "cullface": "east", "tintindex": 0 }
            }
        }]
    }"##;

    fn model(json: &str) -> Model {
        let doc: ModelDocument = serde_json::from_str(json).unwrap();
        let mut model = Model::default();
        model.apply_document(&doc, &ResourceLocation::parse("block/test"));
        model
    }

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_corner_indexing() {
        let corners = element_corners([0.0, 0.0, 0.0], [16.0, 8.0, 4.0]);
        assert_eq!(corners[0], [0.0, 0.0, 0.0]);
        assert_eq!(corners[7], [1.0, 0.5, 0.25]);
        assert_eq!(corners[4], [1.0, 0.0, 0.0]);
        assert_eq!(corners[1], [0.0, 0.0, 0.25]);
    }

    #[test]
    fn test_full_cube_buckets() {
        let geometry = compile(&model(CUBE), Orientation::IDENTITY, &TextureAtlas::empty());

        assert!(geometry.bucket(CullDirection::None).is_empty());
        for dir in CullDirection::DIRECTIONAL {
            assert_eq!(geometry.bucket(dir).len(), 4, "{:?}", dir);
        }

        let up = geometry.bucket(CullDirection::Up);
        assert_eq!(
            up.positions,
            vec![[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]]
        );
        assert_eq!(up.uvs[0], [0.0, 0.0, 0.0]);
        assert_eq!(up.uvs[3], [1.0, 1.0, 0.0]);
        assert_eq!(geometry.bucket(CullDirection::East).tints, vec![0; 4]);
        assert_eq!(up.tints, vec![-1; 4]);
    }

    #[test]
    fn test_faces_lie_on_their_side() {
        let geometry = compile(&model(CUBE), Orientation::IDENTITY, &TextureAtlas::empty());
        for dir in CullDirection::DIRECTIONAL {
            let (dx, dy, dz) = dir.to_direction().unwrap().offset();
            let expected = [dx, dy, dz].map(|d| (d as f32 + 1.0) / 2.0);
            for p in &geometry.bucket(dir).positions {
                for axis in 0..3 {
                    if [dx, dy, dz][axis] != 0 {
                        assert_eq!(p[axis], expected[axis]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let m = model(CUBE);
        let o = Orientation::new(1, 3, true);
        let atlas = TextureAtlas::empty();
        assert_eq!(compile(&m, o, &atlas), compile(&m, o, &atlas));
    }

    #[test]
    fn test_orientation_moves_buckets() {
        let geometry = compile(&model(CUBE), Orientation::new(0, 1, false), &TextureAtlas::empty());
        // The authored north face now points east.
        for p in &geometry.bucket(CullDirection::East).positions {
            assert!((p[0] - 1.0).abs() < 1e-6);
        }
        assert_eq!(geometry.bucket(CullDirection::East).len(), 4);
        assert_eq!(geometry.bucket(CullDirection::Up).len(), 4);
    }

    #[test]
    fn test_face_without_cullface_culls_against_its_direction() {
        let geometry = compile(
            &model(
                r##"{
                "textures": { "side": "block/torch" },
                "elements": [{
                    "from": [7, 0, 7], "to": [9, 10, 9],
                    "faces": {
                        "north": { "texture": "#side" },
                        "down":  { "texture": "#side" }
                    }
                }]
            }"##,
            ),
            Orientation::new(0, 1, false),
            &TextureAtlas::empty(),
        );

        // Inset faces still take their own direction, turned with the block.
        assert_eq!(geometry.bucket(CullDirection::Down).len(), 4);
        assert_eq!(geometry.bucket(CullDirection::East).len(), 4);
        assert!(geometry.bucket(CullDirection::None).is_empty());
        assert!(geometry.no_cull_dirs().is_empty());
    }

    #[test]
    fn test_unknown_cullface_is_never_culled() {
        let geometry = compile(
            &model(
                r##"{
                "textures": { "side": "block/torch" },
                "elements": [{
                    "from": [0, 0, 0], "to": [16, 16, 16],
                    "faces": { "north": { "texture": "#side", "cullface": "sideways" } }
                }]
            }"##,
            ),
            Orientation::new(0, 1, false),
            &TextureAtlas::empty(),
        );

        assert_eq!(geometry.bucket(CullDirection::None).len(), 4);
        assert_eq!(geometry.no_cull_dirs(), &[CullDirection::East]);
    }

    #[test]
    fn test_face_uv_rotation_order() {
        let uvs = [0, 1, 2, 3];
        assert_eq!(rotate_face_uvs(uvs, 0), [0, 1, 2, 3]);
        assert_eq!(rotate_face_uvs(uvs, 1), [2, 0, 3, 1]);
        assert_eq!(rotate_face_uvs(uvs, 2), [3, 2, 1, 0]);
        assert_eq!(rotate_face_uvs(uvs, 3), [1, 3, 0, 2]);
    }

    #[test]
    fn test_uvlock_rotates_sampled_area() {
        let json = r##"{
            "textures": { "top": "block/log_top" },
            "elements": [{ "from": [0,0,0], "to": [16,16,16],
                "faces": { "up": { "texture": "#top", "uv": [0, 0, 8, 8], "cullface": "up" } } }]
        }"##;
        let m = model(json);
        let atlas = TextureAtlas::empty();
        let free = compile(&m, Orientation::new(0, 1, false), &atlas);
        let locked = compile(&m, Orientation::new(0, 1, true), &atlas);
        assert_eq!(free.bucket(CullDirection::Up).uvs[0], [0.0, 0.0, 0.0]);
        assert_ne!(locked.bucket(CullDirection::Up).uvs, free.bucket(CullDirection::Up).uvs);
    }

    #[test]
    fn test_rescaled_diagonal_reaches_corners() {
        let json = r##"{
            "textures": { "cross": "block/grass" },
            "elements": [{
                "from": [0, 0, 8], "to": [16, 16, 8],
                "rotation": { "origin": [8, 8, 8], "axis": "y", "angle": 45, "rescale": true },
                "faces": { "north": { "texture": "#cross" } }
            }]
        }"##;
        let geometry = compile(&model(json), Orientation::IDENTITY, &TextureAtlas::empty());
        let quad = &geometry.bucket(CullDirection::North).positions;
        assert_eq!(quad.len(), 4);
        for p in quad {
            for c in [p[0], p[2]] {
                assert!(c.abs() < 1e-5 || (c - 1.0).abs() < 1e-5, "{:?}", p);
            }
        }
    }

    #[test]
    fn test_unscaled_rotation_is_rigid() {
        let mut corners = element_corners([4.0, 0.0, 4.0], [12.0, 16.0, 12.0]);
        let before = corners;
        apply_element_rotation(
            &mut corners,
            &ElementRotation::Single {
                origin: [8.0, 8.0, 8.0],
                axis: Axis::Z,
                angle: 22.5,
                rescale: false,
            },
        );
        let pivot = Vec3::splat(0.5);
        for (a, b) in before.iter().zip(corners.iter()) {
            let da = (Vec3::from(*a) - pivot).length();
            let db = (Vec3::from(*b) - pivot).length();
            assert!((da - db).abs() < 1e-5);
        }
        assert!(!close(before[0], corners[0]));
    }
}
