//! Ambient occlusion from a 27-cell neighbour mask.
//!
//! Bit `mask_index(dx, dy, dz)` of the mask is set when the cell at that
//! offset from the block casts occlusion. Bit 13 is the block itself.

use crate::types::CullDirection;

/// Bit of a neighbour cell in the occlusion mask. Offsets are -1..=1.
pub const fn mask_index(dx: i32, dy: i32, dz: i32) -> u32 {
    ((dy + 1) * 9 + (dz + 1) * 3 + (dx + 1)) as u32
}

/// Cells framing a face from outside the block, in the order
/// top-left, top-middle, top-right, middle-left, middle-right,
/// bottom-left, bottom-middle, bottom-right.
fn outer_cells(dir: CullDirection) -> Option<[u32; 8]> {
    match dir {
        CullDirection::Down => Some([6, 7, 8, 3, 5, 0, 1, 2]),
        CullDirection::Up => Some([20, 23, 26, 19, 25, 18, 21, 24]),
        CullDirection::South => Some([24, 25, 26, 15, 17, 6, 7, 8]),
        CullDirection::North => Some([2, 11, 20, 1, 19, 0, 9, 18]),
        CullDirection::East => Some([8, 17, 26, 5, 23, 2, 11, 20]),
        CullDirection::West => Some([18, 21, 24, 9, 15, 0, 3, 6]),
        CullDirection::None => None,
    }
}

/// Same layout for faces inside the block: the ring around the block's
/// own cell in the plane of the face.
fn inner_cells(dir: CullDirection) -> Option<[u32; 8]> {
    match dir {
        CullDirection::Up => Some([11, 14, 17, 10, 16, 9, 12, 15]),
        CullDirection::Down => Some([15, 16, 17, 12, 14, 9, 10, 11]),
        CullDirection::North => Some([5, 14, 23, 4, 22, 3, 12, 21]),
        CullDirection::South => Some([21, 22, 23, 12, 14, 3, 4, 5]),
        CullDirection::West => Some([19, 22, 25, 10, 16, 1, 4, 7]),
        CullDirection::East => Some([7, 16, 25, 4, 22, 1, 10, 19]),
        CullDirection::None => None,
    }
}

/// Corner values `[tl, tr, bl, br]` from eight framing cells.
fn corners_from_cells(cells: [u32; 8], mask: u32, intensity: f32) -> [f32; 4] {
    let occ = |slot: usize| if mask & (1 << cells[slot]) != 0 { intensity } else { 0.0 };
    let corner = |side1: usize, corner: usize, side2: usize| (1.0 - occ(side1) - occ(corner) - occ(side2)).max(0.0);

    [
        corner(3, 0, 1),
        corner(1, 2, 4),
        corner(6, 5, 3),
        corner(4, 7, 6),
    ]
}

/// Corner AO of a face on the block boundary.
pub fn face_corner_ao(dir: CullDirection, mask: u32, intensity: f32) -> [f32; 4] {
    outer_cells(dir).map_or([1.0; 4], |cells| corners_from_cells(cells, mask, intensity))
}

/// Corner AO of a never-culled face, looked up by the way it faces.
pub fn in_block_corner_ao(dir: CullDirection, mask: u32, intensity: f32) -> [f32; 4] {
    inner_cells(dir).map_or([1.0; 4], |cells| corners_from_cells(cells, mask, intensity))
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// AO at a vertex: bilinear over the face corners, then lifted towards 1
/// by how lit the vertex is (light in 0-15).
pub fn sample_vertex_ao(dir: CullDirection, corners: [f32; 4], pos: [f32; 3], light: f32) -> f32 {
    let [x, y, z] = pos;
    let (h, v) = match dir {
        CullDirection::Down => (x, z),
        CullDirection::Up => (z, x),
        CullDirection::South => (x, y),
        CullDirection::North => (y, x),
        CullDirection::East => (y, z),
        CullDirection::West => (z, y),
        CullDirection::None => (0.0, 0.0),
    };

    let ao = lerp(lerp(corners[2], corners[0], v), lerp(corners[3], corners[1], v), h);
    lerp(ao, 1.0, light / 15.0)
}
