//! Orientation lookup tables.
//!
//! A blockstate variant can place one model in 16 (z, y) quarter-turn
//! combinations. Two tables are derived here, once per process:
//!
//! - where each authored face direction ends up (the cull remap), and
//! - how many extra quarter turns a face's texture area needs so that a
//!   uv-locked texture stays put in world space.

use super::{CullDirection, Direction, Orientation};
use std::sync::OnceLock;

/// Remapped cull direction per orientation, indexed `[z][y][bucket]`.
type CullTable = [[[CullDirection; 7]; 4]; 4];

/// Extra UV area rotation per orientation, indexed `[z][y][face]`.
type UvLockTable = [[[u8; 6]; 4]; 4];

static CULL_TABLE: OnceLock<CullTable> = OnceLock::new();
static UV_LOCK_TABLE: OnceLock<UvLockTable> = OnceLock::new();

/// Where a face pointing `dir` ends up after the orientation is applied.
/// `None` is orientation-invariant.
pub fn remap_cull(orientation: Orientation, dir: CullDirection) -> CullDirection {
    let table = CULL_TABLE.get_or_init(build_cull_table);
    table[orientation.z_steps as usize % 4][orientation.y_steps as usize % 4][dir.index()]
}

/// Extra quarter turns of texture area for a face, honoring the lock flag.
///
/// Returns 0 unless the orientation requests uv lock and actually rotates.
pub fn uv_lock_rotation(orientation: Orientation, face: Direction) -> u8 {
    if !orientation.uvlock || orientation.is_identity() {
        return 0;
    }
    let table = UV_LOCK_TABLE.get_or_init(build_uv_lock_table);
    table[orientation.z_steps as usize % 4][orientation.y_steps as usize % 4][face_slot(face)]
}

fn face_slot(face: Direction) -> usize {
    match face {
        Direction::Down => 0,
        Direction::Up => 1,
        Direction::North => 2,
        Direction::South => 3,
        Direction::West => 4,
        Direction::East => 5,
    }
}

fn rotate_cycle<const N: usize>(cycle: [CullDirection; N], steps: usize) -> [CullDirection; N] {
    let mut rotated = cycle;
    for (i, slot) in rotated.iter_mut().enumerate() {
        *slot = cycle[(i + steps) % N];
    }
    rotated
}

fn apply_cycle(from: &[CullDirection; 4], to: &[CullDirection; 4], dir: CullDirection) -> CullDirection {
    from.iter()
        .position(|d| *d == dir)
        .map(|i| to[i])
        .unwrap_or(dir)
}

fn build_cull_table() -> CullTable {
    use CullDirection::*;

    let horizontal = [North, East, South, West];
    let mut table = [[[None; 7]; 4]; 4];

    for y in 0..4 {
        let horizontal_rotated = rotate_cycle(horizontal, y);
        // Turning about the east-west axis once the horizontal ring moved.
        let vertical = [horizontal_rotated[0], Down, horizontal_rotated[2], Up];

        for z in 0..4 {
            let vertical_rotated = rotate_cycle(vertical, z);

            for dir in CullDirection::ALL {
                let after_y = apply_cycle(&horizontal, &horizontal_rotated, dir);
                table[z][y][dir.index()] = apply_cycle(&vertical, &vertical_rotated, after_y);
            }
        }
    }

    table
}

fn build_uv_lock_table() -> UvLockTable {
    let mut table = [[[0u8; 6]; 4]; 4];

    for y in 0..4i32 {
        for z in 0..4 {
            // Rotation the mesh turn currently applies to each face's texture.
            let mut local = [0i32; 6];
            let mut set = |face: Direction, value: i32| local[face_slot(face)] = value;

            match z {
                0 => {
                    set(Direction::Up, y);
                    set(Direction::Down, -y);
                }
                1 => {
                    set(Direction::Up, 2);
                    set(Direction::Down, 0);
                    set(Direction::West, -1);
                    set(Direction::East, 1);
                    set(Direction::South, y);
                    set(Direction::North, -y + 2);
                }
                2 => {
                    set(Direction::Up, -y);
                    set(Direction::Down, y);
                    set(Direction::West, 2);
                    set(Direction::East, 2);
                    set(Direction::South, 2);
                    set(Direction::North, 2);
                }
                _ => {
                    set(Direction::Up, 0);
                    set(Direction::Down, 2);
                    set(Direction::West, 1);
                    set(Direction::East, -1);
                    set(Direction::South, -y);
                    set(Direction::North, y + 2);
                }
            }

            for (slot, raw) in local.iter().enumerate() {
                // Cancel the turn; raw is in -3..=5 so the sum stays positive.
                table[z][y as usize][slot] = ((8 - raw) % 4) as u8;
            }
        }
    }

    table
}
