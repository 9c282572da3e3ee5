//! Transform types for block and element rotations.

use super::Axis;

/// Placement rotation of a blockstate variant.
///
/// `z_steps` comes from the wrapper's `x` field and turns the model about
/// the east-west axis, `y_steps` comes from `y` and turns it about the
/// vertical axis. The X turn is applied first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Orientation {
    /// Quarter turns about the east-west axis, 0..=3.
    pub z_steps: u8,
    /// Quarter turns about the vertical axis, 0..=3.
    pub y_steps: u8,
    /// If true, textures stay fixed in world space while the model turns.
    pub uvlock: bool,
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation {
        z_steps: 0,
        y_steps: 0,
        uvlock: false,
    };

    pub fn new(z_steps: u8, y_steps: u8, uvlock: bool) -> Self {
        Self {
            z_steps: z_steps % 4,
            y_steps: y_steps % 4,
            uvlock,
        }
    }

    /// Build from blockstate degrees. Only 90, 180 and 270 count as turns.
    pub fn from_degrees(x: i64, y: i64, uvlock: bool) -> Self {
        Self::new(degrees_to_steps(x), degrees_to_steps(y), uvlock)
    }

    /// Check if this is an identity transform (no rotation).
    pub fn is_identity(&self) -> bool {
        self.z_steps == 0 && self.y_steps == 0
    }

    /// Rigidly rotate a point of the unit cube about its center.
    ///
    /// Quarter turns are pure coordinate swaps, so the result is exact.
    pub fn rotate_point(&self, p: [f32; 3]) -> [f32; 3] {
        let [mut x, mut y, mut z] = p;
        for _ in 0..self.z_steps {
            (y, z) = (z, 1.0 - y);
        }
        for _ in 0..self.y_steps {
            (x, z) = (1.0 - z, x);
        }
        [x, y, z]
    }
}

fn degrees_to_steps(degrees: i64) -> u8 {
    match degrees {
        90 => 1,
        180 => 2,
        270 => 3,
        _ => 0,
    }
}

/// Element-level rotation from a model element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementRotation {
    /// One angle about one axis.
    Single {
        /// Pivot in 0-16 model units.
        origin: [f32; 3],
        axis: Axis,
        /// Angle in degrees.
        angle: f32,
        rescale: bool,
    },
    /// Angles about X, Y and Z applied in that order.
    Compound {
        origin: [f32; 3],
        angles: [f32; 3],
        rescale: bool,
    },
}

impl ElementRotation {
    /// Pivot converted to unit-cube coordinates.
    pub fn normalized_origin(&self) -> [f32; 3] {
        let origin = match self {
            ElementRotation::Single { origin, .. } | ElementRotation::Compound { origin, .. } => {
                origin
            }
        };
        [origin[0] / 16.0, origin[1] / 16.0, origin[2] / 16.0]
    }

    pub fn rescale(&self) -> bool {
        match self {
            ElementRotation::Single { rescale, .. } | ElementRotation::Compound { rescale, .. } => {
                *rescale
            }
        }
    }

    /// The rotation as a sequence of single-axis turns in radians, zero
    /// angles dropped.
    pub fn axis_steps(&self) -> Vec<(Axis, f32)> {
        match *self {
            ElementRotation::Single { axis, angle, .. } => {
                if angle == 0.0 {
                    Vec::new()
                } else {
                    vec![(axis, angle.to_radians())]
                }
            }
            ElementRotation::Compound { angles, .. } => [Axis::X, Axis::Y, Axis::Z]
                .into_iter()
                .zip(angles)
                .filter(|(_, angle)| *angle != 0.0)
                .map(|(axis, angle)| (axis, angle.to_radians()))
                .collect(),
        }
    }
}

/// Scale applied to the axes orthogonal to a rotation when rescaling.
pub fn rescale_factor(angle_radians: f32) -> f32 {
    1.0 / angle_radians.cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_degrees() {
        let o = Orientation::from_degrees(90, 270, true);
        assert_eq!(o.z_steps, 1);
        assert_eq!(o.y_steps, 3);
        assert!(o.uvlock);
        assert!(Orientation::from_degrees(45, 360, false).is_identity());
    }

    #[test]
    fn test_rotate_point_y_moves_north_to_east() {
        let o = Orientation::new(0, 1, false);
        assert_eq!(o.rotate_point([0.5, 0.5, 0.0]), [1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_rotate_point_x_moves_up_to_north() {
        let o = Orientation::new(1, 0, false);
        assert_eq!(o.rotate_point([0.5, 1.0, 0.5]), [0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_four_turns_is_identity() {
        let p = [0.125, 0.25, 0.875];
        let mut q = p;
        let o = Orientation::new(1, 1, false);
        for _ in 0..4 {
            q = Orientation::new(0, 1, false).rotate_point(q);
        }
        assert_eq!(q, p);
        assert_ne!(o.rotate_point(p), p);
    }

    #[test]
    fn test_compound_axis_steps_skip_zero() {
        let rot = ElementRotation::Compound {
            origin: [8.0, 8.0, 8.0],
            angles: [0.0, 45.0, 0.0],
            rescale: false,
        };
        let steps = rot.axis_steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].0, Axis::Y);
        assert_eq!(rot.normalized_origin(), [0.5, 0.5, 0.5]);
    }
}
