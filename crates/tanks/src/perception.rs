//! Facing, angle and line-of-sight helpers shared by every behaviour.

use engine_core::Transform;
use glam::{Mat4, Vec2, Vec3};

use crate::config::House;

/// Which way to yaw to bring a direction toward the facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Multiplier for a positive turn rate.
    pub fn sign(self) -> f32 {
        match self {
            TurnDirection::Left => -1.0,
            TurnDirection::Right => 1.0,
        }
    }
}

/// Outcome of comparing a facing against a desired direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    /// Close enough to snap straight onto the direction.
    Aligned,
    Turn(TurnDirection),
}

/// Unit facing and rightward vectors of a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facing {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Facing {
    /// Read the basis columns of a world matrix (+Z forward, +X right).
    pub fn from_matrix(matrix: &Mat4) -> Self {
        Self {
            forward: matrix.z_axis.truncate().normalize_or_zero(),
            right: matrix.x_axis.truncate().normalize_or_zero(),
        }
    }

    pub fn from_transform(transform: &Transform) -> Self {
        Self::from_matrix(&transform.to_matrix())
    }

    /// Angle in degrees between the facing and `direction`.
    pub fn angle_to(&self, direction: Vec3) -> f32 {
        angle_between_degrees(self.forward, direction)
    }

    pub fn turn_toward(&self, direction: Vec3) -> TurnDirection {
        turn_direction(self.right, direction)
    }

    /// Snap when within `snap_degrees`, otherwise turn toward `direction`.
    pub fn steer(&self, direction: Vec3, snap_degrees: f32) -> Steer {
        if self.angle_to(direction) < snap_degrees {
            Steer::Aligned
        } else {
            Steer::Turn(self.turn_toward(direction))
        }
    }
}

/// `acos(a . b)` in degrees for unit vectors, always within [0, 180].
pub fn angle_between_degrees(a: Vec3, b: Vec3) -> f32 {
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Right when the target lies on the rightward side, left otherwise.
pub fn turn_direction(right: Vec3, direction: Vec3) -> TurnDirection {
    if right.dot(direction) > 0.0 {
        TurnDirection::Right
    } else {
        TurnDirection::Left
    }
}

/// Unit direction from `from` to `to` on the ground plane (zero if coincident).
pub fn flat_direction(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero()
}

/// Horizontal distance between two points.
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

impl House {
    /// True when the ground-plane segment `from`..`to` crosses any of the four walls.
    pub fn blocks(&self, from: Vec3, to: Vec3) -> bool {
        let p = Vec2::new(from.x, from.z);
        let d = Vec2::new(to.x, to.z) - p;
        crosses_wall(p.x, p.y, d.x, d.y, self.min.x, self.min.y, self.max.y)
            || crosses_wall(p.x, p.y, d.x, d.y, self.max.x, self.min.y, self.max.y)
            || crosses_wall(p.y, p.x, d.y, d.x, self.min.y, self.min.x, self.max.x)
            || crosses_wall(p.y, p.x, d.y, d.x, self.max.y, self.min.x, self.max.x)
    }
}

/// Segment `p + d*s`, s in [0, 1], against the wall `u = wall`, `v` in [v_min, v_max].
fn crosses_wall(pu: f32, pv: f32, du: f32, dv: f32, wall: f32, v_min: f32, v_max: f32) -> bool {
    if du.abs() < 1e-6 {
        return false;
    }
    let s = (wall - pu) / du;
    if !(0.0..=1.0).contains(&s) {
        return false;
    }
    let v = pv + dv * s;
    v >= v_min && v <= v_max
}

/// Clear sight between two points past every house.
pub fn line_of_sight(houses: &[House], from: Vec3, to: Vec3) -> bool {
    !houses.iter().any(|house| house.blocks(from, to))
}
