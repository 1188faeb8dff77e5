//! Transform component and utilities for spatial positioning.
//!
//! Entities face along their local +Z axis with +X to their right and +Y up.
//! A positive yaw turns the facing toward the rightward vector.

use glam::{Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform at `position` turned `yaw` radians about Y.
    pub fn from_position_yaw(position: Vec3, yaw: f32) -> Self {
        Self::from_position_rotation(position, Quat::from_rotation_y(yaw))
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Facing direction (local +Z).
    pub fn facing(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Rightward direction (local +X).
    pub fn rightward(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Move along world Y.
    pub fn move_y(&mut self, distance: f32) {
        self.position.y += distance;
    }

    /// Move along the local facing axis.
    pub fn move_local_z(&mut self, distance: f32) {
        self.position += self.facing() * distance;
    }

    /// Move along the local rightward axis.
    pub fn move_local_x(&mut self, distance: f32) {
        self.position += self.rightward() * distance;
    }

    /// Rotate around the local Y axis (yaw).
    pub fn rotate_local_y(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_y(angle)).normalize();
    }

    /// Rotate around the local Z axis (roll).
    pub fn rotate_local_z(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_z(angle)).normalize();
    }

    /// Turn to face `direction`, projected onto the ground plane.
    /// Leaves the rotation untouched for a vertical or zero direction.
    pub fn face_direction(&mut self, direction: Vec3) {
        let flat = Vec3::new(direction.x, 0.0, direction.z);
        if flat.length_squared() > 1e-8 {
            self.rotation = Quat::from_rotation_y(flat.x.atan2(flat.z));
        }
    }

    /// Turn to face a world-space point on the ground plane.
    pub fn face_target(&mut self, target: Vec3) {
        self.face_direction(target - self.position);
    }
}
