//! Parent-relative part hierarchies (e.g. a turret mounted on a hull).
//!
//! Only local transforms are stored. World matrices are rebuilt from the
//! locals and the parent links every time they are requested.

use glam::Mat4;
use thiserror::Error;

use crate::Transform;

/// Errors raised while building a hierarchy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("part parent index {parent} is out of range ({count} parts)")]
    InvalidParent { parent: usize, count: usize },
}

/// A part attached to the root or to an earlier part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    /// Index of the parent part, or `None` when attached to the root.
    pub parent: Option<usize>,
    /// Transform relative to the parent.
    pub local: Transform,
}

/// Root transform plus attached parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub root: Transform,
    parts: Vec<Part>,
}

impl Body {
    pub fn new(root: Transform) -> Self {
        Self {
            root,
            parts: Vec::new(),
        }
    }

    /// Attach a part. Parents must be added before their children, which keeps
    /// world matrix evaluation a single forward pass.
    pub fn attach(&mut self, parent: Option<usize>, local: Transform) -> Result<usize, HierarchyError> {
        if let Some(parent) = parent {
            if parent >= self.parts.len() {
                return Err(HierarchyError::InvalidParent {
                    parent,
                    count: self.parts.len(),
                });
            }
        }
        self.parts.push(Part { parent, local });
        Ok(self.parts.len() - 1)
    }

    /// Attach a part directly to the root.
    pub fn attach_to_root(&mut self, local: Transform) -> usize {
        self.parts.push(Part { parent: None, local });
        self.parts.len() - 1
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn local(&self, part: usize) -> Option<&Transform> {
        self.parts.get(part).map(|p| &p.local)
    }

    pub fn local_mut(&mut self, part: usize) -> Option<&mut Transform> {
        self.parts.get_mut(part).map(|p| &mut p.local)
    }

    /// World position of the root.
    pub fn position(&self) -> glam::Vec3 {
        self.root.position
    }

    /// World matrix of one part, walking up its parent chain.
    pub fn world_matrix(&self, part: usize) -> Option<Mat4> {
        let mut matrix = self.parts.get(part)?.local.to_matrix();
        let mut parent = self.parts[part].parent;
        while let Some(index) = parent {
            matrix = self.parts[index].local.to_matrix() * matrix;
            parent = self.parts[index].parent;
        }
        Some(self.root.to_matrix() * matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn child_inherits_root_yaw() {
        let mut body = Body::new(Transform::from_position_yaw(
            Vec3::new(5.0, 0.0, 0.0),
            std::f32::consts::FRAC_PI_2,
        ));
        let turret = body
            .attach(None, Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        let world = body.world_matrix(turret).unwrap();
        let facing = world.z_axis.truncate().normalize();
        assert!((facing - Vec3::X).length() < 1e-4);
        assert!((world.w_axis.truncate() - Vec3::new(5.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn attach_rejects_unknown_parent() {
        let mut body = Body::default();
        assert_eq!(
            body.attach(Some(2), Transform::default()),
            Err(HierarchyError::InvalidParent { parent: 2, count: 0 })
        );
    }
}
