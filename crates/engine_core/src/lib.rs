//! Core engine types and utilities for the tank arena.
//!
//! This crate provides the foundational types used by the behaviour layer:
//! - Transforms and parent-relative part hierarchies (hull, turret)
//! - Time management
//! - Common component types for ECS

pub mod components;
pub mod hierarchy;
pub mod time;
pub mod transform;

pub use components::*;
pub use hierarchy::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3};
pub use hecs::{Entity, World};
