//! Ammo crates: fall to the ground, advertise themselves, restock whoever drives over them.

use engine_core::{Body, Transform};
use glam::Vec3;
use hecs::Entity;

use crate::context::FrameContext;
use crate::message::MessageKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmmoCrate {
    grounded: bool,
}

impl AmmoCrate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(position: Vec3) -> Body {
        Body::new(Transform::from_position(position))
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Returns false once a tank has claimed the crate.
    pub fn update(&mut self, me: Entity, body: &mut Body, dt: f32, ctx: &mut FrameContext<'_>) -> bool {
        let config = ctx.config;
        let rules = &config.ammo;
        let root = &mut body.root;

        if root.position.y > rules.ground_level {
            root.move_y(-rules.fall_speed * dt);
            root.position.y = root.position.y.max(rules.ground_level);
        } else {
            if !self.grounded {
                log::debug!("Ammo crate {:?} landed at {:?}", me, root.position);
                self.grounded = true;
            }
            for tank in ctx.arena.tanks() {
                ctx.send(tank.id, MessageKind::AmmoAvailable, me);
            }
        }

        let position = body.position();
        let claimant = ctx
            .arena
            .tanks()
            .into_iter()
            .find(|tank| tank.position.distance(position) < rules.claim_radius)
            .map(|tank| tank.id);

        match claimant {
            Some(tank) => {
                let amount = rules.restock_amount;
                ctx.arena.with_tank_mut(tank, |t| t.restock(amount));
                log::info!("Tank {:?} picked up {} shells", tank, amount);
                false
            }
            None => true,
        }
    }
}
