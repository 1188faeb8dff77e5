//! Shells: fly straight, hit the first tank in range, expire after a fixed lifetime.

use engine_core::{Body, Lifetime, Transform};
use glam::Vec3;
use hecs::Entity;

use crate::context::FrameContext;
use crate::message::MessageKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shell {
    shooter: Entity,
    lifetime: Lifetime,
}

impl Shell {
    pub fn new(shooter: Entity, lifetime: f32) -> Self {
        Self {
            shooter,
            lifetime: Lifetime::new(lifetime),
        }
    }

    pub fn body(position: Vec3, facing: Vec3) -> Body {
        let mut transform = Transform::from_position(position);
        transform.face_direction(facing);
        Body::new(transform)
    }

    /// Move, then check for a hit. Returns false once the shell should be removed.
    pub fn update(&mut self, body: &mut Body, dt: f32, ctx: &mut FrameContext<'_>) -> bool {
        body.root.move_local_z(ctx.config.shell.speed * dt);
        let expired = self.lifetime.update(dt);

        if let Some(victim) = self.find_victim(body.position(), ctx) {
            let shooter = self.shooter;
            log::debug!("Shell from {:?} hit {:?}", shooter, victim);
            ctx.send(victim, MessageKind::Hit, shooter);
            ctx.arena.with_tank_mut(victim, |tank| tank.notify_hit(shooter));
            return false;
        }
        !expired
    }

    /// First tank in enumeration order within the hit radius, never the firer.
    fn find_victim(&self, position: Vec3, ctx: &FrameContext<'_>) -> Option<Entity> {
        let rules = &ctx.config.shell;
        let shooter_team = if rules.friendly_fire {
            None
        } else {
            ctx.arena.tank_info(self.shooter).map(|info| info.team)
        };
        ctx.arena
            .tanks()
            .into_iter()
            .filter(|tank| tank.id != self.shooter)
            .filter(|tank| shooter_team.map_or(true, |team| tank.team != team))
            .find(|tank| tank.position.distance(position) < rules.hit_radius)
            .map(|tank| tank.id)
    }
}
