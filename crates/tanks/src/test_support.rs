//! Shared fixture for driving single entities outside a full simulation.

use engine_core::Name;
use glam::Vec3;
use hecs::Entity;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::context::{FrameContext, SpawnRequest};
use crate::message::{Message, MessageKind, Messenger};
use crate::tank::Tank;

pub(crate) struct Harness {
    pub arena: Arena,
    pub messenger: Messenger,
    pub rng: StdRng,
    pub config: ArenaConfig,
    pub spawns: Vec<SpawnRequest>,
}

impl Harness {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            arena: Arena::new(),
            messenger: Messenger::new(),
            rng: StdRng::seed_from_u64(3),
            config,
            spawns: Vec::new(),
        }
    }

    /// Spawn a tank from the first template, facing +Z.
    pub fn tank(&mut self, team: u32, position: Vec3) -> Entity {
        let template = Arc::new(self.config.tank_templates[0].clone());
        let route: Arc<[Vec3]> = self.config.patrol_route(team).unwrap_or(&[]).into();
        let tank = Tank::new(template, team, route);
        let body = Tank::body(position, 0.0, &self.config.tank);
        self.arena.spawn_tank(Name::new("T"), tank, body)
    }

    pub fn send(&mut self, to: Entity, kind: MessageKind, from: Entity) {
        self.messenger.send(to, Message::new(kind, from));
    }

    pub fn ctx(&mut self) -> FrameContext<'_> {
        FrameContext {
            arena: &mut self.arena,
            messenger: &mut self.messenger,
            rng: &mut self.rng,
            config: &self.config,
            spawns: &mut self.spawns,
        }
    }

    /// Run one tank update in place.
    pub fn update(&mut self, id: Entity, dt: f32) {
        let (mut tank, mut body) = self.arena.detach::<Tank>(id).unwrap();
        tank.update(id, &mut body, dt, &mut self.ctx());
        self.arena.attach(id, tank, body);
    }

    /// Owned snapshot of a tank's state.
    pub fn tank_ref(&self, id: Entity) -> Tank {
        self.arena.tank(id).map(|tank| Tank::clone(&tank)).unwrap()
    }
}
