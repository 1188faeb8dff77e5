//! Per-update access handed to every entity behaviour.

use glam::Vec3;
use hecs::Entity;
use rand::rngs::StdRng;

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::message::{Message, MessageKind, Messenger};

/// Entities requested during an update pass; spawned once the pass is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnRequest {
    Shell {
        shooter: Entity,
        position: Vec3,
        facing: Vec3,
    },
    AmmoCrate {
        position: Vec3,
    },
}

pub struct FrameContext<'a> {
    pub arena: &'a mut Arena,
    pub messenger: &'a mut Messenger,
    pub rng: &'a mut StdRng,
    pub config: &'a ArenaConfig,
    pub spawns: &'a mut Vec<SpawnRequest>,
}

impl FrameContext<'_> {
    pub fn send(&mut self, to: Entity, kind: MessageKind, from: Entity) {
        self.messenger.send(to, Message::new(kind, from));
    }
}
