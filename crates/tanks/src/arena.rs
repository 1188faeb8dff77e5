//! Entity store and spatial queries over a hecs world.
//!
//! Every entity carries a `Name`, an `EntityKind` tag, a `Body` and exactly one
//! behaviour component (`Tank`, `Shell` or `AmmoCrate`). Kind-specific access goes
//! through typed lookups, so an id of the wrong kind simply resolves to `None`.

use engine_core::{Body, Name, Transform};
use glam::Vec3;
use hecs::{Component, Entity, World};

use crate::ammo::AmmoCrate;
use crate::shell::Shell;
use crate::tank::Tank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tank,
    Shell,
    AmmoCrate,
}

/// Snapshot of a live entity returned by enumeration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityView {
    pub id: Entity,
    pub kind: EntityKind,
    pub position: Vec3,
    pub transform: Transform,
}

/// Snapshot of the tank fields other entities are allowed to read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankInfo {
    pub id: Entity,
    pub team: u32,
    pub hp: i32,
    pub shell_damage: i32,
    pub last_attacker: Option<Entity>,
    pub position: Vec3,
}

impl TankInfo {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

#[derive(Default)]
pub struct Arena {
    world: World,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_tank(&mut self, name: Name, tank: Tank, body: Body) -> Entity {
        self.world.spawn((name, EntityKind::Tank, tank, body))
    }

    pub fn spawn_shell(&mut self, shell: Shell, body: Body) -> Entity {
        self.world.spawn((Name::new("Shell"), EntityKind::Shell, shell, body))
    }

    pub fn spawn_ammo(&mut self, ammo: AmmoCrate, body: Body) -> Entity {
        self.world.spawn((Name::new("Ammo"), EntityKind::AmmoCrate, ammo, body))
    }

    pub fn despawn(&mut self, id: Entity) -> bool {
        self.world.despawn(id).is_ok()
    }

    pub fn kind(&self, id: Entity) -> Option<EntityKind> {
        self.world.get::<&EntityKind>(id).ok().map(|kind| *kind)
    }

    pub fn name(&self, id: Entity) -> Option<String> {
        self.world.get::<&Name>(id).ok().map(|name| name.0.clone())
    }

    /// All ids in a stable (ascending) order.
    pub fn ids(&self) -> Vec<Entity> {
        let mut ids: Vec<Entity> = self.world.iter().map(|entity| entity.entity()).collect();
        ids.sort_by_key(|id| id.to_bits());
        ids
    }

    /// Live entities matching the filters, in ascending id order.
    /// Reflects the world at call time; call again to restart.
    pub fn enumerate(&self, kind: Option<EntityKind>, name: Option<&str>) -> Vec<EntityView> {
        let mut views: Vec<EntityView> = self
            .world
            .query::<(&EntityKind, &Name, &Body)>()
            .iter()
            .filter(|(_, (k, n, _))| kind.map_or(true, |want| **k == want) && name.map_or(true, |want| n.0 == want))
            .map(|(id, (k, _, body))| EntityView {
                id,
                kind: *k,
                position: body.position(),
                transform: body.root,
            })
            .collect();
        views.sort_by_key(|view| view.id.to_bits());
        views
    }

    pub fn lookup(&self, id: Entity) -> Option<EntityView> {
        let kind = *self.world.get::<&EntityKind>(id).ok()?;
        let body = self.world.get::<&Body>(id).ok()?;
        Some(EntityView {
            id,
            kind,
            position: body.position(),
            transform: body.root,
        })
    }

    pub fn tank_info(&self, id: Entity) -> Option<TankInfo> {
        let tank = self.world.get::<&Tank>(id).ok()?;
        let body = self.world.get::<&Body>(id).ok()?;
        Some(info_of(id, &tank, &body))
    }

    /// Every tank in ascending id order (alive or wrecked).
    pub fn tanks(&self) -> Vec<TankInfo> {
        let mut tanks: Vec<TankInfo> = self
            .world
            .query::<(&Tank, &Body)>()
            .iter()
            .map(|(id, (tank, body))| info_of(id, tank, body))
            .collect();
        tanks.sort_by_key(|info| info.id.to_bits());
        tanks
    }

    pub fn tank(&self, id: Entity) -> Option<hecs::Ref<'_, Tank>> {
        self.world.get::<&Tank>(id).ok()
    }

    pub fn body(&self, id: Entity) -> Option<hecs::Ref<'_, Body>> {
        self.world.get::<&Body>(id).ok()
    }

    /// Run `f` against a tank; `None` if the id is gone or not a tank.
    pub fn with_tank_mut<R>(&mut self, id: Entity, f: impl FnOnce(&mut Tank) -> R) -> Option<R> {
        let mut tank = self.world.get::<&mut Tank>(id).ok()?;
        Some(f(&mut tank))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.world
            .query::<&EntityKind>()
            .iter()
            .filter(|(_, k)| **k == kind)
            .count()
    }

    /// Take an entity's behaviour and body out of the world for its own update.
    /// While detached the entity is invisible to enumeration and typed lookups.
    pub(crate) fn detach<T: Component>(&mut self, id: Entity) -> Option<(T, Body)> {
        self.world.remove::<(T, Body)>(id).ok()
    }

    pub(crate) fn attach<T: Component>(&mut self, id: Entity, behaviour: T, body: Body) {
        if self.world.insert(id, (behaviour, body)).is_err() {
            log::warn!("Entity {:?} vanished during its own update", id);
        }
    }
}

fn info_of(id: Entity, tank: &Tank, body: &Body) -> TankInfo {
    TankInfo {
        id,
        team: tank.team(),
        hp: tank.hp(),
        shell_damage: tank.shell_damage(),
        last_attacker: tank.last_attacker(),
        position: body.position(),
    }
}
