//! Frame driver: owns the arena, the messenger and the random source, and runs
//! every entity's update once per tick.
//!
//! Entities are updated in ascending id order. Removals and spawns requested
//! during a pass are applied only after the pass has finished.

use engine_core::{Body, Name};
use glam::Vec3;
use hecs::{Component, Entity};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::ammo::AmmoCrate;
use crate::arena::{Arena, EntityKind};
use crate::config::{ArenaConfig, ConfigError, TankSpawn, TankTemplate};
use crate::context::{FrameContext, SpawnRequest};
use crate::dropper::AmmoDropper;
use crate::message::{Message, MessageKind, Messenger, SYSTEM_SENDER};
use crate::shell::Shell;
use crate::status::TankStatus;
use crate::tank::Tank;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("unknown tank template {0:?}")]
    UnknownTemplate(String),
    #[error("team {0} has no patrol route")]
    NoRoute(u32),
}

/// What changed in the world during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub destroyed: Vec<Entity>,
    pub spawned: Vec<Entity>,
}

pub struct Simulation {
    config: ArenaConfig,
    templates: HashMap<String, Arc<TankTemplate>>,
    routes: Vec<Arc<[Vec3]>>,
    arena: Arena,
    messenger: Messenger,
    rng: StdRng,
    pending: Vec<SpawnRequest>,
    dropper: AmmoDropper,
    elapsed: f32,
    frames: u64,
}

impl Simulation {
    /// Validate `config` and place its tanks. Nothing moves until `start_all`.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let templates = config
            .tank_templates
            .iter()
            .map(|t| (t.name.clone(), Arc::new(t.clone())))
            .collect();
        let routes = config
            .patrol_routes
            .iter()
            .map(|route| Arc::from(route.as_slice()))
            .collect();

        let mut sim = Self {
            rng: StdRng::seed_from_u64(config.seed),
            templates,
            routes,
            arena: Arena::new(),
            messenger: Messenger::new(),
            pending: Vec::new(),
            dropper: AmmoDropper::new(),
            elapsed: 0.0,
            frames: 0,
            config,
        };
        for spawn in sim.config.tanks.clone() {
            sim.spawn_tank(&spawn)?;
        }
        Ok(sim)
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn messenger(&self) -> &Messenger {
        &self.messenger
    }

    /// Simulated seconds since creation.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn spawn_tank(&mut self, spawn: &TankSpawn) -> Result<Entity, SpawnError> {
        let template = self
            .templates
            .get(&spawn.template)
            .cloned()
            .ok_or_else(|| SpawnError::UnknownTemplate(spawn.template.clone()))?;
        let route = self
            .routes
            .get(spawn.team as usize)
            .filter(|route| !route.is_empty())
            .cloned()
            .ok_or(SpawnError::NoRoute(spawn.team))?;

        let body = Tank::body(spawn.position, spawn.yaw_degrees.to_radians(), &self.config.tank);
        let id = self
            .arena
            .spawn_tank(Name::new(spawn.name.as_str()), Tank::new(template, spawn.team, route), body);
        log::info!("Spawned {} ({}) for team {}", spawn.name, spawn.template, spawn.team);
        Ok(id)
    }

    pub fn spawn_shell(&mut self, shooter: Entity, position: Vec3, facing: Vec3) -> Entity {
        let shell = Shell::new(shooter, self.config.shell.lifetime);
        self.arena.spawn_shell(shell, Shell::body(position, facing))
    }

    pub fn spawn_ammo(&mut self, position: Vec3) -> Entity {
        log::info!("Ammo crate dropped at ({:.1}, {:.1})", position.x, position.z);
        self.arena.spawn_ammo(AmmoCrate::new(), AmmoCrate::body(position))
    }

    pub fn send(&mut self, to: Entity, kind: MessageKind, from: Entity) {
        self.messenger.send(to, Message::new(kind, from));
    }

    /// Order every tank to begin patrolling.
    pub fn start_all(&mut self) {
        self.broadcast_to_tanks(MessageKind::Start);
    }

    pub fn stop_all(&mut self) {
        self.broadcast_to_tanks(MessageKind::Stop);
    }

    fn broadcast_to_tanks(&mut self, kind: MessageKind) {
        for tank in self.arena.tanks() {
            self.messenger.send(tank.id, Message::new(kind, SYSTEM_SENDER));
        }
    }

    /// Advance the world by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();

        for id in self.arena.ids() {
            let keep = match self.arena.kind(id) {
                Some(EntityKind::Tank) => self.step::<Tank>(id, |tank, body, ctx| tank.update(id, body, dt, ctx)),
                Some(EntityKind::Shell) => self.step::<Shell>(id, |shell, body, ctx| shell.update(body, dt, ctx)),
                Some(EntityKind::AmmoCrate) => {
                    self.step::<AmmoCrate>(id, |ammo, body, ctx| ammo.update(id, body, dt, ctx))
                }
                None => true,
            };
            if !keep {
                report.destroyed.push(id);
            }
        }

        for &id in &report.destroyed {
            self.arena.despawn(id);
            self.messenger.discard(id);
        }

        let live_crates = self.arena.count(EntityKind::AmmoCrate);
        if let Some(position) = self.dropper.update(dt, &self.config.ammo, live_crates, &mut self.rng) {
            self.pending.push(SpawnRequest::AmmoCrate { position });
        }

        for request in std::mem::take(&mut self.pending) {
            let id = match request {
                SpawnRequest::Shell {
                    shooter,
                    position,
                    facing,
                } => self.spawn_shell(shooter, position, facing),
                SpawnRequest::AmmoCrate { position } => self.spawn_ammo(position),
            };
            report.spawned.push(id);
        }

        self.elapsed += dt;
        self.frames += 1;
        report
    }

    /// Tick with a fixed step until `seconds` of simulated time have passed.
    pub fn run_for(&mut self, seconds: f32, step: f32) -> u64 {
        if step <= 0.0 {
            return 0;
        }
        let ticks = (seconds / step).ceil() as u64;
        for _ in 0..ticks {
            self.tick(step);
        }
        ticks
    }

    /// Detach, update and reattach one entity. Returns false if it asked to be removed.
    fn step<T: Component>(
        &mut self,
        id: Entity,
        update: impl FnOnce(&mut T, &mut Body, &mut FrameContext<'_>) -> bool,
    ) -> bool {
        let Some((mut behaviour, mut body)) = self.arena.detach::<T>(id) else {
            return true;
        };
        let mut ctx = FrameContext {
            arena: &mut self.arena,
            messenger: &mut self.messenger,
            rng: &mut self.rng,
            config: &self.config,
            spawns: &mut self.pending,
        };
        let keep = update(&mut behaviour, &mut body, &mut ctx);
        self.arena.attach(id, behaviour, body);
        keep
    }

    pub fn tank_status(&self, id: Entity) -> Option<TankStatus> {
        let tank = self.arena.tank(id)?;
        let body = self.arena.body(id)?;
        Some(TankStatus {
            id,
            name: self.arena.name(id).unwrap_or_default(),
            template: tank.template().name.clone(),
            team: tank.team(),
            state: tank.state(),
            hp: tank.hp(),
            max_hp: tank.template().max_hp,
            ammo: tank.ammo(),
            shots_fired: tank.shots_fired(),
            speed: tank.speed(),
            position: body.position(),
            dead: tank.is_dead(),
        })
    }

    /// Every tank, ordered by team then id.
    pub fn scoreboard(&self) -> Vec<TankStatus> {
        let mut board: Vec<TankStatus> = self
            .arena
            .tanks()
            .into_iter()
            .filter_map(|info| self.tank_status(info.id))
            .collect();
        board.sort_by_key(|status| (status.team, status.id.to_bits()));
        board
    }

    /// Teams that still have a tank with HP left.
    pub fn surviving_teams(&self) -> Vec<u32> {
        self.arena
            .tanks()
            .into_iter()
            .filter(|info| info.is_alive())
            .map(|info| info.team)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tank::TankState;

    fn quiet_config() -> ArenaConfig {
        let mut config = ArenaConfig::default();
        config.ammo.drop_interval = 0.0;
        config
    }

    #[test]
    fn new_places_configured_tanks_inactive() {
        let sim = Simulation::new(quiet_config()).unwrap();
        let board = sim.scoreboard();
        assert_eq!(board.len(), 4);
        assert!(board.iter().all(|s| s.state == TankState::Inactive));
        assert_eq!(board[0].team, 0);
        assert_eq!(board[3].team, 1);
        assert_eq!(sim.surviving_teams(), vec![0, 1]);
    }

    #[test]
    fn start_all_puts_every_tank_on_patrol() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        sim.start_all();
        sim.tick(0.01);
        assert!(sim.scoreboard().iter().all(|s| s.state != TankState::Inactive));

        sim.stop_all();
        sim.tick(0.01);
        assert!(sim.scoreboard().iter().all(|s| s.state == TankState::Inactive));
    }

    #[test]
    fn unknown_template_is_a_spawn_error() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        let spawn = TankSpawn {
            name: "X".into(),
            template: "Paper Tiger".into(),
            team: 0,
            position: Vec3::ZERO,
            yaw_degrees: 0.0,
        };
        assert_eq!(
            sim.spawn_tank(&spawn),
            Err(SpawnError::UnknownTemplate("Paper Tiger".into()))
        );
    }

    #[test]
    fn team_without_route_is_a_spawn_error() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        let spawn = TankSpawn {
            name: "X".into(),
            template: "Rogue Scout".into(),
            team: 9,
            position: Vec3::ZERO,
            yaw_degrees: 0.0,
        };
        assert_eq!(sim.spawn_tank(&spawn), Err(SpawnError::NoRoute(9)));
    }

    #[test]
    fn expired_shell_is_removed_after_the_pass() {
        let mut config = quiet_config();
        config.tanks.clear();
        let mut sim = Simulation::new(config).unwrap();
        let shell = sim.spawn_shell(SYSTEM_SENDER, Vec3::new(0.0, 2.5, 0.0), Vec3::Z);

        let mut removed_at = None;
        for frame in 0..30 {
            if sim.tick(0.1).destroyed.contains(&shell) {
                removed_at = Some(frame);
                break;
            }
        }
        assert_eq!(removed_at, Some(19));
        assert!(sim.arena().lookup(shell).is_none());
    }

    #[test]
    fn dropper_spawns_crates_on_schedule() {
        let mut config = ArenaConfig::default();
        config.tanks.clear();
        config.ammo.drop_interval = 1.0;
        let mut sim = Simulation::new(config).unwrap();

        let spawned: usize = (0..10).map(|_| sim.tick(0.25).spawned.len()).sum();
        assert_eq!(spawned, 2);
        assert_eq!(sim.arena().count(EntityKind::AmmoCrate), 2);
    }

    #[test]
    fn run_for_counts_ticks() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        assert_eq!(sim.run_for(1.0, 0.25), 4);
        assert_eq!(sim.frames(), 4);
        assert!((sim.elapsed() - 1.0).abs() < 1e-6);
    }
}
