//! Tank behaviour: inbox handling, perception and the five-state controller.
//!
//! Each update drains the tank's inbox first, then latches death, then runs the
//! current state. All world reads go through the `FrameContext`; anything a tank
//! wants spawned (shells) is queued and created after the update pass.

use engine_core::{Body, Transform};
use glam::Vec3;
use hecs::Entity;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

use crate::arena::EntityKind;
use crate::config::{TankRules, TankTemplate};
use crate::context::{FrameContext, SpawnRequest};
use crate::message::{Message, MessageKind};
use crate::perception::{flat_direction, flat_distance, line_of_sight, Facing, Steer};

/// Part index of the turret within a tank's body.
pub const TURRET: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TankState {
    #[default]
    Inactive,
    Patrol,
    Aim,
    Evade,
    Hunting,
}

impl TankState {
    pub fn as_str(self) -> &'static str {
        match self {
            TankState::Inactive => "Inactive",
            TankState::Patrol => "Patrol",
            TankState::Aim => "Aim",
            TankState::Evade => "Evade",
            TankState::Hunting => "Hunting",
        }
    }
}

impl fmt::Display for TankState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Tank {
    template: Arc<TankTemplate>,
    route: Arc<[Vec3]>,
    team: u32,
    state: TankState,
    /// Seconds spent in the current state.
    timer: f32,
    speed: f32,
    hp: i32,
    ammo: u32,
    shots_fired: u32,
    waypoint: usize,
    destination: Vec3,
    target: Option<Entity>,
    ammo_target: Option<Entity>,
    last_attacker: Option<Entity>,
    help_requested_by: Option<Entity>,
    dead: bool,
    wreck_timer: f32,
    wreck_settled: bool,
}

impl Tank {
    pub fn new(template: Arc<TankTemplate>, team: u32, route: Arc<[Vec3]>) -> Self {
        let destination = route.first().copied().unwrap_or(Vec3::ZERO);
        Self {
            hp: template.max_hp,
            ammo: template.start_ammo,
            template,
            route,
            team,
            state: TankState::Inactive,
            timer: 0.0,
            speed: 0.0,
            shots_fired: 0,
            waypoint: 0,
            destination,
            target: None,
            ammo_target: None,
            last_attacker: None,
            help_requested_by: None,
            dead: false,
            wreck_timer: 0.0,
            wreck_settled: false,
        }
    }

    /// Hull at `position` facing `yaw` radians, with the turret centred on top.
    pub fn body(position: Vec3, yaw: f32, rules: &TankRules) -> Body {
        let mut body = Body::new(Transform::from_position_yaw(position, yaw));
        body.attach_to_root(Transform::from_position(rules.turret_mount));
        body
    }

    pub fn template(&self) -> &TankTemplate {
        &self.template
    }

    pub fn team(&self) -> u32 {
        self.team
    }

    pub fn state(&self) -> TankState {
        self.state
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    pub fn shell_damage(&self) -> i32 {
        self.template.shell_damage
    }

    pub fn waypoint(&self) -> usize {
        self.waypoint
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn last_attacker(&self) -> Option<Entity> {
        self.last_attacker
    }

    pub fn help_requested_by(&self) -> Option<Entity> {
        self.help_requested_by
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// True once the wreck has come to rest on the ground.
    pub fn is_wreck_settled(&self) -> bool {
        self.wreck_settled
    }

    /// Record who just shot us. Damage arrives separately with the Hit message.
    pub fn notify_hit(&mut self, shooter: Entity) {
        self.last_attacker = Some(shooter);
    }

    pub fn restock(&mut self, amount: u32) {
        self.ammo = self.ammo.saturating_add(amount);
    }

    /// Advance one frame. Tanks are never destroyed, so this always returns true.
    pub fn update(&mut self, me: Entity, body: &mut Body, dt: f32, ctx: &mut FrameContext<'_>) -> bool {
        while let Some(message) = ctx.messenger.fetch(me) {
            self.handle_message(me, message, ctx);
        }

        if self.hp <= 0 {
            self.wreck(me, body, dt, &ctx.config.tank);
        }

        match self.state {
            TankState::Inactive => self.speed = 0.0,
            TankState::Patrol => self.patrol(body, dt, ctx),
            TankState::Aim => self.aim(me, body, dt, ctx),
            TankState::Evade => self.evade(body, dt, ctx),
            TankState::Hunting => self.hunt(body, dt, ctx),
        }
        true
    }

    fn enter(&mut self, next: TankState) {
        if self.state != next {
            log::debug!("Tank state {} -> {}", self.state, next);
        }
        self.state = next;
        self.timer = 0.0;
    }

    fn handle_message(&mut self, me: Entity, message: Message, ctx: &mut FrameContext<'_>) {
        match message.kind {
            MessageKind::Start => {
                self.set_waypoint(0);
                self.enter(TankState::Patrol);
            }
            MessageKind::Stop => self.enter(TankState::Inactive),
            MessageKind::Hit => self.take_hit(me, message.from, ctx),
            MessageKind::Help => self.answer_help(me, message.from, ctx),
            MessageKind::AmmoAvailable => {
                self.ammo_target = Some(message.from);
                self.enter(TankState::Hunting);
            }
        }
    }

    fn take_hit(&mut self, me: Entity, shooter: Entity, ctx: &mut FrameContext<'_>) {
        let Some(attacker) = ctx.arena.tank_info(shooter) else {
            log::warn!("{:?} hit by {:?}, which is not a live tank; ignoring", me, shooter);
            return;
        };
        self.hp -= attacker.shell_damage;
        log::debug!("{:?} hit by {:?}, hp now {}", me, shooter, self.hp);

        if self.hp > 0 && attacker.team != self.team {
            for mate in ctx.arena.tanks() {
                if mate.team == self.team && mate.id != me {
                    ctx.send(mate.id, MessageKind::Help, me);
                }
            }
        }
    }

    fn answer_help(&mut self, me: Entity, caller: Entity, ctx: &mut FrameContext<'_>) {
        if !matches!(self.state, TankState::Patrol | TankState::Evade) {
            return;
        }
        self.help_requested_by = Some(caller);

        let Some(mate) = ctx.arena.tank_info(caller) else {
            return;
        };
        if mate.team != self.team || !mate.is_alive() {
            return;
        }
        if let Some(attacker) = mate.last_attacker.filter(|&attacker| attacker != me) {
            self.target = Some(attacker);
            self.enter(TankState::Aim);
        }
    }

    fn set_waypoint(&mut self, index: usize) {
        if let Some(point) = self.route.get(index) {
            self.waypoint = index;
            self.destination = *point;
        }
    }

    fn patrol(&mut self, body: &mut Body, dt: f32, ctx: &mut FrameContext<'_>) {
        let config = ctx.config;
        let rules = &config.tank;
        let speed = self.template.max_speed * rules.patrol_speed_factor;
        self.drive_towards(body, self.destination, speed, rules.patrol_snap_degrees, dt);

        if flat_distance(body.position(), self.destination) < rules.patrol_arrive_radius && !self.route.is_empty() {
            self.set_waypoint((self.waypoint + 1) % self.route.len());
        }

        // Sweep the turret while looking for targets
        let sweep = self.template.turret_turn_speed * rules.turret_sweep_factor * dt;
        if let Some(turret) = body.local_mut(TURRET) {
            turret.rotate_local_y(sweep);
        }

        if self.ammo == 0 {
            return;
        }
        if let Some(enemy) = self.acquire_target(body, ctx) {
            self.target = Some(enemy);
            self.enter(TankState::Aim);
        }
    }

    /// First enemy, in enumeration order, that is alive, inside the turret cone
    /// and not hidden behind a house.
    fn acquire_target(&self, body: &Body, ctx: &FrameContext<'_>) -> Option<Entity> {
        let turret = Facing::from_matrix(&body.world_matrix(TURRET)?);
        let origin = body.position();
        let cone = ctx.config.tank.turret_cone_degrees;
        ctx.arena
            .tanks()
            .into_iter()
            .filter(|other| other.team != self.team && other.is_alive())
            .find(|other| {
                turret.angle_to(flat_direction(origin, other.position)) < cone
                    && line_of_sight(&ctx.config.houses, origin, other.position)
            })
            .map(|other| other.id)
    }

    fn aim(&mut self, me: Entity, body: &mut Body, dt: f32, ctx: &mut FrameContext<'_>) {
        self.timer += dt;
        self.speed = 0.0;

        let Some(target) = self.target.and_then(|id| ctx.arena.tank_info(id)) else {
            log::debug!("{:?} lost its target", me);
            self.target = None;
            self.start_evading(body, ctx);
            return;
        };
        let Some(turret) = body.world_matrix(TURRET).map(|m| Facing::from_matrix(&m)) else {
            return;
        };

        if self.timer >= ctx.config.tank.aim_dwell {
            self.fire(me, body, turret.forward, ctx);
            self.start_evading(body, ctx);
            return;
        }

        let direction = flat_direction(body.position(), target.position);
        if turret.angle_to(direction) > ctx.config.tank.aim_tolerance_degrees {
            let turn = turret.turn_toward(direction).sign() * self.template.turret_turn_speed * dt;
            if let Some(local) = body.local_mut(TURRET) {
                local.rotate_local_y(turn);
            }
        }
    }

    fn fire(&mut self, me: Entity, body: &Body, facing: Vec3, ctx: &mut FrameContext<'_>) {
        if self.ammo == 0 {
            log::debug!("{:?} is out of ammo", me);
            return;
        }
        self.ammo -= 1;
        self.shots_fired += 1;

        let rules = &ctx.config.tank;
        let facing = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
        let origin = body.position();
        let position = Vec3::new(origin.x, rules.muzzle_height, origin.z) + facing * rules.muzzle_offset;
        log::debug!("{:?} fires at {:?} ({} shells left)", me, self.target, self.ammo);
        ctx.spawns.push(SpawnRequest::Shell {
            shooter: me,
            position,
            facing,
        });
    }

    fn start_evading(&mut self, body: &Body, ctx: &mut FrameContext<'_>) {
        let radius = ctx.config.tank.evade_radius;
        let here = body.position();
        self.destination = Vec3::new(
            here.x + ctx.rng.gen_range(-radius..=radius),
            ctx.config.tank.ground_level,
            here.z + ctx.rng.gen_range(-radius..=radius),
        );
        self.enter(TankState::Evade);
    }

    fn evade(&mut self, body: &mut Body, dt: f32, ctx: &mut FrameContext<'_>) {
        let rules = &ctx.config.tank;
        self.drive_towards(body, self.destination, self.template.max_speed, rules.evade_snap_degrees, dt);
        self.centre_turret(body, dt, rules);

        if flat_distance(body.position(), self.destination) < rules.evade_arrive_radius {
            self.set_waypoint(0);
            self.enter(TankState::Patrol);
        }
    }

    fn hunt(&mut self, body: &mut Body, dt: f32, ctx: &mut FrameContext<'_>) {
        let rules = &ctx.config.tank;
        self.centre_turret(body, dt, rules);

        let crate_position = self
            .ammo_target
            .and_then(|id| ctx.arena.lookup(id))
            .filter(|view| view.kind == EntityKind::AmmoCrate)
            .map(|view| view.position);

        match crate_position {
            Some(point) => {
                self.drive_towards(body, point, self.template.max_speed, rules.hunt_snap_degrees, dt);
            }
            None => {
                // Claimed by someone else; resume the route where we left it
                self.ammo_target = None;
                self.enter(TankState::Patrol);
            }
        }
    }

    /// Turn the hull toward `point` (snapping when close) and drive forward.
    fn drive_towards(&mut self, body: &mut Body, point: Vec3, top_speed: f32, snap_degrees: f32, dt: f32) {
        let facing = Facing::from_transform(&body.root);
        let direction = flat_direction(body.root.position, point);
        match facing.steer(direction, snap_degrees) {
            Steer::Aligned => body.root.face_target(point),
            Steer::Turn(turn) => body.root.rotate_local_y(turn.sign() * self.template.turn_speed * dt),
        }

        self.speed = if self.template.acceleration > 0.0 {
            approach(self.speed, top_speed, self.template.acceleration * dt)
        } else {
            top_speed
        };
        body.root.move_local_z(self.speed * dt);
    }

    fn centre_turret(&self, body: &mut Body, dt: f32, rules: &TankRules) {
        let Some(turret) = body.local_mut(TURRET) else {
            return;
        };
        match Facing::from_transform(turret).steer(Vec3::Z, rules.turret_centre_snap_degrees) {
            Steer::Aligned => turret.face_direction(Vec3::Z),
            Steer::Turn(turn) => turret.rotate_local_y(turn.sign() * self.template.turret_turn_speed * dt),
        }
    }

    /// Latch death, force Inactive and play the flip-over once.
    fn wreck(&mut self, me: Entity, body: &mut Body, dt: f32, rules: &TankRules) {
        if !self.dead {
            self.dead = true;
            self.target = None;
            self.ammo_target = None;
            log::info!("Tank {:?} destroyed", me);
        }
        self.enter(TankState::Inactive);
        self.speed = 0.0;
        if self.wreck_settled {
            return;
        }

        let wreck = &rules.wreck;
        self.wreck_timer += dt;
        let root = &mut body.root;
        if self.wreck_timer < wreck.flip_duration {
            root.move_y(wreck.lift_speed * dt);
            root.rotate_local_z(wreck.roll_speed * dt);
            root.move_local_x(wreck.slide_speed * dt);
        } else if root.position.y > rules.ground_level {
            root.move_y(-wreck.lift_speed * dt);
            root.rotate_local_z(2.0 * wreck.roll_speed * dt);
            root.move_local_x(-wreck.slide_speed * dt);
        }

        if self.wreck_timer >= wreck.flip_duration && root.position.y <= rules.ground_level {
            root.position.y = rules.ground_level;
            self.wreck_settled = true;
        }
    }
}

fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ammo::AmmoCrate;
    use crate::config::ArenaConfig;
    use crate::message::SYSTEM_SENDER;
    use crate::test_support::Harness;

    #[test]
    fn start_and_stop_switch_between_patrol_and_inactive() {
        let mut h = Harness::new(ArenaConfig::default());
        let a = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        h.send(a, MessageKind::Start, SYSTEM_SENDER);
        h.update(a, 0.01);
        let tank = h.tank_ref(a);
        assert_eq!(tank.state(), TankState::Patrol);
        assert_eq!(tank.waypoint(), 0);
        assert_eq!(tank.destination(), h.config.patrol_routes[0][0]);

        h.send(a, MessageKind::Stop, SYSTEM_SENDER);
        h.update(a, 0.01);
        assert_eq!(h.tank_ref(a).state(), TankState::Inactive);
    }

    #[test]
    fn hit_from_enemy_costs_damage_and_calls_teammates() {
        let mut h = Harness::new(ArenaConfig::default());
        let a1 = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        let a2 = h.tank(0, Vec3::new(10.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, 50.0));
        let damage = h.tank_ref(b).shell_damage();

        h.send(a1, MessageKind::Hit, b);
        h.update(a1, 0.01);

        assert_eq!(h.tank_ref(a1).hp(), 100 - damage);
        assert_eq!(h.messenger.pending(a2), 1);
        assert_eq!(h.messenger.fetch(a2).map(|m| (m.kind, m.from)), Some((MessageKind::Help, a1)));
        assert_eq!(h.messenger.pending(b), 0);
        assert_eq!(h.messenger.pending(a1), 0);
    }

    #[test]
    fn hit_from_teammate_does_not_call_for_help() {
        let mut h = Harness::new(ArenaConfig::default());
        let a1 = h.tank(0, Vec3::ZERO);
        let a2 = h.tank(0, Vec3::new(10.0, 0.5, 0.0));
        h.send(a1, MessageKind::Hit, a2);
        h.update(a1, 0.01);
        assert_eq!(h.tank_ref(a1).hp(), 80);
        assert_eq!(h.messenger.pending(a2), 0);
    }

    #[test]
    fn hit_from_missing_sender_is_ignored() {
        let mut h = Harness::new(ArenaConfig::default());
        let a = h.tank(0, Vec3::ZERO);
        let gone = h.tank(1, Vec3::new(0.0, 0.5, 50.0));
        h.arena.despawn(gone);
        h.send(a, MessageKind::Hit, gone);
        h.update(a, 0.01);
        assert_eq!(h.tank_ref(a).hp(), 100);
    }

    #[test]
    fn death_latches_and_forces_inactive() {
        let mut h = Harness::new(ArenaConfig::default());
        let a = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, 50.0));
        for _ in 0..5 {
            h.send(a, MessageKind::Hit, b);
        }
        h.update(a, 0.05);
        let tank = h.tank_ref(a);
        assert_eq!(tank.hp(), 0);
        assert!(tank.is_dead());
        assert_eq!(tank.state(), TankState::Inactive);

        h.send(a, MessageKind::Start, SYSTEM_SENDER);
        h.update(a, 0.05);
        assert_eq!(h.tank_ref(a).state(), TankState::Inactive);
    }

    #[test]
    fn wreck_flips_then_settles_on_the_ground() {
        let mut h = Harness::new(ArenaConfig::default());
        let a = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, 50.0));
        for _ in 0..5 {
            h.send(a, MessageKind::Hit, b);
        }
        h.update(a, 0.05);
        h.update(a, 0.05);
        assert!(h.arena.body(a).unwrap().position().y > 0.5);

        for _ in 0..200 {
            h.update(a, 0.05);
        }
        assert!(h.tank_ref(a).is_wreck_settled());
        assert_eq!(h.arena.body(a).unwrap().position().y, 0.5);
        assert!(h.arena.tank_info(a).is_some());
    }

    #[test]
    fn patrol_spots_enemy_straight_ahead() {
        let mut h = Harness::new(ArenaConfig::default());
        let a = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, 20.0));
        h.send(a, MessageKind::Start, SYSTEM_SENDER);
        h.update(a, 0.01);
        let tank = h.tank_ref(a);
        assert_eq!(tank.state(), TankState::Aim);
        assert_eq!(tank.target(), Some(b));
    }

    #[test]
    fn patrol_without_ammo_never_aims() {
        let mut config = ArenaConfig::default();
        config.tank_templates[0].start_ammo = 0;
        let mut h = Harness::new(config);
        let a = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        h.tank(1, Vec3::new(0.0, 0.5, 20.0));
        h.send(a, MessageKind::Start, SYSTEM_SENDER);
        h.update(a, 0.01);
        assert_eq!(h.tank_ref(a).state(), TankState::Patrol);
    }

    #[test]
    fn patrol_does_not_see_through_houses() {
        let mut h = Harness::new(ArenaConfig::default());
        // House spans x -7.5..5, z 36..45.5
        let a = h.tank(0, Vec3::new(-1.0, 0.5, 20.0));
        h.tank(1, Vec3::new(-1.0, 0.5, 60.0));
        h.send(a, MessageKind::Start, SYSTEM_SENDER);
        h.update(a, 0.01);
        assert_eq!(h.tank_ref(a).state(), TankState::Patrol);
    }

    #[test]
    fn aim_fires_after_dwell_then_evades() {
        let mut h = Harness::new(ArenaConfig::default());
        let a = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, 20.0));
        h.send(a, MessageKind::Start, SYSTEM_SENDER);
        h.update(a, 0.01);
        assert_eq!(h.tank_ref(a).state(), TankState::Aim);

        for _ in 0..3 {
            h.update(a, 0.25);
            assert_eq!(h.tank_ref(a).state(), TankState::Aim);
        }
        assert!(h.spawns.is_empty());
        h.update(a, 0.25);

        let tank = h.tank_ref(a);
        assert_eq!(tank.state(), TankState::Evade);
        assert_eq!(tank.ammo(), 9);
        assert_eq!(tank.shots_fired(), 1);
        assert!(matches!(h.spawns.as_slice(), [SpawnRequest::Shell { shooter, .. }] if *shooter == a));
        assert!(h.arena.tank_info(b).is_some());
    }

    #[test]
    fn help_adopts_teammates_attacker() {
        let mut config = ArenaConfig::default();
        config.tank_templates[0].start_ammo = 0;
        let mut h = Harness::new(config);
        let a1 = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        let a2 = h.tank(0, Vec3::new(10.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, 80.0));
        h.arena.with_tank_mut(a1, |t| t.notify_hit(b));

        h.send(a2, MessageKind::Start, SYSTEM_SENDER);
        h.update(a2, 0.01);
        h.send(a2, MessageKind::Help, a1);
        h.update(a2, 0.01);

        let tank = h.tank_ref(a2);
        assert_eq!(tank.state(), TankState::Aim);
        assert_eq!(tank.target(), Some(b));
        assert_eq!(tank.help_requested_by(), Some(a1));
    }

    #[test]
    fn help_is_ignored_while_inactive() {
        let mut h = Harness::new(ArenaConfig::default());
        let a1 = h.tank(0, Vec3::ZERO);
        let a2 = h.tank(0, Vec3::new(10.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, 80.0));
        h.arena.with_tank_mut(a1, |t| t.notify_hit(b));
        h.send(a2, MessageKind::Help, a1);
        h.update(a2, 0.01);
        let tank = h.tank_ref(a2);
        assert_eq!(tank.state(), TankState::Inactive);
        assert_eq!(tank.help_requested_by(), None);
    }

    #[test]
    fn help_from_a_wrecked_teammate_is_ignored() {
        let mut h = Harness::new(ArenaConfig::default());
        let a1 = h.tank(0, Vec3::ZERO);
        let a2 = h.tank(0, Vec3::new(10.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, -80.0));
        let damage = h.tank_ref(b).shell_damage();
        for _ in 0..(100 + damage - 1) / damage {
            h.send(a1, MessageKind::Hit, b);
        }
        h.update(a1, 0.01);
        assert!(h.tank_ref(a1).hp() <= 0);
        h.messenger.discard(a2);

        h.arena.with_tank_mut(a1, |t| t.notify_hit(b));
        h.send(a2, MessageKind::Start, SYSTEM_SENDER);
        h.send(a2, MessageKind::Help, a1);
        h.update(a2, 0.01);
        let tank = h.tank_ref(a2);
        assert_eq!(tank.state(), TankState::Patrol);
        assert_eq!(tank.target(), None);
    }

    #[test]
    fn empty_magazine_skips_the_shot_and_evades_nearby() {
        let mut config = ArenaConfig::default();
        config.tank_templates[0].start_ammo = 0;
        let mut h = Harness::new(config);
        let a1 = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        let a2 = h.tank(0, Vec3::new(10.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, 80.0));
        h.arena.with_tank_mut(a1, |t| t.notify_hit(b));
        h.send(a2, MessageKind::Start, SYSTEM_SENDER);
        h.update(a2, 0.25);
        h.send(a2, MessageKind::Help, a1);
        for _ in 0..4 {
            h.update(a2, 0.25);
        }

        let tank = h.tank_ref(a2);
        let here = h.arena.body(a2).unwrap().position();
        assert_eq!(tank.state(), TankState::Evade);
        assert!(h.spawns.is_empty());
        assert_eq!(tank.shots_fired(), 0);
        assert_eq!(tank.ammo(), 0);
        assert!((tank.destination().x - here.x).abs() <= 40.0);
        assert!((tank.destination().z - here.z).abs() <= 40.0);
    }

    #[test]
    fn lost_target_sends_aim_to_evade() {
        let mut h = Harness::new(ArenaConfig::default());
        let a = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        let b = h.tank(1, Vec3::new(0.0, 0.5, 20.0));
        h.send(a, MessageKind::Start, SYSTEM_SENDER);
        h.update(a, 0.01);
        assert_eq!(h.tank_ref(a).state(), TankState::Aim);

        h.arena.despawn(b);
        h.update(a, 0.01);
        assert_eq!(h.tank_ref(a).state(), TankState::Evade);
    }

    #[test]
    fn hunts_crate_until_it_disappears() {
        let mut h = Harness::new(ArenaConfig::default());
        let a = h.tank(0, Vec3::new(0.0, 0.5, 0.0));
        let ammo = h.arena.spawn_ammo(AmmoCrate::new(), AmmoCrate::body(Vec3::new(0.0, 0.5, 30.0)));
        h.send(a, MessageKind::AmmoAvailable, ammo);
        h.update(a, 0.1);
        assert_eq!(h.tank_ref(a).state(), TankState::Hunting);
        assert!(h.tank_ref(a).speed() > 0.0);

        h.arena.despawn(ammo);
        h.update(a, 0.1);
        assert_eq!(h.tank_ref(a).state(), TankState::Patrol);
    }

    #[test]
    fn hunting_a_tank_id_falls_back_to_patrol() {
        let mut h = Harness::new(ArenaConfig::default());
        let a = h.tank(0, Vec3::ZERO);
        let b = h.tank(1, Vec3::new(0.0, 0.5, 30.0));
        h.send(a, MessageKind::AmmoAvailable, b);
        h.update(a, 0.1);
        assert_eq!(h.tank_ref(a).state(), TankState::Patrol);
    }

    #[test]
    fn speed_ramps_toward_target() {
        assert_eq!(approach(0.0, 10.0, 4.0), 4.0);
        assert_eq!(approach(8.0, 10.0, 4.0), 10.0);
        assert_eq!(approach(10.0, 0.0, 4.0), 6.0);
    }

    #[test]
    fn state_names_match_display() {
        assert_eq!(TankState::Hunting.to_string(), "Hunting");
        assert_eq!(TankState::default(), TankState::Inactive);
    }
}
