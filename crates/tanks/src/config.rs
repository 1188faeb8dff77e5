//! Arena configuration (templates, patrol routes, behaviour tuning). Loaded from arena.ron at startup.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating an arena config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("tank template {0:?} is defined twice")]
    DuplicateTemplate(String),
    #[error("tank {tank:?} uses unknown template {template:?}")]
    UnknownTemplate { tank: String, template: String },
    #[error("team {0} has no patrol route")]
    MissingRoute(u32),
    #[error("patrol route for team {0} is empty")]
    EmptyRoute(u32),
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error(transparent)]
    Spawn(#[from] crate::simulation::SpawnError),
}

/// Shared, read-only stats for one type of tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankTemplate {
    pub name: String,
    /// Full speed in units per second.
    pub max_speed: f32,
    /// Units per second squared.
    pub acceleration: f32,
    /// Hull turn rate in radians per second.
    pub turn_speed: f32,
    /// Turret turn rate in radians per second.
    pub turret_turn_speed: f32,
    pub max_hp: i32,
    pub start_ammo: u32,
    /// HP removed from a tank hit by one of this tank's shells.
    pub shell_damage: i32,
}

/// Tunables for the tank state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankRules {
    /// Seconds spent aiming before the shot.
    pub aim_dwell: f32,
    /// Half-angle of the turret acquisition cone, in degrees.
    pub turret_cone_degrees: f32,
    /// Turret stops turning toward its target inside this angle.
    pub aim_tolerance_degrees: f32,
    pub patrol_arrive_radius: f32,
    pub evade_arrive_radius: f32,
    /// Evade points are picked within +/- this many units on X and Z.
    pub evade_radius: f32,
    /// Fraction of max speed used while patrolling.
    pub patrol_speed_factor: f32,
    /// Fraction of turret turn speed used for the patrol sweep.
    pub turret_sweep_factor: f32,
    pub patrol_snap_degrees: f32,
    pub evade_snap_degrees: f32,
    pub hunt_snap_degrees: f32,
    pub turret_centre_snap_degrees: f32,
    /// Turret mount relative to the hull origin.
    pub turret_mount: Vec3,
    /// Distance in front of the turret where shells appear.
    pub muzzle_offset: f32,
    pub muzzle_height: f32,
    /// Height at which a hull rests on the ground.
    pub ground_level: f32,
    pub wreck: WreckRules,
}

impl Default for TankRules {
    fn default() -> Self {
        Self {
            aim_dwell: 1.0,
            turret_cone_degrees: 15.0,
            aim_tolerance_degrees: 2.0,
            patrol_arrive_radius: 8.0,
            evade_arrive_radius: 7.0,
            evade_radius: 40.0,
            patrol_speed_factor: 0.75,
            turret_sweep_factor: 0.5,
            patrol_snap_degrees: 2.0,
            evade_snap_degrees: 5.0,
            hunt_snap_degrees: 2.0,
            turret_centre_snap_degrees: 2.0,
            turret_mount: Vec3::new(0.0, 1.2, 0.0),
            muzzle_offset: 2.0,
            muzzle_height: 2.5,
            ground_level: 0.5,
            wreck: WreckRules::default(),
        }
    }
}

/// Flip-over animation played once when a tank is destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WreckRules {
    /// Length of the upward flip, in seconds.
    pub flip_duration: f32,
    pub lift_speed: f32,
    /// Roll rate in radians per second.
    pub roll_speed: f32,
    pub slide_speed: f32,
}

impl Default for WreckRules {
    fn default() -> Self {
        Self {
            flip_duration: 0.5,
            lift_speed: 18.0,
            roll_speed: 3.0,
            slide_speed: 6.0,
        }
    }
}

/// Tunables for fired shells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellRules {
    pub speed: f32,
    /// Seconds before an unspent shell is removed.
    pub lifetime: f32,
    pub hit_radius: f32,
    /// When false, shells pass through the firer's teammates.
    pub friendly_fire: bool,
}

impl Default for ShellRules {
    fn default() -> Self {
        Self {
            speed: 60.0,
            lifetime: 2.0,
            hit_radius: 8.0,
            friendly_fire: true,
        }
    }
}

/// Tunables for ammo crates and the crate dropper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmmoRules {
    pub fall_speed: f32,
    pub ground_level: f32,
    pub claim_radius: f32,
    pub restock_amount: u32,
    /// Seconds between drops; zero disables the dropper.
    pub drop_interval: f32,
    pub drop_height: f32,
    /// Drop area corners on the XZ plane.
    pub drop_area_min: Vec2,
    pub drop_area_max: Vec2,
    /// Crates allowed on the field at once.
    pub max_crates: usize,
}

impl Default for AmmoRules {
    fn default() -> Self {
        Self {
            fall_speed: 10.0,
            ground_level: 0.5,
            claim_radius: 2.0,
            restock_amount: 5,
            drop_interval: 20.0,
            drop_height: 30.0,
            drop_area_min: Vec2::new(-40.0, -30.0),
            drop_area_max: Vec2::new(40.0, 60.0),
            max_crates: 2,
        }
    }
}

/// Axis-aligned building footprint on the XZ plane that blocks line of sight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct House {
    /// Minimum corner (x, z).
    pub min: Vec2,
    /// Maximum corner (x, z).
    pub max: Vec2,
}

/// A tank placed on the field at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSpawn {
    pub name: String,
    pub template: String,
    pub team: u32,
    pub position: Vec3,
    #[serde(default)]
    pub yaw_degrees: f32,
}

/// Full arena setup. Loaded from `arena.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Seed for evade points and crate drops.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_templates")]
    pub tank_templates: Vec<TankTemplate>,
    /// Waypoint loop per team, indexed by team id.
    #[serde(default = "default_patrol_routes")]
    pub patrol_routes: Vec<Vec<Vec3>>,
    #[serde(default)]
    pub tank: TankRules,
    #[serde(default)]
    pub shell: ShellRules,
    #[serde(default)]
    pub ammo: AmmoRules,
    #[serde(default = "default_houses")]
    pub houses: Vec<House>,
    #[serde(default = "default_tanks")]
    pub tanks: Vec<TankSpawn>,
}

fn default_seed() -> u64 {
    7
}

fn default_templates() -> Vec<TankTemplate> {
    vec![
        TankTemplate {
            name: "Rogue Scout".into(),
            max_speed: 24.0,
            acceleration: 12.0,
            turn_speed: 3.0,
            turret_turn_speed: 2.0,
            max_hp: 100,
            start_ammo: 10,
            shell_damage: 20,
        },
        TankTemplate {
            name: "Oberon MkII".into(),
            max_speed: 18.0,
            acceleration: 8.0,
            turn_speed: 2.5,
            turret_turn_speed: 1.5,
            max_hp: 120,
            start_ammo: 8,
            shell_damage: 30,
        },
    ]
}

fn default_patrol_routes() -> Vec<Vec<Vec3>> {
    vec![
        vec![
            Vec3::new(-30.0, 0.5, -10.0),
            Vec3::new(-10.0, 0.5, -20.0),
            Vec3::new(-30.0, 0.5, 40.0),
            Vec3::new(-10.0, 0.5, 20.0),
            Vec3::new(-30.0, 0.5, -10.0),
        ],
        vec![
            Vec3::new(10.0, 0.5, 10.0),
            Vec3::new(30.0, 0.5, 20.0),
            Vec3::new(40.0, 0.5, 40.0),
            Vec3::new(20.0, 0.5, 60.0),
            Vec3::new(20.0, 0.5, -30.0),
        ],
    ]
}

fn default_houses() -> Vec<House> {
    vec![House {
        min: Vec2::new(-7.5, 36.0),
        max: Vec2::new(5.0, 45.5),
    }]
}

fn default_tanks() -> Vec<TankSpawn> {
    let spawn = |name: &str, template: &str, team, position, yaw_degrees| TankSpawn {
        name: name.into(),
        template: template.into(),
        team,
        position,
        yaw_degrees,
    };
    vec![
        spawn("A-1", "Rogue Scout", 0, Vec3::new(-30.0, 0.5, -30.0), 0.0),
        spawn("A-2", "Oberon MkII", 0, Vec3::new(-20.0, 0.5, -40.0), 0.0),
        spawn("B-1", "Rogue Scout", 1, Vec3::new(30.0, 0.5, 60.0), 180.0),
        spawn("B-2", "Oberon MkII", 1, Vec3::new(20.0, 0.5, 70.0), 180.0),
    ]
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tank_templates: default_templates(),
            patrol_routes: default_patrol_routes(),
            tank: TankRules::default(),
            shell: ShellRules::default(),
            ammo: AmmoRules::default(),
            houses: default_houses(),
            tanks: default_tanks(),
        }
    }
}

impl ArenaConfig {
    /// Load config from `arena.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load and validate a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config text without validating it.
    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Pretty RON text for this config.
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Save current config to `arena.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Err(e) = self.save_to(&path) {
            log::warn!("Could not write config to {:?}: {}", path, e);
        }
    }

    /// Write the config to `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_ron()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn template(&self, name: &str) -> Option<&TankTemplate> {
        self.tank_templates.iter().find(|t| t.name == name)
    }

    pub fn patrol_route(&self, team: u32) -> Option<&[Vec3]> {
        self.patrol_routes.get(team as usize).map(Vec::as_slice)
    }

    /// Check cross references and ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for template in &self.tank_templates {
            if !names.insert(template.name.as_str()) {
                return Err(ConfigError::DuplicateTemplate(template.name.clone()));
            }
        }

        for (team, route) in self.patrol_routes.iter().enumerate() {
            if route.is_empty() {
                return Err(ConfigError::EmptyRoute(team as u32));
            }
        }

        for spawn in &self.tanks {
            if self.template(&spawn.template).is_none() {
                return Err(ConfigError::UnknownTemplate {
                    tank: spawn.name.clone(),
                    template: spawn.template.clone(),
                });
            }
            if self.patrol_route(spawn.team).is_none() {
                return Err(ConfigError::MissingRoute(spawn.team));
            }
        }

        let positive = [
            ("shell.lifetime", self.shell.lifetime),
            ("shell.hit_radius", self.shell.hit_radius),
            ("ammo.claim_radius", self.ammo.claim_radius),
            ("tank.evade_radius", self.tank.evade_radius),
            ("tank.evade_arrive_radius", self.tank.evade_arrive_radius),
            ("tank.patrol_arrive_radius", self.tank.patrol_arrive_radius),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("arena.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ArenaConfig::default().validate().unwrap();
    }

    #[test]
    fn default_routes_have_five_waypoints_per_team() {
        let config = ArenaConfig::default();
        assert_eq!(config.patrol_route(0).map(<[Vec3]>::len), Some(5));
        assert_eq!(config.patrol_route(1).map(<[Vec3]>::len), Some(5));
        assert!(config.patrol_route(2).is_none());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config = ArenaConfig::from_ron("(seed: 99, shell: (lifetime: 3.0))").unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.shell.lifetime, 3.0);
        assert_eq!(config.shell.hit_radius, ShellRules::default().hit_radius);
        assert_eq!(config.tanks.len(), 4);
    }

    #[test]
    fn written_config_parses_back() {
        let config = ArenaConfig::default();
        let text = config.to_ron().unwrap();
        assert_eq!(ArenaConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn unknown_template_is_rejected() {
        let mut config = ArenaConfig::default();
        config.tanks[0].template = "Paper Tiger".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownTemplate { .. })
        ));
    }

    #[test]
    fn team_without_route_is_rejected() {
        let mut config = ArenaConfig::default();
        config.tanks[0].team = 5;
        assert!(matches!(config.validate(), Err(ConfigError::MissingRoute(5))));
    }

    #[test]
    fn zero_lifetime_is_rejected() {
        let mut config = ArenaConfig::default();
        config.shell.lifetime = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "shell.lifetime", .. })
        ));
    }
}
