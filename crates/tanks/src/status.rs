//! Read-only tank summaries for logs and the end-of-battle scoreboard.

use glam::Vec3;
use hecs::Entity;
use std::fmt;

use crate::tank::TankState;

#[derive(Debug, Clone, PartialEq)]
pub struct TankStatus {
    pub id: Entity,
    pub name: String,
    pub template: String,
    pub team: u32,
    pub state: TankState,
    pub hp: i32,
    pub max_hp: i32,
    pub ammo: u32,
    pub shots_fired: u32,
    pub speed: f32,
    pub position: Vec3,
    pub dead: bool,
}

impl fmt::Display for TankStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6} team {} {:<12} {:<9} hp {:>4}/{:<4} ammo {:>3} shots {:>3} at ({:.1}, {:.1})",
            self.name,
            self.team,
            self.template,
            if self.dead { "Destroyed" } else { self.state.as_str() },
            self.hp.max(0),
            self.max_hp,
            self.ammo,
            self.shots_fired,
            self.position.x,
            self.position.z,
        )
    }
}
