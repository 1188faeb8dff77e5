//! Tank arena: autonomous tanks patrolling, hunting ammo and trading shells.

pub mod ammo;
pub mod arena;
pub mod config;
pub mod context;
pub mod dropper;
pub mod message;
pub mod perception;
pub mod shell;
pub mod simulation;
pub mod status;
pub mod tank;
#[cfg(test)]
pub(crate) mod test_support;

pub use ammo::AmmoCrate;
pub use arena::{Arena, EntityKind, EntityView, TankInfo};
pub use config::{ArenaConfig, ConfigError, TankSpawn, TankTemplate};
pub use context::{FrameContext, SpawnRequest};
pub use message::{Message, MessageKind, Messenger, SYSTEM_SENDER};
pub use shell::Shell;
pub use simulation::{Simulation, SpawnError, TickReport};
pub use status::TankStatus;
pub use tank::{Tank, TankState};
