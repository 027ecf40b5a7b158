//! Server-side simulation core for the sail combat game: config, terrain,
//! wind, ship classes, roles, entities, kinematics, projectiles,
//! collision/SAT, navigation, NPC behavior, harbors, wrecks, missions, and
//! the `World` tick orchestrator.
//!
//! This crate has no networking dependency. It is driven purely by calling
//! [`World::tick`] and is independently unit-testable; `server` is the only
//! crate that talks to clients.

pub mod collision;
pub mod config;
pub mod entity;
pub mod geometry;
pub mod harbor;
pub mod ids;
pub mod kinematics;
pub mod mission;
pub mod navigator;
pub mod npc;
pub mod npc_ai;
pub mod projectile;
pub mod reward;
pub mod role;
pub mod shipclass;
pub mod terrain;
pub mod wind;
pub mod wreck;
pub mod world;

pub use config::Config;
pub use entity::{Entity, EntityKind, Side};
pub use harbor::HarborRegistry;
pub use ids::{EntityId, HarborId, ProjectileId, WreckId};
pub use mission::{Mission, MissionManager};
pub use reward::RewardTable;
pub use role::RoleTable;
pub use shipclass::ShipClassTable;
pub use terrain::{TerrainLoadError, TerrainMap};
pub use world::{World, WorldEvent};
