//! # game-types
//!
//! Shared wire types for the sail combat server.
//!
//! These types are used by:
//! - `game-world`: building snapshots and reading client input
//! - `server`: (de)serializing Socket.IO message payloads
//!
//! ## Coordinate conventions
//!
//! World space is continuous floats. Rotation is in radians, 0 = north
//! (screen -Y), increasing clockwise, normalized to `(-pi, pi]`. Tile grid
//! origin is (0,0) top-left; `tile_x = floor(world_x / tile_size)`.

use serde::{Deserialize, Serialize};

/// A 2D point/vector in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn dist(&self, other: Vec2) -> f64 {
        self.dist_sq(other).sqrt()
    }

    pub fn dist_sq(&self, other: Vec2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn sub(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    pub fn add(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    pub fn scale(&self, s: f64) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

// ── Client -> Server message payloads ─────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SetPlayerName {
    pub name: String,
    #[serde(default)]
    pub spawn: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct InputMessage {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default, rename = "sailUp")]
    pub sail_up: bool,
    #[serde(default, rename = "sailDown")]
    pub sail_down: bool,
    #[serde(default, rename = "shootLeft")]
    pub shoot_left: bool,
    #[serde(default, rename = "shootRight")]
    pub shoot_right: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchFlagship {
    #[serde(rename = "shipClass")]
    pub ship_class: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugTeleport {
    pub x: f64,
    pub y: f64,
}

// ── Server -> Client message payloads ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarborInfo {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub name: String,
    pub island_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_direction: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    pub harbors: Vec<HarborInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSnapshot {
    pub kind: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub health: f64,
    pub max_health: f64,
    pub sail_state: u8,
    pub speed_in_knots: f64,
    pub max_speed_in_knots: f64,
    pub wind_efficiency: f64,
    pub is_in_deep_water: bool,
    pub ship_class_name: String,
    pub is_raft: bool,
    pub has_shield: bool,
    pub fleet_size: u32,
    pub navigation_skill: f64,
    pub near_harbor: bool,
    pub reload_left: f64,
    pub reload_right: f64,
    pub max_reload: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission: Option<MissionSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WreckSnapshot {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub is_owner_loot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindSnapshot {
    pub direction: f64,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamestateUpdate {
    pub players: std::collections::HashMap<String, PlayerSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub wrecks: Vec<WreckSnapshot>,
    pub wind: WindSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionComplete {
    pub gold: u64,
    pub xp: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRejected {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerFull {
    pub message: String,
    pub max_players: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec2_distance_is_euclidean() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.dist(b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn input_message_defaults_are_all_false() {
        let m: InputMessage = serde_json::from_str("{}").unwrap();
        assert!(!m.left && !m.right && !m.sail_up && !m.sail_down);
        assert!(!m.shoot_left && !m.shoot_right);
    }
}
