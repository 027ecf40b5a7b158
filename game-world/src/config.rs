//! Immutable tuning values, loaded once at startup from `config.toml`.
//!
//! Mirrors the teacher's `SimConfig`/`FullConfig` split: a plain
//! `serde::Deserialize` struct with a code-level `Default` so the server
//! (and every unit test) has sane numbers even with no file on disk.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Gust turn magnitude: direction shifts by `U(-change_rate, +change_rate)`.
    pub change_rate: f64,
    pub interval_min_s: f64,
    pub interval_max_s: f64,
    /// P(LOW), P(NORMAL), P(FULL) — must sum to 1.0.
    pub strength_probabilities: [f64; 3],
    pub strength_multipliers: [f64; 3],
    /// Zone edges in degrees: [poor_end, moderate_end, good_end, excellent_end].
    pub efficiency_zone_edges_deg: [f64; 4],
    /// Efficiency multiplier per zone: POOR, MODERATE, GOOD, EXCELLENT.
    pub efficiency_zone_values: [f64; 4],
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            change_rate: 0.25,
            interval_min_s: 30.0,
            interval_max_s: 60.0,
            strength_probabilities: [0.2, 0.4, 0.4],
            strength_multipliers: [0.6, 0.8, 1.0],
            efficiency_zone_edges_deg: [60.0, 100.0, 140.0, 180.0],
            efficiency_zone_values: [0.40, 0.65, 0.85, 1.00],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub shallow_speed_mult: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    pub shallow_accel_mult: f64,
    pub shallow_decel_mult: f64,
    pub collision_threshold: f64,
    pub collision_damage_mult: f64,
    pub max_consecutive_collisions: u32,
    pub harbor_spawn_distance: f64,
    pub harbor_exit_shield_duration_s: f64,
    pub sail_change_cooldown_s: f64,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            shallow_speed_mult: 0.75,
            acceleration: 40.0,
            deceleration: 30.0,
            shallow_accel_mult: 0.5,
            shallow_decel_mult: 1.5,
            collision_threshold: 20.0,
            collision_damage_mult: 2.0,
            max_consecutive_collisions: 10,
            harbor_spawn_distance: 120.0,
            harbor_exit_shield_duration_s: 5.0,
            sail_change_cooldown_s: 1.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Broad-phase radius factor: `dist^2 < ((maxDimA + maxDimB) * factor)^2`.
    pub broadphase_factor: f64,
    /// Fraction of the SAT minimum-translation-vector applied per tick.
    pub mtv_correction: f64,
    /// Speed fraction lost by a rammer.
    pub ram_speed_penalty: f64,
    /// Half-angle (degrees) of the bow cone that makes a ship "the rammer".
    pub ram_cone_deg: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            broadphase_factor: 0.6,
            mtv_correction: 0.20,
            ram_speed_penalty: 0.05,
            ram_cone_deg: 60.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Run the full look-ahead update every N ticks.
    pub update_interval_ticks: u32,
    pub look_ahead_tiles: f64,
    /// Radians/sec turn rate used to interpolate `current_heading`.
    pub turn_smoothing: f64,
    /// Ordered absolute search offsets in degrees (paired +/-).
    pub search_angles_deg: Vec<f64>,
    pub min_progress_dot: f64,
    /// Fraction of the look-ahead radius used to probe for other ships.
    pub ship_probe_radius_mult: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            update_interval_ticks: 10,
            look_ahead_tiles: 4.0,
            turn_smoothing: 1.5,
            search_angles_deg: vec![15.0, 30.0, 45.0, 60.0, 75.0, 90.0, 105.0, 120.0, 135.0, 150.0, 165.0, 180.0],
            min_progress_dot: 0.2,
            ship_probe_radius_mult: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    pub max_engagement_range: f64,
    pub combat_standoff_mult: f64,
    pub evade_duration_s: f64,
    pub evade_exit_distance: f64,
    pub wait_timer_s: f64,
    pub arrived_despawn_delay_s: f64,
    pub defensive_retaliation_window_s: f64,
    pub harbor_arrival_mult: f64,
    /// Formation offset bucket applied via `id % 3`, radians.
    pub formation_offsets: [f64; 3],
    /// Firing arc tolerance around +-pi/2 bearing, radians.
    pub fire_angle_tolerance: f64,
    pub flee_log_threshold_hp: f64,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            max_engagement_range: 900.0,
            combat_standoff_mult: 0.8,
            evade_duration_s: 30.0,
            evade_exit_distance: 600.0,
            wait_timer_s: 5.0,
            arrived_despawn_delay_s: 0.5,
            defensive_retaliation_window_s: 30.0,
            harbor_arrival_mult: 2.0,
            formation_offsets: [-0.4, 0.0, 0.4],
            fire_angle_tolerance: std::f64::consts::PI / 18.0,
            flee_log_threshold_hp: 50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f64,
    pub max_distance: f64,
    pub damage: f64,
    pub collision_radius: f64,
    pub initial_z: f64,
    pub initial_z_speed: f64,
    pub fire_rate_s: f64,
    pub combat_fire_rate_s: f64,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 420.0,
            max_distance: 520.0,
            damage: 12.0,
            collision_radius: 6.0,
            initial_z: 4.0,
            initial_z_speed: 6.0,
            fire_rate_s: 1.2,
            combat_fire_rate_s: 1.8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub tick_rate: u32,
    pub max_players: u32,
    pub spawn_search_attempts: u32,
    pub spawn_box_half_extent: f64,
    pub name_min_len: usize,
    pub name_max_len: usize,
    pub tick_budget_ms: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_players: 20,
            spawn_search_attempts: 50,
            spawn_box_half_extent: 400.0,
            name_min_len: 3,
            name_max_len: 20,
            tick_budget_ms: 1000.0 / 60.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WreckConfig {
    pub owner_loot_window_s: f64,
    pub total_life_s: f64,
}

impl Default for WreckConfig {
    fn default() -> Self {
        Self {
            owner_loot_window_s: 30.0,
            total_life_s: 120.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NpcSpawnerConfig {
    pub max_population: u32,
    pub spawn_interval_s: f64,
    pub max_lifetime_s: f64,
}

impl Default for NpcSpawnerConfig {
    fn default() -> Self {
        Self {
            max_population: 12,
            spawn_interval_s: 8.0,
            max_lifetime_s: 600.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub wind: WindConfig,
    pub ship: ShipConfig,
    pub collision: CollisionConfig,
    pub navigator: NavigatorConfig,
    pub npc: NpcConfig,
    pub projectile: ProjectileConfig,
    pub session: SessionConfig,
    pub wreck: WreckConfig,
    pub npc_spawner: NpcSpawnerConfig,
}

impl Config {
    /// Parse a `config.toml` document. Missing tables/fields fall back to
    /// their `Default` values field-by-field via `#[serde(default)]`.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg.session.tick_rate, 60);
        assert_eq!(cfg.ship.shallow_speed_mult, 0.75);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = Config::from_toml_str("[session]\nmax_players = 8\n").unwrap();
        assert_eq!(cfg.session.max_players, 8);
        assert_eq!(cfg.session.tick_rate, 60);
    }
}
