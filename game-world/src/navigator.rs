//! NPC steering: look-ahead land/ship avoidance plus heading smoothing.
//! Runs on a per-NPC throttle (`update_interval_ticks`) rather than every
//! tick, since probing several headings is the most expensive part of AI.

use game_types::Vec2;

use crate::config::NavigatorConfig;
use crate::geometry::{forward_vector, turn_toward};
use crate::terrain::TerrainMap;

/// Result of one navigation decision: the heading to steer the hull toward
/// this tick, and whether the NPC failed to find any clear heading (the
/// caller bumps its stuck counter on `stuck = true`).
#[derive(Debug, Clone, Copy)]
pub struct NavOutcome {
    pub current_heading: f64,
    pub stuck: bool,
}

/// Reconcile `current_heading` against `desired_heading` using look-ahead
/// obstacle probes, following the four-way rule from the design: both
/// clear interpolates smoothly, only-current-blocked searches a fan of
/// angles around the goal, only-desired-blocked holds the current heading
/// (hysteresis), and a failed search nudges hard to the beam and counts as
/// stuck.
pub fn navigate(
    current_heading: f64,
    desired_heading: f64,
    pos: Vec2,
    terrain: &TerrainMap,
    nearby_ships: &[(Vec2, f64)],
    dt: f64,
    cfg: &NavigatorConfig,
) -> NavOutcome {
    let look_ahead = cfg.look_ahead_tiles * terrain.tile_size();
    let current_clear = is_clear(pos, current_heading, look_ahead, terrain, nearby_ships, cfg);
    let desired_clear = is_clear(pos, desired_heading, look_ahead, terrain, nearby_ships, cfg);

    if current_clear && desired_clear {
        return NavOutcome { current_heading: smooth_heading(current_heading, desired_heading, dt, cfg), stuck: false };
    }

    if current_clear {
        // Only the goal heading is blocked: hold course rather than
        // thrashing toward an obstacle (hysteresis).
        return NavOutcome { current_heading, stuck: false };
    }

    if let Some(candidate) = search_clear_heading(pos, desired_heading, look_ahead, terrain, nearby_ships, cfg) {
        return NavOutcome { current_heading: candidate, stuck: false };
    }

    NavOutcome { current_heading: crate::geometry::normalize_angle(desired_heading + std::f64::consts::FRAC_PI_2), stuck: true }
}

/// Test the ordered `search_angles_deg` fan around `desired_heading`,
/// returning the first clear candidate that still makes forward progress
/// toward the goal (dot product with `desired_heading` >= `min_progress_dot`).
fn search_clear_heading(
    pos: Vec2,
    desired_heading: f64,
    look_ahead: f64,
    terrain: &TerrainMap,
    nearby_ships: &[(Vec2, f64)],
    cfg: &NavigatorConfig,
) -> Option<f64> {
    let goal_dir = forward_vector(desired_heading);
    for offset_deg in &cfg.search_angles_deg {
        let offset = offset_deg.to_radians();
        for candidate in [desired_heading + offset, desired_heading - offset] {
            let cand_dir = forward_vector(candidate);
            let progress = cand_dir.x * goal_dir.x + cand_dir.y * goal_dir.y;
            if progress < cfg.min_progress_dot {
                continue;
            }
            if is_clear(pos, candidate, look_ahead, terrain, nearby_ships, cfg) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Walk the look-ahead ray in `tileSize` steps, treating any LAND sample as
/// blocking, then probe for other ships near the far end of the ray.
fn is_clear(
    pos: Vec2,
    heading: f64,
    look_ahead: f64,
    terrain: &TerrainMap,
    nearby_ships: &[(Vec2, f64)],
    cfg: &NavigatorConfig,
) -> bool {
    let dir = forward_vector(heading);
    let tile_size = terrain.tile_size();
    let steps = (look_ahead / tile_size).ceil().max(1.0) as u32;
    for step in 1..=steps {
        let dist = (step as f64 * tile_size).min(look_ahead);
        let sample = Vec2::new(pos.x + dir.x * dist, pos.y + dir.y * dist);
        if terrain.is_land(sample.x, sample.y) {
            return false;
        }
    }
    let probe = Vec2::new(pos.x + dir.x * look_ahead, pos.y + dir.y * look_ahead);
    let probe_radius = look_ahead * cfg.ship_probe_radius_mult;
    !nearby_ships
        .iter()
        .any(|(other_pos, _)| probe.dist_sq(*other_pos) < probe_radius * probe_radius)
}

/// Smooth `current_heading` toward `desired_heading` at a fixed angular
/// rate, independent of the look-ahead search above.
pub fn smooth_heading(current_heading: f64, desired_heading: f64, dt: f64, cfg: &NavigatorConfig) -> f64 {
    turn_toward(current_heading, desired_heading, cfg.turn_smoothing * dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_terrain() -> TerrainMap {
        let rows: Vec<Vec<u8>> = (0..20).map(|_| vec![0u8; 20]).collect();
        let json = serde_json::json!({"width": 20, "height": 20, "tileSize": 32, "tiles": rows}).to_string();
        TerrainMap::from_json(&json).unwrap()
    }

    fn land_wall_terrain() -> TerrainMap {
        // A column of land at x-tile 5 blanketing the whole height, open
        // water everywhere else, so every heading toward +X is blocked.
        let rows: Vec<Vec<u8>> = (0..20)
            .map(|_| {
                let mut row = vec![0u8; 20];
                row[5] = 2;
                row
            })
            .collect();
        let json = serde_json::json!({"width": 20, "height": 20, "tileSize": 32, "tiles": rows}).to_string();
        TerrainMap::from_json(&json).unwrap()
    }

    #[test]
    fn clear_path_keeps_the_goal_heading() {
        let terrain = open_terrain();
        let cfg = NavigatorConfig::default();
        let outcome = navigate(0.5, 0.5, Vec2::new(100.0, 100.0), &terrain, &[], 1.0 / 60.0, &cfg);
        assert!((outcome.current_heading - 0.5).abs() < 1e-9);
        assert!(!outcome.stuck);
    }

    #[test]
    fn smoothing_moves_toward_desired_without_overshoot() {
        let cfg = NavigatorConfig::default();
        let next = smooth_heading(0.0, 1.0, 0.01, &cfg);
        assert!(next > 0.0 && next <= 1.0);
    }

    #[test]
    fn only_desired_blocked_holds_current_heading() {
        let terrain = land_wall_terrain();
        let cfg = NavigatorConfig::default();
        // Ship sits just west of the wall; heading east (+X, bearing pi/2)
        // is blocked while its current heading north is clear.
        let pos = Vec2::new(4.0 * 32.0 + 16.0, 10.0 * 32.0);
        let north = 0.0;
        let east = std::f64::consts::FRAC_PI_2;
        let outcome = navigate(north, east, pos, &terrain, &[], 1.0 / 60.0, &cfg);
        assert_eq!(outcome.current_heading, north);
        assert!(!outcome.stuck);
    }

    #[test]
    fn fully_enclosed_ship_gets_beam_fallback_and_counts_as_stuck() {
        // A 1x1 water pocket surrounded by land in every probed direction.
        let mut rows = vec![vec![2u8; 9]; 9];
        rows[4][4] = 0;
        let json = serde_json::json!({"width": 9, "height": 9, "tileSize": 8, "tiles": rows}).to_string();
        let terrain = TerrainMap::from_json(&json).unwrap();
        let cfg = NavigatorConfig::default();
        let pos = Vec2::new(4.0 * 8.0 + 4.0, 4.0 * 8.0 + 4.0);
        let outcome = navigate(0.0, 0.0, pos, &terrain, &[], 1.0 / 60.0, &cfg);
        assert!(outcome.stuck);
        let expected = crate::geometry::normalize_angle(std::f64::consts::FRAC_PI_2);
        assert!((outcome.current_heading - expected).abs() < 1e-9);
    }
}
