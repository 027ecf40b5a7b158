//! Global wind: direction/strength with scheduled gusts. Single writer,
//! created once per world, lives for the process.

use rand::Rng;

use crate::config::WindConfig;
use crate::geometry::angle_diff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Low,
    Normal,
    Full,
}

impl Strength {
    pub fn multiplier(self, cfg: &WindConfig) -> f64 {
        match self {
            Strength::Low => cfg.strength_multipliers[0],
            Strength::Normal => cfg.strength_multipliers[1],
            Strength::Full => cfg.strength_multipliers[2],
        }
    }

    fn sample(cfg: &WindConfig, rng: &mut impl Rng) -> Strength {
        let roll: f64 = rng.gen_range(0.0..1.0);
        let [p_low, p_normal, _p_full] = cfg.strength_probabilities;
        if roll < p_low {
            Strength::Low
        } else if roll < p_low + p_normal {
            Strength::Normal
        } else {
            Strength::Full
        }
    }

    pub fn as_f64(self, cfg: &WindConfig) -> f64 {
        self.multiplier(cfg)
    }
}

#[derive(Debug, Clone)]
pub struct Wind {
    pub direction: f64,
    pub strength: Strength,
    time_to_change: f64,
}

impl Wind {
    pub fn new(cfg: &WindConfig, rng: &mut impl Rng) -> Self {
        Self {
            direction: rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI),
            strength: Strength::sample(cfg, rng),
            time_to_change: rng.gen_range(cfg.interval_min_s..cfg.interval_max_s),
        }
    }

    pub fn tick(&mut self, dt: f64, cfg: &WindConfig, rng: &mut impl Rng) {
        self.time_to_change -= dt;
        if self.time_to_change <= 0.0 {
            let shift = rng.gen_range(-cfg.change_rate..cfg.change_rate);
            self.direction = crate::geometry::normalize_angle(self.direction + shift);
            self.strength = Strength::sample(cfg, rng);
            self.time_to_change = rng.gen_range(cfg.interval_min_s..cfg.interval_max_s);
        }
    }

    /// Sailing efficiency for `heading` against this wind's source direction.
    /// Symmetric on both tacks: only the absolute angular difference matters.
    pub fn efficiency(&self, heading: f64, cfg: &WindConfig) -> f64 {
        wind_efficiency(heading, self.direction, cfg)
    }
}

/// Zone-based sailing efficiency. `a` is the absolute angular difference
/// (degrees) between the wind source direction and the ship's heading.
pub fn wind_efficiency(heading: f64, wind_direction: f64, cfg: &WindConfig) -> f64 {
    let diff = angle_diff(wind_direction, heading);
    let a = diff.abs().to_degrees();
    let edges = cfg.efficiency_zone_edges_deg;
    let values = cfg.efficiency_zone_values;
    if a < edges[0] {
        values[0]
    } else if a < edges[1] {
        values[1]
    } else if a < edges[2] {
        values[2]
    } else {
        values[3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn efficiency_is_symmetric_around_wind_direction() {
        let cfg = WindConfig::default();
        let wind_dir = 0.5;
        for offset in [0.1, 0.5, 1.0, 2.0, 3.0] {
            let a = wind_efficiency(wind_dir - offset, wind_dir, &cfg);
            let b = wind_efficiency(wind_dir + offset, wind_dir, &cfg);
            assert!((a - b).abs() < 1e-9, "offset {offset}: {a} != {b}");
        }
    }

    #[test]
    fn efficiency_zones_match_spec_table() {
        let cfg = WindConfig::default();
        // Downwind (a=0) is POOR; dead upwind (a=180) is EXCELLENT.
        assert!((wind_efficiency(0.0, 0.0, &cfg) - 0.40).abs() < 1e-9);
        assert!((wind_efficiency(std::f64::consts::PI, 0.0, &cfg) - 1.00).abs() < 1e-9);
    }

    #[test]
    fn gust_changes_direction_and_reschedules() {
        let cfg = WindConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut wind = Wind::new(&cfg, &mut rng);
        let initial_dir = wind.direction;
        // Force the schedule to fire immediately.
        wind.time_to_change = 0.0;
        wind.tick(0.016, &cfg, &mut rng);
        assert_ne!(wind.direction, initial_dir);
    }
}
