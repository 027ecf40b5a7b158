//! Angle and vector helpers shared across kinematics, navigation and combat.
//!
//! Rotation convention: radians, 0 = north (screen -Y), increasing clockwise,
//! normalized to `(-pi, pi]`. Forward velocity uses `heading - pi/2` to map
//! the north-up heading onto the canvas-style +X/-Y axes.

use std::f64::consts::PI;

use game_types::Vec2;

/// Normalize an angle (radians) into `(-pi, pi]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Signed shortest angular difference `a - b`, normalized to `(-pi, pi]`.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    normalize_angle(a - b)
}

/// Unit forward vector for a given heading, using the `heading - pi/2`
/// canvas transform (heading 0 = north = -Y on screen).
pub fn forward_vector(heading: f64) -> Vec2 {
    let a = heading - PI / 2.0;
    Vec2::new(a.cos(), a.sin())
}

/// Interpolate `current` toward `target` by at most `max_delta` radians,
/// taking the shortest path around the circle.
pub fn turn_toward(current: f64, target: f64, max_delta: f64) -> f64 {
    let diff = angle_diff(target, current);
    let step = diff.clamp(-max_delta, max_delta);
    normalize_angle(current + step)
}

/// Convert a world-space `atan2` bearing (where 0 = +X axis) into ship
/// heading convention (0 = north, clockwise).
pub fn bearing_to_heading(bearing: f64) -> f64 {
    normalize_angle(bearing + PI / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_range() {
        assert!((normalize_angle(0.0) - 0.0).abs() < 1e-12);
        assert!((normalize_angle(PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-9);
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-9);
        for i in -20..20 {
            let a = normalize_angle(i as f64 * 0.37);
            assert!(a > -PI && a <= PI, "angle {a} out of (-pi, pi]");
        }
    }

    #[test]
    fn turn_toward_clamps_rate() {
        let next = turn_toward(0.0, PI / 2.0, 0.1);
        assert!((next - 0.1).abs() < 1e-9);
    }

    #[test]
    fn turn_toward_takes_shortest_path() {
        // From just past +pi to just past -pi should be a tiny step, not a big one.
        let next = turn_toward(3.1, -3.1, 1.0);
        assert!(angle_diff(next, 3.1).abs() <= 1.0 + 1e-9);
    }
}
