//! Cannonballs: ballistic arcs fired from a broadside, expiring on range,
//! water impact, or a hit.

use game_types::Vec2;

use crate::config::ProjectileConfig;
use crate::entity::Side;
use crate::geometry::forward_vector;
use crate::ids::{EntityId, ProjectileId};
use crate::shipclass::ShipClass;

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner: EntityId,
    pub pos: Vec2,
    pub z: f64,
    pub vel: Vec2,
    pub z_vel: f64,
    /// Downward acceleration derived so the shot lands at `max_distance`.
    pub gravity: f64,
    pub traveled: f64,
    pub max_distance: f64,
    pub damage: f64,
    pub collision_radius: f64,
}

impl Projectile {
    /// Spawns one shot from `origin` along `side` of a ship facing `heading`.
    /// `cannons_per_side` shots on a side sit equally spaced along the
    /// hull's longitudinal axis (0-indexed by `slot`), each offset laterally
    /// by a fixed half hull width.
    pub fn spawn(
        id: ProjectileId,
        owner: EntityId,
        origin: Vec2,
        heading: f64,
        side: Side,
        slot: u32,
        cannons_per_side: u32,
        class: &ShipClass,
        cfg: &ProjectileConfig,
    ) -> Self {
        let lateral = match side {
            Side::Port => heading - std::f64::consts::FRAC_PI_2,
            Side::Starboard => heading + std::f64::consts::FRAC_PI_2,
        };
        let lateral_dir = forward_vector(lateral);
        let half_width = class.sprite_size * class.hitbox_width_factor / 2.0;
        let hull_length = class.sprite_size * class.hitbox_height_factor;
        let spacing = if cannons_per_side > 0 { hull_length / cannons_per_side as f64 } else { 0.0 };
        let longitudinal = (slot as f64 - (cannons_per_side as f64 - 1.0) / 2.0) * spacing;
        let forward_dir = forward_vector(heading);
        let pos = Vec2::new(
            origin.x + lateral_dir.x * half_width + forward_dir.x * longitudinal,
            origin.y + lateral_dir.y * half_width + forward_dir.y * longitudinal,
        );
        let vel = Vec2::new(lateral_dir.x * cfg.speed, lateral_dir.y * cfg.speed);

        // Time-of-flight is fixed by the desired horizontal range, then
        // gravity is solved backward so z(time_to_max) == 0 exactly:
        // 0 = z0 + z_speed0*t - 0.5*g*t^2  =>  g = 2*(z0 + z_speed0*t) / t^2.
        let time_to_max = cfg.max_distance / cfg.speed;
        let gravity = if time_to_max > 0.0 {
            2.0 * (cfg.initial_z + cfg.initial_z_speed * time_to_max) / (time_to_max * time_to_max)
        } else {
            0.0
        };

        Self {
            id,
            owner,
            pos,
            z: cfg.initial_z,
            vel,
            z_vel: cfg.initial_z_speed,
            gravity,
            traveled: 0.0,
            max_distance: cfg.max_distance,
            damage: cfg.damage,
            collision_radius: cfg.collision_radius,
        }
    }

    /// Advance one tick. Returns false once the shot should be removed.
    pub fn step(&mut self, dt: f64) -> bool {
        self.pos.x += self.vel.x * dt;
        self.pos.y += self.vel.y * dt;
        self.z_vel -= self.gravity * dt;
        self.z += self.z_vel * dt;
        self.traveled += (self.vel.x * self.vel.x + self.vel.y * self.vel.y).sqrt() * dt;

        self.z > 0.0 && self.traveled < self.max_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::EntityId;

    fn class() -> ShipClass {
        ShipClass {
            id: "sloop".into(),
            max_speed: 120.0,
            turn_speed: 1.5,
            max_health: 100.0,
            cannons_per_side: 4,
            hitbox_width_factor: 0.8,
            hitbox_height_factor: 1.2,
            sprite_size: 64.0,
            is_raft: false,
        }
    }

    #[test]
    fn spawned_shot_lands_near_max_distance() {
        let cfg = ProjectileConfig::default();
        let class = class();
        let mut shot = Projectile::spawn(
            ProjectileId(1),
            EntityId(1),
            Vec2::new(0.0, 0.0),
            0.0,
            Side::Starboard,
            0,
            class.cannons_per_side,
            &class,
            &cfg,
        );
        let dt = 1.0 / 60.0;
        let mut ticks = 0;
        while shot.step(dt) {
            ticks += 1;
            assert!(ticks < 100_000, "projectile never lands");
        }
        assert!((shot.traveled - cfg.max_distance).abs() < cfg.speed * dt * 2.0);
    }

    #[test]
    fn port_and_starboard_fire_opposite_lateral_directions() {
        let cfg = ProjectileConfig::default();
        let class = class();
        let port = Projectile::spawn(ProjectileId(1), EntityId(1), Vec2::zero(), 0.0, Side::Port, 0, class.cannons_per_side, &class, &cfg);
        let starboard = Projectile::spawn(ProjectileId(2), EntityId(1), Vec2::zero(), 0.0, Side::Starboard, 0, class.cannons_per_side, &class, &cfg);
        assert!(port.vel.x < 0.0);
        assert!(starboard.vel.x > 0.0);
    }

    #[test]
    fn cannon_slots_spread_along_hull_length_not_lateral_axis() {
        let cfg = ProjectileConfig::default();
        let class = class();
        // Heading 0 = north: the longitudinal axis is +/-Y, lateral is +/-X.
        let bow = Projectile::spawn(ProjectileId(1), EntityId(1), Vec2::zero(), 0.0, Side::Starboard, 0, class.cannons_per_side, &class, &cfg);
        let stern = Projectile::spawn(
            ProjectileId(2),
            EntityId(1),
            Vec2::zero(),
            0.0,
            Side::Starboard,
            class.cannons_per_side - 1,
            class.cannons_per_side,
            &class,
            &cfg,
        );

        let half_width = class.sprite_size * class.hitbox_width_factor / 2.0;
        assert!((bow.pos.x - half_width).abs() < 1e-9);
        assert!((stern.pos.x - half_width).abs() < 1e-9);
        assert!((bow.pos.y - stern.pos.y).abs() > 1e-6);
    }
}
