//! Hit detection: projectile-vs-ship via a rotated-rectangle local-frame
//! test, ship-vs-ship via SAT broad + narrow phase with MTV correction.

use game_types::Vec2;

use crate::config::CollisionConfig;
use crate::entity::{Entity, Side};
use crate::projectile::Projectile;
use crate::shipclass::ShipClassTable;

fn half_extents(entity: &Entity, classes: &ShipClassTable) -> Option<(f64, f64)> {
    let class = classes.get(&entity.flagship()?.class_id)?;
    Some((
        class.sprite_size * class.hitbox_width_factor / 2.0,
        class.sprite_size * class.hitbox_height_factor / 2.0,
    ))
}

/// True if `point` falls inside `entity`'s hitbox, tested in the ship's own
/// rotated frame (heading 0 = local +Y, per the shared canvas convention).
pub fn point_hits_ship(point: Vec2, entity: &Entity, classes: &ShipClassTable) -> bool {
    let Some((hx, hy)) = half_extents(entity, classes) else {
        return false;
    };
    let dx = point.x - entity.pos.x;
    let dy = point.y - entity.pos.y;
    let (sin, cos) = entity.heading.sin_cos();
    // Rotate the offset into the ship's local frame by the inverse heading.
    let local_x = dx * cos + dy * sin;
    let local_y = -dx * sin + dy * cos;
    local_x.abs() <= hx && local_y.abs() <= hy
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectileHit {
    pub projectile_index: usize,
    pub target_index: usize,
}

/// Finds, for each live projectile, the first ship (excluding its owner,
/// and any shielded ship) whose hitbox it has entered this tick.
pub fn find_projectile_hits(
    projectiles: &[Projectile],
    entities: &[Entity],
    classes: &ShipClassTable,
    now: f64,
) -> Vec<ProjectileHit> {
    let mut hits = Vec::new();
    for (pi, shot) in projectiles.iter().enumerate() {
        if shot.z > 20.0 {
            continue;
        }
        for (ei, entity) in entities.iter().enumerate() {
            if entity.id == shot.owner || entity.is_sunk() || entity.has_shield(now) {
                continue;
            }
            if point_hits_ship(shot.pos, entity, classes) {
                hits.push(ProjectileHit {
                    projectile_index: pi,
                    target_index: ei,
                });
                break;
            }
        }
    }
    hits
}

/// A confirmed ship-vs-ship collision: index pair plus which one is the
/// rammer (struck the other roughly bow-first) if either qualifies.
#[derive(Debug, Clone, Copy)]
pub struct ShipCollision {
    pub a: usize,
    pub b: usize,
    pub mtv: Vec2,
    pub rammer: Option<usize>,
}

fn obb_axes(heading: f64) -> [Vec2; 2] {
    let (sin, cos) = heading.sin_cos();
    [Vec2::new(cos, sin), Vec2::new(-sin, cos)]
}

fn obb_corners(center: Vec2, heading: f64, hx: f64, hy: f64) -> [Vec2; 4] {
    let [ax, ay] = obb_axes(heading);
    let ex = ax.scale(hx);
    let ey = ay.scale(hy);
    [
        Vec2::new(center.x + ex.x + ey.x, center.y + ex.y + ey.y),
        Vec2::new(center.x - ex.x + ey.x, center.y - ex.y + ey.y),
        Vec2::new(center.x - ex.x - ey.x, center.y - ex.y - ey.y),
        Vec2::new(center.x + ex.x - ey.x, center.y + ex.y - ey.y),
    ]
}

fn project(corners: &[Vec2; 4], axis: Vec2) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for c in corners {
        let p = c.x * axis.x + c.y * axis.y;
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

/// Separating axis test between two oriented boxes. Returns the minimum
/// translation vector (to move `a` out of `b`) if they overlap.
fn sat_overlap(
    center_a: Vec2,
    heading_a: f64,
    hx_a: f64,
    hy_a: f64,
    center_b: Vec2,
    heading_b: f64,
    hx_b: f64,
    hy_b: f64,
) -> Option<Vec2> {
    let corners_a = obb_corners(center_a, heading_a, hx_a, hy_a);
    let corners_b = obb_corners(center_b, heading_b, hx_b, hy_b);
    let axes: [Vec2; 4] = {
        let [a0, a1] = obb_axes(heading_a);
        let [b0, b1] = obb_axes(heading_b);
        [a0, a1, b0, b1]
    };

    let mut best_overlap = f64::INFINITY;
    let mut best_axis = Vec2::zero();

    for axis in axes {
        let (min_a, max_a) = project(&corners_a, axis);
        let (min_b, max_b) = project(&corners_b, axis);
        let overlap = (max_a.min(max_b)) - (min_a.max(min_b));
        if overlap <= 0.0 {
            return None;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            let center_diff = center_a.sub(center_b);
            let sign = if center_diff.x * axis.x + center_diff.y * axis.y < 0.0 { -1.0 } else { 1.0 };
            best_axis = axis.scale(sign);
        }
    }

    Some(best_axis.scale(best_overlap))
}

/// Broad-phase + SAT narrow-phase over all live (non-sunk) entities.
/// Quadratic in entity count, acceptable at the spec's player/NPC scale.
pub fn find_ship_collisions(
    entities: &[Entity],
    classes: &ShipClassTable,
    cfg: &CollisionConfig,
) -> Vec<ShipCollision> {
    let mut results = Vec::new();
    for i in 0..entities.len() {
        if entities[i].is_sunk() || entities[i].is_raft {
            continue;
        }
        let Some((hx_a, hy_a)) = half_extents(&entities[i], classes) else { continue };
        let max_dim_a = hx_a.max(hy_a);
        for j in (i + 1)..entities.len() {
            if entities[j].is_sunk() || entities[j].is_raft {
                continue;
            }
            let Some((hx_b, hy_b)) = half_extents(&entities[j], classes) else { continue };
            let max_dim_b = hx_b.max(hy_b);

            let broad_radius = (max_dim_a + max_dim_b) * cfg.broadphase_factor;
            if entities[i].pos.dist_sq(entities[j].pos) > broad_radius * broad_radius {
                continue;
            }

            if let Some(mtv) = sat_overlap(
                entities[i].pos,
                entities[i].heading,
                hx_a,
                hy_a,
                entities[j].pos,
                entities[j].heading,
                hx_b,
                hy_b,
            ) {
                let rammer = ram_bow_check(&entities[i], &entities[j], cfg)
                    .then_some(i)
                    .or_else(|| ram_bow_check(&entities[j], &entities[i], cfg).then_some(j));
                results.push(ShipCollision { a: i, b: j, mtv, rammer });
            }
        }
    }
    results
}

/// True if `rammer`'s bow is pointed roughly at `target` and it is moving.
fn ram_bow_check(rammer: &Entity, target: &Entity, cfg: &CollisionConfig) -> bool {
    if rammer.speed <= 1.0 {
        return false;
    }
    let to_target = target.pos.sub(rammer.pos);
    let dist = (to_target.x * to_target.x + to_target.y * to_target.y).sqrt();
    if dist < 1e-6 {
        return false;
    }
    let bearing = to_target.y.atan2(to_target.x);
    let heading_bearing = rammer.heading - std::f64::consts::FRAC_PI_2;
    let diff = crate::geometry::angle_diff(bearing, heading_bearing).abs();
    diff.to_degrees() <= cfg.ram_cone_deg
}

/// Apply one tick's worth of MTV separation plus the ram speed penalty to
/// the rammer, if any. Takes disjoint mutable borrows via `split_at_mut`.
pub fn resolve_collision(entities: &mut [Entity], collision: &ShipCollision, cfg: &CollisionConfig) {
    let (lo, hi) = (collision.a.min(collision.b), collision.a.max(collision.b));
    let (left, right) = entities.split_at_mut(hi);
    let (a, b) = (&mut left[lo], &mut right[0]);

    let push = collision.mtv.scale(cfg.mtv_correction * 0.5);
    a.pos.x += push.x;
    a.pos.y += push.y;
    b.pos.x -= push.x;
    b.pos.y -= push.y;

    if let Some(rammer) = collision.rammer {
        let target = if rammer == collision.a { &mut *b } else { &mut *a };
        target.speed *= 1.0 - cfg.ram_speed_penalty;
    }
}

/// Resolves a collision against a docked ship: it's an immovable obstacle,
/// so the other side absorbs the whole MTV (not split 50/50) and always
/// pays the ram speed penalty, same as striking land.
pub fn resolve_immovable_collision(entities: &mut [Entity], collision: &ShipCollision, immovable: usize, cfg: &CollisionConfig) {
    let mover = if collision.a == immovable { collision.b } else { collision.a };
    let sign = if mover == collision.a { 1.0 } else { -1.0 };
    let push = collision.mtv.scale(cfg.mtv_correction * sign);
    let m = &mut entities[mover];
    m.pos.x += push.x;
    m.pos.y += push.y;
    m.speed *= 1.0 - cfg.ram_speed_penalty;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, Ship};
    use crate::ids::EntityId;

    fn ship_entity(id: u64, pos: Vec2, heading: f64) -> Entity {
        Entity {
            id: EntityId(id),
            name: "Ship".into(),
            kind: EntityKind::Player,
            pos,
            heading,
            speed: 0.0,
            sail_state: 0,
            sail_cooldown: 0.0,
            wind_efficiency: 0.0,
            is_in_deep_water: true,
            fleet: vec![Ship::new("sloop", 100.0)],
            is_raft: false,
            shield_until: None,
            harbor: Default::default(),
            last_shot: [f64::NEG_INFINITY; 2],
            fire_rate: 1.0,
            input: Default::default(),
            consecutive_collisions: 0,
            pending_removal: false,
        }
    }

    fn classes() -> ShipClassTable {
        ShipClassTable::from_json(r#"[{"id":"sloop","max_speed":120.0,"turn_speed":1.5,"max_health":100.0,"cannons_per_side":4,"hitbox_width_factor":1.0,"hitbox_height_factor":1.0,"sprite_size":40.0}]"#).unwrap()
    }

    #[test]
    fn overlapping_ships_are_detected() {
        let classes = classes();
        let cfg = CollisionConfig::default();
        let entities = vec![
            ship_entity(1, Vec2::new(0.0, 0.0), 0.0),
            ship_entity(2, Vec2::new(10.0, 0.0), 0.0),
        ];
        let hits = find_ship_collisions(&entities, &classes, &cfg);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn distant_ships_do_not_collide() {
        let classes = classes();
        let cfg = CollisionConfig::default();
        let entities = vec![
            ship_entity(1, Vec2::new(0.0, 0.0), 0.0),
            ship_entity(2, Vec2::new(2000.0, 0.0), 0.0),
        ];
        assert!(find_ship_collisions(&entities, &classes, &cfg).is_empty());
    }

    #[test]
    fn point_inside_hitbox_is_a_hit() {
        let classes = classes();
        let ship = ship_entity(1, Vec2::new(100.0, 100.0), 0.0);
        assert!(point_hits_ship(Vec2::new(105.0, 105.0), &ship, &classes));
        assert!(!point_hits_ship(Vec2::new(500.0, 500.0), &ship, &classes));
    }

    #[test]
    fn rafts_and_sunk_ships_are_excluded_from_ship_collisions() {
        let classes = classes();
        let cfg = CollisionConfig::default();
        let mut raft = ship_entity(2, Vec2::new(10.0, 0.0), 0.0);
        raft.is_raft = true;
        let mut sunk = ship_entity(3, Vec2::new(10.0, 0.0), 0.0);
        sunk.flagship_mut().unwrap().sunk = true;

        let entities = vec![ship_entity(1, Vec2::new(0.0, 0.0), 0.0), raft, sunk];
        assert!(find_ship_collisions(&entities, &classes, &cfg).is_empty());
    }

    #[test]
    fn docked_ship_is_immovable_and_mover_pays_ram_penalty() {
        let cfg = CollisionConfig::default();
        let mut entities = vec![
            ship_entity(1, Vec2::new(0.0, 0.0), 0.0),
            ship_entity(2, Vec2::new(10.0, 0.0), 0.0),
        ];
        entities[1].speed = 50.0;
        let docked_pos = entities[0].pos;
        // mtv points away from b (per sat_overlap's "separate a from b"
        // convention), so b is pushed the opposite way: further +x, away
        // from the docked ship at the origin.
        let collision = ShipCollision { a: 0, b: 1, mtv: Vec2::new(-4.0, 0.0), rammer: None };

        resolve_immovable_collision(&mut entities, &collision, 0, &cfg);

        assert_eq!(entities[0].pos, docked_pos);
        assert!(entities[1].pos.x > 10.0);
        assert!((entities[1].speed - 50.0 * (1.0 - cfg.ram_speed_penalty)).abs() < 1e-9);
    }
}
