//! Per-entity ship physics: sails, acceleration, wind effects, shallow/land
//! reaction, world wrap, and harbor docking/exit for players.

use game_types::Vec2;

use crate::config::Config;
use crate::entity::Entity;
use crate::geometry::forward_vector;
use crate::harbor::HarborRegistry;
use crate::shipclass::ShipClassTable;
use crate::terrain::TerrainMap;
use crate::wind::Wind;

/// Outcome of one entity's kinematics step that the caller (the tick
/// orchestrator) needs to react to, beyond the entity's own field mutation.
#[derive(Debug, Clone, Default)]
pub struct KinematicsEvent {
    pub land_collision_damage: Option<f64>,
    pub despawn_stuck: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn step(
    entity: &mut Entity,
    dt: f64,
    now: f64,
    wind: &Wind,
    terrain: &TerrainMap,
    classes: &ShipClassTable,
    harbors: &HarborRegistry,
    cfg: &Config,
) -> KinematicsEvent {
    let mut event = KinematicsEvent::default();

    if entity.is_sunk() {
        return event;
    }

    entity.is_in_deep_water = terrain.is_water(entity.pos.x, entity.pos.y);

    step_sails(entity, dt, cfg);

    let max_speed = entity
        .flagship()
        .and_then(|s| classes.get(&s.class_id))
        .map(|c| c.max_speed)
        .unwrap_or(0.0);
    let turn_speed = entity
        .flagship()
        .and_then(|s| classes.get(&s.class_id))
        .map(|c| c.turn_speed)
        .unwrap_or(0.0);

    let target_speed = target_speed(entity, wind, max_speed, cfg);
    accelerate_toward(entity, target_speed, max_speed, dt, cfg);

    if !entity.is_raft {
        if entity.input.left {
            entity.heading = crate::geometry::normalize_angle(entity.heading - turn_speed * dt);
        }
        if entity.input.right {
            entity.heading = crate::geometry::normalize_angle(entity.heading + turn_speed * dt);
        }
    }

    let forward = forward_vector(entity.heading);
    let tentative = Vec2::new(
        entity.pos.x + forward.x * entity.speed * dt,
        entity.pos.y + forward.y * entity.speed * dt,
    );

    if terrain.is_land(tentative.x, tentative.y) {
        if entity.speed > cfg.ship.collision_threshold {
            event.land_collision_damage = Some((entity.speed - cfg.ship.collision_threshold) * cfg.ship.collision_damage_mult);
        }
        entity.speed = 0.0;
        entity.consecutive_collisions += 1;
        if entity.consecutive_collisions >= cfg.ship.max_consecutive_collisions {
            event.despawn_stuck = true;
        }
    } else {
        entity.consecutive_collisions = 0;
        let (wx, wy) = terrain.wrap(tentative.x, tentative.y);
        entity.pos = Vec2::new(wx, wy);
    }

    step_harbor(entity, now, harbors, cfg);

    event
}

fn step_sails(entity: &mut Entity, dt: f64, cfg: &Config) {
    entity.sail_cooldown -= dt;
    if entity.sail_cooldown > 0.0 {
        return;
    }
    if entity.input.sail_up {
        entity.sail_state = (entity.sail_state + 1).min(2);
        entity.sail_cooldown = cfg.ship.sail_change_cooldown_s;
    } else if entity.input.sail_down {
        entity.sail_state = entity.sail_state.saturating_sub(1);
        entity.sail_cooldown = cfg.ship.sail_change_cooldown_s;
    }
}

fn target_speed(entity: &mut Entity, wind: &Wind, max_speed: f64, cfg: &Config) -> f64 {
    if entity.sail_state == 0 {
        entity.wind_efficiency = 0.0;
        return 0.0;
    }
    let sail_mod = if entity.sail_state == 1 { 0.5 } else { 1.0 };
    if entity.is_in_deep_water {
        let eff = wind.efficiency(entity.heading, &cfg.wind);
        entity.wind_efficiency = eff;
        max_speed * sail_mod * wind.strength.as_f64(&cfg.wind) * eff
    } else {
        entity.wind_efficiency = wind.efficiency(entity.heading, &cfg.wind);
        max_speed * sail_mod * cfg.ship.shallow_speed_mult
    }
}

fn accelerate_toward(entity: &mut Entity, target: f64, max_speed: f64, dt: f64, cfg: &Config) {
    let (accel, decel) = if entity.is_in_deep_water {
        (cfg.ship.acceleration, cfg.ship.deceleration)
    } else {
        (
            cfg.ship.acceleration * cfg.ship.shallow_accel_mult,
            cfg.ship.deceleration * cfg.ship.shallow_decel_mult,
        )
    };
    if entity.speed < target {
        entity.speed = (entity.speed + accel * dt).min(target);
    } else if entity.speed > target {
        entity.speed = (entity.speed - decel * dt).max(target);
    }
    entity.speed = entity.speed.clamp(0.0, max_speed);
}

fn step_harbor(entity: &mut Entity, now: f64, harbors: &HarborRegistry, cfg: &Config) {
    if !entity.kind.is_player() {
        return;
    }
    if entity.harbor.in_harbor {
        return;
    }
    if let Some(h) = harbors.within_radius(entity.pos) {
        entity.harbor.near_harbor = true;
        let _ = h; // entry itself is driven explicitly by `enterHarbor`
    } else {
        entity.harbor.near_harbor = false;
    }
    let _ = (now, cfg);
}

/// Called by the gateway on `enterHarbor`: docks the ship if within radius.
pub fn enter_harbor(entity: &mut Entity, harbors: &HarborRegistry) -> bool {
    if entity.harbor.in_harbor {
        return false;
    }
    if let Some(h) = harbors.within_radius(entity.pos) {
        entity.harbor.in_harbor = true;
        entity.harbor.docked_harbor_id = Some(h.id);
        entity.speed = 0.0;
        entity.sail_state = 0;
        true
    } else {
        false
    }
}

/// Called by the gateway on `closeHarbor`: releases the ship outside the
/// harbor along its stored exit direction, with a temporary exit shield.
pub fn exit_harbor(entity: &mut Entity, now: f64, harbors: &HarborRegistry, cfg: &Config) -> bool {
    let Some(id) = entity.harbor.docked_harbor_id else {
        return false;
    };
    let Some(h) = harbors.get(id) else {
        return false;
    };
    entity.pos = Vec2::new(
        h.pos.x + h.exit_direction.x * cfg.ship.harbor_spawn_distance,
        h.pos.y + h.exit_direction.y * cfg.ship.harbor_spawn_distance,
    );
    entity.harbor.in_harbor = false;
    entity.harbor.docked_harbor_id = None;
    entity.shield_until = Some(now + cfg.ship.harbor_exit_shield_duration_s);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, Ship};
    use crate::ids::EntityId;
    use rand::SeedableRng;

    fn water_terrain() -> TerrainMap {
        TerrainMap::from_json(r#"{"width":20,"height":20,"tileSize":32,"tiles":[[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0]]}"#).unwrap()
    }

    fn sample_entity() -> Entity {
        Entity {
            id: EntityId(1),
            name: "Mate".into(),
            kind: EntityKind::Player,
            pos: Vec2::new(100.0, 100.0),
            heading: 0.0,
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
        ShipClassTable::from_json(r#"[{"id":"sloop","max_speed":120.0,"turn_speed":1.5,"max_health":100.0,"cannons_per_side":4,"hitbox_width_factor":0.8,"hitbox_height_factor":1.2,"sprite_size":64.0}]"#).unwrap()
    }

    #[test]
    fn stationary_ship_has_zero_speed_and_sails_down() {
        let mut e = sample_entity();
        let cfg = Config::default();
        let terrain = water_terrain();
        let classes = classes();
        let harbors = HarborRegistry::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let wind = Wind::new(&cfg.wind, &mut rng);
        step(&mut e, 1.0 / 60.0, 0.0, &wind, &terrain, &classes, &harbors, &cfg);
        assert_eq!(e.sail_state, 0);
        assert_eq!(e.speed, 0.0);
    }

    #[test]
    fn rotation_stays_normalized_after_many_ticks() {
        let mut e = sample_entity();
        e.input.right = true;
        let cfg = Config::default();
        let terrain = water_terrain();
        let classes = classes();
        let harbors = HarborRegistry::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let wind = Wind::new(&cfg.wind, &mut rng);
        for i in 0..1000 {
            step(&mut e, 1.0 / 60.0, i as f64 / 60.0, &wind, &terrain, &classes, &harbors, &cfg);
            assert!(e.heading > -std::f64::consts::PI && e.heading <= std::f64::consts::PI);
        }
    }
}
