//! NPC intent state machine. Split into a read-only decision pass (may
//! inspect every other entity) and a mutation pass (touches only its own
//! NPC), so target selection never needs two simultaneous mutable borrows
//! into the entity list.

use game_types::Vec2;

use crate::config::NpcConfig;
use crate::entity::{Entity, Side};
use crate::harbor::HarborRegistry;
use crate::ids::EntityId;
use crate::npc::{AiState, Intent};
use crate::role::RoleTable;
use crate::shipclass::ShipClassTable;

#[derive(Debug, Clone, Copy)]
pub enum Action {
    None,
    FireBroadside(Side),
    Despawn,
}

/// Everything the mutation pass needs to write back onto one NPC, computed
/// without mutably borrowing the entity list.
#[derive(Debug, Clone)]
pub struct Decision {
    pub intent: Intent,
    pub target_heading: f64,
    pub combat_target: Option<EntityId>,
    pub combat_distance: f64,
    pub combat_side: Option<Side>,
    pub action: Action,
}

/// Compute the next-tick decision for the NPC at `self_index`. Reads the
/// full entity slice for target search only; never mutates it.
#[allow(clippy::too_many_arguments)]
pub fn decide(
    self_index: usize,
    entities: &[Entity],
    harbors: &HarborRegistry,
    roles: &RoleTable,
    cfg: &NpcConfig,
    projectile_max_distance: f64,
    now: f64,
) -> Decision {
    let entity = &entities[self_index];
    let npc = entity.kind.npc().expect("decide called on a player entity");

    if entity.is_sunk() {
        return Decision {
            intent: Intent::Despawning,
            target_heading: entity.heading,
            combat_target: None,
            combat_distance: 0.0,
            combat_side: None,
            action: Action::Despawn,
        };
    }

    if now - npc.spawn_time > npc.max_lifetime && npc.intent != Intent::Arrived {
        return Decision {
            intent: Intent::Despawning,
            target_heading: entity.heading,
            combat_target: None,
            combat_distance: 0.0,
            combat_side: None,
            action: Action::None,
        };
    }

    if npc.intent == Intent::Evade {
        if let Some(from) = npc.intent_data.evade_from {
            if now - npc.intent_data.evade_started_at < cfg.evade_duration_s
                && entity.pos.dist(entities.iter().find(|e| e.id == from).map(|e| e.pos).unwrap_or(entity.pos)) <= cfg.evade_exit_distance
            {
                return continue_evade(entity, entities, from, now);
            }
        }
    }

    match npc.intent {
        Intent::Despawning => Decision {
            intent: Intent::Despawning,
            target_heading: entity.heading,
            combat_target: None,
            combat_distance: 0.0,
            combat_side: None,
            action: Action::Despawn,
        },
        Intent::Arrived => arrived_decision(entity, now, cfg),
        Intent::Wait => wait_decision(entity, now, cfg),
        // Either the 30s timer or the exit-distance check above failed to
        // hold, so the threat is gone or stale: resume travelling.
        Intent::Evade => evade_expired_decision(entity),
        Intent::Engage => engage_decision(self_index, entities, roles, cfg, projectile_max_distance, now),
        Intent::Travel => travel_decision(self_index, entities, harbors, roles, cfg, now),
    }
}

fn evade_expired_decision(entity: &Entity) -> Decision {
    Decision {
        intent: Intent::Travel,
        target_heading: entity.heading,
        combat_target: None,
        combat_distance: 0.0,
        combat_side: None,
        action: Action::None,
    }
}

fn continue_evade(entity: &Entity, entities: &[Entity], from: EntityId, _now: f64) -> Decision {
    let away_heading = entities
        .iter()
        .find(|e| e.id == from)
        .map(|threat| {
            let delta = entity.pos.sub(threat.pos);
            crate::geometry::bearing_to_heading(delta.y.atan2(delta.x))
        })
        .unwrap_or(entity.heading);
    Decision {
        intent: Intent::Evade,
        target_heading: away_heading,
        combat_target: Some(from),
        combat_distance: 0.0,
        combat_side: None,
        action: Action::None,
    }
}

fn arrived_decision(entity: &Entity, now: f64, cfg: &NpcConfig) -> Decision {
    let npc = entity.kind.npc().unwrap();
    let should_despawn = npc
        .intent_data
        .arrived_at
        .is_some_and(|at| now - at >= cfg.arrived_despawn_delay_s);

    if should_despawn {
        return Decision {
            intent: Intent::Despawning,
            target_heading: entity.heading,
            combat_target: None,
            combat_distance: 0.0,
            combat_side: None,
            action: Action::Despawn,
        };
    }

    Decision {
        intent: Intent::Arrived,
        target_heading: entity.heading,
        combat_target: None,
        combat_distance: 0.0,
        combat_side: None,
        action: Action::None,
    }
}

fn wait_decision(entity: &Entity, now: f64, cfg: &NpcConfig) -> Decision {
    let npc = entity.kind.npc().unwrap();
    let intent = if now - npc.intent_data.wait_started_at >= cfg.wait_timer_s {
        Intent::Travel
    } else {
        Intent::Wait
    };
    Decision {
        intent,
        target_heading: entity.heading,
        combat_target: None,
        combat_distance: 0.0,
        combat_side: None,
        action: Action::None,
    }
}

fn travel_decision(
    self_index: usize,
    entities: &[Entity],
    harbors: &HarborRegistry,
    roles: &RoleTable,
    cfg: &NpcConfig,
    now: f64,
) -> Decision {
    let entity = &entities[self_index];
    let npc = entity.kind.npc().unwrap();
    let role = roles.get(&npc.role);

    if let Some(role) = role {
        // Aggressive roles proactively hunt while travelling; merely
        // combat-capable ones only fight back once attacked (see
        // `register_hit`'s defensive-retaliation transition into Engage).
        if role.combat_aggressive {
            if let Some((target_idx, dist)) = nearest_hostile(self_index, entities, role.engagement_range.min(cfg.max_engagement_range)) {
                let target = &entities[target_idx];
                return Decision {
                    intent: Intent::Engage,
                    target_heading: heading_toward(entity.pos, target.pos),
                    combat_target: Some(target.id),
                    combat_distance: dist,
                    combat_side: Some(firing_side(entity, target)),
                    action: Action::None,
                };
            }
        }
    }

    if let Some(harbor_id) = npc.intent_data.travel_harbor {
        if let Some(harbor) = harbors.get(harbor_id) {
            let dist = entity.pos.dist(harbor.pos);
            if dist <= harbor.radius * cfg.harbor_arrival_mult {
                return Decision {
                    intent: Intent::Arrived,
                    target_heading: entity.heading,
                    combat_target: None,
                    combat_distance: 0.0,
                    combat_side: None,
                    action: Action::None,
                };
            }
            return Decision {
                intent: Intent::Travel,
                target_heading: heading_toward(entity.pos, harbor.pos),
                combat_target: None,
                combat_distance: 0.0,
                combat_side: None,
                action: Action::None,
            };
        }
    }

    Decision {
        intent: Intent::Travel,
        target_heading: entity.heading,
        combat_target: None,
        combat_distance: 0.0,
        combat_side: None,
        action: Action::None,
    }
}

fn engage_decision(
    self_index: usize,
    entities: &[Entity],
    roles: &RoleTable,
    cfg: &NpcConfig,
    projectile_max_distance: f64,
    now: f64,
) -> Decision {
    let entity = &entities[self_index];
    let npc = entity.kind.npc().unwrap();
    let role = roles.get(&npc.role);

    // Non-aggressive roles (TRADER, etc.) only fight back while the memory
    // of being attacked is fresh; once the window lapses with no further
    // hits they give up the chase and resume travelling.
    if role.map(|r| !r.combat_aggressive).unwrap_or(true) && now - npc.last_attack_time > cfg.defensive_retaliation_window_s {
        return Decision {
            intent: Intent::Travel,
            target_heading: entity.heading,
            combat_target: None,
            combat_distance: 0.0,
            combat_side: None,
            action: Action::None,
        };
    }

    let range = role.map(|r| r.engagement_range.min(cfg.max_engagement_range)).unwrap_or(cfg.max_engagement_range);

    let current_target = npc.combat_target.and_then(|id| entities.iter().position(|e| e.id == id));
    let target_idx = current_target
        .filter(|&i| {
            !entities[i].is_sunk()
                && !entities[i].is_raft
                && !entities[i].harbor.in_harbor
                && entities[i].pos.dist(entity.pos) <= range
        })
        .or_else(|| nearest_hostile(self_index, entities, range).map(|(i, _)| i));

    let Some(target_idx) = target_idx else {
        return Decision {
            intent: Intent::Travel,
            target_heading: entity.heading,
            combat_target: None,
            combat_distance: 0.0,
            combat_side: None,
            action: Action::None,
        };
    };

    let target = &entities[target_idx];
    let dist = entity.pos.dist(target.pos);
    let standoff = projectile_max_distance * cfg.combat_standoff_mult;
    let side = firing_side(entity, target);

    // Spread ships converging on the same target around its perimeter
    // instead of stacking on the direct bearing line: each NPC holds its own
    // bucket of entity.id % 3, offsetting its station by a fixed angle
    // around the bearing from the target back to itself.
    let bearing_target_to_self = {
        let delta = entity.pos.sub(target.pos);
        crate::geometry::bearing_to_heading(delta.y.atan2(delta.x))
    };
    let formation_offset = cfg.formation_offsets[(entity.id.0 % 3) as usize];
    let station_bearing = crate::geometry::normalize_angle(bearing_target_to_self + formation_offset);
    let station_dir = crate::geometry::forward_vector(station_bearing);
    let station = Vec2::new(
        target.pos.x + station_dir.x * standoff,
        target.pos.y + station_dir.y * standoff,
    );
    let dist_to_station = entity.pos.dist(station);

    let target_heading = if dist_to_station > standoff * 0.15 {
        heading_toward(entity.pos, station)
    } else {
        // Close enough to station: present the chosen broadside to the target.
        let bearing_heading = heading_toward(entity.pos, target.pos);
        let beam_offset = match side {
            Side::Starboard => -std::f64::consts::FRAC_PI_2,
            Side::Port => std::f64::consts::FRAC_PI_2,
        };
        crate::geometry::normalize_angle(bearing_heading + beam_offset)
    };

    let action = if can_fire_on_target(entity, target, side, cfg, now, dist, standoff) {
        Action::FireBroadside(side)
    } else {
        Action::None
    };

    Decision {
        intent: Intent::Engage,
        target_heading,
        combat_target: Some(target.id),
        combat_distance: dist,
        combat_side: Some(side),
        action,
    }
}

/// Angular difference between the target's bearing and the ship's heading,
/// where +pi/2 is dead abeam to starboard and -pi/2 is dead abeam to port.
fn bearing_offset(entity: &Entity, target: &Entity) -> f64 {
    let delta = target.pos.sub(entity.pos);
    let bearing_heading = crate::geometry::bearing_to_heading(delta.y.atan2(delta.x));
    crate::geometry::angle_diff(bearing_heading, entity.heading)
}

fn can_fire_on_target(entity: &Entity, target: &Entity, side: Side, cfg: &NpcConfig, now: f64, dist: f64, standoff: f64) -> bool {
    if dist > standoff * 1.2 {
        return false;
    }
    if !entity.can_fire(side, now) {
        return false;
    }
    let target_offset = match side {
        Side::Starboard => std::f64::consts::FRAC_PI_2,
        Side::Port => -std::f64::consts::FRAC_PI_2,
    };
    (bearing_offset(entity, target) - target_offset).abs() <= cfg.fire_angle_tolerance
}

fn firing_side(entity: &Entity, target: &Entity) -> Side {
    if bearing_offset(entity, target) >= 0.0 {
        Side::Starboard
    } else {
        Side::Port
    }
}

fn heading_toward(from: Vec2, to: Vec2) -> f64 {
    let delta = to.sub(from);
    crate::geometry::bearing_to_heading(delta.y.atan2(delta.x))
}

fn nearest_hostile(self_index: usize, entities: &[Entity], max_range: f64) -> Option<(usize, f64)> {
    let entity = &entities[self_index];
    entities
        .iter()
        .enumerate()
        .filter(|(i, e)| {
            *i != self_index && !e.is_sunk() && !e.is_raft && !e.harbor.in_harbor && is_hostile_pair(entity, e)
        })
        .map(|(i, e)| (i, entity.pos.dist(e.pos)))
        .filter(|(_, d)| *d <= max_range)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
}

fn is_hostile_pair(a: &Entity, b: &Entity) -> bool {
    // Players are always valid targets for combat-capable NPCs; NPCs of the
    // same role never fight each other.
    match (&a.kind, &b.kind) {
        (crate::entity::EntityKind::Npc(na), crate::entity::EntityKind::Npc(nb)) => na.role != nb.role,
        _ => true,
    }
}

/// Apply a previously computed `Decision` onto the NPC's own fields. Never
/// touches any other entity.
pub fn apply(entity: &mut Entity, decision: &Decision, now: f64) {
    let ai_state_before_sunk = entity.is_sunk();
    let Some(npc) = entity.kind.npc_mut() else { return };

    let entering_new_intent = npc.intent != decision.intent;
    npc.intent = decision.intent;
    npc.desired_heading = decision.target_heading;
    npc.combat_target = decision.combat_target;
    npc.combat_distance = decision.combat_distance;
    npc.combat_side = decision.combat_side;
    npc.combat_active = decision.intent == Intent::Engage;

    if entering_new_intent {
        match decision.intent {
            Intent::Evade => npc.intent_data.evade_started_at = now,
            Intent::Wait => npc.intent_data.wait_started_at = now,
            Intent::Arrived => npc.intent_data.arrived_at = Some(now),
            _ => {}
        }
    }

    npc.ai_state = if ai_state_before_sunk {
        AiState::Despawning
    } else if entity.speed > 0.1 {
        AiState::Sailing
    } else {
        AiState::Stopped
    };
}

/// Records a hostile hit on this NPC so a subsequent `decide()` call can
/// react (retaliation), and immediately switches to EVADE if the hit drops
/// health below the role's flee threshold.
pub fn register_hit(entity: &mut Entity, attacker: EntityId, now: f64, classes: &ShipClassTable, roles: &RoleTable, cfg: &NpcConfig) {
    let health = entity.flagship().map(|s| s.health);
    let max_health = entity.max_health(classes);
    let name = entity.name.clone();
    let Some(npc) = entity.kind.npc_mut() else { return };

    npc.last_attacker = Some(attacker);
    npc.last_attack_time = now;

    let flee_threshold = roles.get(&npc.role).map(|r| r.flee_threshold).unwrap_or(0.0);
    let should_flee = health.map(|h| max_health > 0.0 && h / max_health < flee_threshold).unwrap_or(false);

    if should_flee && npc.intent != Intent::Evade {
        npc.intent = Intent::Evade;
        npc.intent_data.evade_from = Some(attacker);
        npc.intent_data.evade_started_at = now;
        npc.combat_active = false;
        npc.combat_target = Some(attacker);
    } else if npc.intent == Intent::Travel || npc.intent == Intent::Wait {
        npc.intent = Intent::Engage;
        npc.combat_target = Some(attacker);
    }

    // Throttle to once per configured HP bucket crossed so a barrage of
    // hits doesn't spam a log line per shot.
    if let Some(health) = health {
        let bucket = (health / cfg.flee_log_threshold_hp).floor() as i64;
        if bucket < npc.last_logged_health_bucket {
            npc.last_logged_health_bucket = bucket;
            tracing::info!(npc = %name, health, attacker = %attacker, "npc took damage");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::npc::NpcState;
    use crate::shipclass::ShipClassTable;

    fn classes() -> ShipClassTable {
        ShipClassTable::from_json(r#"[{"id":"sloop","max_speed":120.0,"turn_speed":1.5,"max_health":100.0,"cannons_per_side":4,"hitbox_width_factor":0.8,"hitbox_height_factor":1.2,"sprite_size":64.0}]"#).unwrap()
    }

    fn roles() -> RoleTable {
        RoleTable::from_json(r#"[{"name":"PIRATE","allowed_ship_classes":["sloop"],"default_intent":"Travel","combat_capable":true,"combat_aggressive":true,"flee_threshold":0.25,"engagement_range":900.0}]"#).unwrap()
    }

    fn pirate(health: f64) -> Entity {
        Entity {
            id: EntityId(1),
            name: "Corsair".into(),
            kind: EntityKind::Npc(NpcState::new("PIRATE", 0.0, 600.0, 0.0)),
            pos: Vec2::new(0.0, 0.0),
            heading: 0.0,
            speed: 0.0,
            sail_state: 0,
            sail_cooldown: 0.0,
            wind_efficiency: 0.0,
            is_in_deep_water: true,
            fleet: vec![crate::entity::Ship::new("sloop", health)],
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

    #[test]
    fn hit_dropping_below_flee_threshold_switches_to_evade() {
        let mut npc = pirate(20.0);
        npc.kind.npc_mut().unwrap().intent = Intent::Engage;
        register_hit(&mut npc, EntityId(2), 10.0, &classes(), &roles(), &NpcConfig::default());
        let state = npc.kind.npc().unwrap();
        assert_eq!(state.intent, Intent::Evade);
        assert_eq!(state.intent_data.evade_from, Some(EntityId(2)));
        assert!(!state.combat_active);
    }

    #[test]
    fn hit_above_flee_threshold_while_travelling_retaliates_instead_of_fleeing() {
        let mut npc = pirate(90.0);
        register_hit(&mut npc, EntityId(2), 10.0, &classes(), &roles(), &NpcConfig::default());
        let state = npc.kind.npc().unwrap();
        assert_eq!(state.intent, Intent::Engage);
        assert_eq!(state.combat_target, Some(EntityId(2)));
    }

    #[test]
    fn evade_exits_to_travel_once_threat_passes_exit_distance() {
        let mut entity = pirate(20.0);
        {
            let npc = entity.kind.npc_mut().unwrap();
            npc.intent = Intent::Evade;
            npc.intent_data.evade_from = Some(EntityId(2));
            npc.intent_data.evade_started_at = 0.0;
        }
        let threat = {
            let mut t = pirate(100.0);
            t.id = EntityId(2);
            t.pos = Vec2::new(10_000.0, 0.0);
            t
        };
        let entities = vec![entity.clone(), threat];
        let decision = decide(0, &entities, &HarborRegistry::default(), &roles(), &NpcConfig::default(), 520.0, 5.0);
        assert_eq!(decision.intent, Intent::Travel);
    }

    #[test]
    fn engage_station_differs_by_id_bucket() {
        let cfg = NpcConfig::default();
        let target = {
            let mut t = pirate(100.0);
            t.id = EntityId(99);
            t.kind = EntityKind::Player;
            t.pos = Vec2::new(0.0, 600.0);
            t
        };
        let mut attacker_a = pirate(100.0);
        attacker_a.id = EntityId(0);
        let mut attacker_b = attacker_a.clone();
        attacker_b.id = EntityId(1);

        let entities_a = vec![attacker_a, target.clone()];
        let entities_b = vec![attacker_b, target];

        let decision_a = engage_decision(0, &entities_a, &roles(), &cfg, 520.0, 0.0);
        let decision_b = engage_decision(0, &entities_b, &roles(), &cfg, 520.0, 0.0);

        // id 0 and id 1 fall into different formation_offsets buckets, so
        // they steer toward different stations around the same target.
        assert!((decision_a.target_heading - decision_b.target_heading).abs() > 1e-6);
    }

    #[test]
    fn arrived_npc_despawns_after_configured_delay() {
        let cfg = NpcConfig::default();
        let mut npc = pirate(100.0);
        {
            let state = npc.kind.npc_mut().unwrap();
            state.intent = Intent::Arrived;
            state.intent_data.arrived_at = Some(0.0);
        }
        let still_waiting = arrived_decision(&npc, cfg.arrived_despawn_delay_s - 0.01, &cfg);
        assert_eq!(still_waiting.intent, Intent::Arrived);

        let despawns = arrived_decision(&npc, cfg.arrived_despawn_delay_s + 0.01, &cfg);
        assert_eq!(despawns.intent, Intent::Despawning);
    }

    #[test]
    fn defensive_role_abandons_chase_once_retaliation_window_lapses() {
        let cfg = NpcConfig::default();
        let trader_roles = RoleTable::from_json(
            r#"[{"name":"TRADER","allowed_ship_classes":["sloop"],"default_intent":"Travel","combat_capable":true,"combat_aggressive":false,"flee_threshold":0.4,"engagement_range":600.0}]"#,
        )
        .unwrap();

        let mut attacker = pirate(100.0);
        {
            let state = attacker.kind.npc_mut().unwrap();
            state.role = "TRADER".into();
            state.intent = Intent::Engage;
            state.combat_target = Some(EntityId(2));
            state.last_attack_time = 0.0;
        }
        let target = {
            let mut t = pirate(100.0);
            t.id = EntityId(2);
            t.kind = EntityKind::Player;
            t.pos = Vec2::new(0.0, 100.0);
            t
        };
        let entities = vec![attacker.clone(), target];

        let still_chasing = engage_decision(0, &entities, &trader_roles, &cfg, 520.0, cfg.defensive_retaliation_window_s - 0.01);
        assert_eq!(still_chasing.intent, Intent::Engage);

        let gives_up = engage_decision(0, &entities, &trader_roles, &cfg, 520.0, cfg.defensive_retaliation_window_s + 0.01);
        assert_eq!(gives_up.intent, Intent::Travel);
        assert_eq!(gives_up.combat_target, None);
    }

    #[test]
    fn nearest_hostile_skips_docked_and_raft_entities() {
        let mut docked_player = pirate(100.0);
        docked_player.id = EntityId(2);
        docked_player.kind = EntityKind::Player;
        docked_player.pos = Vec2::new(50.0, 0.0);
        docked_player.harbor.in_harbor = true;

        let mut raft_player = pirate(100.0);
        raft_player.id = EntityId(3);
        raft_player.kind = EntityKind::Player;
        raft_player.pos = Vec2::new(0.0, 50.0);
        raft_player.is_raft = true;

        let mut open_water_player = pirate(100.0);
        open_water_player.id = EntityId(4);
        open_water_player.kind = EntityKind::Player;
        open_water_player.pos = Vec2::new(200.0, 0.0);

        let attacker = pirate(100.0);
        let entities = vec![attacker, docked_player, raft_player, open_water_player];

        let (target_idx, _) = nearest_hostile(0, &entities, 1000.0).expect("should find the open-water player");
        assert_eq!(entities[target_idx].id, EntityId(4));
    }
}
