//! Tagged-variant entity model: a single `Entity` carries the fields shared
//! by players and NPCs, plus an `EntityKind` enum for the player/NPC-only
//! data. Shared physics (kinematics, collision) reads/writes the common
//! fields only; AI and gateway code reach into `EntityKind::Npc`/`Player`.

use game_types::{InputMessage, Vec2};

use crate::ids::{EntityId, HarborId};
use crate::npc::NpcState;
use crate::shipclass::ShipClassTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Port,
    Starboard,
}

/// One hull in a fleet. `fleet[0]` is always the flagship when non-empty.
#[derive(Debug, Clone)]
pub struct Ship {
    pub class_id: String,
    pub health: f64,
    pub sunk: bool,
}

impl Ship {
    pub fn new(class_id: impl Into<String>, max_health: f64) -> Self {
        Self {
            class_id: class_id.into(),
            health: max_health,
            sunk: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HarborState {
    pub in_harbor: bool,
    pub docked_harbor_id: Option<HarborId>,
    pub near_harbor: bool,
}

#[derive(Debug, Clone)]
pub enum EntityKind {
    Player,
    Npc(NpcState),
}

impl EntityKind {
    pub fn is_player(&self) -> bool {
        matches!(self, EntityKind::Player)
    }

    pub fn is_npc(&self) -> bool {
        matches!(self, EntityKind::Npc(_))
    }

    pub fn npc(&self) -> Option<&NpcState> {
        match self {
            EntityKind::Npc(n) => Some(n),
            _ => None,
        }
    }

    pub fn npc_mut(&mut self) -> Option<&mut NpcState> {
        match self {
            EntityKind::Npc(n) => Some(n),
            _ => None,
        }
    }
}

/// A ship at sea: either a player's or an NPC's presence in the world.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,

    pub pos: Vec2,
    pub heading: f64,
    pub speed: f64,
    pub sail_state: u8,
    pub sail_cooldown: f64,
    pub wind_efficiency: f64,
    pub is_in_deep_water: bool,

    /// Ordered fleet; index 0 is the flagship.
    pub fleet: Vec<Ship>,
    pub is_raft: bool,

    pub shield_until: Option<f64>,
    pub harbor: HarborState,

    /// Last-shot timestamps, indexed by `Side as usize` (Port=0, Starboard=1).
    pub last_shot: [f64; 2],
    pub fire_rate: f64,

    pub input: InputMessage,

    /// Consecutive land-contact ticks; NPCs despawn at the configured max.
    pub consecutive_collisions: u32,

    /// Set when some other phase decided this entity must leave the world
    /// at the end of the tick (sunk, despawned, disconnected).
    pub pending_removal: bool,
}

impl Entity {
    pub fn flagship(&self) -> Option<&Ship> {
        self.fleet.first()
    }

    pub fn flagship_mut(&mut self) -> Option<&mut Ship> {
        self.fleet.first_mut()
    }

    pub fn is_sunk(&self) -> bool {
        self.flagship().map(|s| s.sunk).unwrap_or(true)
    }

    pub fn has_shield(&self, now: f64) -> bool {
        self.shield_until.map(|t| now < t).unwrap_or(false)
    }

    pub fn max_health(&self, classes: &ShipClassTable) -> f64 {
        self.flagship()
            .and_then(|s| classes.get(&s.class_id))
            .map(|c| c.max_health)
            .unwrap_or(0.0)
    }

    pub fn cannons_per_side(&self, classes: &ShipClassTable) -> u32 {
        if self.is_raft {
            return 0;
        }
        self.flagship()
            .and_then(|s| classes.get(&s.class_id))
            .map(|c| c.cannons_per_side)
            .unwrap_or(0)
    }

    pub fn last_shot_for(&self, side: Side) -> f64 {
        self.last_shot[side as usize]
    }

    pub fn set_last_shot(&mut self, side: Side, at: f64) {
        self.last_shot[side as usize] = at;
    }

    pub fn can_fire(&self, side: Side, now: f64) -> bool {
        !self.is_raft
            && !self.is_sunk()
            && !self.has_shield(now)
            && now - self.last_shot_for(side) >= self.fire_rate
    }

    /// Apply damage, honoring shield/raft immunity. Returns true if damage
    /// was actually applied.
    pub fn apply_damage(&mut self, amount: f64, now: f64) -> bool {
        if self.is_raft || self.has_shield(now) {
            return false;
        }
        if let Some(ship) = self.flagship_mut() {
            ship.health = (ship.health - amount).max(0.0);
            if ship.health <= 0.0 {
                ship.sunk = true;
            }
            true
        } else {
            false
        }
    }
}
