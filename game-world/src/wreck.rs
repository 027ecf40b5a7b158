//! Wrecks: what's left after a ship sinks. Lootable by anyone once the
//! owner's priority window has passed; expire after their total lifetime.

use game_types::Vec2;

use crate::config::WreckConfig;
use crate::ids::{EntityId, WreckId};

#[derive(Debug, Clone)]
pub struct Wreck {
    pub id: WreckId,
    pub pos: Vec2,
    pub rotation: f64,
    pub owner: Option<EntityId>,
    pub created_at: f64,
}

impl Wreck {
    pub fn new(id: WreckId, pos: Vec2, rotation: f64, owner: Option<EntityId>, now: f64) -> Self {
        Self { id, pos, rotation, owner, created_at: now }
    }

    /// Only the owner may loot during `owner_loot_window_s`; open to anyone
    /// after that, until `total_life_s` expires the wreck entirely.
    pub fn can_be_looted_by(&self, looter: EntityId, now: f64, cfg: &WreckConfig) -> bool {
        if now - self.created_at >= cfg.total_life_s {
            return false;
        }
        match self.owner {
            Some(owner) if owner != looter => now - self.created_at >= cfg.owner_loot_window_s,
            _ => true,
        }
    }

    pub fn is_expired(&self, now: f64, cfg: &WreckConfig) -> bool {
        now - self.created_at >= cfg.total_life_s
    }

    pub fn is_owner_loot(&self, now: f64, cfg: &WreckConfig) -> bool {
        now - self.created_at < cfg.owner_loot_window_s && self.owner.is_some()
    }
}
