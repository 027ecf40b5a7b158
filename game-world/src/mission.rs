//! Per-player mission mailbox. One active mission at a time; the tick
//! orchestrator feeds it world events and reads back completions to emit
//! `missionComplete` to the client.

use game_types::{MissionSnapshot, Vec2};

use crate::ids::{EntityId, HarborId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Active,
    Success,
    Failed,
}

#[derive(Debug, Clone)]
pub enum Kind {
    SailToHarbor { harbor: HarborId },
    Escort { target: EntityId },
    DefeatNpcs { remaining: u32 },
    StayInArea { center: Vec2, radius: f64, elapsed_s: f64, duration_s: f64 },
}

#[derive(Debug, Clone)]
pub struct Mission {
    pub kind: Kind,
    pub status: Status,
    pub reward_key: String,
}

impl Mission {
    pub fn sail_to_harbor(harbor: HarborId, reward_key: impl Into<String>) -> Self {
        Self { kind: Kind::SailToHarbor { harbor }, status: Status::Active, reward_key: reward_key.into() }
    }

    pub fn escort(target: EntityId, reward_key: impl Into<String>) -> Self {
        Self { kind: Kind::Escort { target }, status: Status::Active, reward_key: reward_key.into() }
    }

    pub fn defeat_npcs(count: u32, reward_key: impl Into<String>) -> Self {
        Self { kind: Kind::DefeatNpcs { remaining: count }, status: Status::Active, reward_key: reward_key.into() }
    }

    pub fn stay_in_area(center: Vec2, radius: f64, duration_s: f64, reward_key: impl Into<String>) -> Self {
        Self {
            kind: Kind::StayInArea { center, radius, elapsed_s: 0.0, duration_s },
            status: Status::Active,
            reward_key: reward_key.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// React to a player arriving at their docked harbor.
    pub fn on_arrived(&mut self, harbor: HarborId) {
        if let Kind::SailToHarbor { harbor: target } = self.kind {
            if target == harbor {
                self.status = Status::Success;
            }
        }
    }

    /// React to an NPC sinking, attributed to `killer`.
    pub fn on_npc_sunk(&mut self, killer: EntityId, owner: EntityId) {
        if killer != owner {
            return;
        }
        if let Kind::DefeatNpcs { remaining } = &mut self.kind {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.status = Status::Success;
            }
        }
    }

    /// React to the escorted entity being removed from the world (sunk or
    /// disconnected) before the mission otherwise completed.
    pub fn on_escort_target_lost(&mut self, lost: EntityId) {
        if let Kind::Escort { target } = self.kind {
            if target == lost {
                self.status = Status::Failed;
            }
        }
    }

    /// React to the escorted entity reaching safety (docked at a harbor)
    /// while still alive.
    pub fn on_escort_target_docked(&mut self, docked: EntityId) {
        if let Kind::Escort { target } = self.kind {
            if target == docked {
                self.status = Status::Success;
            }
        }
    }

    pub fn tick(&mut self, owner_pos: Vec2, dt: f64) {
        if let Kind::StayInArea { center, radius, elapsed_s, duration_s } = &mut self.kind {
            if owner_pos.dist(*center) <= *radius {
                *elapsed_s += dt;
                if *elapsed_s >= *duration_s {
                    self.status = Status::Success;
                }
            } else {
                *elapsed_s = 0.0;
            }
        }
    }

    pub fn snapshot(&self) -> MissionSnapshot {
        let (kind, progress) = match &self.kind {
            Kind::SailToHarbor { .. } => ("SAIL_TO_HARBOR".to_string(), None),
            Kind::Escort { .. } => ("ESCORT".to_string(), None),
            Kind::DefeatNpcs { remaining } => ("DEFEAT_NPCS".to_string(), Some(remaining.to_string())),
            Kind::StayInArea { elapsed_s, duration_s, .. } => {
                ("STAY_IN_AREA".to_string(), Some(format!("{elapsed_s:.0}/{duration_s:.0}")))
            }
        };
        let status = match self.status {
            Status::Active => "ACTIVE",
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
        };
        MissionSnapshot { kind, status: status.to_string(), progress }
    }
}

/// One mailbox slot per player id.
#[derive(Debug, Clone, Default)]
pub struct MissionManager {
    active: std::collections::HashMap<EntityId, Mission>,
}

impl MissionManager {
    pub fn assign(&mut self, player: EntityId, mission: Mission) {
        self.active.insert(player, mission);
    }

    pub fn get(&self, player: EntityId) -> Option<&Mission> {
        self.active.get(&player)
    }

    pub fn get_mut(&mut self, player: EntityId) -> Option<&mut Mission> {
        self.active.get_mut(&player)
    }

    pub fn remove(&mut self, player: EntityId) -> Option<Mission> {
        self.active.remove(&player)
    }

    /// Drains missions that resolved to SUCCESS this tick, returning their
    /// owner and reward key so the caller can apply rewards and clear the
    /// mailbox slot.
    pub fn drain_completed(&mut self) -> Vec<(EntityId, String)> {
        let done: Vec<EntityId> = self
            .active
            .iter()
            .filter(|(_, m)| m.status == Status::Success)
            .map(|(id, _)| *id)
            .collect();
        done.into_iter()
            .filter_map(|id| self.active.remove(&id).map(|m| (id, m.reward_key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sail_to_harbor_succeeds_on_matching_arrival() {
        let mut m = Mission::sail_to_harbor(HarborId(3), "TRAVEL.DELIVERY");
        m.on_arrived(HarborId(1));
        assert!(m.is_active());
        m.on_arrived(HarborId(3));
        assert_eq!(m.status, Status::Success);
    }

    #[test]
    fn defeat_npcs_counts_down_and_completes() {
        let mut m = Mission::defeat_npcs(2, "COMBAT.CLEAR_NPCS");
        let player = EntityId(1);
        m.on_npc_sunk(player, player);
        assert!(m.is_active());
        m.on_npc_sunk(player, player);
        assert_eq!(m.status, Status::Success);
    }

    #[test]
    fn escort_fails_when_target_lost_and_succeeds_when_docked() {
        let target = EntityId(9);
        let mut m = Mission::escort(target, "ESCORT.COMPLETE");
        m.on_escort_target_lost(EntityId(1));
        assert!(m.is_active());
        m.on_escort_target_docked(target);
        assert_eq!(m.status, Status::Success);

        let mut failed = Mission::escort(target, "ESCORT.COMPLETE");
        failed.on_escort_target_lost(target);
        assert_eq!(failed.status, Status::Failed);
    }

    #[test]
    fn manager_drains_only_successful_missions() {
        let mut mgr = MissionManager::default();
        let p1 = EntityId(1);
        let p2 = EntityId(2);
        mgr.assign(p1, Mission::sail_to_harbor(HarborId(1), "A"));
        mgr.assign(p2, Mission::sail_to_harbor(HarborId(2), "B"));
        mgr.get_mut(p1).unwrap().on_arrived(HarborId(1));
        let done = mgr.drain_completed();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].0, p1);
        assert!(mgr.get(p1).is_none());
        assert!(mgr.get(p2).is_some());
    }
}
