//! NPC-only state: role reference, intent machine, navigation and combat
//! bookkeeping. The stepping logic lives in `npc_ai`; this module is just
//! the data the state machine reads and writes.

use serde::Deserialize;

use crate::entity::Side;
use crate::ids::{EntityId, HarborId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Intent {
    Travel,
    Engage,
    Evade,
    Wait,
    Arrived,
    Despawning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    Sailing,
    Stopped,
    Despawning,
}

/// Per-intent scratch data. Only the field(s) relevant to the current
/// `Intent` are meaningful at any given time.
#[derive(Debug, Clone, Default)]
pub struct IntentData {
    pub travel_harbor: Option<HarborId>,
    pub evade_from: Option<EntityId>,
    pub evade_started_at: f64,
    pub wait_started_at: f64,
    pub arrived_at: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NpcState {
    pub role: String,
    pub intent: Intent,
    pub intent_data: IntentData,
    pub ai_state: AiState,

    pub desired_heading: f64,
    pub current_heading: f64,
    pub nav_update_counter: u32,
    pub nav_stuck_counter: u32,

    pub combat_active: bool,
    pub combat_target: Option<EntityId>,
    pub combat_distance: f64,
    pub combat_side: Option<Side>,

    pub last_attacker: Option<EntityId>,
    pub last_attack_time: f64,

    pub spawn_time: f64,
    pub max_lifetime: f64,

    /// Throttles the HP-drop log line to once per configured HP threshold.
    pub last_logged_health_bucket: i64,
}

impl NpcState {
    pub fn new(role: impl Into<String>, now: f64, max_lifetime: f64, heading: f64) -> Self {
        Self {
            role: role.into(),
            intent: Intent::Travel,
            intent_data: IntentData::default(),
            ai_state: AiState::Sailing,
            desired_heading: heading,
            current_heading: heading,
            nav_update_counter: 0,
            nav_stuck_counter: 0,
            combat_active: false,
            combat_target: None,
            combat_distance: 0.0,
            combat_side: None,
            last_attacker: None,
            last_attack_time: f64::NEG_INFINITY,
            spawn_time: now,
            max_lifetime,
            last_logged_health_bucket: i64::MAX,
        }
    }
}
