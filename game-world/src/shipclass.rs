//! The immutable ship class table, loaded once at startup.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ShipClass {
    pub id: String,
    pub max_speed: f64,
    pub turn_speed: f64,
    pub max_health: f64,
    pub cannons_per_side: u32,
    pub hitbox_width_factor: f64,
    pub hitbox_height_factor: f64,
    pub sprite_size: f64,
    /// Rafts carry zero cannons and ignore all damage (see
    /// `Entity::apply_damage`/`Entity::can_fire`). A ship class is a raft
    /// only if this is set, not merely by having zero cannons, since a
    /// becalmed galleon with cannons still mounted shouldn't count.
    #[serde(default)]
    pub is_raft: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ShipClassTable {
    classes: HashMap<String, ShipClass>,
}

impl ShipClassTable {
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        let list: Vec<ShipClass> = serde_json::from_str(data)?;
        let classes = list.into_iter().map(|c| (c.id.clone(), c)).collect();
        Ok(Self { classes })
    }

    pub fn get(&self, id: &str) -> Option<&ShipClass> {
        self.classes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.classes.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShipClass> {
        self.classes.values()
    }
}
