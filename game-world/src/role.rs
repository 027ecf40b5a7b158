//! The immutable NPC role table (TRADER, PIRATE, PATROL, ...).

use std::collections::HashMap;

use serde::Deserialize;

use crate::npc::Intent;

#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    pub name: String,
    pub allowed_ship_classes: Vec<String>,
    pub default_intent: Intent,
    pub combat_capable: bool,
    pub combat_aggressive: bool,
    pub flee_threshold: f64,
    pub engagement_range: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: HashMap<String, Role>,
}

impl RoleTable {
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        let list: Vec<Role> = serde_json::from_str(data)?;
        let roles = list.into_iter().map(|r| (r.name.clone(), r)).collect();
        Ok(Self { roles })
    }

    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_role_table() {
        let json = r#"[{"name":"PIRATE","allowed_ship_classes":["sloop"],"default_intent":"Travel","combat_capable":true,"combat_aggressive":true,"flee_threshold":0.25,"engagement_range":900.0}]"#;
        let table = RoleTable::from_json(json).unwrap();
        let pirate = table.get("PIRATE").unwrap();
        assert!(pirate.combat_aggressive);
        assert_eq!(pirate.flee_threshold, 0.25);
    }
}
