//! Reward table: dotted-key lookup (e.g. `COMBAT.PIRATE_SUNK`) to a
//! gold/xp payout, applied to a player's wallet on mission or combat
//! completion.

use std::collections::HashMap;

use serde::Deserialize;

use game_types::TransactionResult;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RewardEntry {
    pub gold: u64,
    pub xp: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RewardTable {
    entries: HashMap<String, RewardEntry>,
}

impl RewardTable {
    /// Parses a flat JSON object keyed by dotted reward key, e.g.
    /// `{"COMBAT.PIRATE_SUNK": {"gold": 10, "xp": 5}}`.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        let entries: HashMap<String, RewardEntry> = serde_json::from_str(data)?;
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<RewardEntry> {
        self.entries.get(key).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Wallet {
    pub gold: u64,
    pub xp: u64,
}

impl Wallet {
    pub fn credit(&mut self, entry: RewardEntry) {
        self.gold += entry.gold;
        self.xp += entry.xp;
    }
}

/// Looks up `key`, credits `wallet` if found, and builds the client-facing
/// result. An unknown key is a no-op reported as a failed transaction
/// rather than a panic, since reward keys can originate from data files.
pub fn apply_reward(wallet: &mut Wallet, table: &RewardTable, key: &str) -> TransactionResult {
    match table.get(key) {
        Some(entry) => {
            wallet.credit(entry);
            TransactionResult { success: true, message: format!("+{}g +{}xp", entry.gold, entry.xp) }
        }
        None => TransactionResult { success: false, message: format!("unknown reward key: {key}") },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_dotted_key_and_credits_wallet() {
        let table = RewardTable::from_json(r#"{"COMBAT.PIRATE_SUNK": {"gold": 10, "xp": 5}}"#).unwrap();
        let mut wallet = Wallet::default();
        let result = apply_reward(&mut wallet, &table, "COMBAT.PIRATE_SUNK");
        assert!(result.success);
        assert_eq!(wallet.gold, 10);
        assert_eq!(wallet.xp, 5);
    }

    #[test]
    fn unknown_key_is_reported_without_panicking() {
        let table = RewardTable::default();
        let mut wallet = Wallet::default();
        let result = apply_reward(&mut wallet, &table, "NOPE.MISSING");
        assert!(!result.success);
        assert_eq!(wallet.gold, 0);
    }
}
