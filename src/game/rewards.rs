//! Adventure loot.
//!
//! Each adventure yields one item drawn uniformly from a [`LootTable`]. The table is
//! plain data so the server can load it from config and tests can supply their own.

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;

/// Trinkets found on an ordinary adventure.
pub const DEFAULT_LOOT: [&str; 10] = [
    "rusty_dagger",
    "leather_boots",
    "wooden_shield",
    "health_potion",
    "iron_helmet",
    "lucky_coin",
    "wolf_pelt",
    "torch",
    "bone_necklace",
    "tattered_map",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootTable {
    items: Vec<String>,
}

impl LootTable {
    pub fn new(items: Vec<String>) -> Self {
        LootTable { items }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    /// Draw one item. An empty table yields `None`.
    pub fn generate(&self, rng: &mut impl RandomSource) -> Option<String> {
        if self.items.is_empty() {
            return None;
        }
        let idx = rng.pick_index(self.items.len());
        self.items.get(idx).cloned()
    }
}

impl Default for LootTable {
    fn default() -> Self {
        LootTable::new(DEFAULT_LOOT.iter().map(|s| s.to_string()).collect())
    }
}
