//! One adventure: roll gold and experience, find an item, apply sword bonuses, level up.

use serde::{Deserialize, Serialize};

use super::barbarian::Barbarian;
use super::rewards::LootTable;
use super::rng::RandomSource;

pub const BASE_GOLD_MIN: u64 = 5;
pub const BASE_GOLD_MAX: u64 = 15;
pub const XP_MIN: u64 = 1;
pub const XP_MAX: u64 = 5;

pub const BASIC_SWORD: &str = "basic_sword";
pub const SILVER_SWORD: &str = "silver_sword";
pub const GOLDEN_SWORD: &str = "golden_sword";
pub const XP_SWORD: &str = "xp_sword";

/// What a single adventure paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureOutcome {
    pub gold_earned: u64,
    pub xp_earned: u64,
    pub item: Option<String>,
    pub levels_gained: u32,
}

impl AdventureOutcome {
    /// The `(gold, xp)` pair credited by this adventure.
    pub fn earnings(&self) -> (u64, u64) {
        (self.gold_earned, self.xp_earned)
    }
}

/// Gold and experience bonuses from the swords a barbarian carries.
///
/// Each sword counts once regardless of how many copies are held, and all
/// bonuses stack.
pub fn sword_bonuses(barbarian: &Barbarian, base_gold: u64) -> (u64, u64) {
    let mut gold = 0;
    let mut xp = 0;
    if barbarian.has_item(BASIC_SWORD) {
        gold += 5;
    }
    if barbarian.has_item(SILVER_SWORD) {
        gold += base_gold * 20 / 100;
    }
    if barbarian.has_item(GOLDEN_SWORD) {
        gold += 10 + base_gold * 10 / 100;
    }
    if barbarian.has_item(XP_SWORD) {
        xp += 2;
    }
    (gold, xp)
}

/// Run one adventure against `barbarian`.
///
/// The found item is appended before bonuses are checked, so a sword that drops
/// on this adventure already counts.
pub fn go_on_adventure(
    barbarian: &mut Barbarian,
    loot: &LootTable,
    max_gold: u64,
    rng: &mut impl RandomSource,
) -> AdventureOutcome {
    let base_gold = rng.roll(BASE_GOLD_MIN, BASE_GOLD_MAX);
    let mut xp_earned = rng.roll(XP_MIN, XP_MAX);

    let item = loot.generate(rng);
    if let Some(found) = &item {
        barbarian.items.push(found.clone());
    }

    let (bonus_gold, bonus_xp) = sword_bonuses(barbarian, base_gold);
    let gold_earned = base_gold + bonus_gold;
    xp_earned += bonus_xp;

    barbarian.add_gold(gold_earned, max_gold);
    barbarian.experience = barbarian.experience.saturating_add(xp_earned);
    let levels_gained = barbarian.apply_level_ups();

    AdventureOutcome {
        gold_earned,
        xp_earned,
        item,
        levels_gained,
    }
}
