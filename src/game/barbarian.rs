use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard ceiling on a barbarian's purse.
pub const MAX_GOLD: u64 = 1_000_000_000_000;

/// Experience needed to leave `level`.
pub fn xp_threshold(level: u32) -> u64 {
    u64::from(level) * 10
}

/// # Barbarian
///
/// The in-game character carried by a logged-in session. Every game operation takes
/// a `&mut Barbarian`; persistence of the item list is a separate step owned by the
/// caller.
///
/// ## Invariants
///
/// - `gold` never exceeds the configured cap ([`MAX_GOLD`] by default)
/// - after an adventure resolves, `experience < level * 10`
/// - `items` only grows, in acquisition order, duplicates allowed
/// - `level` starts at 1 and never decreases
///
/// ```rust
/// use barbarian::game::Barbarian;
///
/// let hero = Barbarian::new("b1f4".to_string(), vec!["basic_sword".to_string()]);
/// assert_eq!(hero.level, 1);
/// assert_eq!(hero.gold, 0);
/// assert!(hero.has_item("basic_sword"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barbarian {
    pub id: String,
    pub gold: u64,
    pub experience: u64,
    pub level: u32,
    pub items: Vec<String>,
    pub auto_adventure: bool,
    pub last_adventure_time: DateTime<Utc>,
}

impl Barbarian {
    /// Fresh state for a player whose persisted inventory is `items`.
    pub fn new(id: String, items: Vec<String>) -> Self {
        Self::new_at(id, items, Utc::now())
    }

    pub fn new_at(id: String, items: Vec<String>, now: DateTime<Utc>) -> Self {
        Barbarian {
            id,
            gold: 0,
            experience: 0,
            level: 1,
            items,
            auto_adventure: false,
            last_adventure_time: now,
        }
    }

    /// Presence check used by sword bonuses; counts are irrelevant.
    pub fn has_item(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    /// Add gold, saturating at `cap`.
    pub fn add_gold(&mut self, amount: u64, cap: u64) {
        self.gold = self.gold.saturating_add(amount).min(cap);
    }

    /// Experience still needed for the next level.
    pub fn xp_to_next_level(&self) -> u64 {
        xp_threshold(self.level).saturating_sub(self.experience)
    }

    /// Drain experience into levels. Returns how many levels were gained.
    pub fn apply_level_ups(&mut self) -> u32 {
        let mut gained = 0;
        while self.experience >= xp_threshold(self.level) {
            self.experience -= xp_threshold(self.level);
            self.level += 1;
            gained += 1;
        }
        gained
    }

    /// Flip auto-adventure and restart the tick clock at `now`.
    pub fn toggle_auto(&mut self, now: DateTime<Utc>) -> bool {
        self.auto_adventure = !self.auto_adventure;
        self.last_adventure_time = now;
        self.auto_adventure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn hero() -> Barbarian {
        Barbarian::new("id-1".to_string(), Vec::new())
    }

    #[test]
    fn leveling_drains_excess_experience() {
        let mut b = hero();
        b.experience = 10;
        assert_eq!(b.apply_level_ups(), 1);
        assert_eq!((b.level, b.experience), (2, 0));

        // 20 (lvl 2) + 30 (lvl 3) + 5 left over
        b.experience = 55;
        assert_eq!(b.apply_level_ups(), 2);
        assert_eq!((b.level, b.experience), (4, 5));
        assert!(b.experience < xp_threshold(b.level));
    }

    #[test]
    fn gold_saturates_at_cap() {
        let mut b = hero();
        b.gold = MAX_GOLD - 3;
        b.add_gold(10, MAX_GOLD);
        assert_eq!(b.gold, MAX_GOLD);
        b.add_gold(u64::MAX, MAX_GOLD);
        assert_eq!(b.gold, MAX_GOLD);
    }

    #[test]
    fn toggle_resets_clock() {
        let start = Utc::now() - Duration::hours(3);
        let mut b = Barbarian::new_at("id-2".to_string(), Vec::new(), start);
        let now = Utc::now();
        assert!(b.toggle_auto(now));
        assert_eq!(b.last_adventure_time, now);
        assert!(!b.toggle_auto(now));
    }

    #[test]
    fn presence_check() {
        let mut b = hero();
        b.items.push("xp_sword".into());
        b.items.push("xp_sword".into());
        assert!(b.has_item("xp_sword"));
        assert!(!b.has_item("basic_sword"));
        assert_eq!(b.items.len(), 2);
        assert_eq!(b.xp_to_next_level(), 10);
    }
}
