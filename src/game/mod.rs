//! # Game Core
//!
//! The adventure, reward, leveling and shop rules. Nothing in here touches the
//! network, the session map or the account store; every operation takes the
//! player's [`Barbarian`] by mutable reference and an injected [`RandomSource`].
//!
//! - [`rewards`] - loot table and item drops
//! - [`adventure`] - a single adventure with sword bonuses and leveling
//! - [`catch_up`] - replaying adventures owed for elapsed time
//! - [`shop`] - buying swords with gold
//! - [`barbarian`] - the player state record
//! - [`rng`] - random source abstraction
//!
//! ```rust
//! use barbarian::game::{go_on_adventure, Barbarian, LootTable, ScriptedRolls, MAX_GOLD};
//!
//! let mut hero = Barbarian::new("p1".to_string(), vec!["golden_sword".to_string()]);
//! let mut rolls = ScriptedRolls::new(vec![10, 2, 0]);
//! let outcome = go_on_adventure(&mut hero, &LootTable::default(), MAX_GOLD, &mut rolls);
//! assert_eq!(outcome.gold_earned, 21);
//! ```

pub mod adventure;
pub mod barbarian;
pub mod catch_up;
pub mod rewards;
pub mod rng;
pub mod shop;

pub use adventure::{go_on_adventure, sword_bonuses, AdventureOutcome};
pub use barbarian::{xp_threshold, Barbarian, MAX_GOLD};
pub use catch_up::{adventures_due, calculate_and_simulate_adventures, CatchUpReport};
pub use rewards::LootTable;
pub use rng::{RandomSource, ScriptedRolls};
pub use shop::{PriceCatalog, Purchase, Shop, ShopError};

/// Tunables shared by the adventure and catch-up code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub max_gold: u64,
    pub adventure_interval_secs: u64,
    /// 0 replays every elapsed interval.
    pub max_catch_up_adventures: u64,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            max_gold: MAX_GOLD,
            adventure_interval_secs: 5,
            max_catch_up_adventures: 0,
        }
    }
}
