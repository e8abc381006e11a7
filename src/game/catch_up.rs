//! Catch-up progression.
//!
//! Auto-adventuring has no background timer. Instead, the next time a player's
//! state is read we replay one adventure per elapsed interval since the last
//! processed tick and move the tick clock to `now`. Leftover time shorter than one
//! interval is dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::adventure::go_on_adventure;
use super::barbarian::Barbarian;
use super::rewards::LootTable;
use super::rng::RandomSource;
use super::GameRules;

/// Summary of one catch-up pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchUpReport {
    pub elapsed_seconds: i64,
    pub adventures: u64,
    pub gold_earned: u64,
    pub xp_earned: u64,
    pub levels_gained: u32,
    pub items_found: Vec<String>,
}

/// Number of whole intervals in `elapsed_seconds`, capped at `max` unless `max` is 0.
pub fn adventures_due(elapsed_seconds: i64, interval_secs: u64, max: u64) -> u64 {
    if elapsed_seconds <= 0 || interval_secs == 0 {
        return 0;
    }
    let due = elapsed_seconds as u64 / interval_secs;
    if max == 0 {
        due
    } else {
        due.min(max)
    }
}

/// Replay the adventures owed since `last_adventure_time` and stamp the clock with `now`.
pub fn calculate_and_simulate_adventures(
    barbarian: &mut Barbarian,
    now: DateTime<Utc>,
    rules: &GameRules,
    loot: &LootTable,
    rng: &mut impl RandomSource,
) -> CatchUpReport {
    let elapsed_seconds = now
        .signed_duration_since(barbarian.last_adventure_time)
        .num_seconds();
    let count = adventures_due(
        elapsed_seconds,
        rules.adventure_interval_secs,
        rules.max_catch_up_adventures,
    );

    let mut report = CatchUpReport {
        elapsed_seconds: elapsed_seconds.max(0),
        ..CatchUpReport::default()
    };
    for _ in 0..count {
        let out = go_on_adventure(barbarian, loot, rules.max_gold, rng);
        report.adventures += 1;
        report.gold_earned = report.gold_earned.saturating_add(out.gold_earned);
        report.xp_earned = report.xp_earned.saturating_add(out.xp_earned);
        report.levels_gained += out.levels_gained;
        if let Some(item) = out.item {
            report.items_found.push(item);
        }
    }

    barbarian.last_adventure_time = now;
    report
}
