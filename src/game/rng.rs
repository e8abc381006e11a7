//! Random source used by the adventure and reward code.
//!
//! Everything that rolls dice goes through [`RandomSource`] so tests can drive the
//! simulation with a seeded generator or a fixed script of rolls.

use rand::Rng;

/// Source of the dice rolls an adventure needs.
pub trait RandomSource {
    /// Uniform integer in `low..=high`.
    fn roll(&mut self, low: u64, high: u64) -> u64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn roll(&mut self, low: u64, high: u64) -> u64 {
        self.gen_range(low..=high)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Replays a fixed list of rolls in order, clamping each to the requested range.
///
/// Index picks consume from the same script. Once the script runs out every roll
/// returns the low end of its range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    rolls: Vec<u64>,
    cursor: usize,
}

impl ScriptedRolls {
    pub fn new(rolls: Vec<u64>) -> Self {
        Self {
            rolls,
            cursor: 0,
        }
    }

    fn next_raw(&mut self) -> Option<u64> {
        let value = self.rolls.get(self.cursor).copied();
        if value.is_some() {
            self.cursor += 1;
        }
        value
    }
}

impl RandomSource for ScriptedRolls {
    fn roll(&mut self, low: u64, high: u64) -> u64 {
        self.next_raw().map_or(low, |v| v.clamp(low, high))
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.next_raw()
            .map_or(0, |v| (v as usize).min(len.saturating_sub(1)))
    }
}
