//! Process-wide game counters, served as JSON at `/metrics` and logged at shutdown.
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

static MANUAL_ADVENTURES: AtomicU64 = AtomicU64::new(0);
static CATCH_UP_ADVENTURES: AtomicU64 = AtomicU64::new(0);
static CATCH_UP_PASSES: AtomicU64 = AtomicU64::new(0);
static PURCHASES_OK: AtomicU64 = AtomicU64::new(0);
static PURCHASES_FAILED: AtomicU64 = AtomicU64::new(0);
static LOGINS_OK: AtomicU64 = AtomicU64::new(0);
static LOGINS_FAILED: AtomicU64 = AtomicU64::new(0);
static ACCOUNTS_CREATED: AtomicU64 = AtomicU64::new(0);
static GOLD_AWARDED: AtomicU64 = AtomicU64::new(0);

pub fn inc_manual_adventure(gold: u64) {
    MANUAL_ADVENTURES.fetch_add(1, Ordering::Relaxed);
    GOLD_AWARDED.fetch_add(gold, Ordering::Relaxed);
}

pub fn record_catch_up(adventures: u64, gold: u64) {
    CATCH_UP_PASSES.fetch_add(1, Ordering::Relaxed);
    CATCH_UP_ADVENTURES.fetch_add(adventures, Ordering::Relaxed);
    GOLD_AWARDED.fetch_add(gold, Ordering::Relaxed);
}

pub fn inc_purchase(ok: bool) {
    if ok {
        PURCHASES_OK.fetch_add(1, Ordering::Relaxed);
    } else {
        PURCHASES_FAILED.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn inc_login(ok: bool) {
    if ok {
        LOGINS_OK.fetch_add(1, Ordering::Relaxed);
    } else {
        LOGINS_FAILED.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn inc_account_created() {
    ACCOUNTS_CREATED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct Snapshot {
    pub manual_adventures: u64,
    pub catch_up_adventures: u64,
    pub catch_up_passes: u64,
    pub purchases_ok: u64,
    pub purchases_failed: u64,
    pub logins_ok: u64,
    pub logins_failed: u64,
    pub accounts_created: u64,
    pub gold_awarded: u64,
    /// Filled in by the server from its session map.
    pub active_sessions: usize,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        manual_adventures: MANUAL_ADVENTURES.load(Ordering::Relaxed),
        catch_up_adventures: CATCH_UP_ADVENTURES.load(Ordering::Relaxed),
        catch_up_passes: CATCH_UP_PASSES.load(Ordering::Relaxed),
        purchases_ok: PURCHASES_OK.load(Ordering::Relaxed),
        purchases_failed: PURCHASES_FAILED.load(Ordering::Relaxed),
        logins_ok: LOGINS_OK.load(Ordering::Relaxed),
        logins_failed: LOGINS_FAILED.load(Ordering::Relaxed),
        accounts_created: ACCOUNTS_CREATED.load(Ordering::Relaxed),
        gold_awarded: GOLD_AWARDED.load(Ordering::Relaxed),
        active_sessions: 0,
    }
}
