//! Shared fixtures for the integration tests.

use argon2::Params;
use barbarian::game::{GameRules, LootTable, PriceCatalog, Shop};
use barbarian::server::GameActions;
use barbarian::storage::AccountStore;
use std::path::Path;

/// Account store with cheap Argon2 parameters so hashing stays fast in tests.
pub fn fast_store(dir: &Path) -> AccountStore {
    let params = Params::new(1024, 1, 1, None).unwrap();
    AccountStore::open_with_params(dir.join("accounts"), Some(params)).unwrap()
}

/// Action layer with a one-item loot table so scripted rolls are easy to predict.
#[allow(dead_code)]
pub fn torch_actions(dir: &Path) -> GameActions {
    GameActions::from_parts(
        fast_store(dir),
        GameRules::default(),
        LootTable::new(vec!["torch".to_string()]),
        Shop::new(PriceCatalog::default()),
        60,
    )
}
