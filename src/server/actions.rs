//! The game's action surface, independent of HTTP.
//!
//! Every state-changing action follows the same shape: copy the barbarian out of
//! the session map, run exactly one game operation on it, persist what needs
//! persisting, write it back. Two racing actions on the same session resolve
//! last-write-wins.
//!
//! Store calls (Argon2 hashing, sled flushes) run on the blocking pool.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::Mutex;

use super::errors::{ActionError, AuthError};
use super::session::SessionStore;
use crate::config::Config;
use crate::game::{
    calculate_and_simulate_adventures, go_on_adventure, AdventureOutcome, Barbarian,
    CatchUpReport, GameRules, LootTable, Purchase, RandomSource, Shop,
};
use crate::logutil::{escape_log, short_token};
use crate::metrics;
use crate::storage::{AccountRecord, AccountStore, StoreError};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub player_id: String,
    pub username: String,
}

pub struct GameActions {
    store: AccountStore,
    sessions: Mutex<SessionStore>,
    rules: GameRules,
    loot: LootTable,
    shop: Shop,
}

impl GameActions {
    pub fn new(store: AccountStore, config: &Config) -> Self {
        Self::from_parts(
            store,
            config.game.rules(),
            config.game.loot(),
            Shop::new(config.game.catalog()),
            config.server.session_timeout,
        )
    }

    pub fn from_parts(
        store: AccountStore,
        rules: GameRules,
        loot: LootTable,
        shop: Shop,
        session_timeout: u32,
    ) -> Self {
        GameActions {
            store,
            sessions: Mutex::new(SessionStore::new(session_timeout)),
            rules,
            loot,
            shop,
        }
    }

    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Run a store call on the blocking pool.
    async fn blocking<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: FnOnce(&AccountStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || call(&store))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Register a new account and return its id.
    pub async fn create_account(&self, username: &str, password: &str) -> Result<String, StoreError> {
        let registered = self
            .blocking({
                let username = username.to_string();
                let password = password.to_string();
                move |store: &AccountStore| store.register_user(&username, &password)
            })
            .await;
        match registered {
            Ok(account) => {
                metrics::inc_account_created();
                info!(
                    "Account created: {} ({})",
                    escape_log(&account.username),
                    account.id
                );
                Ok(account.id)
            }
            Err(e) => {
                if e.is_user_error() {
                    debug!("Registration refused for {}: {}", escape_log(username), e);
                } else {
                    warn!("Registration failed for {}: {}", escape_log(username), e);
                }
                Err(e)
            }
        }
    }

    async fn check_credentials(&self, username: &str, password: &str) -> Result<AccountRecord, AuthError> {
        let (account, ok) = self
            .blocking({
                let username = username.to_string();
                let password = password.to_string();
                move |store: &AccountStore| store.verify_user_password(&username, &password)
            })
            .await?;
        let result = match account {
            None => Err(AuthError::UnknownUser),
            Some(_) if !ok => Err(AuthError::BadPassword),
            Some(account) => Ok(account),
        };
        match &result {
            Ok(_) => metrics::inc_login(true),
            Err(e) => {
                metrics::inc_login(false);
                warn!(target: "security", "Login failed for {}: {:?}", escape_log(username), e);
            }
        }
        result
    }

    /// Check credentials and return the player id.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, AuthError> {
        self.check_credentials(username, password).await.map(|a| a.id)
    }

    /// Authenticate and open a session seeded from the persisted item list.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let account = self.check_credentials(username, password).await?;
        let account = self
            .blocking(move |store: &AccountStore| store.record_login(&account.id))
            .await?;
        let token = self.sessions.lock().await.create(&account);
        info!(
            "Login: {} session {}",
            escape_log(&account.username),
            short_token(&token)
        );
        Ok(LoginOutcome {
            token,
            player_id: account.id,
            username: account.username,
        })
    }

    pub async fn logout(&self, token: &str) -> bool {
        match self.sessions.lock().await.remove(token) {
            Some(session) => {
                info!(
                    "Logout: {} after {} minutes",
                    escape_log(&session.username),
                    session.session_duration().num_minutes()
                );
                true
            }
            None => false,
        }
    }

    async fn load(&self, token: &str) -> Result<Barbarian, ActionError> {
        let mut sessions = self.sessions.lock().await;
        sessions.prune_idle(Utc::now());
        sessions.load(token).ok_or(ActionError::MissingPlayer)
    }

    async fn save(&self, token: &str, barbarian: Barbarian) -> Result<(), ActionError> {
        if self.sessions.lock().await.store(token, barbarian) {
            Ok(())
        } else {
            Err(ActionError::MissingPlayer)
        }
    }

    /// Write the barbarian back to its session, then its item list to the store.
    /// Nothing is persisted for a session that has gone away.
    async fn save_and_persist(&self, token: &str, barbarian: Barbarian) -> Result<(), ActionError> {
        self.save(token, barbarian.clone()).await?;
        self.blocking(move |store: &AccountStore| {
            store.save_items(&barbarian.id, &barbarian.items)
        })
        .await?;
        Ok(())
    }

    /// Current state without running any simulation.
    pub async fn state(&self, token: &str) -> Result<Barbarian, ActionError> {
        self.load(token).await
    }

    pub async fn username(&self, token: &str) -> Option<String> {
        self.sessions
            .lock()
            .await
            .get(token)
            .map(|s| s.username.clone())
    }

    /// One manual adventure. The item list is persisted once the session is updated.
    pub async fn do_adventure(
        &self,
        token: &str,
        rng: &mut impl RandomSource,
    ) -> Result<AdventureOutcome, ActionError> {
        let mut barbarian = self.load(token).await?;
        let outcome = go_on_adventure(&mut barbarian, &self.loot, self.rules.max_gold, rng);
        metrics::inc_manual_adventure(outcome.gold_earned);
        debug!(
            "Adventure {}: +{} gold +{} xp item={:?} level={}",
            barbarian.id, outcome.gold_earned, outcome.xp_earned, outcome.item, barbarian.level
        );
        self.save_and_persist(token, barbarian).await?;
        Ok(outcome)
    }

    /// Replay adventures owed since the last tick, whatever the auto flag says.
    pub async fn do_catch_up(
        &self,
        token: &str,
        now: DateTime<Utc>,
        rng: &mut impl RandomSource,
    ) -> Result<CatchUpReport, ActionError> {
        let mut barbarian = self.load(token).await?;
        let report = calculate_and_simulate_adventures(&mut barbarian, now, &self.rules, &self.loot, rng);
        if report.adventures > 0 {
            metrics::record_catch_up(report.adventures, report.gold_earned);
            debug!(
                "Catch-up {}: {} adventures over {}s, +{} gold +{} xp",
                barbarian.id,
                report.adventures,
                report.elapsed_seconds,
                report.gold_earned,
                report.xp_earned
            );
        }
        self.save(token, barbarian).await?;
        Ok(report)
    }

    /// Read path used by the polling endpoints: catch up first when auto mode is on.
    pub async fn poll(
        &self,
        token: &str,
        now: DateTime<Utc>,
        rng: &mut impl RandomSource,
    ) -> Result<Barbarian, ActionError> {
        let barbarian = self.load(token).await?;
        if barbarian.auto_adventure {
            self.do_catch_up(token, now, rng).await?;
            return self.load(token).await;
        }
        Ok(barbarian)
    }

    /// Buy `item`. A refused purchase changes nothing; a successful one persists items
    /// after the session write-back.
    pub async fn buy(&self, token: &str, item: &str) -> Result<Purchase, ActionError> {
        let mut barbarian = self.load(token).await?;
        let purchase = match self.shop.buy(item, &mut barbarian) {
            Ok(p) => p,
            Err(e) => {
                metrics::inc_purchase(false);
                debug!("Purchase refused for {}: {}", barbarian.id, e);
                return Err(e.into());
            }
        };
        metrics::inc_purchase(true);
        info!(
            "Purchase {}: {} for {} gold",
            barbarian.id,
            escape_log(&purchase.item),
            purchase.price
        );
        self.save_and_persist(token, barbarian).await?;
        Ok(purchase)
    }

    /// Flip auto-adventure. Returns the new setting.
    pub async fn toggle_auto(&self, token: &str, now: DateTime<Utc>) -> Result<bool, ActionError> {
        let mut barbarian = self.load(token).await?;
        let enabled = barbarian.toggle_auto(now);
        debug!("Auto-adventure for {} is now {}", barbarian.id, enabled);
        self.save(token, barbarian).await?;
        Ok(enabled)
    }

    pub async fn set_flash(&self, token: &str, message: impl Into<String>) {
        self.sessions.lock().await.set_flash(token, message);
    }

    pub async fn take_flash(&self, token: &str) -> Option<String> {
        self.sessions.lock().await.take_flash(token)
    }

    pub async fn active_sessions(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        sessions.prune_idle(Utc::now());
        sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PriceCatalog;
    use argon2::Params;
    use tempfile::tempdir;

    fn actions(dir: &std::path::Path) -> GameActions {
        let params = Params::new(1024, 1, 1, None).unwrap();
        let store = AccountStore::open_with_params(dir.join("accounts"), Some(params)).unwrap();
        GameActions::from_parts(
            store,
            GameRules::default(),
            LootTable::new(vec!["torch".to_string()]),
            Shop::new(PriceCatalog::default()),
            60,
        )
    }

    #[tokio::test]
    async fn items_are_not_persisted_for_a_vanished_session() {
        let tmp = tempdir().unwrap();
        let actions = actions(tmp.path());
        let id = actions.create_account("conan", "cimmeria123").await.unwrap();

        let mut barbarian = Barbarian::new(id.clone(), Vec::new());
        barbarian.items.push("torch".to_string());
        let err = actions
            .save_and_persist("no-such-session", barbarian.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::MissingPlayer));
        assert!(actions.store().get_account(&id).unwrap().items.is_empty());

        let login = actions.login("conan", "cimmeria123").await.unwrap();
        actions.save_and_persist(&login.token, barbarian).await.unwrap();
        assert_eq!(actions.store().get_account(&id).unwrap().items, vec!["torch"]);
    }
}
