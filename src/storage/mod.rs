//! # Storage Module - Account Persistence
//!
//! Sled-backed persistence for player accounts: credentials and the item list
//! carried between sessions. Gold, experience and level live only in the session.
//!
//! ## Layout
//!
//! ```text
//! <db_path>/
//!   tree "accounts"   accounts:<id>        -> bincode AccountRecord
//!   tree "usernames"  <lowercase username> -> <id>
//! ```
//!
//! The username index is claimed with a compare-and-swap, so two concurrent
//! registrations of the same name cannot both succeed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use barbarian::storage::AccountStore;
//!
//! # fn main() -> Result<(), barbarian::storage::StoreError> {
//! let store = AccountStore::open("./data/accounts")?;
//! let account = store.register_user("conan", "crom-is-strong")?;
//! let (found, ok) = store.verify_user_password("conan", "crom-is-strong")?;
//! assert!(ok && found.is_some());
//! store.save_items(&account.id, &["basic_sword".to_string()])?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Security
//!
//! - Passwords are hashed with Argon2id (configurable parameters)
//! - Usernames are validated before they reach the index
//! - Lookups by name are case-insensitive

pub mod errors;

pub use errors::StoreError;

use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{DateTime, Utc};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use serde::{Deserialize, Serialize};
use sled::IVec;
use std::path::Path;
use uuid::Uuid;

use crate::validation::{username_key, validate_password, validate_player_name};

pub const ACCOUNT_SCHEMA_VERSION: u8 = 1;

const TREE_ACCOUNTS: &str = "accounts";
const TREE_USERNAMES: &str = "usernames";

/// A persisted player account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub items: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub schema_version: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStatistics {
    pub total_accounts: usize,
    pub total_items: usize,
    pub newest_account: Option<DateTime<Utc>>,
}

/// Handle to the account trees. Clones share the same database.
#[derive(Clone)]
pub struct AccountStore {
    _db: sled::Db,
    accounts: sled::Tree,
    usernames: sled::Tree,
    argon2: Argon2<'static>,
}

impl AccountStore {
    /// Open (or create) the account store rooted at `path` with default Argon2 parameters.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_params(path, None)
    }

    /// Open with explicit Argon2 parameters.
    pub fn open_with_params<P: AsRef<Path>>(
        path: P,
        params: Option<Params>,
    ) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let accounts = db.open_tree(TREE_ACCOUNTS)?;
        let usernames = db.open_tree(TREE_USERNAMES)?;
        let argon2 = match params {
            Some(p) => Argon2::new(Algorithm::Argon2id, Version::V0x13, p),
            None => Argon2::default(),
        };
        Ok(Self {
            _db: db,
            accounts,
            usernames,
            argon2,
        })
    }

    fn account_key(id: &str) -> Vec<u8> {
        format!("accounts:{}", id).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, StoreError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn hash_password(&self, password: &str) -> Result<String, StoreError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn put_account(&self, mut account: AccountRecord) -> Result<AccountRecord, StoreError> {
        account.schema_version = ACCOUNT_SCHEMA_VERSION;
        let bytes = Self::serialize(&account)?;
        self.accounts.insert(Self::account_key(&account.id), bytes)?;
        self.accounts.flush()?;
        Ok(account)
    }

    /// Register a new account; fails if the name is invalid or already taken.
    ///
    /// The password is hashed before the name is claimed, and a claim whose
    /// account record cannot be written is released again.
    pub fn register_user(&self, username: &str, password: &str) -> Result<AccountRecord, StoreError> {
        let username = validate_player_name(username)?;
        validate_password(password)?;
        let password_hash = self.hash_password(password)?;

        let id = Uuid::new_v4().to_string();
        let key = username_key(&username);
        let claimed = self.usernames.compare_and_swap(
            key.as_bytes(),
            None as Option<&[u8]>,
            Some(id.as_bytes()),
        )?;
        if claimed.is_err() {
            return Err(StoreError::UsernameTaken(username));
        }

        let now = Utc::now();
        let account = AccountRecord {
            id: id.clone(),
            username,
            password_hash,
            items: Vec::new(),
            created_at: now,
            last_login: now,
            schema_version: ACCOUNT_SCHEMA_VERSION,
        };
        let stored = self
            .put_account(account)
            .and_then(|stored| {
                self.usernames.flush()?;
                Ok(stored)
            });
        if stored.is_err() {
            self.release_claim(key.as_bytes(), &id);
        }
        stored
    }

    fn release_claim(&self, key: &[u8], id: &str) {
        let _ = self.accounts.remove(Self::account_key(id));
        let _ = self
            .usernames
            .compare_and_swap(key, Some(id.as_bytes()), None as Option<&[u8]>);
    }

    /// Fetch an account by id.
    pub fn get_account(&self, id: &str) -> Result<AccountRecord, StoreError> {
        let Some(bytes) = self.accounts.get(Self::account_key(id))? else {
            return Err(StoreError::NotFound(format!("account: {}", id)));
        };
        let record: AccountRecord = Self::deserialize(bytes)?;
        if record.schema_version != ACCOUNT_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "account",
                expected: ACCOUNT_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Look an account up by (case-insensitive) username.
    pub fn find_by_username(&self, username: &str) -> Result<Option<AccountRecord>, StoreError> {
        let Some(id) = self.usernames.get(username_key(username))? else {
            return Ok(None);
        };
        let id = String::from_utf8_lossy(&id).into_owned();
        self.get_account(&id).map(Some)
    }

    /// Verify a password; returns (account, bool match)
    pub fn verify_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(Option<AccountRecord>, bool), StoreError> {
        let Some(account) = self.find_by_username(username)? else {
            return Ok((None, false));
        };
        let parsed = PasswordHash::new(&account.password_hash)
            .map_err(|e| StoreError::PasswordHash(format!("corrupt hash: {e}")))?;
        let ok = self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        Ok((Some(account), ok))
    }

    /// Replace the persisted item list.
    pub fn save_items(&self, id: &str, items: &[String]) -> Result<(), StoreError> {
        let mut account = self.get_account(id)?;
        account.items = items.to_vec();
        self.put_account(account)?;
        Ok(())
    }

    /// Stamp `last_login` and return the updated record.
    pub fn record_login(&self, id: &str) -> Result<AccountRecord, StoreError> {
        let mut account = self.get_account(id)?;
        account.last_login = Utc::now();
        self.put_account(account)
    }

    pub fn list_accounts(&self) -> Result<Vec<AccountRecord>, StoreError> {
        let mut out = Vec::new();
        for entry in self.accounts.scan_prefix(b"accounts:") {
            let (_, value) = entry?;
            out.push(Self::deserialize(value)?);
        }
        Ok(out)
    }

    pub fn statistics(&self) -> Result<StoreStatistics, StoreError> {
        let accounts = self.list_accounts()?;
        Ok(StoreStatistics {
            total_accounts: accounts.len(),
            total_items: accounts.iter().map(|a| a.items.len()).sum(),
            newest_account: accounts.iter().map(|a| a.created_at).max(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::Params;
    use tempfile::tempdir;

    // Cheap hashing keeps the tests quick.
    fn fast_store(path: &Path) -> AccountStore {
        let params = Params::new(1024, 1, 1, None).unwrap();
        AccountStore::open_with_params(path, Some(params)).unwrap()
    }

    #[test]
    fn register_and_fetch() {
        let tmp = tempdir().unwrap();
        let store = fast_store(tmp.path());
        let acct = store.register_user("Conan", "crom-is-strong").unwrap();
        assert_eq!(acct.username, "Conan");
        assert!(acct.items.is_empty());
        assert!(Uuid::parse_str(&acct.id).is_ok());
        assert_ne!(acct.password_hash, "crom-is-strong");

        let by_id = store.get_account(&acct.id).unwrap();
        assert_eq!(by_id, acct);
        let by_name = store.find_by_username("conan").unwrap().unwrap();
        assert_eq!(by_name.id, acct.id);
    }

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let tmp = tempdir().unwrap();
        let store = fast_store(tmp.path());
        store.register_user("Conan", "crom-is-strong").unwrap();
        let err = store.register_user("CONAN", "another-pass").unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(_)));
        assert!(err.is_user_error());
        assert_eq!(store.list_accounts().unwrap().len(), 1);
    }

    #[test]
    fn invalid_input_is_rejected_before_claiming_the_name() {
        let tmp = tempdir().unwrap();
        let store = fast_store(tmp.path());
        assert!(matches!(
            store.register_user("valeria", "short"),
            Err(StoreError::InvalidPassword(_))
        ));
        assert!(matches!(
            store.register_user("admin", "long-enough-pass"),
            Err(StoreError::InvalidUsername(_))
        ));
        // name is still free after the failed attempt
        assert!(store.register_user("valeria", "long-enough-pass").is_ok());
    }

    #[test]
    fn released_claim_frees_the_name() {
        let tmp = tempdir().unwrap();
        let store = fast_store(tmp.path());
        // a claim whose account record never landed
        let key = username_key("valeria");
        let stale = Uuid::new_v4().to_string();
        store
            .usernames
            .insert(key.as_bytes(), stale.as_bytes())
            .unwrap();
        assert!(matches!(
            store.register_user("valeria", "long-enough-pass"),
            Err(StoreError::UsernameTaken(_))
        ));

        store.release_claim(key.as_bytes(), &stale);
        let acct = store.register_user("valeria", "long-enough-pass").unwrap();
        assert_eq!(store.find_by_username("valeria").unwrap().unwrap().id, acct.id);

        // releasing with the wrong id leaves a live claim alone
        store.release_claim(key.as_bytes(), &stale);
        assert!(store.find_by_username("valeria").unwrap().is_some());
    }

    #[test]
    fn items_persist_across_reopen() {
        let tmp = tempdir().unwrap();
        let id = {
            let store = fast_store(tmp.path());
            let acct = store.register_user("belit", "queen-of-the-coast").unwrap();
            store
                .save_items(&acct.id, &["torch".to_string(), "xp_sword".to_string()])
                .unwrap();
            acct.id
        };
        let store = fast_store(tmp.path());
        let acct = store.get_account(&id).unwrap();
        assert_eq!(acct.items, vec!["torch".to_string(), "xp_sword".to_string()]);
        let stats = store.statistics().unwrap();
        assert_eq!(stats.total_accounts, 1);
        assert_eq!(stats.total_items, 2);
    }

    #[test]
    fn unknown_account_is_not_found() {
        let tmp = tempdir().unwrap();
        let store = fast_store(tmp.path());
        assert!(matches!(
            store.get_account("missing"),
            Err(StoreError::NotFound(_))
        ));
        assert!(store.save_items("missing", &[]).is_err());
        assert!(store.find_by_username("nobody").unwrap().is_none());
    }
}
