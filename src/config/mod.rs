//! # Configuration Management Module
//!
//! This module handles all configuration for the barbarian server: where it
//! listens, where accounts live, the game tunables, logging and password hashing.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - Listener address, session timeout, banner text
//! - [`StorageConfig`] - Data directory and account database path
//! - [`GameConfig`] - Gold cap, adventure interval, loot table and shop prices
//! - [`LoggingConfig`] - Logging level and optional log file
//! - [`SecurityConfig`] - Argon2 password hashing parameters
//!
//! ## Usage
//!
//! ```rust,no_run
//! use barbarian::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Write a starter file, then load it back
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Listening on {}", config.server.bind);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [server]
//! name = "Barbarian Idle"
//! bind = "127.0.0.1:5000"
//! session_timeout = 60
//!
//! [storage]
//! data_dir = "./data"
//!
//! [game]
//! max_gold = 1000000000000
//! adventure_interval_secs = 5
//! loot_table = ["rusty_dagger", "torch"]
//!
//! [game.shop]
//! basic_sword = 100
//! xp_sword = 200
//! ```
//!
//! Missing `[game]` keys fall back to the built-in defaults.

use anyhow::{anyhow, Result};
use argon2::Params;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use tokio::fs;

use crate::game::rewards::DEFAULT_LOOT;
use crate::game::{GameRules, LootTable, PriceCatalog, MAX_GOLD};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub bind: String,
    /// Idle minutes before a session is dropped. 0 disables expiry.
    pub session_timeout: u32,
    #[serde(default)]
    pub welcome_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Optional override for the sled account database; defaults to `<data_dir>/accounts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

impl StorageConfig {
    pub fn account_db_path(&self) -> String {
        match &self.db_path {
            Some(p) => p.clone(),
            None => Path::new(&self.data_dir)
                .join("accounts")
                .to_string_lossy()
                .into_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_max_gold")]
    pub max_gold: u64,
    #[serde(default = "default_adventure_interval_secs")]
    pub adventure_interval_secs: u64,
    /// Upper bound on adventures replayed by one catch-up pass. 0 means no bound.
    #[serde(default = "default_max_catch_up_adventures")]
    pub max_catch_up_adventures: u64,
    #[serde(default = "default_loot_table")]
    pub loot_table: Vec<String>,
    /// Item id to price in gold.
    #[serde(default = "default_shop")]
    pub shop: BTreeMap<String, u64>,
}

fn default_max_gold() -> u64 {
    MAX_GOLD
}

fn default_adventure_interval_secs() -> u64 {
    5
}

fn default_max_catch_up_adventures() -> u64 {
    0
}

fn default_loot_table() -> Vec<String> {
    DEFAULT_LOOT.iter().map(|s| s.to_string()).collect()
}

fn default_shop() -> BTreeMap<String, u64> {
    let catalog = PriceCatalog::default();
    catalog
        .listing()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            max_gold: default_max_gold(),
            adventure_interval_secs: default_adventure_interval_secs(),
            max_catch_up_adventures: default_max_catch_up_adventures(),
            loot_table: default_loot_table(),
            shop: default_shop(),
        }
    }
}

impl GameConfig {
    pub fn rules(&self) -> GameRules {
        GameRules {
            max_gold: self.max_gold,
            adventure_interval_secs: self.adventure_interval_secs,
            max_catch_up_adventures: self.max_catch_up_adventures,
        }
    }

    pub fn loot(&self) -> LootTable {
        LootTable::new(self.loot_table.clone())
    }

    pub fn catalog(&self) -> PriceCatalog {
        PriceCatalog::new(self.shop.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default)]
    pub security_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Argon2Config {
    #[serde(default)]
    pub memory_kib: Option<u32>,
    #[serde(default)]
    pub time_cost: Option<u32>,
    #[serde(default)]
    pub parallelism: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub argon2: Option<Argon2Config>,
}

impl SecurityConfig {
    /// Argon2 parameters when any are overridden; `None` keeps the library defaults.
    pub fn argon2_params(&self) -> Result<Option<Params>> {
        let Some(cfg) = &self.argon2 else {
            return Ok(None);
        };
        if cfg.memory_kib.is_none() && cfg.time_cost.is_none() && cfg.parallelism.is_none() {
            return Ok(None);
        }
        let params = Params::new(
            cfg.memory_kib.unwrap_or(Params::DEFAULT_M_COST),
            cfg.time_cost.unwrap_or(Params::DEFAULT_T_COST),
            cfg.parallelism.unwrap_or(Params::DEFAULT_P_COST),
            None,
        )
        .map_err(|e| anyhow!("Invalid argon2 parameters: {}", e))?;
        Ok(Some(params))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub game: GameConfig,
    pub logging: LoggingConfig,
    pub security: Option<SecurityConfig>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if self.game.adventure_interval_secs == 0 {
            return Err(anyhow!("game.adventure_interval_secs must be at least 1"));
        }
        if self.game.max_gold == 0 || self.game.max_gold > MAX_GOLD {
            return Err(anyhow!(
                "game.max_gold must be between 1 and {}",
                MAX_GOLD
            ));
        }
        if self.game.loot_table.is_empty() {
            return Err(anyhow!("game.loot_table must list at least one item"));
        }
        if self.game.shop.is_empty() {
            return Err(anyhow!("game.shop must list at least one item"));
        }
        if let Some(sec) = &self.security {
            sec.argon2_params()?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| anyhow!("Invalid server.bind '{}': {}", self.server.bind, e))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                name: "Barbarian Idle".to_string(),
                bind: "127.0.0.1:5000".to_string(),
                session_timeout: 60,
                welcome_message: "Sharpen your axe. Adventure awaits.".to_string(),
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                db_path: None,
            },
            game: GameConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("barbarian.log".to_string()),
                security_file: Some("barbarian-security.log".to_string()),
            },
            security: Some(SecurityConfig::default()),
        }
    }
}
