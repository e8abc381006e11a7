//! # Barbarian - an idle adventure game served over HTTP
//!
//! Players register, log in and send their barbarian on adventures for gold,
//! experience and loot. Swords bought in the shop boost every later adventure,
//! and auto-adventure mode keeps earning while the player is away: the gap is
//! replayed in one pass the next time the browser polls.
//!
//! ## Features
//!
//! - **Adventures**: random gold (5-15), experience (1-5) and one loot item per adventure
//! - **Swords**: basic, silver and golden gold bonuses stack; the XP sword adds 2 experience
//! - **Leveling**: `level * 10` experience per level, with carry-over
//! - **Catch-up**: one adventure per elapsed interval
//! - **Accounts**: Argon2id password hashing, sled-backed item persistence
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use barbarian::config::Config;
//! use barbarian::server::GameServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let server = GameServer::new(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - Pure game rules: barbarian state, adventures, catch-up, shop
//! - [`server`] - axum routes, sessions and the action layer
//! - [`storage`] - Account persistence
//! - [`config`] - Configuration management and validation
//! - [`validation`] - Username, password and item id checks
//! - [`metrics`] - Process-wide counters
//! - [`logutil`] - Log-safe string helpers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Browser        │
//! └─────────────────┘
//!          │ HTTP
//! ┌─────────────────┐
//! │  server         │ ← routes, sessions, GameActions
//! └─────────────────┘
//!          │
//! ┌─────────────────┐     ┌─────────────────┐
//! │  game           │     │  storage        │
//! └─────────────────┘     └─────────────────┘
//! ```

pub mod config;
pub mod game;
pub mod logutil;
pub mod metrics;
pub mod server;
pub mod storage;
pub mod validation;
