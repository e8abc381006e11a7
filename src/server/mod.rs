//! # Web Server Module
//!
//! Serves the game over HTTP. Handlers are thin: they resolve the session cookie,
//! call into [`actions::GameActions`] and render a page or a redirect.
//!
//! ## Components
//!
//! - [`actions`] - Game actions on a logged-in player (adventure, buy, toggle, catch-up)
//! - [`session`] - In-memory session map with idle expiry
//! - [`routes`] - axum router and handlers
//! - [`render`] - HTML pages
//! - [`errors`] - Login and action failures
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  axum Router    │ ← cookie → token, form/path extraction
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  GameActions    │ ← load barbarian, run one game operation, persist items
//! └─────────────────┘
//!          │
//! ┌─────────────────┐     ┌─────────────────┐
//! │  SessionStore   │     │  AccountStore   │
//! └─────────────────┘     └─────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use barbarian::config::Config;
//! use barbarian::server::GameServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let server = GameServer::new(config).await?;
//!     server.run().await
//! }
//! ```

pub mod actions;
pub mod errors;
pub mod render;
pub mod routes;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::metrics;
use crate::storage::AccountStore;
pub use actions::{GameActions, LoginOutcome};
pub use errors::{ActionError, AuthError};
use routes::{AppState, SiteInfo};

pub struct GameServer {
    config: Config,
    actions: Arc<GameActions>,
}

impl GameServer {
    /// Open the account store and build the action layer.
    pub async fn new(config: Config) -> Result<Self> {
        let db_path = config.storage.account_db_path();
        let params = match &config.security {
            Some(sec) => sec.argon2_params()?,
            None => None,
        };
        let store = AccountStore::open_with_params(&db_path, params)
            .with_context(|| format!("Failed to open account store at {}", db_path))?;
        let actions = Arc::new(GameActions::new(store, &config));
        Ok(GameServer { config, actions })
    }

    pub fn actions(&self) -> Arc<GameActions> {
        Arc::clone(&self.actions)
    }

    pub fn router(&self) -> axum::Router {
        routes::router(AppState {
            actions: self.actions(),
            site: Arc::new(SiteInfo {
                name: self.config.server.name.clone(),
                welcome: self.config.server.welcome_message.clone(),
            }),
        })
    }

    /// Serve on the configured address until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        self.run_on(self.config.bind_addr()?).await
    }

    pub async fn run_on(&self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        info!("{} listening on http://{}", self.config.server.name, listener.local_addr()?);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Received shutdown signal");
            })
            .await?;
        self.shutdown().await;
        Ok(())
    }

    async fn shutdown(&self) {
        let mut snap = metrics::snapshot();
        snap.active_sessions = self.actions.active_sessions().await;
        info!(
            "Shutdown: {} manual adventures, {} catch-up adventures, {} purchases, {} sessions dropped",
            snap.manual_adventures, snap.catch_up_adventures, snap.purchases_ok, snap.active_sessions
        );
    }

    pub async fn show_status(&self) -> Result<()> {
        println!("=== {} Status ===", self.config.server.name);
        println!("Bind Address: {}", self.config.server.bind);
        println!("Account Store: {}", self.config.storage.account_db_path());
        println!("Adventure Interval: {}s", self.config.game.adventure_interval_secs);
        println!("Shop Items: {}", self.actions.shop().catalog().len());

        let stats = self.actions.store().statistics()?;
        println!("Total Accounts: {}", stats.total_accounts);
        println!("Persisted Items: {}", stats.total_items);
        if let Some(newest) = stats.newest_account {
            println!("Newest Account: {}", newest.format("%Y-%m-%d %H:%M UTC"));
        }
        Ok(())
    }
}
