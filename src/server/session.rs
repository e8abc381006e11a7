use chrono::{DateTime, Duration, Utc};
use log::info;
use std::collections::HashMap;
use uuid::Uuid;

use crate::game::Barbarian;
use crate::logutil::{escape_log, short_token};
use crate::storage::AccountRecord;

/// # Player Session
///
/// One logged-in browser. The session owns the full mutable [`Barbarian`] between
/// requests; only the item list is mirrored to the account store.
///
/// ## Lifecycle
///
/// 1. Created on successful login with zeroed gold and experience, level 1 and the
///    persisted item list
/// 2. Read at the start of every action and written back at the end
/// 3. Dropped on logout or after `session_timeout` idle minutes
///
/// ```rust
/// use barbarian::server::session::Session;
///
/// let session = Session::new("token".into(), "id-1".into(), "conan".into(), vec![]);
/// assert_eq!(session.barbarian.level, 1);
/// assert!(session.flash.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub player_id: String,
    pub username: String,
    pub barbarian: Barbarian,
    /// One-shot message shown on the next rendered page.
    pub flash: Option<String>,
    pub login_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, player_id: String, username: String, items: Vec<String>) -> Self {
        let now = Utc::now();
        Session {
            token,
            barbarian: Barbarian::new_at(player_id.clone(), items, now),
            player_id,
            username,
            flash: None,
            login_time: now,
            last_activity: now,
        }
    }

    pub fn update_activity(&mut self) {
        self.last_activity = Utc::now();
    }

    /// True when idle for at least `timeout_minutes` as of `now`.
    pub fn is_inactive_at(&self, timeout_minutes: u32, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_activity) >= Duration::minutes(i64::from(timeout_minutes))
    }

    pub fn session_duration(&self) -> Duration {
        Utc::now().signed_duration_since(self.login_time)
    }
}

/// In-memory map from session token to [`Session`].
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
    timeout_minutes: u32,
}

impl SessionStore {
    /// `timeout_minutes == 0` keeps sessions until logout.
    pub fn new(timeout_minutes: u32) -> Self {
        SessionStore {
            sessions: HashMap::new(),
            timeout_minutes,
        }
    }

    /// Start a session for `account`, returning its token.
    pub fn create(&mut self, account: &AccountRecord) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session::new(
            token.clone(),
            account.id.clone(),
            account.username.clone(),
            account.items.clone(),
        );
        self.sessions.insert(token.clone(), session);
        token
    }

    pub fn get(&self, token: &str) -> Option<&Session> {
        self.sessions.get(token)
    }

    /// Mutable access that also counts as activity.
    pub fn get_mut(&mut self, token: &str) -> Option<&mut Session> {
        let session = self.sessions.get_mut(token)?;
        session.update_activity();
        Some(session)
    }

    /// Copy of the player's state for a read-modify-write cycle.
    pub fn load(&mut self, token: &str) -> Option<Barbarian> {
        self.get_mut(token).map(|s| s.barbarian.clone())
    }

    /// Write a player's state back. Returns false if the session has gone away.
    pub fn store(&mut self, token: &str, barbarian: Barbarian) -> bool {
        match self.get_mut(token) {
            Some(session) => {
                session.barbarian = barbarian;
                true
            }
            None => false,
        }
    }

    pub fn set_flash(&mut self, token: &str, message: impl Into<String>) {
        if let Some(session) = self.sessions.get_mut(token) {
            session.flash = Some(message.into());
        }
    }

    pub fn take_flash(&mut self, token: &str) -> Option<String> {
        self.sessions.get_mut(token).and_then(|s| s.flash.take())
    }

    pub fn remove(&mut self, token: &str) -> Option<Session> {
        self.sessions.remove(token)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle past the timeout. Returns the usernames that were dropped.
    pub fn prune_idle(&mut self, now: DateTime<Utc>) -> Vec<String> {
        if self.timeout_minutes == 0 {
            return Vec::new();
        }
        let timeout = self.timeout_minutes;
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.is_inactive_at(timeout, now))
            .map(|(k, _)| k.clone())
            .collect();
        let mut dropped = Vec::with_capacity(expired.len());
        for token in expired {
            if let Some(s) = self.sessions.remove(&token) {
                info!(
                    "Session {} (user {}) expired after {} idle minutes",
                    short_token(&token),
                    escape_log(&s.username),
                    timeout
                );
                dropped.push(s.username);
            }
        }
        dropped
    }
}
