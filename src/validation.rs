//! Input validation for account names, passwords, shop item ids and session tokens

use std::collections::HashSet;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;
pub const ITEM_ID_MAX_LEN: usize = 32;

/// Username validation errors with helpful messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("Username is too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("Username is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Username cannot start or end with whitespace")]
    InvalidWhitespace,

    #[error("Username contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("Username is a reserved name")]
    Reserved,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("Password too short (minimum {} characters)", PASSWORD_MIN_LEN)]
    TooShort,

    #[error("Password too long (maximum {} characters)", PASSWORD_MAX_LEN)]
    TooLong,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid item id")]
pub struct ItemIdError;

/// Username validation rules configuration
#[derive(Debug, Clone)]
pub struct UsernameRules {
    pub min_length: usize,
    pub max_length: usize,
    pub allow_spaces: bool,
    pub allow_unicode: bool,
}

impl UsernameRules {
    /// Rules for player accounts
    pub fn player() -> Self {
        UsernameRules {
            min_length: 2,
            max_length: 30,
            allow_spaces: true,
            allow_unicode: true,
        }
    }
}

fn reserved_names() -> HashSet<&'static str> {
    [
        "admin", "administrator", "root", "system", "operator", "moderator",
        "guest", "anonymous", "null", "none", "undefined",
        // route names
        "login", "logout", "home", "adventure", "buy", "shop", "metrics", "api",
    ]
    .iter()
    .copied()
    .collect()
}

/// Validate a username according to the given rules. Returns the accepted name.
pub fn validate_username(username: &str, rules: &UsernameRules) -> Result<String, UsernameError> {
    let trimmed = username.trim();

    let len = trimmed.chars().count();
    if len < rules.min_length {
        return Err(UsernameError::TooShort { min: rules.min_length });
    }
    if len > rules.max_length {
        return Err(UsernameError::TooLong { max: rules.max_length });
    }

    if trimmed != username {
        return Err(UsernameError::InvalidWhitespace);
    }

    if reserved_names().contains(trimmed.to_lowercase().as_str()) {
        return Err(UsernameError::Reserved);
    }

    let mut invalid: Vec<char> = Vec::new();
    for ch in trimmed.chars() {
        let ok = if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.' {
            true
        } else if ch == ' ' {
            rules.allow_spaces
        } else if ch.is_control() {
            false
        } else if !ch.is_ascii() {
            rules.allow_unicode && (ch.is_alphabetic() || ch.is_numeric())
        } else {
            false
        };
        if !ok && !invalid.contains(&ch) {
            invalid.push(ch);
        }
    }
    if !invalid.is_empty() {
        let chars = invalid
            .iter()
            .map(|c| {
                if c.is_control() {
                    format!("\\u{{{:04x}}}", *c as u32)
                } else {
                    c.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        return Err(UsernameError::InvalidCharacters { chars });
    }

    Ok(trimmed.to_string())
}

/// Validate a player account name
pub fn validate_player_name(name: &str) -> Result<String, UsernameError> {
    validate_username(name, &UsernameRules::player())
}

/// Length limits only; the content of a password is the player's business.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.len() < PASSWORD_MIN_LEN {
        return Err(PasswordError::TooShort);
    }
    if password.len() > PASSWORD_MAX_LEN {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

/// Item ids are lowercase snake case.
pub fn validate_item_id(item: &str) -> Result<&str, ItemIdError> {
    if item.is_empty() || item.len() > ITEM_ID_MAX_LEN {
        return Err(ItemIdError);
    }
    if !item
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ItemIdError);
    }
    Ok(item)
}

/// Session tokens are hyphenated UUIDs; anything else is ignored without a lookup.
pub fn is_valid_session_token(token: &str) -> bool {
    uuid::Uuid::try_parse(token).is_ok()
}

/// Case-insensitive key for the username index.
pub fn username_key(name: &str) -> String {
    name.to_lowercase()
}
