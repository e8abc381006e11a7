use thiserror::Error;

use crate::game::ShopError;
use crate::storage::StoreError;

/// Login failures. The display text is what the player sees.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User does not exist. Please create a new account.")]
    UnknownUser,

    #[error("Please check your login details and try again.")]
    BadPassword,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of a state-changing action on a logged-in player.
#[derive(Debug, Error)]
pub enum ActionError {
    /// No live session for the presented token.
    #[error("Error: Player's id could not be found.")]
    MissingPlayer,

    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
