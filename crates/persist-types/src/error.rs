use thiserror::Error;

use crate::token::TokenError;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid owner id {id:?}: {reason}")]
    InvalidOwnerId { id: String, reason: String },

    #[error("invalid record key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("malformed lock token: {0}")]
    Token(#[from] TokenError),
}
