//! Shared error types for the rarity ranking service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Deserialization failed: {message}")]
    Deserialization { message: String },

    #[error("Invalid token identifier: {value}")]
    InvalidTokenId { value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
