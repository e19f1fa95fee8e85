//! Shared types for the rarity ranking service
//!
//! Contains the token and ranking data model exchanged between callers and the
//! ranking engine, the shared error type and the tracing setup used by every
//! component.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
