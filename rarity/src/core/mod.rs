//! Core business logic modules
//!
//! Pure logic with no I/O: script generation and result parsing.

pub mod ranking;
pub mod script;

pub use ranking::{parse_rankings, RankingCache};
pub use script::{generate, RankingScript};
