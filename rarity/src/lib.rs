//! Rarity ranking service
//!
//! Ranks NFT-style token collections by rarity using an external ranking
//! package hosted in an embedded interpreter. This crate manages that
//! interpreter's lifecycle, turns token metadata into ranking requests and
//! caches the latest ranking for point lookups.

pub mod checker;
pub mod config;
pub mod core;
pub mod error;
pub mod gateway;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use checker::RarityChecker;
pub use config::RarityConfig;
pub use error::{RarityError, RarityResult, RuntimeFailure};
pub use gateway::RuntimeGateway;
pub use services::{MetadataDirectory, PipInstaller, PythonRuntime};
pub use shared::{RankingRecord, RuntimeStatus, TokenAttribute, TokenId, TokenMetadata};
pub use traits::{EmbeddedRuntime, PackageInstaller};
