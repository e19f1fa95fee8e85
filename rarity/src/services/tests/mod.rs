//! Service-specific tests
//!
//! Tests that need a real Python interpreter (and network access for pip) are
//! marked `#[ignore]`; run them with `cargo test -- --ignored`.


// Common test utilities for services
pub mod common {
    use std::path::PathBuf;
    use std::time::Duration;

    /// Upper bound for subprocess-based tests
    pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Interpreter used by ignored tests
    pub fn test_python() -> PathBuf {
        std::env::var("RARITY_PYTHON")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("python3"))
    }
}
