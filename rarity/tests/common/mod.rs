//! Shared helpers for rarity integration tests

#![allow(dead_code)]

pub mod fake_runtime;
pub mod fixtures;

pub use fake_runtime::{FakeProbe, FakeRuntime};
pub use fixtures::TestFixtures;

use std::time::Duration;

use rarity::{RarityChecker, RarityConfig};

/// Upper bound for any single test step
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Checker over a fresh fake runtime, plus the probe observing it
pub fn fake_checker() -> (RarityChecker<FakeRuntime>, std::sync::Arc<FakeProbe>) {
    fake_checker_with(RarityConfig::default())
}

pub fn fake_checker_with(config: RarityConfig) -> (RarityChecker<FakeRuntime>, std::sync::Arc<FakeProbe>) {
    let runtime = FakeRuntime::new();
    let probe = runtime.probe();
    (RarityChecker::new(runtime, config), probe)
}
