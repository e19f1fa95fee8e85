//! Trait definitions with mockall annotations for testing
//!
//! The embedded runtime and its package installer are external collaborators.
//! The gateway only talks to them through these traits, so tests can swap in
//! mocks or deterministic fakes instead of a real interpreter.

use std::sync::Arc;

use crate::error::RuntimeFailure;

/// In-process execution environment for the ranking package
///
/// Caller data never becomes source text: `run_script` receives the fixed
/// script source and the input as a separate value. The runtime exposes the
/// value to the script as `rarity_input`, and the script leaves its result in
/// `rarity_output`.
#[mockall::automock]
#[async_trait::async_trait]
pub trait EmbeddedRuntime: Send + Sync {
    /// Bootstrap the runtime; called at most once per successful bootstrap
    async fn load(&self) -> Result<(), RuntimeFailure>;

    /// Make a bundled module available inside the runtime
    async fn load_module(&self, name: &str) -> Result<(), RuntimeFailure>;

    /// Obtain a handle to an installer module previously loaded
    async fn import_installer(&self, name: &str) -> Result<Arc<dyn PackageInstaller>, RuntimeFailure>;

    /// Execute `source` with `input` bound as `rarity_input`
    ///
    /// # Returns
    /// The raw result: `rarity_output` serialized as JSON text. It is not
    /// validated here.
    async fn run_script(&self, source: &str, input: &serde_json::Value) -> Result<String, RuntimeFailure>;
}

/// Package installer obtained through the runtime
#[mockall::automock]
#[async_trait::async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Fetch and install `package` into the runtime
    async fn install(&self, package: &str) -> Result<(), RuntimeFailure>;
}
