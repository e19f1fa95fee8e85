//! Rarity checker
//!
//! The public entry point of the service. It drives the runtime lifecycle
//! (INIT → LOADING → READY / ERROR), turns token batches into ranking scripts,
//! parses the results and answers point lookups from the last ranking.

use std::time::Instant;

use tokio::sync::{Mutex, RwLock};

use shared::{
    component_debug, component_info, component_warn, logging, Component, RankingRecord, RuntimeStatus, TokenId,
    TokenMetadata, DEFAULT_IDENTIFIER_FIELD,
};

use crate::config::RarityConfig;
use crate::core::ranking::{parse_rankings, RankingCache};
use crate::core::script;
use crate::error::{RarityError, RarityResult};
use crate::gateway::RuntimeGateway;
use crate::services::PythonRuntime;
use crate::traits::EmbeddedRuntime;

/// Rarity ranking service with dependency injection
///
/// Construct one per embedding scope; nothing here is process-global. Ranking
/// requests on one instance are served one at a time, and concurrent first
/// callers share a single bootstrap.
pub struct RarityChecker<R: EmbeddedRuntime> {
    gateway: RuntimeGateway<R>,
    package: String,

    status: RwLock<RuntimeStatus>,

    /// Serializes `init` so only one bootstrap runs at a time
    init_gate: Mutex<()>,

    /// Single-slot queue for ranking requests
    computation: Mutex<()>,

    /// Last successful ranking batch
    rarities: RwLock<Option<RankingCache>>,
}

impl RarityChecker<PythonRuntime> {
    /// Checker backed by a CPython subprocess runtime
    pub fn python(config: RarityConfig) -> Self {
        let runtime = PythonRuntime::new(config.python.clone()).with_venv_dir(config.venv_dir.clone());
        Self::new(runtime, config)
    }
}

impl<R: EmbeddedRuntime> RarityChecker<R> {
    pub fn new(runtime: R, config: RarityConfig) -> Self {
        Self {
            gateway: RuntimeGateway::new(runtime, config.installer_module, config.timeout),
            package: config.package,
            status: RwLock::new(RuntimeStatus::Uninitialized),
            init_gate: Mutex::new(()),
            computation: Mutex::new(()),
            rarities: RwLock::new(None),
        }
    }

    pub async fn status(&self) -> RuntimeStatus {
        *self.status.read().await
    }

    pub fn gateway(&self) -> &RuntimeGateway<R> {
        &self.gateway
    }

    /// Bootstrap the runtime and install the ranking package
    ///
    /// A no-op once READY. A checker left in ERROR (or in LOADING by a cancelled
    /// attempt) retries the bootstrap instead of staying stranded.
    pub async fn init(&self) -> RarityResult<()> {
        let _gate = self.init_gate.lock().await;

        match self.status().await {
            RuntimeStatus::Ready => {
                component_debug!(Component::Checker, "Rarity checker already initialized");
                return Ok(());
            }
            RuntimeStatus::Error => {
                component_warn!(Component::Checker, "⚠️ Retrying initialization after a failed attempt");
            }
            RuntimeStatus::Loading => {
                component_warn!(Component::Checker, "⚠️ Resuming interrupted initialization");
            }
            RuntimeStatus::Uninitialized => {}
        }

        self.set_status(RuntimeStatus::Loading).await;

        match self.gateway.install_package(&self.package).await {
            Ok(()) => {
                self.set_status(RuntimeStatus::Ready).await;
                logging::log_success(Component::Checker, "Rarity checker ready");
                Ok(())
            }
            Err(e) => {
                self.set_status(RuntimeStatus::Error).await;
                logging::log_error(Component::Checker, "Rarity checker initialization", &e);
                Err(e)
            }
        }
    }

    /// Rank `tokens` using the default `tokenID` identifier field
    pub async fn get_all_rarities(&self, tokens: &[TokenMetadata]) -> RarityResult<Vec<RankingRecord>> {
        self.get_all_rarities_with_identifier(tokens, DEFAULT_IDENTIFIER_FIELD).await
    }

    /// Rank `tokens`, correlating records through `identifier_field`
    ///
    /// Every failure, including initialization and timeouts, is reported as
    /// [`RarityError::RarityComputation`] wrapping the cause. A failed request
    /// leaves the previous ranking in place.
    pub async fn get_all_rarities_with_identifier(
        &self,
        tokens: &[TokenMetadata],
        identifier_field: &str,
    ) -> RarityResult<Vec<RankingRecord>> {
        let _slot = self.computation.lock().await;

        if self.status().await != RuntimeStatus::Ready {
            self.init().await.map_err(RarityError::computation)?;
        }

        let started = Instant::now();
        let records = match self.compute(tokens, identifier_field).await {
            Ok(records) => records,
            Err(e) => {
                logging::log_error(Component::Checker, "Rarity computation", &e);
                return Err(RarityError::computation(e));
            }
        };

        *self.rarities.write().await = Some(RankingCache::new(records.clone()));

        component_info!(
            Component::Checker,
            tokens = tokens.len() as u64,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "🏆 Ranked {} tokens by {}",
            records.len(),
            identifier_field
        );
        Ok(records)
    }

    async fn compute(&self, tokens: &[TokenMetadata], identifier_field: &str) -> RarityResult<Vec<RankingRecord>> {
        let serialized = serde_json::to_value(tokens)?;
        let script = script::generate(serialized, identifier_field);
        let raw = self.gateway.run_script(script.source, &script.input).await?;
        parse_rankings(&raw, tokens.len())
    }

    /// Look up one token in the last ranking
    ///
    /// Never triggers a computation. Returns `Ok(None)` when the token is not
    /// part of the last batch.
    pub async fn get_single_rarity(&self, token_id: &TokenId) -> RarityResult<Option<RankingRecord>> {
        let rarities = self.rarities.read().await;
        let cache = rarities.as_ref().ok_or(RarityError::NoRaritiesComputed)?;
        Ok(cache.get(token_id).cloned())
    }

    /// Snapshot of the last ranking, if any
    pub async fn rarities(&self) -> Option<Vec<RankingRecord>> {
        self.rarities
            .read()
            .await
            .as_ref()
            .map(|cache| cache.records().to_vec())
    }

    async fn set_status(&self, status: RuntimeStatus) {
        let mut current = self.status.write().await;
        component_debug!(Component::Checker, "Status {} -> {}", *current, status);
        *current = status;
    }
}
