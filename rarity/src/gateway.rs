//! Embedded runtime gateway
//!
//! Owns the runtime lifecycle: deferred bootstrap, one-time installer load,
//! idempotent package installation and script execution. Every low-level
//! [`RuntimeFailure`] is classified by the step that produced it, and every
//! suspension point is bounded by the configured timeout.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OnceCell};

use shared::{component_debug, component_info, Component};

use crate::error::{RarityError, RarityResult, RuntimeFailure};
use crate::traits::{EmbeddedRuntime, PackageInstaller};

pub struct RuntimeGateway<R: EmbeddedRuntime> {
    runtime: R,

    /// Set once the runtime has bootstrapped; concurrent callers share one load
    loaded: OnceCell<()>,

    /// Installer handle, loaded on first install
    installer: OnceCell<Arc<dyn PackageInstaller>>,

    /// Packages installed in this process; the lock also serializes installs
    installed: Mutex<HashSet<String>>,

    installer_module: String,
    timeout: Option<Duration>,
}

impl<R: EmbeddedRuntime> RuntimeGateway<R> {
    pub fn new(runtime: R, installer_module: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            runtime,
            loaded: OnceCell::new(),
            installer: OnceCell::new(),
            installed: Mutex::new(HashSet::new()),
            installer_module: installer_module.into(),
            timeout,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Bootstrap the runtime unless it is already up
    pub async fn ensure_runtime(&self) -> RarityResult<&R> {
        self.loaded
            .get_or_try_init(|| async {
                let started = Instant::now();
                component_info!(Component::Gateway, "🚀 Bootstrapping embedded runtime");

                self.bounded("runtime bootstrap", self.runtime.load(), |failure| {
                    RarityError::RuntimeBootstrap {
                        message: failure.message,
                    }
                })
                .await?;

                component_info!(
                    Component::Gateway,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "✅ Embedded runtime ready"
                );
                Ok::<(), RarityError>(())
            })
            .await?;

        Ok(&self.runtime)
    }

    /// Install `package` once per process
    ///
    /// The installer module is loaded and imported before the first install.
    /// Runtime bootstrap failures keep their own classification; any installer
    /// or package failure becomes [`RarityError::PackageInstall`].
    pub async fn install_package(&self, package: &str) -> RarityResult<()> {
        let mut installed = self.installed.lock().await;
        if installed.contains(package) {
            component_debug!(Component::Gateway, "Package {} already installed", package);
            return Ok(());
        }

        self.ensure_runtime().await?;

        let installer = self
            .installer
            .get_or_try_init(|| async {
                let module = self.installer_module.as_str();
                component_debug!(Component::Gateway, "Loading installer module {}", module);

                self.bounded("installer load", self.runtime.load_module(module), |failure| {
                    Self::install_error(module, failure)
                })
                .await?;

                self.bounded("installer import", self.runtime.import_installer(module), |failure| {
                    Self::install_error(module, failure)
                })
                .await
            })
            .await?;

        let started = Instant::now();
        component_info!(Component::Gateway, "📦 Installing package {}", package);

        self.bounded("package install", installer.install(package), |failure| {
            Self::install_error(package, failure)
        })
        .await?;

        installed.insert(package.to_string());
        component_info!(
            Component::Gateway,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "✅ Package {} installed",
            package
        );
        Ok(())
    }

    /// Run a script against the ready runtime and return its raw result
    pub async fn run_script(&self, source: &str, input: &serde_json::Value) -> RarityResult<String> {
        let runtime = self.ensure_runtime().await?;

        let started = Instant::now();
        let raw = self
            .bounded("script execution", runtime.run_script(source, input), |failure| {
                RarityError::Execution {
                    message: failure.message,
                }
            })
            .await?;

        component_debug!(
            Component::Gateway,
            elapsed_ms = started.elapsed().as_millis() as u64,
            result_bytes = raw.len() as u64,
            "Script finished"
        );
        Ok(raw)
    }

    fn install_error(package: &str, failure: RuntimeFailure) -> RarityError {
        RarityError::PackageInstall {
            package: package.to_string(),
            message: failure.message,
        }
    }

    /// Await a runtime step under the configured timeout and classify its failure
    async fn bounded<T, F, C>(&self, operation: &str, step: F, classify: C) -> RarityResult<T>
    where
        F: Future<Output = Result<T, RuntimeFailure>>,
        C: FnOnce(RuntimeFailure) -> RarityError,
    {
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, step).await.map_err(|_| RarityError::Timeout {
                operation: operation.to_string(),
                timeout: limit,
            })?,
            None => step.await,
        };
        outcome.map_err(classify)
    }
}
