//! Deterministic in-process stand-in for the embedded interpreter
//!
//! Scores tokens by summed inverse trait frequency, which is enough to give
//! stable, checkable rankings without a real ranking package.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use rarity::{EmbeddedRuntime, PackageInstaller, RuntimeFailure, TokenMetadata};

/// Call counters and failure switches shared with the test body
#[derive(Default)]
pub struct FakeProbe {
    pub loads: AtomicUsize,
    pub module_loads: AtomicUsize,
    pub installs: AtomicUsize,
    pub runs: AtomicUsize,

    pub fail_load: AtomicBool,
    pub fail_run: AtomicBool,
    /// Number of upcoming installs that fail
    pub install_failures: AtomicUsize,

    pub load_delay: Mutex<Option<Duration>>,
    pub run_delay: Mutex<Option<Duration>>,
    /// Raw result returned instead of the computed ranking
    pub raw_override: Mutex<Option<String>>,
}

impl FakeProbe {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn module_loads(&self) -> usize {
        self.module_loads.load(Ordering::SeqCst)
    }

    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_run(&self, fail: bool) {
        self.fail_run.store(fail, Ordering::SeqCst);
    }

    pub fn fail_next_installs(&self, count: usize) {
        self.install_failures.store(count, Ordering::SeqCst);
    }

    pub fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_run_delay(&self, delay: Option<Duration>) {
        *self.run_delay.lock().unwrap() = delay;
    }

    pub fn set_raw_override(&self, raw: Option<&str>) {
        *self.raw_override.lock().unwrap() = raw.map(str::to_string);
    }
}

pub struct FakeRuntime {
    probe: Arc<FakeProbe>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self {
            probe: Arc::new(FakeProbe::default()),
        }
    }

    pub fn probe(&self) -> Arc<FakeProbe> {
        self.probe.clone()
    }

    /// Rank `input["tokens"]` the way the ranking script reports results
    pub fn rank(input: &Value) -> Result<Value, RuntimeFailure> {
        let field = input["identifier_field"]
            .as_str()
            .ok_or_else(|| RuntimeFailure::new("identifier_field missing"))?;
        let tokens: Vec<TokenMetadata> = serde_json::from_value(input["tokens"].clone())
            .map_err(|e| RuntimeFailure::new(format!("TypeError: {e}")))?;

        let traits: Vec<_> = tokens.iter().map(TokenMetadata::trait_map).collect();
        let mut frequency: HashMap<(String, String), usize> = HashMap::new();
        for map in &traits {
            for (name, value) in map {
                *frequency.entry((name.clone(), value.to_string())).or_default() += 1;
            }
        }

        let total = tokens.len() as f64;
        let mut scored: Vec<(usize, f64)> = traits
            .iter()
            .enumerate()
            .map(|(index, map)| {
                let score = map
                    .iter()
                    .map(|(name, value)| total / frequency[&(name.clone(), value.to_string())] as f64)
                    .sum::<f64>();
                (index, score)
            })
            .collect();
        // Stable sort keeps input order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let records: Vec<Value> = scored
            .iter()
            .enumerate()
            .map(|(position, (index, score))| {
                let id = tokens[*index].fields.get(field).cloned().unwrap_or(Value::Null);
                json!({ "tokenID": id, "rank": position + 1, "score": score })
            })
            .collect();
        Ok(Value::Array(records))
    }
}

struct FakeInstaller {
    probe: Arc<FakeProbe>,
}

#[async_trait]
impl PackageInstaller for FakeInstaller {
    async fn install(&self, package: &str) -> Result<(), RuntimeFailure> {
        self.probe.installs.fetch_add(1, Ordering::SeqCst);

        let pending = self.probe.install_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.probe.install_failures.store(pending - 1, Ordering::SeqCst);
            return Err(RuntimeFailure::new(format!("No matching distribution found for {package}")));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddedRuntime for FakeRuntime {
    async fn load(&self) -> Result<(), RuntimeFailure> {
        self.probe.loads.fetch_add(1, Ordering::SeqCst);

        let delay = *self.probe.load_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.probe.fail_load.load(Ordering::SeqCst) {
            return Err(RuntimeFailure::new("failed to fetch runtime assets"));
        }
        Ok(())
    }

    async fn load_module(&self, name: &str) -> Result<(), RuntimeFailure> {
        self.probe.module_loads.fetch_add(1, Ordering::SeqCst);
        if name != "pip" {
            return Err(RuntimeFailure::new(format!("No module named '{name}'")));
        }
        Ok(())
    }

    async fn import_installer(&self, _name: &str) -> Result<Arc<dyn PackageInstaller>, RuntimeFailure> {
        Ok(Arc::new(FakeInstaller {
            probe: self.probe.clone(),
        }))
    }

    async fn run_script(&self, _source: &str, input: &Value) -> Result<String, RuntimeFailure> {
        self.probe.runs.fetch_add(1, Ordering::SeqCst);

        let delay = *self.probe.run_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.probe.fail_run.load(Ordering::SeqCst) {
            return Err(RuntimeFailure::new("ValueError: collection is empty"));
        }
        let raw_override = self.probe.raw_override.lock().unwrap().clone();
        if let Some(raw) = raw_override {
            return Ok(raw);
        }

        Ok(Self::rank(input)?.to_string())
    }
}
