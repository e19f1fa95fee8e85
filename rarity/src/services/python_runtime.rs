//! CPython subprocess runtime
//!
//! Hosts the ranking package in a CPython interpreter, optionally inside a
//! dedicated virtual environment. Every call is a fresh interpreter process;
//! state that must survive between calls (the venv, installed packages) lives
//! on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use shared::{component_debug, component_info, component_warn, Component};

use crate::error::RuntimeFailure;
use crate::services::pip_installer::PipInstaller;
use crate::services::process::run_program;
use crate::traits::{EmbeddedRuntime, PackageInstaller};

/// Binds `rarity_input` from stdin ahead of the script
const DRIVER_PRELUDE: &str = "import json as __rarity_json\nimport sys as __rarity_sys\nrarity_input = __rarity_json.load(__rarity_sys.stdin)\n";

/// Emits `rarity_output` as the final stdout line; NaN and infinities raise
/// `ValueError` instead of producing non-standard JSON
const DRIVER_EPILOGUE: &str = "\n__rarity_sys.stdout.write(\"\\n\" + __rarity_json.dumps(globals().get(\"rarity_output\"), allow_nan=False) + \"\\n\")\n";

const IMPORT_MODULE: &str = "import importlib, sys; importlib.import_module(sys.argv[1])";
const VERSION_PROBE: &str = "import sys; print(sys.version.split()[0])";

/// Real embedded runtime driving a CPython executable
pub struct PythonRuntime {
    /// Interpreter used to bootstrap (and to create the venv)
    base_python: PathBuf,

    /// Optional virtual environment directory
    venv_dir: Option<PathBuf>,

    /// Interpreter resolved by `load`
    interpreter: OnceCell<PathBuf>,
}

impl PythonRuntime {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            base_python: python.into(),
            venv_dir: None,
            interpreter: OnceCell::new(),
        }
    }

    /// Configure virtual environment (fluent API)
    pub fn with_venv_dir(mut self, venv_dir: Option<PathBuf>) -> Self {
        self.venv_dir = venv_dir;
        self
    }

    /// Interpreter inside a virtual environment
    pub fn venv_python(venv_dir: &Path) -> PathBuf {
        if cfg!(windows) {
            venv_dir.join("Scripts").join("python.exe")
        } else {
            venv_dir.join("bin").join("python")
        }
    }

    /// Interpreter resolved by a successful `load`
    pub fn interpreter(&self) -> Result<&Path, RuntimeFailure> {
        self.interpreter
            .get()
            .map(PathBuf::as_path)
            .ok_or_else(|| RuntimeFailure::new("Python runtime is not loaded"))
    }

    /// Compose the program handed to `python -c`
    pub fn driver_program(source: &str) -> String {
        format!("{DRIVER_PRELUDE}{source}{DRIVER_EPILOGUE}")
    }

    /// Extract the raw result from script stdout
    pub fn extract_result(stdout: &str) -> Option<&str> {
        stdout.lines().rev().map(str::trim).find(|line| !line.is_empty())
    }

    async fn resolve_interpreter(&self) -> Result<PathBuf, RuntimeFailure> {
        let Some(venv_dir) = &self.venv_dir else {
            return Ok(self.base_python.clone());
        };

        let python = Self::venv_python(venv_dir);
        if tokio::fs::try_exists(&python).await.unwrap_or(false) {
            component_debug!(Component::Runtime, "Reusing virtual environment {}", venv_dir.display());
            return Ok(python);
        }

        component_info!(Component::Runtime, "🧰 Creating virtual environment {}", venv_dir.display());
        let venv_arg = venv_dir.to_string_lossy().into_owned();
        run_program(&self.base_python, &["-m", "venv", venv_arg.as_str()], None)
            .await?
            .into_result()?;
        Ok(python)
    }

    async fn import_module(&self, python: &Path, name: &str) -> Result<(), RuntimeFailure> {
        run_program(python, &["-c", IMPORT_MODULE, name], None).await?.into_result()?;
        Ok(())
    }
}

/// Reject names that the interpreter or installer would read as options
pub(crate) fn validate_name(kind: &str, name: &str) -> Result<(), RuntimeFailure> {
    if name.trim().is_empty() || name.starts_with('-') {
        return Err(RuntimeFailure::new(format!("Invalid {kind} name: {name:?}")));
    }
    Ok(())
}

#[async_trait]
impl EmbeddedRuntime for PythonRuntime {
    async fn load(&self) -> Result<(), RuntimeFailure> {
        let python = self.resolve_interpreter().await?;

        let probe = run_program(&python, &["-c", VERSION_PROBE], None).await?.into_result()?;
        component_info!(
            Component::Runtime,
            "🐍 Python {} at {}",
            probe.stdout.trim(),
            python.display()
        );

        // A concurrent load may have won; both resolved the same path.
        let _ = self.interpreter.set(python);
        Ok(())
    }

    async fn load_module(&self, name: &str) -> Result<(), RuntimeFailure> {
        validate_name("module", name)?;
        let python = self.interpreter()?;

        match self.import_module(python, name).await {
            Ok(()) => Ok(()),
            Err(failure) if name == "pip" => {
                component_warn!(Component::Runtime, "⚠️ pip unavailable ({}), bootstrapping with ensurepip", failure);
                run_program(python, &["-m", "ensurepip", "--default-pip"], None)
                    .await?
                    .into_result()?;
                self.import_module(python, name).await
            }
            Err(failure) => Err(failure),
        }
    }

    async fn import_installer(&self, name: &str) -> Result<Arc<dyn PackageInstaller>, RuntimeFailure> {
        if name != "pip" {
            return Err(RuntimeFailure::new(format!("Unsupported installer module: {name}")));
        }
        let python = self.interpreter()?.to_path_buf();
        Ok(Arc::new(PipInstaller::new(python)))
    }

    async fn run_script(&self, source: &str, input: &serde_json::Value) -> Result<String, RuntimeFailure> {
        let python = self.interpreter()?;
        let program = Self::driver_program(source);
        let payload = serde_json::to_vec(input).map_err(|e| RuntimeFailure::new(format!("Failed to encode input: {e}")))?;

        let output = run_program(python, &["-c", program.as_str()], Some(payload)).await?.into_result()?;

        Self::extract_result(&output.stdout)
            .map(str::to_string)
            .ok_or_else(|| RuntimeFailure::new("Script produced no result"))
    }
}
