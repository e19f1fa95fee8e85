//! pip-backed package installer

use std::path::PathBuf;

use async_trait::async_trait;

use shared::{component_debug, Component};

use crate::error::RuntimeFailure;
use crate::services::process::run_program;
use crate::services::python_runtime::validate_name;
use crate::traits::PackageInstaller;

/// Installs packages into the interpreter's environment with `python -m pip`
pub struct PipInstaller {
    python: PathBuf,
}

impl PipInstaller {
    pub fn new(python: PathBuf) -> Self {
        Self { python }
    }

    pub fn install_args(package: &str) -> [&str; 6] {
        ["-m", "pip", "install", "--disable-pip-version-check", "--quiet", package]
    }
}

#[async_trait]
impl PackageInstaller for PipInstaller {
    async fn install(&self, package: &str) -> Result<(), RuntimeFailure> {
        validate_name("package", package)?;
        component_debug!(Component::Installer, "pip install {} via {}", package, self.python.display());

        run_program(&self.python, &Self::install_args(package), None)
            .await?
            .into_result()?;
        Ok(())
    }
}
