//! Rarity service configuration
//!
//! Values are resolved in this order:
//! 1. Built-in defaults
//! 2. `.env` file in the current directory or its parents (if present)
//! 3. Process environment variables
//! 4. Explicit `with_*` overrides
//!
//! ## Environment Variables
//! - `RARITY_PYTHON`: interpreter used to host the ranking package (default `python3`)
//! - `RARITY_VENV_DIR`: virtual environment created on first bootstrap, or `none`
//!   to install straight into the interpreter (default `$XDG_CACHE_HOME/rarity/venv`,
//!   then `$HOME/.cache/rarity/venv`)
//!
//! Distribution interpreters that mark themselves externally managed refuse
//! `pip install`, so the ranking package goes into a private virtual
//! environment unless `none` is chosen explicitly.
//! - `RARITY_PACKAGE`: ranking package to install (default `open-rarity`)
//! - `RARITY_INSTALLER`: installer module loaded inside the runtime (default `pip`)
//! - `RARITY_TIMEOUT_SECS`: limit for each bootstrap, install and execute step (optional)

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RarityError, RarityResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RarityConfig {
    /// Interpreter executable or path
    pub python: PathBuf,

    /// Virtual environment hosting the installed package
    pub venv_dir: Option<PathBuf>,

    /// Ranking package installed on first use
    pub package: String,

    /// Module providing package installation inside the runtime
    pub installer_module: String,

    /// Limit applied to every runtime suspension point
    pub timeout: Option<Duration>,
}

impl Default for RarityConfig {
    fn default() -> Self {
        Self::defaults(&|key: &str| std::env::var(key).ok())
    }
}

/// Per-user virtual environment location
fn default_venv_dir<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

    if let Some(cache) = non_empty("XDG_CACHE_HOME") {
        cache.join("rarity").join("venv")
    } else if let Some(home) = non_empty("HOME") {
        home.join(".cache").join("rarity").join("venv")
    } else {
        std::env::temp_dir().join("rarity-venv")
    }
}

impl RarityConfig {
    pub const DEFAULT_PYTHON: &'static str = "python3";
    pub const DEFAULT_PACKAGE: &'static str = "open-rarity";
    pub const DEFAULT_INSTALLER: &'static str = "pip";

    /// `RARITY_VENV_DIR` value selecting the bare interpreter
    pub const NO_VENV: &'static str = "none";

    fn defaults<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            python: PathBuf::from(Self::DEFAULT_PYTHON),
            venv_dir: Some(default_venv_dir(lookup)),
            package: Self::DEFAULT_PACKAGE.to_string(),
            installer_module: Self::DEFAULT_INSTALLER.to_string(),
            timeout: None,
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> RarityResult<Self> {
        // Missing .env files are fine
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> RarityResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::defaults(&lookup);

        if let Some(python) = lookup("RARITY_PYTHON").filter(|v| !v.trim().is_empty()) {
            config.python = PathBuf::from(python);
        }
        if let Some(dir) = lookup("RARITY_VENV_DIR").filter(|v| !v.trim().is_empty()) {
            config.venv_dir = if dir.trim().eq_ignore_ascii_case(Self::NO_VENV) {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        if let Some(package) = lookup("RARITY_PACKAGE").filter(|v| !v.trim().is_empty()) {
            config.package = package;
        }
        if let Some(installer) = lookup("RARITY_INSTALLER").filter(|v| !v.trim().is_empty()) {
            config.installer_module = installer;
        }
        if let Some(raw) = lookup("RARITY_TIMEOUT_SECS") {
            let seconds: u64 = raw
                .trim()
                .parse()
                .map_err(|_| RarityError::config("RARITY_TIMEOUT_SECS", raw.clone()))?;
            if seconds == 0 {
                return Err(RarityError::config("RARITY_TIMEOUT_SECS", raw));
            }
            config.timeout = Some(Duration::from_secs(seconds));
        }

        Ok(config)
    }

    /// Configure interpreter (fluent API)
    pub fn with_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.python = python.into();
        self
    }

    /// Configure virtual environment directory (fluent API)
    pub fn with_venv_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.venv_dir = Some(dir.into());
        self
    }

    /// Install into the interpreter itself (fluent API)
    pub fn without_venv(mut self) -> Self {
        self.venv_dir = None;
        self
    }

    /// Configure ranking package (fluent API)
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Configure installer module (fluent API)
    pub fn with_installer_module(mut self, module: impl Into<String>) -> Self {
        self.installer_module = module.into();
        self
    }

    /// Configure per-step timeout (fluent API)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RarityConfig::from_lookup(lookup_from(&[("HOME", "/home/collector")])).unwrap();

        assert_eq!(config.python, PathBuf::from("python3"));
        assert_eq!(config.package, "open-rarity");
        assert_eq!(config.installer_module, "pip");
        assert_eq!(config.venv_dir, Some(PathBuf::from("/home/collector/.cache/rarity/venv")));
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_default_venv_location() {
        let xdg = RarityConfig::from_lookup(lookup_from(&[("HOME", "/home/collector"), ("XDG_CACHE_HOME", "/var/cache/u1")]))
            .unwrap();
        assert_eq!(xdg.venv_dir, Some(PathBuf::from("/var/cache/u1/rarity/venv")));

        let homeless = RarityConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(homeless.venv_dir, Some(std::env::temp_dir().join("rarity-venv")));

        assert!(RarityConfig::default().venv_dir.is_some());
    }

    #[test]
    fn test_bare_interpreter_opt_in() {
        let config = RarityConfig::from_lookup(lookup_from(&[("HOME", "/home/collector"), ("RARITY_VENV_DIR", "None")]))
            .unwrap();
        assert!(config.venv_dir.is_none());

        assert!(RarityConfig::new().without_venv().venv_dir.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let config = RarityConfig::from_lookup(lookup_from(&[
            ("RARITY_PYTHON", "/usr/bin/python3.11"),
            ("RARITY_VENV_DIR", "/tmp/rarity-venv"),
            ("RARITY_PACKAGE", "open-rarity==0.7.3"),
            ("RARITY_TIMEOUT_SECS", "90"),
        ]))
        .unwrap();

        assert_eq!(config.python, PathBuf::from("/usr/bin/python3.11"));
        assert_eq!(config.venv_dir, Some(PathBuf::from("/tmp/rarity-venv")));
        assert_eq!(config.package, "open-rarity==0.7.3");
        assert_eq!(config.timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = RarityConfig::from_lookup(lookup_from(&[("RARITY_PYTHON", "  "), ("RARITY_PACKAGE", "")])).unwrap();
        assert_eq!(config.python, PathBuf::from("python3"));
        assert_eq!(config.package, "open-rarity");
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        for raw in ["soon", "-1", "0"] {
            let result = RarityConfig::from_lookup(lookup_from(&[("RARITY_TIMEOUT_SECS", raw)]));
            match result {
                Err(RarityError::Configuration { field, value }) => {
                    assert_eq!(field, "RARITY_TIMEOUT_SECS");
                    assert_eq!(value, raw);
                }
                other => panic!("expected configuration error for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_fluent_overrides() {
        let config = RarityConfig::new()
            .with_python("python3.12")
            .with_venv_dir(".rarity-venv")
            .with_package("open-rarity")
            .with_installer_module("pip")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.python, PathBuf::from("python3.12"));
        assert_eq!(config.venv_dir, Some(PathBuf::from(".rarity-venv")));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
