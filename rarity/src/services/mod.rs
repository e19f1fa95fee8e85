//! Service implementations
//!
//! Real implementations of the runtime traits plus the metadata loader.
//! These are the production implementations that spawn interpreters and
//! touch the file system.

pub mod metadata;
pub mod pip_installer;
pub mod process;
pub mod python_runtime;

#[cfg(test)]
mod tests;

pub use metadata::MetadataDirectory;
pub use pip_installer::PipInstaller;
pub use python_runtime::PythonRuntime;
