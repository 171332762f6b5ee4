// src/config.rs

//! Install configuration
//!
//! All filesystem locations the installer touches are carried here and
//! handed to the orchestrator at construction. Nothing is read from
//! global state, so tests can point every location at a temp directory.

use std::path::{Path, PathBuf};

/// Default scratch workspace for unpacking package containers
pub const DEFAULT_SCRATCH_DIR: &str = "/tmp/pms_extract";

/// Default registry directory
pub const DEFAULT_REGISTRY_DIR: &str = "/var/lib/pms/db";

/// Default root that payload entries are unpacked under
pub const DEFAULT_TARGET_ROOT: &str = "/";

/// Filesystem locations used by one installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    /// Scratch workspace, wiped at the start of every install
    pub scratch_dir: PathBuf,
    /// One file per installed package lives here
    pub registry_dir: PathBuf,
    /// Payload entry paths are applied relative to this directory
    pub target_root: PathBuf,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            registry_dir: PathBuf::from(DEFAULT_REGISTRY_DIR),
            target_root: PathBuf::from(DEFAULT_TARGET_ROOT),
        }
    }
}

impl InstallConfig {
    /// Use a different scratch workspace
    pub fn with_scratch_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.scratch_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Use a different registry directory
    pub fn with_registry_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.registry_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Unpack payloads under a different root
    pub fn with_target_root(mut self, dir: impl AsRef<Path>) -> Self {
        self.target_root = dir.as_ref().to_path_buf();
        self
    }

    /// Place all three locations under one base directory
    ///
    /// Produces `<base>/scratch`, `<base>/db` and `<base>/root`.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            scratch_dir: base.join("scratch"),
            registry_dir: base.join("db"),
            target_root: base.join("root"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locations() {
        let config = InstallConfig::default();
        assert_eq!(config.scratch_dir, Path::new("/tmp/pms_extract"));
        assert_eq!(config.registry_dir, Path::new("/var/lib/pms/db"));
        assert_eq!(config.target_root, Path::new("/"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = InstallConfig::default()
            .with_scratch_dir("/a")
            .with_registry_dir("/b")
            .with_target_root("/c");
        assert_eq!(config.scratch_dir, Path::new("/a"));
        assert_eq!(config.registry_dir, Path::new("/b"));
        assert_eq!(config.target_root, Path::new("/c"));
    }

    #[test]
    fn test_rooted_at() {
        let config = InstallConfig::rooted_at("/base");
        assert_eq!(config.scratch_dir, Path::new("/base/scratch"));
        assert_eq!(config.registry_dir, Path::new("/base/db"));
        assert_eq!(config.target_root, Path::new("/base/root"));
    }
}
