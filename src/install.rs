// src/install.rs

//! Install orchestration
//!
//! An install moves through `Start -> Staged -> Parsed -> Recorded -> Done`.
//! The first failing stage ends the install. Work already committed by
//! earlier stages (payload files on disk) is left in place.

use crate::archive::{ArchiveBackend, NativeBackend, Stager};
use crate::config::InstallConfig;
use crate::control::{self, PackageMetadata};
use crate::error::Result;
use crate::registry::Registry;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Pipeline position of an install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Start,
    Staged,
    Parsed,
    Recorded,
    Done,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallStage::Start => "start",
            InstallStage::Staged => "staged",
            InstallStage::Parsed => "parsed",
            InstallStage::Recorded => "recorded",
            InstallStage::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of a successful install
#[derive(Debug, Clone)]
pub struct InstalledPackage {
    pub metadata: PackageMetadata,
    pub registry_entry: PathBuf,
    pub unpacked_entries: usize,
}

impl fmt::Display for InstalledPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Installed: {} {}", self.metadata.name(), self.metadata.version())
    }
}

/// Runs installs against one set of configured locations
pub struct Installer<B: ArchiveBackend = NativeBackend> {
    stager: Stager<B>,
    registry: Registry,
}

impl Installer<NativeBackend> {
    /// Installer using the built-in `ar`/`tar` backend
    pub fn new(config: InstallConfig) -> Self {
        Self::with_backend(config, NativeBackend::new())
    }
}

impl<B: ArchiveBackend> Installer<B> {
    pub fn with_backend(config: InstallConfig, backend: B) -> Self {
        let InstallConfig {
            scratch_dir,
            registry_dir,
            target_root,
        } = config;

        Self {
            stager: Stager::new(backend, scratch_dir, target_root),
            registry: Registry::new(registry_dir),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Install one package file
    pub fn install(&self, package_path: &Path) -> Result<InstalledPackage> {
        info!("Installing package: {}", package_path.display());
        let mut stage = InstallStage::Start;

        let result = self.run(package_path, &mut stage);
        match &result {
            Ok(installed) => info!("{}", installed),
            Err(e) => warn!("Install of {} failed after stage {}: {}", package_path.display(), stage, e),
        }
        result
    }

    fn run(&self, package_path: &Path, stage: &mut InstallStage) -> Result<InstalledPackage> {
        let staged = self.stager.stage(package_path)?;
        debug!(
            "Applied {} ({} entries) from scratch {}",
            staged.payload_member(),
            staged.unpacked_entries(),
            staged.scratch_dir().display()
        );
        advance(stage, InstallStage::Staged);

        let metadata = control::read_control(staged.control_path())?;
        advance(stage, InstallStage::Parsed);

        let registry_entry = self.registry.record(&metadata)?;
        advance(stage, InstallStage::Recorded);

        let installed = InstalledPackage {
            metadata,
            registry_entry,
            unpacked_entries: staged.unpacked_entries(),
        };
        advance(stage, InstallStage::Done);

        Ok(installed)
    }
}

fn advance(stage: &mut InstallStage, next: InstallStage) {
    debug!("Install stage {} -> {}", stage, next);
    *stage = next;
}
