// src/archive/mod.rs

//! Package staging
//!
//! A package is an `ar` container holding a `control` metadata member and a
//! `data.tar` payload. Staging unpacks the container into a scratch
//! workspace and then unpacks the payload onto the target root. Payload
//! entries land at their final locations as soon as this step succeeds;
//! there is no rollback.

pub mod backend;

pub use backend::{ArchiveBackend, NativeBackend};

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the metadata member inside a package container
pub const CONTROL_MEMBER: &str = "control";

/// Accepted payload member names, in lookup order
pub const PAYLOAD_MEMBERS: [&str; 4] = ["data.tar", "data.tar.gz", "data.tar.xz", "data.tar.zst"];

/// A package whose payload has been written to the target root
#[derive(Debug, Clone)]
pub struct StagedPackage {
    scratch_dir: PathBuf,
    control_path: Option<PathBuf>,
    payload_member: String,
    unpacked_entries: usize,
}

impl StagedPackage {
    /// Scratch workspace the container was unpacked into
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Control member, if the container carried one
    pub fn control_path(&self) -> Option<&Path> {
        self.control_path.as_deref()
    }

    /// Payload member that was applied
    pub fn payload_member(&self) -> &str {
        &self.payload_member
    }

    /// Number of payload entries written under the target root
    pub fn unpacked_entries(&self) -> usize {
        self.unpacked_entries
    }
}

/// Unpacks package containers and applies their payloads
pub struct Stager<B: ArchiveBackend> {
    backend: B,
    scratch_dir: PathBuf,
    target_root: PathBuf,
}

impl<B: ArchiveBackend> Stager<B> {
    pub fn new(backend: B, scratch_dir: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            scratch_dir: scratch_dir.into(),
            target_root: target_root.into(),
        }
    }

    /// Stage a package: reset scratch, unpack container, check payload,
    /// unpack payload onto the target root, locate the control member
    pub fn stage(&self, package_path: &Path) -> Result<StagedPackage> {
        self.reset_scratch()?;

        self.backend
            .extract_container(package_path, &self.scratch_dir)
            .map_err(|source| Error::ExtractOuterFailed {
                path: package_path.to_path_buf(),
                source,
            })?;

        let members = self
            .backend
            .list_members(&self.scratch_dir)
            .map_err(|source| Error::Scratch {
                path: self.scratch_dir.clone(),
                source,
            })?;
        debug!("Container members: {:?}", members);

        let payload_member = PAYLOAD_MEMBERS
            .iter()
            .find(|candidate| members.iter().any(|m| m == *candidate))
            .ok_or_else(|| Error::MissingPayload(package_path.to_path_buf()))?
            .to_string();

        let unpacked_entries = self
            .backend
            .extract_payload(&self.scratch_dir.join(&payload_member), &self.target_root)
            .map_err(|source| Error::ExtractPayloadFailed {
                member: payload_member.clone(),
                source,
            })?;

        info!(
            "Unpacked {} entries from {} onto {}",
            unpacked_entries,
            payload_member,
            self.target_root.display()
        );

        let control_path = members
            .iter()
            .any(|m| m == CONTROL_MEMBER)
            .then(|| self.scratch_dir.join(CONTROL_MEMBER));

        Ok(StagedPackage {
            scratch_dir: self.scratch_dir.clone(),
            control_path,
            payload_member,
            unpacked_entries,
        })
    }

    /// Remove any previous scratch contents and recreate the directory empty
    fn reset_scratch(&self) -> Result<()> {
        let scratch_error = |source| Error::Scratch {
            path: self.scratch_dir.clone(),
            source,
        };

        match fs::remove_dir_all(&self.scratch_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(scratch_error(e)),
        }
        fs::create_dir_all(&self.scratch_dir).map_err(scratch_error)?;

        debug!("Reset scratch directory {}", self.scratch_dir.display());
        Ok(())
    }
}
