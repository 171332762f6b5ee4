// src/archive/backend.rs

//! Archive decoding capabilities used by the stager
//!
//! Decoding happens in-process through the `ar` and `tar` crates; package
//! paths are never handed to a shell.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;
use tar::Archive;
use tracing::{debug, warn};
use xz2::read::XzDecoder;

/// Operations the stager needs from an archive implementation
pub trait ArchiveBackend {
    /// Unpack every member of the outer package container into `dest_dir`
    fn extract_container(&self, package: &Path, dest_dir: &Path) -> io::Result<()>;

    /// File names present in `dir` after container extraction, sorted
    fn list_members(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// Unpack a payload archive with its entry paths applied under `root`
    ///
    /// Returns the number of entries written.
    fn extract_payload(&self, archive: &Path, root: &Path) -> io::Result<usize>;
}

/// Backend built on the `ar` and `tar` crates
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }

    /// Turn an `ar` identifier into a plain file name, rejecting anything path-like
    fn member_name(identifier: &[u8]) -> io::Result<String> {
        let name = String::from_utf8_lossy(identifier);
        // GNU ar terminates names with '/'
        let name = name.trim_end_matches('/');

        if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\0') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid container member name {:?}", name),
            ));
        }

        Ok(name.to_string())
    }

    /// Pick a decompressor from the payload member's file name
    fn open_payload(path: &Path) -> io::Result<Box<dyn Read>> {
        let file = BufReader::new(File::open(path)?);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let reader: Box<dyn Read> = if name.ends_with(".gz") {
            Box::new(GzDecoder::new(file))
        } else if name.ends_with(".xz") {
            Box::new(XzDecoder::new(file))
        } else if name.ends_with(".zst") {
            Box::new(zstd::Decoder::with_buffer(file)?)
        } else {
            Box::new(file)
        };

        Ok(reader)
    }
}

impl ArchiveBackend for NativeBackend {
    fn extract_container(&self, package: &Path, dest_dir: &Path) -> io::Result<()> {
        debug!("Extracting container {} into {}", package.display(), dest_dir.display());

        let file = File::open(package)?;
        let mut archive = ar::Archive::new(file);
        let mut count = 0usize;

        while let Some(entry) = archive.next_entry() {
            let mut entry = entry?;
            let name = Self::member_name(entry.header().identifier())?;

            let mut out = File::create(dest_dir.join(&name))?;
            let written = io::copy(&mut entry, &mut out)?;
            debug!("Extracted member {} ({} bytes)", name, written);
            count += 1;
        }

        debug!("Extracted {} members from {}", count, package.display());
        Ok(())
    }

    fn list_members(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut members = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            members.push(entry.file_name().to_string_lossy().to_string());
        }
        members.sort();
        Ok(members)
    }

    fn extract_payload(&self, archive: &Path, root: &Path) -> io::Result<usize> {
        debug!("Unpacking payload {} onto {}", archive.display(), root.display());

        fs::create_dir_all(root)?;

        let mut payload = Archive::new(Self::open_payload(archive)?);
        payload.set_preserve_permissions(true);
        payload.set_overwrite(true);

        let mut unpacked = 0usize;
        for entry in payload.entries()? {
            let mut entry = entry?;
            let entry_path = entry.path()?.to_string_lossy().to_string();

            if entry.unpack_in(root)? {
                unpacked += 1;
            } else {
                warn!("Skipped payload entry outside the target root: {}", entry_path);
            }
        }

        debug!("Unpacked {} payload entries", unpacked);
        Ok(unpacked)
    }
}
