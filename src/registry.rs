// src/registry.rs

//! Installed-package registry
//!
//! A flat directory with one file per package, named after the package.
//! The file holds the version on the first line and one dependency per
//! following line. Re-recording a package replaces its file wholesale.

use crate::control::PackageMetadata;
use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of in-flight record files; never a valid package name
const TEMP_PREFIX: &str = ".pms-tmp-";

/// Mode of registry record files
#[cfg(unix)]
const RECORD_MODE: u32 = 0o644;

/// A record read back from the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
}

/// On-disk registry of installed packages
#[derive(Debug, Clone)]
pub struct Registry {
    dir: PathBuf,
}

impl Registry {
    /// Open a registry rooted at `dir`; nothing is created until `record`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Registry directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `name`
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Persist a package record, replacing any previous one
    ///
    /// Returns the path of the written record.
    pub fn record(&self, metadata: &PackageMetadata) -> Result<PathBuf> {
        let path = self.checked_entry_path(metadata.name())?;

        fs::create_dir_all(&self.dir).map_err(|e| self.error(&self.dir, e))?;

        if let Ok(Some(previous)) = self.get(metadata.name()) {
            info!(
                "Replacing registry entry for {} (was version {:?})",
                previous.name, previous.version
            );
        }

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.dir)
            .map_err(|e| self.error(&self.dir, e))?;
        tmp.write_all(serialize(metadata).as_bytes())
            .and_then(|_| set_record_permissions(tmp.as_file()))
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.error(&path, e))?;
        tmp.persist(&path).map_err(|e| self.error(&path, e.error))?;

        debug!("Recorded {} in registry at {}", metadata.name(), path.display());
        Ok(path)
    }

    /// Read a package record, `None` if the package was never recorded
    pub fn get(&self, name: &str) -> Result<Option<RegistryEntry>> {
        let path = self.checked_entry_path(name)?;

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.error(&path, e)),
        };

        let mut lines = contents.lines();
        let version = lines.next().unwrap_or_default().to_string();
        let dependencies = lines.map(str::to_string).collect();

        Ok(Some(RegistryEntry {
            name: name.to_string(),
            version,
            dependencies,
        }))
    }

    /// Names of all recorded packages, sorted
    pub fn names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.error(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.error(&self.dir, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| self.error(&entry.path(), e))?
                .is_file();
            // Skip in-flight temp files left by an interrupted record
            let name = entry.file_name().to_string_lossy().to_string();
            if is_file && !name.starts_with(TEMP_PREFIX) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Package names become file names; reject ones that would escape the directory
    fn checked_entry_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\0')
            || name.starts_with(TEMP_PREFIX)
        {
            return Err(self.error(
                &self.dir,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("package name {:?} cannot be used as a registry entry", name),
                ),
            ));
        }
        Ok(self.entry_path(name))
    }

    fn error(&self, path: &Path, source: io::Error) -> Error {
        Error::Registry {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Temp files start out 0600; records are world-readable like any plain file
fn set_record_permissions(file: &fs::File) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(RECORD_MODE))?;
    }
    #[cfg(not(unix))]
    let _ = file;
    Ok(())
}

/// Render a record: version line, then one dependency per line
fn serialize(metadata: &PackageMetadata) -> String {
    let mut out = String::with_capacity(metadata.version().len() + 1);
    out.push_str(metadata.version());
    out.push('\n');
    for dep in metadata.dependencies() {
        out.push_str(dep);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn meta(name: &str, version: &str, deps: &[&str]) -> PackageMetadata {
        PackageMetadata::new(name, version, deps.iter().map(|d| d.to_string())).unwrap()
    }

    #[test]
    fn test_record_creates_directory_and_file() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path().join("nested/db"));

        let path = registry.record(&meta("app", "1.2", &["libc", "libssl"])).unwrap();
        assert_eq!(path, dir.path().join("nested/db/app"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1.2\nlibc\nlibssl\n");
    }

    #[test]
    fn test_record_overwrites_previous_entry() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path());

        registry.record(&meta("app", "1.0", &["a", "b", "c"])).unwrap();
        let path = registry.record(&meta("app", "2.0", &["d"])).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "2.0\nd\n");
        assert_eq!(registry.names().unwrap(), ["app"]);
    }

    #[test]
    fn test_record_empty_version() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path());

        let path = registry.record(&meta("bare", "", &[])).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "\n");
    }

    #[test]
    fn test_get_round_trip() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path());

        assert_eq!(registry.get("app").unwrap(), None);

        registry.record(&meta("app", "1.2", &["libc"])).unwrap();
        let entry = registry.get("app").unwrap().unwrap();
        assert_eq!(entry.name, "app");
        assert_eq!(entry.version, "1.2");
        assert_eq!(entry.dependencies, ["libc"]);
    }

    #[test]
    fn test_names_sorted() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path().join("db"));
        assert!(registry.names().unwrap().is_empty());

        registry.record(&meta("zlib", "1", &[])).unwrap();
        registry.record(&meta("app", "1", &[])).unwrap();
        assert_eq!(registry.names().unwrap(), ["app", "zlib"]);
    }

    #[test]
    fn test_rejects_unsafe_names() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path().join("db"));

        for name in ["..", ".", "../escape", "a/b", ".pms-tmp-x"] {
            let result = registry.record(&meta(name, "1", &[]));
            assert!(matches!(result, Err(Error::Registry { .. })), "{name}");
        }
        assert!(!dir.path().join("escape").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_record_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path());

        let path = registry.record(&meta("app", "1.0", &["libc"])).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);

        // Replacing an entry keeps the same mode
        let path = registry.record(&meta("app", "2.0", &[])).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_names_lists_dot_tmp_packages() {
        let dir = tempdir().unwrap();
        let registry = Registry::new(dir.path());

        registry.record(&meta(".tmpfoo", "1", &[])).unwrap();
        registry.record(&meta("app", "1", &[])).unwrap();
        fs::write(dir.path().join(".pms-tmp-abc123"), "partial").unwrap();

        assert_eq!(registry.names().unwrap(), [".tmpfoo", "app"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_directory_is_registry_error() {
        // A regular file where the registry directory should be
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("db");
        fs::write(&blocker, "not a directory").unwrap();

        let registry = Registry::new(&blocker);
        let result = registry.record(&meta("app", "1", &[]));
        assert!(matches!(result, Err(Error::Registry { .. })));
    }
}
