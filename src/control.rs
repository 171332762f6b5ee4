// src/control.rs

//! Control file parser
//!
//! A control file is a line-oriented list of `Key:value` pairs. Only
//! `Name`, `Version` and `Depends` are understood; everything else is
//! ignored so newer packages keep installing.

use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Package metadata read from a control file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    name: String,
    version: String,
    dependencies: Vec<String>,
}

impl PackageMetadata {
    /// Build metadata directly, applying the same rules as the parser
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        dependencies: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Parse("package name is empty".to_string()));
        }

        let mut deps: Vec<String> = Vec::new();
        for dep in dependencies {
            if !dep.is_empty() && !deps.contains(&dep) {
                deps.push(dep);
            }
        }

        Ok(Self {
            name,
            version: version.into(),
            dependencies: deps,
        })
    }

    /// Get the package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the package version (may be empty)
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the dependency list in declaration order
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// Fields collected while scanning a control file
#[derive(Default)]
struct ControlInfo {
    name: Option<String>,
    version: Option<String>,
    dependencies: Vec<String>,
}

/// Parse control file contents into package metadata
///
/// Keys must start the line and be followed directly by `:`. The value is
/// taken verbatim. Later occurrences of a key replace earlier ones.
pub fn parse_control(contents: &str) -> Result<PackageMetadata> {
    let mut info = ControlInfo::default();

    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("Name:") {
            info.name = Some(value.to_string());
        } else if let Some(value) = line.strip_prefix("Version:") {
            info.version = Some(value.to_string());
        } else if let Some(value) = line.strip_prefix("Depends:") {
            info.dependencies = parse_dependency_list(value);
        }
    }

    let name = info
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::Parse("Name field not found".to_string()))?;

    debug!(
        "Parsed control file: {} version {:?} ({} dependencies)",
        name,
        info.version.as_deref().unwrap_or(""),
        info.dependencies.len()
    );

    PackageMetadata::new(name, info.version.unwrap_or_default(), info.dependencies)
}

/// Read and parse a staged control file
///
/// A missing control member is reported the same way as a control file
/// without a `Name` line.
pub fn read_control(path: Option<&Path>) -> Result<PackageMetadata> {
    let Some(path) = path else {
        return Err(Error::Parse("package has no control member".to_string()));
    };

    let contents = std::fs::read(path)
        .map_err(|e| Error::Parse(format!("failed to read {}: {}", path.display(), e)))?;

    parse_control(&String::from_utf8_lossy(&contents))
}

/// Split a `Depends` value on commas, dropping empty items and repeats
fn parse_dependency_list(deps: &str) -> Vec<String> {
    let mut parsed: Vec<String> = Vec::new();
    for dep in deps.split(',').filter(|dep| !dep.is_empty()) {
        if !parsed.iter().any(|seen| seen == dep) {
            parsed.push(dep.to_string());
        }
    }
    parsed
}
