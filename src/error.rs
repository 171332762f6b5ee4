// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for pms
///
/// Every variant is terminal for the install that produced it.
#[derive(Error, Debug)]
pub enum Error {
    /// Process is not running with the privilege an install requires
    #[error("pms install must be run as root ({0})")]
    Privilege(String),

    /// Package path given on the command line is not absolute
    #[error("Package path must be absolute: {}", .0.display())]
    Path(PathBuf),

    /// Scratch workspace could not be reset
    #[error("Failed to prepare scratch directory {}: {source}", path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Outer package container could not be extracted
    #[error(
        "Failed to extract package {}: {source} (does the file exist and is it a valid package?)",
        path.display()
    )]
    ExtractOuterFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Container has no payload archive member
    #[error("Malformed package {}: no data.tar member", .0.display())]
    MissingPayload(PathBuf),

    /// Payload archive could not be unpacked onto the target root
    #[error("Failed to extract {member}: {source}")]
    ExtractPayloadFailed {
        member: String,
        #[source]
        source: std::io::Error,
    },

    /// Control file missing, unreadable or without a Name field
    #[error("Invalid control file: {0}")]
    Parse(String),

    /// Registry directory or record could not be written
    #[error("Registry error at {}: {source}", path.display())]
    Registry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using pms's Error type
pub type Result<T> = std::result::Result<T, Error>;
