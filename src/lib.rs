// src/lib.rs

//! pms: a minimal package installer
//!
//! Installs packages shipped as `ar` containers holding a `control` metadata
//! file and a `data.tar` payload, and keeps a flat registry of what was
//! installed.
//!
//! # Architecture
//!
//! - Staging: unpack the container to a scratch directory, apply the payload
//!   to the target root
//! - Control parsing: `Name`, `Version`, `Depends` lines
//! - Registry: one file per package, version then dependencies
//! - All locations come from `InstallConfig`; nothing is global

pub mod archive;
pub mod config;
pub mod control;
mod error;
pub mod install;
pub mod preflight;
pub mod registry;

pub use config::InstallConfig;
pub use control::{PackageMetadata, parse_control};
pub use error::{Error, Result};
pub use install::{InstalledPackage, Installer};
pub use registry::Registry;
