// src/preflight.rs

//! Checks run by the command line before an install starts

use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Effective user id of this process, `None` where uids don't exist
pub fn effective_uid() -> Option<u32> {
    #[cfg(unix)]
    return Some(nix::unistd::geteuid().as_raw());

    #[cfg(not(unix))]
    return None;
}

/// Fail unless the given effective uid is root
///
/// Hosts without uids can't prove privilege, so installs are refused there.
pub fn require_root(euid: Option<u32>) -> Result<()> {
    match euid {
        Some(0) => {
            debug!("Running with root privileges");
            Ok(())
        }
        Some(euid) => Err(Error::Privilege(format!("effective uid {}", euid))),
        None => Err(Error::Privilege(
            "privilege check is only supported on unix hosts".to_string(),
        )),
    }
}

/// Fail unless the package path is absolute
pub fn require_absolute(package_path: &Path) -> Result<()> {
    if !package_path.is_absolute() {
        return Err(Error::Path(package_path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_root() {
        assert!(require_root(Some(0)).is_ok());

        let err = require_root(Some(1000)).unwrap_err();
        assert!(matches!(err, Error::Privilege(_)));
        assert!(err.to_string().contains("effective uid 1000"));
    }

    #[test]
    fn test_require_root_without_uids_is_refused() {
        let err = require_root(None).unwrap_err();
        assert!(matches!(err, Error::Privilege(_)));
        assert!(err.to_string().contains("only supported on unix"));
    }

    #[cfg(unix)]
    #[test]
    fn test_effective_uid_present_on_unix() {
        assert!(effective_uid().is_some());
    }

    #[test]
    fn test_require_absolute() {
        assert!(require_absolute(Path::new("/srv/pkgs/app.pms")).is_ok());
        assert!(matches!(
            require_absolute(Path::new("app.pms")),
            Err(Error::Path(_))
        ));
        assert!(require_absolute(Path::new("./app.pms")).is_err());
    }
}
