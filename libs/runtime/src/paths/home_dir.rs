//! Resolution of the server home directory.
//!
//! Accepted inputs:
//! - `None` / empty: platform default (`%APPDATA%/<subdir>` on Windows,
//!   `$HOME/<subdir>` elsewhere)
//! - `~` or `~/rest`: expanded against the platform home
//! - absolute paths: kept as-is
//! - relative paths: joined onto the current working directory

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine platform home directory ({0} is not set)")]
    PlatformHomeUnavailable(&'static str),

    #[error("failed to create home directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

#[cfg(target_os = "windows")]
const PLATFORM_HOME_VAR: &str = "APPDATA";
#[cfg(not(target_os = "windows"))]
const PLATFORM_HOME_VAR: &str = "HOME";

fn platform_home() -> Option<PathBuf> {
    std::env::var_os(PLATFORM_HOME_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Resolve `configured` into an absolute home directory, optionally creating it.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    resolve_with_platform_home(configured, default_subdir, create, platform_home())
}

fn resolve_with_platform_home(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
    home: Option<PathBuf>,
) -> Result<PathBuf, HomeDirError> {
    let require_home =
        || home.clone().ok_or(HomeDirError::PlatformHomeUnavailable(PLATFORM_HOME_VAR));

    let resolved = match configured.as_deref().map(str::trim) {
        None | Some("") => require_home()?.join(default_subdir),
        Some("~") => require_home()?,
        Some(raw) => {
            if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
                require_home()?.join(rest)
            } else if Path::new(raw).is_absolute() {
                PathBuf::from(raw)
            } else {
                std::env::current_dir()
                    .map_err(HomeDirError::CurrentDir)?
                    .join(raw)
            }
        }
    };

    if create {
        std::fs::create_dir_all(&resolved).map_err(|source| HomeDirError::Create {
            path: resolved.clone(),
            source,
        })?;
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_input_uses_platform_default_subdir() {
        let tmp = tempdir().unwrap();
        let p = resolve_with_platform_home(
            None,
            ".profile_server",
            true,
            Some(tmp.path().to_path_buf()),
        )
        .unwrap();
        assert_eq!(p, tmp.path().join(".profile_server"));
        assert!(p.is_dir());
    }

    #[test]
    fn tilde_is_expanded() {
        let tmp = tempdir().unwrap();
        let p = resolve_with_platform_home(
            Some("~/custom/home".into()),
            ".profile_server",
            false,
            Some(tmp.path().to_path_buf()),
        )
        .unwrap();
        assert_eq!(p, tmp.path().join("custom/home"));
        assert!(!p.exists(), "create=false must not touch the filesystem");
    }

    #[test]
    fn absolute_path_is_kept() {
        let tmp = tempdir().unwrap();
        let abs = tmp.path().join("abs");
        let p = resolve_with_platform_home(
            Some(abs.to_string_lossy().into_owned()),
            ".profile_server",
            true,
            None,
        )
        .unwrap();
        assert_eq!(p, abs);
    }

    #[test]
    fn missing_platform_home_is_an_error() {
        let err = resolve_with_platform_home(None, ".x", false, None).unwrap_err();
        assert!(matches!(err, HomeDirError::PlatformHomeUnavailable(_)));
    }
}
