//! Path resolution utilities

use std::path::{Path, PathBuf};

use crate::error::PlatformError;

/// Environment variable overriding the default cache root.
pub const CACHE_DIR_VAR: &str = "KILN_CACHE_DIR";

/// Environment variable overriding the default data root.
pub const DATA_DIR_VAR: &str = "KILN_DATA_DIR";

/// Default cache root for kiln state (package caches, downloads).
///
/// `$KILN_CACHE_DIR` takes precedence; otherwise the platform cache
/// directory with a `kiln` suffix.
pub fn cache_root() -> Result<PathBuf, PlatformError> {
  if let Ok(path) = std::env::var(CACHE_DIR_VAR) {
    return Ok(PathBuf::from(path));
  }

  dirs::cache_dir()
    .map(|d| d.join("kiln"))
    .ok_or(PlatformError::NoHomeDirectory)
}

/// Default data root for kiln state (tool state, receipts).
///
/// `$KILN_DATA_DIR` takes precedence; otherwise the platform data
/// directory with a `kiln` suffix.
pub fn data_root() -> Result<PathBuf, PlatformError> {
  if let Ok(path) = std::env::var(DATA_DIR_VAR) {
    return Ok(PathBuf::from(path));
  }

  dirs::data_dir()
    .map(|d| d.join("kiln"))
    .ok_or(PlatformError::NoHomeDirectory)
}

/// Expand a path, resolving `~` to the user's home directory
pub fn expand_path<P: AsRef<Path>>(path: P) -> Result<PathBuf, PlatformError> {
  let path = path.as_ref();
  let path_str = path.to_string_lossy();

  if path_str.starts_with("~/") {
    let home = dirs::home_dir().ok_or(PlatformError::NoHomeDirectory)?;
    Ok(home.join(&path_str[2..]))
  } else if path_str == "~" {
    dirs::home_dir().ok_or(PlatformError::NoHomeDirectory)
  } else {
    Ok(path.to_path_buf())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use temp_env::with_vars;

  #[test]
  #[serial]
  fn env_var_overrides_default_roots() {
    with_vars(
      [
        (CACHE_DIR_VAR, Some("/custom/cache")),
        (DATA_DIR_VAR, Some("/custom/data")),
      ],
      || {
        assert_eq!(cache_root().unwrap(), PathBuf::from("/custom/cache"));
        assert_eq!(data_root().unwrap(), PathBuf::from("/custom/data"));
      },
    )
  }

  #[test]
  #[serial]
  fn default_roots_end_in_kiln() {
    with_vars(
      [(CACHE_DIR_VAR, None::<&str>), (DATA_DIR_VAR, None::<&str>)],
      || {
        assert!(cache_root().unwrap().ends_with("kiln"));
        assert!(data_root().unwrap().ends_with("kiln"));
      },
    )
  }

  #[test]
  fn expand_tilde() {
    let home = dirs::home_dir().expect("no home directory");

    let expanded = expand_path("~/.config").unwrap();
    assert_eq!(expanded, home.join(".config"));

    let expanded = expand_path("~").unwrap();
    assert_eq!(expanded, home);
  }

  #[test]
  fn absolute_paths_pass_through() {
    let expanded = expand_path("/etc/hosts").unwrap();
    assert_eq!(expanded, PathBuf::from("/etc/hosts"));
  }
}
