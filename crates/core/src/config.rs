//! Build configuration.
//!
//! Everything the environment used to carry ambiently — cache location,
//! data location, home, install strategy — is an explicit struct handed to
//! the orchestrator, so parallel builds stay independently testable.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Strategy for materializing installed packages in the target directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
  #[default]
  Copy,
  Hardlink,
  Symlink,
}

impl LinkMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      LinkMode::Copy => "copy",
      LinkMode::Hardlink => "hardlink",
      LinkMode::Symlink => "symlink",
    }
  }
}

/// Configuration for one build invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
  /// Package cache location.
  pub cache_dir: PathBuf,
  /// Tool state location.
  pub data_dir: PathBuf,
  /// Home directory exposed to build steps.
  pub home_dir: PathBuf,
  /// Precompile bytecode after install.
  pub compile_bytecode: bool,
  /// Copy-vs-link install strategy.
  pub link_mode: LinkMode,
  /// Keep the package manager away from any project virtualenv.
  pub no_sync: bool,
}

impl BuildConfig {
  /// A configuration with every stateful directory scoped beneath `root`.
  ///
  /// This is the default for builds: nothing escapes the per-build
  /// temporary root, so two builds never contaminate each other.
  pub fn hermetic(root: &Path) -> Self {
    Self {
      cache_dir: root.join("cache"),
      data_dir: root.join("data"),
      home_dir: root.join("home"),
      compile_bytecode: true,
      link_mode: LinkMode::Copy,
      no_sync: true,
    }
  }

  /// A configuration sharing the user-level cache and data roots.
  ///
  /// Useful for repeated local builds where warm caches matter more than
  /// strict isolation; the home directory still points at scratch space
  /// under `root`.
  pub fn shared_cache(root: &Path) -> Result<Self> {
    Ok(Self {
      cache_dir: kiln_platform::cache_root()?,
      data_dir: kiln_platform::data_root()?,
      home_dir: root.join("home"),
      compile_bytecode: true,
      link_mode: LinkMode::Copy,
      no_sync: true,
    })
  }
}
