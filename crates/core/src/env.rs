//! Isolated build environments.
//!
//! Every external command a build spawns runs with a scrubbed environment
//! rooted at a per-build temporary directory: home, caches, data, and temp
//! space all live beneath one root that vanishes with the build. The only
//! ambient value carried over is `PATH` — the package manager and test
//! runner are the caller's tools — plus a pinned locale and
//! `SOURCE_DATE_EPOCH` for reproducible outputs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use crate::Result;
use crate::config::BuildConfig;

/// Value is January 1, 1980 00:00:00 UTC (ZIP epoch)
const SOURCE_DATE_EPOCH: &str = "315532800";

/// The environment-variable bindings for one build invocation.
#[derive(Debug, Clone)]
pub struct IsolatedEnv {
  root: PathBuf,
  config: BuildConfig,
  vars: BTreeMap<String, String>,
}

impl IsolatedEnv {
  /// Create the binding set rooted at `root`, materializing the scoped
  /// directories on disk.
  pub fn new(root: &Path, config: &BuildConfig) -> Result<Self> {
    let tmp_dir = root.join("tmp");
    fs::create_dir_all(&tmp_dir)?;
    fs::create_dir_all(&config.cache_dir)?;
    fs::create_dir_all(&config.data_dir)?;
    fs::create_dir_all(&config.home_dir)?;

    let mut vars = BTreeMap::new();
    vars.insert("HOME".to_string(), config.home_dir.display().to_string());
    vars.insert(
      "XDG_CACHE_HOME".to_string(),
      config.cache_dir.display().to_string(),
    );
    vars.insert(
      "XDG_DATA_HOME".to_string(),
      config.data_dir.display().to_string(),
    );
    for name in ["TMPDIR", "TMP", "TEMP", "TEMPDIR"] {
      vars.insert(name.to_string(), tmp_dir.display().to_string());
    }
    // Minimal locale
    vars.insert("LANG".to_string(), "C".to_string());
    vars.insert("LC_ALL".to_string(), "C".to_string());
    vars.insert(
      "SOURCE_DATE_EPOCH".to_string(),
      SOURCE_DATE_EPOCH.to_string(),
    );
    // External tools come from the caller's PATH; everything stateful is
    // pinned beneath the root.
    if let Ok(path) = std::env::var("PATH") {
      vars.insert("PATH".to_string(), path);
    }

    Ok(Self {
      root: root.to_path_buf(),
      config: config.clone(),
      vars,
    })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  pub fn vars(&self) -> &BTreeMap<String, String> {
    &self.vars
  }

  /// Add or override a binding.
  pub fn set(&mut self, name: &str, value: &str) {
    self.vars.insert(name.to_string(), value.to_string());
  }

  /// Apply the bindings to a command, clearing everything else first.
  pub fn apply(&self, command: &mut Command) {
    command.env_clear();
    for (name, value) in &self.vars {
      command.env(name, value);
    }
    debug!(root = %self.root.display(), "applied isolated environment");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  /// Bindings allowed to point outside the build root.
  const AMBIENT: &[&str] = &["PATH", "LANG", "LC_ALL", "SOURCE_DATE_EPOCH"];

  #[test]
  fn every_stateful_binding_stays_beneath_the_root() {
    let root = TempDir::new().unwrap();
    let config = BuildConfig::hermetic(root.path());
    let env = IsolatedEnv::new(root.path(), &config).unwrap();

    for (name, value) in env.vars() {
      if AMBIENT.contains(&name.as_str()) {
        continue;
      }
      assert!(
        Path::new(value).starts_with(root.path()),
        "{name}={value} escapes the build root"
      );
    }
  }

  #[test]
  fn scoped_directories_are_created() {
    let root = TempDir::new().unwrap();
    let config = BuildConfig::hermetic(root.path());
    IsolatedEnv::new(root.path(), &config).unwrap();

    assert!(config.home_dir.is_dir());
    assert!(config.cache_dir.is_dir());
    assert!(root.path().join("tmp").is_dir());
  }

  #[test]
  fn set_overrides_a_binding() {
    let root = TempDir::new().unwrap();
    let config = BuildConfig::hermetic(root.path());
    let mut env = IsolatedEnv::new(root.path(), &config).unwrap();

    env.set("PYTHONPATH", "/some/deps");
    assert_eq!(env.vars()["PYTHONPATH"], "/some/deps");
  }

  #[tokio::test]
  async fn applied_environment_is_scrubbed() {
    let root = TempDir::new().unwrap();
    let config = BuildConfig::hermetic(root.path());
    let env = IsolatedEnv::new(root.path(), &config).unwrap();

    let mut cmd = Command::new("sh");
    cmd.args(["-c", "printf '%s' \"$HOME:$KILN_LEAK_CHECK\""]);
    cmd.env("KILN_LEAK_CHECK", "leaked");
    env.apply(&mut cmd);

    let output = cmd.output().await.unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, format!("{}:", config.home_dir.display()));
  }
}
