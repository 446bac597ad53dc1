//! Build orchestration.
//!
//! The pipeline is strictly linear, no internal concurrency:
//!
//! ```text
//! Start → Resolving → Installing → Testing → Assembling → Done
//!                                     └── fail ──────────→ Aborted
//! ```
//!
//! With the gate disabled, Installing hands straight to Assembling. No
//! aborted path produces an artifact: everything before assembly lives
//! under a temporary build root, and assembly publishes atomically.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tracing::info;

use kiln_platform::Platform;

use crate::artifact::{self, AssembleRequest};
use crate::config::BuildConfig;
use crate::env::IsolatedEnv;
use crate::gate;
use crate::hash::BuildId;
use crate::lockfile::Lockfile;
use crate::manager::PackageManager;
use crate::manifest::ProjectManifest;
use crate::{CoreError, Result};

/// Phases of one build, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Resolving,
  Installing,
  Testing,
  Assembling,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Phase::Resolving => "resolving",
      Phase::Installing => "installing",
      Phase::Testing => "testing",
      Phase::Assembling => "assembling",
    };
    write!(f, "{name}")
  }
}

/// Options for one build invocation.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Output root; the artifact lands at `<out_root>/<name>-<id>`.
  pub out_root: PathBuf,
  /// Disable the test gate.
  pub skip_tests: bool,
  /// Explicit configuration; defaults to hermetic under the build root.
  pub config: Option<BuildConfig>,
}

/// Summary of a completed build.
#[derive(Debug)]
pub struct BuildReport {
  pub id: BuildId,
  pub platform: Platform,
  pub artifact: PathBuf,
  pub packages: usize,
  /// Whether the test gate ran.
  pub gated: bool,
  /// Whether an existing artifact satisfied the build.
  pub cached: bool,
  pub elapsed: Duration,
}

/// Run one build to completion.
///
/// # Errors
/// [`CoreError::Export`] / [`CoreError::Install`] abort during resolution,
/// [`CoreError::TestsFailed`] closes the gate; in every error path the
/// output root is left without a new artifact.
pub async fn run_build<M: PackageManager>(
  source: &Path,
  manager: &M,
  options: &BuildOptions,
) -> Result<BuildReport> {
  let started = Instant::now();

  let platform = Platform::current()?;
  let manifest = ProjectManifest::load(source)?;
  let lockfile = Lockfile::load(&manifest.lockfile_path(source))?;
  let id = lockfile.id().clone();
  info!(
    project = %manifest.project.name,
    id = %id,
    platform = %platform,
    manager = manager.name(),
    "starting build"
  );

  let final_dir = artifact::artifact_dir(&options.out_root, &manifest.project.name, &id);
  if artifact::is_complete(&final_dir) {
    let receipt = artifact::read_receipt(&final_dir)?
      .expect("is_complete implies a readable receipt");
    info!(artifact = %final_dir.display(), "artifact up to date");
    return Ok(BuildReport {
      id,
      platform,
      artifact: final_dir,
      packages: receipt.packages,
      gated: false,
      cached: true,
      elapsed: started.elapsed(),
    });
  }

  let build_root = TempDir::new()?;
  let config = match &options.config {
    Some(config) => config.clone(),
    None => BuildConfig::hermetic(build_root.path()),
  };
  let env = IsolatedEnv::new(build_root.path(), &config)?;

  info!(phase = %Phase::Resolving, "exporting pinned requirements");
  let reqs = manager.export(&lockfile, &env).await?;

  info!(phase = %Phase::Installing, packages = reqs.len(), "installing dependency set");
  let deps_dir = build_root.path().join("deps");
  manager.install(&reqs, &deps_dir, &env).await?;

  let gated = !options.skip_tests;
  if gated {
    info!(phase = %Phase::Testing, "running test gate");
    let report = gate::run_tests(source, &deps_dir, &manifest, &env).await?;
    if !report.passed {
      return Err(CoreError::TestsFailed { code: report.code });
    }
  }

  info!(phase = %Phase::Assembling, "assembling artifact");
  let artifact = artifact::assemble(
    &options.out_root,
    &AssembleRequest {
      source,
      deps: &deps_dir,
      manifest: &manifest,
      id: &id,
      platform,
      packages: reqs.len(),
    },
  )?;

  Ok(BuildReport {
    id,
    platform,
    artifact,
    packages: reqs.len(),
    gated,
    cached: false,
    elapsed: started.elapsed(),
  })
}
