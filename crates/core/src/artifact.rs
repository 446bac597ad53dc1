//! Artifact assembly.
//!
//! The output of a build is an immutable directory tree:
//!
//! ```text
//! <out_root>/<name>-<id>/
//! ├── bin/<name>             # entry launcher
//! ├── bin/<name>-module      # module launcher
//! ├── deps/                  # installed dependency set
//! ├── <source tree copy>
//! └── .kiln-receipt          # written last
//! ```
//!
//! Assembly happens in a staging directory beside the final location and
//! becomes visible only through one atomic rename, so a killed build never
//! leaves a partially visible artifact.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use kiln_platform::Platform;

use crate::Result;
use crate::consts::{DEPS_DIRNAME, RECEIPT_FILENAME, RECEIPT_VERSION, SOURCE_EXCLUDES};
use crate::hash::BuildId;
use crate::launcher::{self, LauncherSpec};
use crate::manifest::ProjectManifest;

/// Receipt written into an artifact once assembly completes.
///
/// Its presence marks the artifact as complete; an identifier-addressed
/// directory without one is a leftover from an interrupted build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
  pub version: u32,
  pub name: String,
  pub id: BuildId,
  pub platform: String,
  pub packages: usize,
  pub built_at: DateTime<Utc>,
}

/// The identifier-addressed location of an artifact.
pub fn artifact_dir(out_root: &Path, name: &str, id: &BuildId) -> PathBuf {
  out_root.join(format!("{name}-{id}"))
}

/// Read an artifact's receipt, `None` if absent.
pub fn read_receipt(artifact: &Path) -> Result<Option<Receipt>> {
  let path = artifact.join(RECEIPT_FILENAME);
  if !path.exists() {
    return Ok(None);
  }

  let content = fs::read_to_string(&path)?;
  Ok(Some(serde_json::from_str(&content)?))
}

/// Whether an artifact directory holds a completed build.
pub fn is_complete(artifact: &Path) -> bool {
  matches!(
    read_receipt(artifact),
    Ok(Some(receipt)) if receipt.version == RECEIPT_VERSION
  )
}

/// Inputs to one assembly.
#[derive(Debug)]
pub struct AssembleRequest<'a> {
  pub source: &'a Path,
  pub deps: &'a Path,
  pub manifest: &'a ProjectManifest,
  pub id: &'a BuildId,
  pub platform: Platform,
  pub packages: usize,
}

/// Assemble the final output tree.
///
/// Returns the artifact path. If a complete artifact for this identifier
/// already exists it is returned untouched (cache hit); artifacts are
/// never mutated after assembly.
pub fn assemble(out_root: &Path, request: &AssembleRequest<'_>) -> Result<PathBuf> {
  fs::create_dir_all(out_root)?;

  let name = &request.manifest.project.name;
  let final_dir = artifact_dir(out_root, name, request.id);
  if is_complete(&final_dir) {
    info!(artifact = %final_dir.display(), "artifact already built");
    return Ok(final_dir);
  }
  if final_dir.exists() {
    // Leftover from an interrupted build; no receipt, so rebuild it
    warn!(artifact = %final_dir.display(), "removing incomplete artifact");
    fs::remove_dir_all(&final_dir)?;
  }

  // Stage beside the final location so the last rename stays on one
  // filesystem
  let staging = out_root.join(format!(".stage-{}-{}", request.id, std::process::id()));
  if staging.exists() {
    fs::remove_dir_all(&staging)?;
  }
  fs::create_dir_all(&staging)?;
  let guard = StageGuard::new(&staging);

  let copied = copy_tree(request.source, &staging, SOURCE_EXCLUDES)?;
  debug!(files = copied, "copied source tree");

  let deps_dir = staging.join(DEPS_DIRNAME);
  if request.deps.is_dir() {
    copy_tree(request.deps, &deps_dir, &[])?;
  } else {
    fs::create_dir_all(&deps_dir)?;
  }

  launcher::write_launchers(&staging, name, &LauncherSpec::from_manifest(request.manifest))?;

  let receipt = Receipt {
    version: RECEIPT_VERSION,
    name: name.clone(),
    id: request.id.clone(),
    platform: request.platform.to_string(),
    packages: request.packages,
    built_at: Utc::now(),
  };
  let content = serde_json::to_string_pretty(&receipt)?;
  fs::write(staging.join(RECEIPT_FILENAME), format!("{content}\n"))?;

  fs::rename(&staging, &final_dir)?;
  guard.disarm();

  info!(artifact = %final_dir.display(), "artifact assembled");
  Ok(final_dir)
}

/// Copy a directory tree, skipping excluded entry names and symlinks.
///
/// Returns the number of files copied.
fn copy_tree(src: &Path, dst: &Path, excludes: &[&str]) -> Result<u64> {
  let mut copied = 0;

  let walker = WalkDir::new(src)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| {
      e.file_name()
        .to_str()
        .map(|name| !excludes.contains(&name) && !name.starts_with(".stage-"))
        .unwrap_or(true)
    });

  for entry in walker {
    let entry = entry.map_err(|e| {
      std::io::Error::other(format!("failed to walk {}: {e}", src.display()))
    })?;
    let rel = entry
      .path()
      .strip_prefix(src)
      .expect("walkdir yields paths under its root");
    let target = dst.join(rel);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&target)?;
    } else if entry.file_type().is_file() {
      if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
      }
      fs::copy(entry.path(), &target)?;
      copied += 1;
    } else {
      warn!(path = %entry.path().display(), "skipping symlink in source tree");
    }
  }

  Ok(copied)
}

/// Removes the staging directory unless the assembly reached its rename.
struct StageGuard {
  path: PathBuf,
  armed: bool,
}

impl StageGuard {
  fn new(path: &Path) -> Self {
    Self {
      path: path.to_path_buf(),
      armed: true,
    }
  }

  fn disarm(mut self) {
    self.armed = false;
  }
}

impl Drop for StageGuard {
  fn drop(&mut self) {
    if self.armed {
      let _ = fs::remove_dir_all(&self.path);
    }
  }
}
