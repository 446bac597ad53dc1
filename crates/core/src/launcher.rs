//! Launcher script rendering.
//!
//! An artifact carries two thin executables: one invoking the top-level
//! entry script, one invoking the project as an importable module. Both
//! put the artifact's installed dependencies on the module search path
//! before delegating, forward every caller argument unmodified, and `exec`
//! so the exit code passes straight through.
//!
//! Rendering is a pure function over a [`LauncherSpec`], unit-testable
//! without running a build.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::Result;
use crate::consts::{BIN_DIRNAME, DEPS_DIRNAME};
use crate::manifest::ProjectManifest;

/// Which of the two launchers to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherKind {
  /// Runs the top-level entry script directly.
  Entry,
  /// Runs the project as `interpreter -m <module>`.
  Module,
}

impl fmt::Display for LauncherKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LauncherKind::Entry => write!(f, "entry"),
      LauncherKind::Module => write!(f, "module"),
    }
  }
}

/// Everything a launcher needs to know about its artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct LauncherSpec {
  /// Interpreter to delegate to (e.g. `python3`).
  pub interpreter: String,
  /// Entry script path, relative to the artifact root.
  pub entry: String,
  /// Importable module name.
  pub module: String,
}

impl LauncherSpec {
  pub fn from_manifest(manifest: &ProjectManifest) -> Self {
    Self {
      interpreter: manifest.project.interpreter.clone(),
      entry: manifest.project.entry.clone(),
      module: manifest.project.module.clone(),
    }
  }
}

/// Render one launcher as POSIX sh.
///
/// The script resolves the artifact root from its own location, so the
/// artifact stays relocatable.
pub fn render_launcher(kind: LauncherKind, spec: &LauncherSpec) -> String {
  let delegate = match kind {
    LauncherKind::Entry => format!("{} \"$root\"/{}", spec.interpreter, spec.entry),
    LauncherKind::Module => format!("{} -m {}", spec.interpreter, spec.module),
  };

  format!(
    "#!/bin/sh\n\
     # Generated by kiln; do not edit.\n\
     root=\"$(CDPATH= cd -- \"$(dirname -- \"$0\")/..\" && pwd)\"\n\
     PYTHONPATH=\"$root/{deps}:$root${{PYTHONPATH:+:$PYTHONPATH}}\"\n\
     export PYTHONPATH\n\
     exec {delegate} \"$@\"\n",
    deps = DEPS_DIRNAME,
  )
}

/// Write both launchers into `<artifact>/bin`, executable on unix.
pub fn write_launchers(artifact: &Path, name: &str, spec: &LauncherSpec) -> Result<()> {
  let bin_dir = artifact.join(BIN_DIRNAME);
  fs::create_dir_all(&bin_dir)?;

  let scripts = [
    (name.to_string(), LauncherKind::Entry),
    (format!("{name}-module"), LauncherKind::Module),
  ];

  for (filename, kind) in scripts {
    let path = bin_dir.join(filename);
    fs::write(&path, render_launcher(kind, spec))?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }
  }

  Ok(())
}
