//! Formatter integration.
//!
//! kiln delegates formatting to the project's configured tool and only
//! interprets its exit status. A failed check is surfaced as an error to
//! the caller; it never gates or touches build artifacts.

use std::io;
use std::path::Path;

use tokio::process::Command;
use tracing::info;

use crate::manifest::ProjectManifest;
use crate::{CoreError, Result};

/// Formatter invocation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtMode {
  /// Rewrite non-conforming files in place.
  Write,
  /// Report non-conforming files without touching them.
  Check,
}

/// Run the configured formatter over the source tree.
///
/// # Errors
/// [`CoreError::FormatCheck`] when a check finds non-conforming files,
/// [`CoreError::CmdFailed`] when a write-mode run fails,
/// [`CoreError::ToolMissing`] when the formatter is not on PATH.
pub async fn run_formatter(source: &Path, manifest: &ProjectManifest, mode: FmtMode) -> Result<()> {
  let (program, args) = manifest
    .fmt
    .command
    .split_first()
    .expect("manifest validation guarantees a non-empty fmt command");

  let mut command = Command::new(program);
  command.args(args).current_dir(source);
  if mode == FmtMode::Check {
    command.arg(&manifest.fmt.check_flag);
  }

  info!(formatter = %program, ?mode, "running formatter");
  let status = match command.status().await {
    Ok(status) => status,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      return Err(CoreError::ToolMissing(program.clone()));
    }
    Err(e) => return Err(e.into()),
  };

  if status.success() {
    return Ok(());
  }

  match mode {
    FmtMode::Check => Err(CoreError::FormatCheck {
      code: status.code(),
    }),
    FmtMode::Write => Err(CoreError::CmdFailed {
      cmd: manifest.fmt.command.join(" "),
      code: status.code(),
    }),
  }
}
