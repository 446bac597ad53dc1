//! The test gate.
//!
//! A build is not publishable until the project's suite passes against the
//! freshly installed dependency set. The gate reports pass/fail; closing
//! the build on failure is the orchestrator's decision.

use std::io;
use std::path::Path;

use tokio::process::Command;
use tracing::info;

use crate::env::IsolatedEnv;
use crate::manifest::ProjectManifest;
use crate::{CoreError, Result};

/// Outcome of one gate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateReport {
  pub passed: bool,
  pub code: Option<i32>,
}

/// Run the project's test suite against an installed dependency set.
///
/// The runner executes from the source root with the target directory and
/// the source root on the module search path; its stdio streams through to
/// the caller, and its exit status decides pass/fail.
pub async fn run_tests(
  source: &Path,
  deps: &Path,
  manifest: &ProjectManifest,
  env: &IsolatedEnv,
) -> Result<GateReport> {
  let (program, args) = manifest
    .test
    .command
    .split_first()
    .expect("manifest validation guarantees a non-empty test command");

  let mut command = Command::new(program);
  command.args(args).current_dir(source);
  env.apply(&mut command);
  command.env(
    "PYTHONPATH",
    format!("{}:{}", deps.display(), source.display()),
  );

  info!(runner = %program, "running test suite");
  let status = match command.status().await {
    Ok(status) => status,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      return Err(CoreError::ToolMissing(program.clone()));
    }
    Err(e) => return Err(e.into()),
  };

  Ok(GateReport {
    passed: status.success(),
    code: status.code(),
  })
}
