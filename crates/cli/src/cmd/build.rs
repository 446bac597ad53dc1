//! Implementation of the `kiln build` command.
//!
//! Runs the full pipeline — resolve, install, test gate, assemble — with
//! the production `uv` backend and prints a summary. A closed gate exits
//! non-zero without an artifact.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use kiln_core::CoreError;
use kiln_core::build::{BuildOptions, run_build};
use kiln_core::config::BuildConfig;
use kiln_core::manager::Uv;

use crate::output;

/// Execute the build command.
pub fn cmd_build(source: &Path, out: &Path, no_gate: bool, shared_cache: bool) -> Result<()> {
  let out = kiln_platform::expand_path(out)?;

  // Scratch home for shared-cache builds; must outlive the build
  let (config, _scratch) = if shared_cache {
    let scratch = tempfile::tempdir().context("failed to create scratch directory")?;
    let config = BuildConfig::shared_cache(scratch.path())?;
    (Some(config), Some(scratch))
  } else {
    (None, None)
  };

  let options = BuildOptions {
    out_root: out,
    skip_tests: no_gate,
    config,
  };

  let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
  let report = match rt.block_on(run_build(source, &Uv, &options)) {
    Ok(report) => report,
    Err(e @ CoreError::TestsFailed { .. }) => {
      output::print_error(&e.to_string());
      std::process::exit(1);
    }
    Err(e) => return Err(e).context("build failed"),
  };

  debug!(artifact = %report.artifact.display(), "build finished");

  println!();
  if report.cached {
    output::print_success("Artifact up to date");
  } else {
    output::print_success("Build complete!");
  }
  println!("  Artifact:   {}", report.artifact.display());
  println!("  Identifier: {}", report.id);
  println!("  Platform:   {}", report.platform);
  println!("  Packages:   {}", report.packages);
  if !report.cached {
    let gate = if report.gated { "tests passed" } else { "skipped" };
    println!("  Gate:       {}", gate);
  }
  println!("  Took:       {}", output::format_duration(report.elapsed));

  Ok(())
}
