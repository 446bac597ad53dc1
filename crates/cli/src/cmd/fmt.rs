//! Implementation of the `kiln fmt` command.

use std::path::Path;

use anyhow::{Context, Result};

use kiln_core::CoreError;
use kiln_core::fmtcheck::{FmtMode, run_formatter};
use kiln_core::manifest::ProjectManifest;

use crate::output;

/// Execute the fmt command.
///
/// In check mode, non-conforming files surface as a non-zero exit without
/// touching anything.
pub fn cmd_fmt(source: &Path, check: bool) -> Result<()> {
  let manifest = ProjectManifest::load(source)?;
  let mode = if check { FmtMode::Check } else { FmtMode::Write };

  let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
  match rt.block_on(run_formatter(source, &manifest, mode)) {
    Ok(()) => {
      if check {
        output::print_success("Formatting is clean");
      }
      Ok(())
    }
    Err(e @ CoreError::FormatCheck { .. }) => {
      output::print_error(&e.to_string());
      std::process::exit(1);
    }
    Err(e) => Err(e).context("formatter failed"),
  }
}
