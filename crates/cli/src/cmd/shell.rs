//! Implementation of the `kiln shell` command.
//!
//! Without flags, probes the tools the dev shell exposes and reports
//! which are present. With `--print`, emits the activation script for the
//! detected (or requested) shell so callers can `eval` it.

use std::path::Path;

use anyhow::{Result, bail};
use owo_colors::{OwoColorize, Stream};

use kiln_core::devshell::{self, missing_tools};
use kiln_core::manifest::ProjectManifest;
use kiln_platform::Shell;

use crate::output::symbols;

/// Execute the shell command.
pub fn cmd_shell(source: &Path, shell: Option<&str>, print: bool) -> Result<()> {
  let manifest = ProjectManifest::load(source)?;

  if print {
    let shell = match shell {
      Some(name) => match Shell::parse(name) {
        Some(shell) => shell,
        None => bail!("unknown shell: {name}"),
      },
      None => Shell::detect(),
    };
    print!("{}", devshell::render_activation(shell, source, &manifest));
    return Ok(());
  }

  let statuses = devshell::probe_tools(&manifest, "uv");
  for status in &statuses {
    match &status.path {
      Some(path) => println!(
        "{} {}  {}",
        symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
        status.name,
        path.display()
      ),
      None => println!(
        "{} {}  not found",
        symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
        status.name
      ),
    }
  }

  let missing = missing_tools(&statuses);
  if !missing.is_empty() {
    bail!("{} dev shell tool(s) missing: {}", missing.len(), missing.join(", "));
  }

  Ok(())
}
