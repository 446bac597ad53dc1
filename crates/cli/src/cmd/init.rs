//! Implementation of the `kiln init` command.

use std::path::Path;

use anyhow::{Result, bail};

use kiln_core::consts::MANIFEST_FILENAME;
use kiln_core::manifest::ProjectManifest;

use crate::output;

/// Execute the init command.
///
/// Writes a starter descriptor; refuses to overwrite an existing one.
pub fn cmd_init(source: &Path, name: Option<&str>) -> Result<()> {
  let path = source.join(MANIFEST_FILENAME);
  if path.exists() {
    bail!("{} already exists", path.display());
  }

  let name = match name {
    Some(name) => name.to_string(),
    None => source
      .canonicalize()?
      .file_name()
      .and_then(|n| n.to_str())
      .unwrap_or("project")
      .to_string(),
  };

  std::fs::write(&path, ProjectManifest::starter(&name))?;
  output::print_success(&format!("Wrote {}", path.display()));
  Ok(())
}
