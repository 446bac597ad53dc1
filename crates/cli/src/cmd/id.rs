//! Implementation of the `kiln id` command.

use std::path::Path;

use anyhow::Result;

use kiln_core::hash::BuildId;

/// Print the build identifier a lockfile maps to.
///
/// The identifier is stable: byte-identical lockfiles always print the
/// same value.
pub fn cmd_id(lockfile: &Path) -> Result<()> {
  let id = BuildId::of_file(lockfile)?;
  println!("{id}");
  Ok(())
}
