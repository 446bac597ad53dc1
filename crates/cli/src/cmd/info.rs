//! Implementation of the `kiln info` command.

use std::path::Path;

use anyhow::Result;

use kiln_core::CoreError;
use kiln_core::lockfile::Lockfile;
use kiln_core::manifest::ProjectManifest;
use kiln_platform::Platform;

/// Execute the info command.
///
/// Prints the host platform, the support matrix, and — when run inside a
/// project — the descriptor summary and current lockfile identifier.
pub fn cmd_info(source: &Path) -> Result<()> {
  println!("kiln {}", env!("CARGO_PKG_VERSION"));

  match Platform::current() {
    Ok(platform) => println!("  Platform: {platform}"),
    Err(e) => println!("  Platform: unsupported ({e})"),
  }
  let supported: Vec<String> = Platform::SUPPORTED.iter().map(|p| p.to_string()).collect();
  println!("  Supported: {}", supported.join(", "));

  match ProjectManifest::load(source) {
    Ok(manifest) => {
      println!();
      println!("Project: {}", manifest.project.name);
      println!("  Entry:    {}", manifest.project.entry);
      println!("  Module:   {}", manifest.project.module);
      println!("  Lockfile: {}", manifest.project.lockfile);

      match Lockfile::load(&manifest.lockfile_path(source)) {
        Ok(lockfile) => println!("  Identifier: {}", lockfile.id()),
        Err(CoreError::LockfileMissing(_)) => println!("  Identifier: (no lockfile)"),
        Err(e) => return Err(e.into()),
      }
    }
    Err(CoreError::ManifestMissing(_)) => {
      // Not inside a project; platform info alone is still useful
    }
    Err(e) => return Err(e.into()),
  }

  Ok(())
}
