//! Package manager capability interface.
//!
//! The orchestrator never assumes a specific dependency manager. It talks
//! to this trait: export a flat pin list from a lockfile, then install
//! that list into a dedicated target directory. The backing tool is
//! swappable; production uses the external `uv` binary.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::env::IsolatedEnv;
use crate::lockfile::{Lockfile, Requirements};
use crate::{CoreError, Result};

/// A dependency manager the orchestrator can delegate to.
///
/// Implementations must be `Send + Sync`; the orchestrator holds one for
/// the duration of a build.
#[async_trait]
pub trait PackageManager: Send + Sync {
  /// Tool name, for diagnostics and presence probes.
  fn name(&self) -> &str;

  /// Export a flat, hash-free `name==version` list from the lockfile.
  ///
  /// Must be deterministic given the lockfile bytes — no network-driven
  /// version drift.
  async fn export(&self, lockfile: &Lockfile, env: &IsolatedEnv) -> Result<Requirements>;

  /// Install every pin into `target`, never into a shared system location.
  ///
  /// # Errors
  /// Returns [`CoreError::Install`] if any package fails to install; the
  /// build aborts, nothing is retried.
  async fn install(&self, reqs: &Requirements, target: &Path, env: &IsolatedEnv) -> Result<()>;
}

/// Production backend: the external `uv` package manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uv;

impl Uv {
  /// Bind the build configuration onto a `uv` invocation.
  fn bind(&self, env: &IsolatedEnv, command: &mut Command) {
    let config = env.config();
    env.apply(command);
    command
      .env("UV_CACHE_DIR", &config.cache_dir)
      .env(
        "UV_COMPILE_BYTECODE",
        if config.compile_bytecode { "1" } else { "0" },
      )
      .env("UV_LINK_MODE", config.link_mode.as_str());
    if config.no_sync {
      command.env("UV_NO_SYNC", "1");
    }
  }
}

#[async_trait]
impl PackageManager for Uv {
  fn name(&self) -> &str {
    "uv"
  }

  async fn export(&self, lockfile: &Lockfile, env: &IsolatedEnv) -> Result<Requirements> {
    let project_dir = lockfile.path().parent().unwrap_or_else(|| Path::new("."));

    let mut command = Command::new("uv");
    command
      .args([
        "export",
        "--frozen",
        "--no-hashes",
        "--no-emit-project",
        "--format",
        "requirements.txt",
      ])
      .current_dir(project_dir);
    self.bind(env, &mut command);

    debug!(lockfile = %lockfile.path().display(), "exporting requirements");
    let output = run_tool(&mut command, "uv").await?;

    if !output.status.success() {
      return Err(CoreError::Export {
        message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let reqs = Requirements::parse(&stdout)?;
    info!(packages = reqs.len(), "exported requirements");
    Ok(reqs)
  }

  async fn install(&self, reqs: &Requirements, target: &Path, env: &IsolatedEnv) -> Result<()> {
    if reqs.is_empty() {
      info!("no dependencies to install");
      tokio::fs::create_dir_all(target).await?;
      return Ok(());
    }

    let reqs_file = env.root().join("requirements.txt");
    tokio::fs::write(&reqs_file, reqs.render()).await?;

    let mut command = Command::new("uv");
    command
      .arg("pip")
      .arg("install")
      // The exported list is the full pinned closure already
      .arg("--no-deps")
      .arg("--requirement")
      .arg(&reqs_file)
      .arg("--target")
      .arg(target);
    self.bind(env, &mut command);

    info!(packages = reqs.len(), target = %target.display(), "installing dependencies");
    let output = run_tool(&mut command, "uv").await?;

    if !output.status.success() {
      return Err(CoreError::Install {
        message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }

    Ok(())
  }
}

/// Run a tool to completion, mapping a missing binary to [`CoreError::ToolMissing`].
async fn run_tool(command: &mut Command, tool: &str) -> Result<std::process::Output> {
  match command.output().await {
    Ok(output) => Ok(output),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      Err(CoreError::ToolMissing(tool.to_string()))
    }
    Err(e) => Err(e.into()),
  }
}
