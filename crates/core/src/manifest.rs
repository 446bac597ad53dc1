//! Project descriptor (`kiln.toml`).
//!
//! The descriptor lives at the root of a source tree and names what kiln
//! needs to know about the project: where the lockfile is, which script is
//! the entry point, which package is importable as a module, and which
//! external tools the test gate, formatter, and dev shell use.
//!
//! # Format
//!
//! ```toml
//! [project]
//! name = "execution-handler"
//! entry = "execution_handler.py"
//! module = "src"
//! lockfile = "uv.lock"
//!
//! [test]
//! command = ["pytest"]
//!
//! [fmt]
//! command = ["ruff", "format"]
//!
//! [shell]
//! tools = ["nickel", "mask"]
//! ```
//!
//! Only `[project].name` is required; everything else defaults to the
//! values above.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::MANIFEST_FILENAME;
use crate::{CoreError, Result};

/// The parsed `kiln.toml` descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
  pub project: ProjectSection,
  #[serde(default)]
  pub test: TestSection,
  #[serde(default)]
  pub fmt: FmtSection,
  #[serde(default)]
  pub shell: ShellSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSection {
  /// Project name; prefixes the artifact directory.
  pub name: String,

  /// Top-level entry script, run by the first launcher.
  #[serde(default = "default_entry")]
  pub entry: String,

  /// Importable module, run by the second launcher (`python -m`).
  #[serde(default = "default_module")]
  pub module: String,

  /// Lockfile name, relative to the source root.
  #[serde(default = "default_lockfile")]
  pub lockfile: String,

  /// Interpreter the launchers delegate to.
  #[serde(default = "default_interpreter")]
  pub interpreter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSection {
  /// Test runner invocation; argv, not a shell string.
  #[serde(default = "default_test_command")]
  pub command: Vec<String>,
}

impl Default for TestSection {
  fn default() -> Self {
    Self {
      command: default_test_command(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FmtSection {
  /// Formatter invocation; argv, not a shell string.
  #[serde(default = "default_fmt_command")]
  pub command: Vec<String>,

  /// Flag appended for check (non-mutating) mode.
  #[serde(default = "default_check_flag")]
  pub check_flag: String,
}

impl Default for FmtSection {
  fn default() -> Self {
    Self {
      command: default_fmt_command(),
      check_flag: default_check_flag(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellSection {
  /// Named CLI utilities the dev shell exposes.
  #[serde(default = "default_shell_tools")]
  pub tools: Vec<String>,
}

impl Default for ShellSection {
  fn default() -> Self {
    Self {
      tools: default_shell_tools(),
    }
  }
}

fn default_entry() -> String {
  "execution_handler.py".to_string()
}

fn default_module() -> String {
  "src".to_string()
}

fn default_lockfile() -> String {
  "uv.lock".to_string()
}

fn default_interpreter() -> String {
  "python3".to_string()
}

fn default_test_command() -> Vec<String> {
  vec!["pytest".to_string()]
}

fn default_fmt_command() -> Vec<String> {
  vec!["ruff".to_string(), "format".to_string()]
}

fn default_check_flag() -> String {
  "--check".to_string()
}

fn default_shell_tools() -> Vec<String> {
  vec!["nickel".to_string(), "mask".to_string()]
}

impl ProjectManifest {
  /// Load `kiln.toml` from the root of a source tree.
  pub fn load(source: &Path) -> Result<Self> {
    let path = source.join(MANIFEST_FILENAME);
    let content = match std::fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(CoreError::ManifestMissing(path.display().to_string()));
      }
      Err(e) => return Err(e.into()),
    };

    let manifest: ProjectManifest =
      toml::from_str(&content).map_err(|e| CoreError::Manifest {
        path: path.display().to_string(),
        message: e.to_string(),
      })?;

    if manifest.project.name.is_empty() {
      return Err(CoreError::Manifest {
        path: path.display().to_string(),
        message: "project.name must not be empty".to_string(),
      });
    }
    if manifest.test.command.is_empty() {
      return Err(CoreError::Manifest {
        path: path.display().to_string(),
        message: "test.command must not be empty".to_string(),
      });
    }
    if manifest.fmt.command.is_empty() {
      return Err(CoreError::Manifest {
        path: path.display().to_string(),
        message: "fmt.command must not be empty".to_string(),
      });
    }

    Ok(manifest)
  }

  /// Absolute path of the project lockfile.
  pub fn lockfile_path(&self, source: &Path) -> PathBuf {
    source.join(&self.project.lockfile)
  }

  /// Tool name of the configured formatter, for presence probes.
  pub fn fmt_tool(&self) -> Option<&str> {
    self.fmt.command.first().map(String::as_str)
  }

  /// A starter descriptor for `kiln init`.
  pub fn starter(name: &str) -> String {
    format!(
      "[project]\n\
       name = \"{name}\"\n\
       entry = \"execution_handler.py\"\n\
       module = \"src\"\n\
       lockfile = \"uv.lock\"\n\
       \n\
       [test]\n\
       command = [\"pytest\"]\n\
       \n\
       [fmt]\n\
       command = [\"ruff\", \"format\"]\n\
       \n\
       [shell]\n\
       tools = [\"nickel\", \"mask\"]\n"
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn write_manifest(dir: &TempDir, content: &str) {
    std::fs::write(dir.path().join(MANIFEST_FILENAME), content).unwrap();
  }

  #[test]
  fn minimal_manifest_gets_defaults() {
    let dir = TempDir::new().unwrap();
    write_manifest(&dir, "[project]\nname = \"demo\"\n");

    let manifest = ProjectManifest::load(dir.path()).unwrap();
    assert_eq!(manifest.project.name, "demo");
    assert_eq!(manifest.project.entry, "execution_handler.py");
    assert_eq!(manifest.project.module, "src");
    assert_eq!(manifest.project.lockfile, "uv.lock");
    assert_eq!(manifest.test.command, vec!["pytest"]);
    assert_eq!(manifest.fmt.command, vec!["ruff", "format"]);
    assert_eq!(manifest.shell.tools, vec!["nickel", "mask"]);
  }

  #[test]
  fn explicit_fields_override_defaults() {
    let dir = TempDir::new().unwrap();
    write_manifest(
      &dir,
      r#"
        [project]
        name = "svc"
        entry = "serve.py"
        module = "svc"
        lockfile = "poetry.lock"

        [test]
        command = ["pytest", "-x", "tests"]
      "#,
    );

    let manifest = ProjectManifest::load(dir.path()).unwrap();
    assert_eq!(manifest.project.entry, "serve.py");
    assert_eq!(manifest.test.command, vec!["pytest", "-x", "tests"]);
    assert_eq!(manifest.lockfile_path(dir.path()), dir.path().join("poetry.lock"));
  }

  #[test]
  fn missing_manifest_is_a_distinct_error() {
    let dir = TempDir::new().unwrap();
    let err = ProjectManifest::load(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ManifestMissing(_)));
  }

  #[test]
  fn empty_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_manifest(&dir, "[project]\nname = \"\"\n");
    assert!(ProjectManifest::load(dir.path()).is_err());
  }

  #[test]
  fn empty_test_command_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_manifest(&dir, "[project]\nname = \"demo\"\n[test]\ncommand = []\n");
    assert!(ProjectManifest::load(dir.path()).is_err());
  }

  #[test]
  fn starter_parses_back() {
    let manifest: ProjectManifest = toml::from_str(&ProjectManifest::starter("demo")).unwrap();
    assert_eq!(manifest.project.name, "demo");
  }
}
