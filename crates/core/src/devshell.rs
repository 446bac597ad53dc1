//! Development shell surface.
//!
//! The dev shell exposes a set of named CLI utilities (by default the
//! `nickel` configuration evaluator and the `mask` task runner, plus the
//! package manager and formatter) and an activation script for the
//! caller's shell. Only presence and invocation are kiln's concern; the
//! tools themselves stay external.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use kiln_platform::Shell;

use crate::manifest::ProjectManifest;

/// Presence of one named tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
  pub name: String,
  pub path: Option<PathBuf>,
}

impl ToolStatus {
  pub fn found(&self) -> bool {
    self.path.is_some()
  }
}

/// Probe every tool the dev shell exposes, in declaration order.
pub fn probe_tools(manifest: &ProjectManifest, manager: &str) -> Vec<ToolStatus> {
  let mut names: Vec<String> = manifest.shell.tools.clone();
  names.push(manager.to_string());
  if let Some(tool) = manifest.fmt_tool() {
    names.push(tool.to_string());
  }

  let mut seen = HashSet::new();
  names.retain(|name| seen.insert(name.clone()));

  names
    .into_iter()
    .map(|name| {
      let path = which::which(&name).ok();
      debug!(tool = %name, found = path.is_some(), "probed dev shell tool");
      ToolStatus { name, path }
    })
    .collect()
}

/// Names of the tools a probe did not find.
pub fn missing_tools(statuses: &[ToolStatus]) -> Vec<&str> {
  statuses
    .iter()
    .filter(|s| !s.found())
    .map(|s| s.name.as_str())
    .collect()
}

/// Render the activation script for an interactive session.
///
/// Sourcing the script drops the caller into the project's environment:
/// the source tree lands on the module search path and the project name is
/// exported for prompts and tooling.
pub fn render_activation(shell: Shell, source: &Path, manifest: &ProjectManifest) -> String {
  let mut lines = vec![
    shell.comment(&format!("kiln dev shell for {}", manifest.project.name)),
    shell.export_var("KILN_PROJECT", &manifest.project.name),
    shell.prepend_path("PYTHONPATH", &source.display().to_string()),
  ];
  lines.push(String::new());
  lines.join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn manifest(tools: &str) -> ProjectManifest {
    toml::from_str(&format!(
      "[project]\nname = \"demo\"\n[shell]\ntools = [{tools}]\n"
    ))
    .unwrap()
  }

  #[test]
  fn probe_reports_present_and_missing_tools() {
    // `sh` exists everywhere the support matrix reaches
    let statuses = probe_tools(&manifest("\"sh\", \"kiln-no-such-tool\""), "uv");
    let sh = statuses.iter().find(|s| s.name == "sh").unwrap();
    let missing = statuses.iter().find(|s| s.name == "kiln-no-such-tool").unwrap();

    assert!(sh.found());
    assert!(!missing.found());
    assert!(missing_tools(&statuses).contains(&"kiln-no-such-tool"));
  }

  #[test]
  fn probe_includes_manager_and_formatter_once() {
    // `ruff` is both a shell tool and the formatter; it must appear once
    let statuses = probe_tools(&manifest("\"nickel\", \"mask\", \"ruff\""), "uv");
    let names: Vec<_> = statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["nickel", "mask", "ruff", "uv"]);
  }

  #[test]
  fn activation_script_exports_the_project() {
    let script = render_activation(Shell::Sh, Path::new("/work/demo"), &manifest("\"mask\""));
    assert!(script.contains("export KILN_PROJECT=\"demo\""));
    assert!(script.contains("export PYTHONPATH=\"/work/demo\":$PYTHONPATH"));
    assert!(script.starts_with("# kiln dev shell for demo"));
  }
}
