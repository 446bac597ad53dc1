//! End-to-end orchestration tests against a stub package manager.
//!
//! The stub treats the lockfile itself as the flat pin list, so these
//! tests exercise the full pipeline — resolve, install, gate, assemble —
//! without a real dependency manager on PATH.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use kiln_core::build::{BuildOptions, run_build};
use kiln_core::env::IsolatedEnv;
use kiln_core::lockfile::{Lockfile, Requirements};
use kiln_core::manager::PackageManager;
use kiln_core::{CoreError, Result};

struct StubManager;

#[async_trait]
impl PackageManager for StubManager {
  fn name(&self) -> &str {
    "stub"
  }

  async fn export(&self, lockfile: &Lockfile, _env: &IsolatedEnv) -> Result<Requirements> {
    Requirements::parse(&String::from_utf8_lossy(lockfile.bytes()))
  }

  async fn install(&self, reqs: &Requirements, target: &Path, _env: &IsolatedEnv) -> Result<()> {
    std::fs::create_dir_all(target)?;
    for pin in reqs.iter() {
      let pkg = target.join(&pin.name);
      std::fs::create_dir_all(&pkg)?;
      std::fs::write(
        pkg.join("__init__.py"),
        format!("__version__ = \"{}\"\n", pin.version),
      )?;
    }
    Ok(())
  }
}

struct Project {
  _temp: TempDir,
  source: PathBuf,
  out: PathBuf,
}

fn project(test_command: &str, lock: &str) -> Project {
  let temp = TempDir::new().unwrap();
  let source = temp.path().join("source");
  std::fs::create_dir_all(source.join("src")).unwrap();
  std::fs::write(
    source.join("kiln.toml"),
    format!(
      "[project]\n\
       name = \"demo\"\n\
       entry = \"main.py\"\n\
       module = \"src\"\n\
       lockfile = \"uv.lock\"\n\
       \n\
       [test]\n\
       command = [{test_command}]\n"
    ),
  )
  .unwrap();
  std::fs::write(source.join("main.py"), "print('hi')\n").unwrap();
  std::fs::write(source.join("src/__init__.py"), "").unwrap();
  std::fs::write(source.join("uv.lock"), lock).unwrap();

  let out = temp.path().join("out");
  Project {
    source,
    out,
    _temp: temp,
  }
}

fn options(project: &Project) -> BuildOptions {
  BuildOptions {
    out_root: project.out.clone(),
    skip_tests: false,
    config: None,
  }
}

fn artifact_dirs(out: &Path) -> Vec<PathBuf> {
  match std::fs::read_dir(out) {
    Ok(entries) => entries
      .filter_map(|e| e.ok())
      .map(|e| e.path())
      .filter(|p| p.is_dir())
      .collect(),
    Err(_) => Vec::new(),
  }
}

#[tokio::test]
async fn passing_build_produces_a_complete_artifact() {
  let project = project("\"true\"", "requests==2.31.0\n");

  let report = run_build(&project.source, &StubManager, &options(&project))
    .await
    .unwrap();

  assert!(report.gated);
  assert!(!report.cached);
  assert_eq!(report.packages, 1);
  assert!(report.artifact.join("deps/requests/__init__.py").is_file());
  assert!(report.artifact.join("main.py").is_file());
  assert!(report.artifact.join("bin/demo").is_file());
  assert!(report.artifact.join("bin/demo-module").is_file());

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    for launcher in ["bin/demo", "bin/demo-module"] {
      let mode = std::fs::metadata(report.artifact.join(launcher))
        .unwrap()
        .permissions()
        .mode();
      assert_eq!(mode & 0o111, 0o111, "{launcher} must be executable");
    }
  }
}

#[tokio::test]
async fn failing_gate_leaves_no_artifact() {
  let project = project("\"false\"", "requests==2.31.0\n");

  let err = run_build(&project.source, &StubManager, &options(&project))
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::TestsFailed { code: Some(1) }));
  assert!(
    artifact_dirs(&project.out).is_empty(),
    "a closed gate must not publish an output tree"
  );
}

#[tokio::test]
async fn disabled_gate_goes_straight_to_assembly() {
  let project = project("\"false\"", "requests==2.31.0\n");
  let mut options = options(&project);
  options.skip_tests = true;

  let report = run_build(&project.source, &StubManager, &options)
    .await
    .unwrap();

  assert!(!report.gated);
  assert!(report.artifact.join("bin/demo").is_file());
}

#[tokio::test]
async fn identical_lockfile_is_a_cache_hit() {
  let project = project("\"true\"", "requests==2.31.0\n");

  let first = run_build(&project.source, &StubManager, &options(&project))
    .await
    .unwrap();
  let second = run_build(&project.source, &StubManager, &options(&project))
    .await
    .unwrap();

  assert!(!first.cached);
  assert!(second.cached);
  assert_eq!(first.artifact, second.artifact);
  assert_eq!(second.packages, 1);
}

#[tokio::test]
async fn changed_lockfile_changes_the_identity() {
  let project = project("\"true\"", "requests==2.31.0\n");

  let first = run_build(&project.source, &StubManager, &options(&project))
    .await
    .unwrap();

  std::fs::write(project.source.join("uv.lock"), "requests==2.32.0\n").unwrap();
  let second = run_build(&project.source, &StubManager, &options(&project))
    .await
    .unwrap();

  assert_ne!(first.id, second.id);
  assert_ne!(first.artifact, second.artifact);
  assert!(first.artifact.is_dir());
  assert!(second.artifact.is_dir());
}

#[tokio::test]
async fn export_failure_aborts_before_any_output() {
  // An unparsable lockfile makes the stub's export fail, standing in for
  // a dependency resolution failure
  let project = project("\"true\"", "this is not a pin list\n");

  let err = run_build(&project.source, &StubManager, &options(&project))
    .await
    .unwrap_err();

  assert!(matches!(err, CoreError::Requirement { .. }));
  assert!(artifact_dirs(&project.out).is_empty());
}
