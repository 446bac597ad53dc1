//! Error types for kiln-core

use thiserror::Error;

/// Errors that can occur in core operations
///
/// Every failure is terminal for the invocation that produced it; there is
/// no retry layer and no transient/permanent distinction.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("platform error: {0}")]
  Platform(#[from] kiln_platform::PlatformError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("failed to parse {path}: {message}")]
  Manifest { path: String, message: String },

  #[error("no project descriptor found at {0}")]
  ManifestMissing(String),

  #[error("lockfile not found: {0}")]
  LockfileMissing(String),

  #[error("invalid requirement '{line}': {message}")]
  Requirement { line: String, message: String },

  /// Lockfile export failed (dependency resolution failure).
  #[error("requirements export failed: {message}")]
  Export { message: String },

  /// Package installation failed (dependency resolution failure).
  #[error("package installation failed: {message}")]
  Install { message: String },

  /// The test gate is closed: the suite reported failing cases.
  #[error("test suite failed with exit code {code:?}")]
  TestsFailed { code: Option<i32> },

  /// The formatter found non-conforming files during a check.
  #[error("formatting check failed with exit code {code:?}")]
  FormatCheck { code: Option<i32> },

  #[error("required tool not found on PATH: {0}")]
  ToolMissing(String),

  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  #[error("failed to encode receipt: {0}")]
  Receipt(#[from] serde_json::Error),
}
