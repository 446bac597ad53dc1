//! Error types for kiln-platform

use thiserror::Error;

/// Errors that can occur in platform operations
#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("failed to determine home directory")]
  NoHomeDirectory,

  #[error("unsupported platform: {0}")]
  Unsupported(String),

  #[error("invalid platform identifier: {0}")]
  InvalidIdentifier(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
