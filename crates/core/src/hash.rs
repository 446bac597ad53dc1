//! Hash computation for content addressing

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::Result;
use crate::consts::ID_PREFIX_LEN;

/// Compute SHA256 hash of file contents and return as hex string
pub fn hash_file(path: &Path) -> Result<String> {
  let file = File::open(path)?;
  let mut reader = BufReader::new(file);
  let mut hasher = Sha256::new();

  let mut buffer = [0u8; 8192];
  loop {
    let bytes_read = reader.read(&mut buffer)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(hex::encode(hasher.finalize()))
}

/// Compute SHA256 hash of bytes and return as hex string
pub fn hash_bytes(data: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(data);
  hex::encode(hasher.finalize())
}

/// Truncate a full hash to the id prefix used in artifact paths
pub fn short_hash(full: &str) -> &str {
  &full[..ID_PREFIX_LEN.min(full.len())]
}

/// Content-derived identifier for a build.
///
/// A `BuildId` is the truncated SHA-256 of the lockfile bytes. Identical
/// lockfiles always produce the identical id, so distinct dependency sets
/// never collide on an output path and identical ones are cache-hit
/// addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildId(String);

impl BuildId {
  /// Derive the id from raw lockfile bytes.
  pub fn of_bytes(data: &[u8]) -> Self {
    Self(short_hash(&hash_bytes(data)).to_string())
  }

  /// Derive the id from a lockfile on disk.
  pub fn of_file(path: &Path) -> Result<Self> {
    Ok(Self(short_hash(&hash_file(path)?).to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for BuildId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;
  use tempfile::NamedTempFile;

  #[test]
  fn test_hash_bytes() {
    let hash = hash_bytes(b"hello world");
    assert_eq!(
      hash,
      "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
  }

  #[test]
  fn test_hash_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"hello world")?;
    file.flush()?;

    let hash = hash_file(file.path())?;
    assert_eq!(
      hash,
      "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
    Ok(())
  }

  #[test]
  fn test_short_hash() {
    let full = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    assert_eq!(short_hash(full), "b94d27b9934d");
  }

  #[test]
  fn identical_content_yields_identical_id() {
    let a = BuildId::of_bytes(b"requests==2.31.0\n");
    let b = BuildId::of_bytes(b"requests==2.31.0\n");
    assert_eq!(a, b);
    assert_eq!(a.as_str().len(), ID_PREFIX_LEN);
  }

  #[test]
  fn different_content_yields_different_id() {
    let a = BuildId::of_bytes(b"requests==2.31.0\n");
    let b = BuildId::of_bytes(b"requests==2.32.0\n");
    assert_ne!(a, b);
  }

  #[test]
  fn id_is_lowercase_hex() {
    let id = BuildId::of_bytes(b"anything");
    assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
  }
}
