//! Lockfile handling and the flat requirements format.
//!
//! A lockfile pins exact dependency versions in a manager-specific format.
//! kiln never interprets that format itself: it derives the build id from
//! the raw bytes and asks the package manager to export a flat, hash-free
//! pin list — newline-delimited `name==version`, one pin per line.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hash::BuildId;
use crate::{CoreError, Result};

/// A lockfile loaded into memory, with its content-derived identity.
#[derive(Debug, Clone)]
pub struct Lockfile {
  path: PathBuf,
  bytes: Vec<u8>,
  id: BuildId,
}

impl Lockfile {
  /// Load a lockfile from disk.
  ///
  /// A missing file is [`CoreError::LockfileMissing`]; everything else
  /// propagates as io.
  pub fn load(path: &Path) -> Result<Self> {
    let bytes = match std::fs::read(path) {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(CoreError::LockfileMissing(path.display().to_string()));
      }
      Err(e) => return Err(e.into()),
    };

    let id = BuildId::of_bytes(&bytes);
    Ok(Self {
      path: path.to_path_buf(),
      bytes,
      id,
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn bytes(&self) -> &[u8] {
    &self.bytes
  }

  /// The content-derived build identifier.
  pub fn id(&self) -> &BuildId {
    &self.id
  }
}

/// A single exact pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
  pub name: String,
  pub version: String,
}

impl fmt::Display for Requirement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}=={}", self.name, self.version)
  }
}

/// The flat, hash-free export of a lockfile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements(Vec<Requirement>);

impl Requirements {
  /// Parse the newline-delimited `name==version` format.
  ///
  /// Blank lines and `#` comments are skipped. Integrity-hash fragments
  /// and non-exact specifiers are rejected: the export step is expected to
  /// have flattened those away already.
  pub fn parse(text: &str) -> Result<Self> {
    let mut pins = Vec::new();

    for raw in text.lines() {
      let line = raw.trim();
      if line.is_empty() || line.starts_with('#') {
        continue;
      }

      if line.contains("--hash") {
        return Err(CoreError::Requirement {
          line: line.to_string(),
          message: "integrity hashes are not part of the flat format".to_string(),
        });
      }

      let Some((name, version)) = line.split_once("==") else {
        return Err(CoreError::Requirement {
          line: line.to_string(),
          message: "expected an exact `name==version` pin".to_string(),
        });
      };

      let name = name.trim();
      let version = version.trim();
      if name.is_empty() || version.is_empty() {
        return Err(CoreError::Requirement {
          line: line.to_string(),
          message: "empty name or version".to_string(),
        });
      }
      if !is_valid_name(name) {
        return Err(CoreError::Requirement {
          line: line.to_string(),
          message: "package name contains invalid characters".to_string(),
        });
      }
      if version.contains(char::is_whitespace) {
        return Err(CoreError::Requirement {
          line: line.to_string(),
          message: "version contains whitespace".to_string(),
        });
      }

      pins.push(Requirement {
        name: name.to_string(),
        version: version.to_string(),
      });
    }

    Ok(Self(pins))
  }

  /// Render back to the newline-delimited format.
  pub fn render(&self) -> String {
    let mut out = String::new();
    for pin in &self.0 {
      out.push_str(&pin.to_string());
      out.push('\n');
    }
    out
  }

  pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

fn is_valid_name(name: &str) -> bool {
  name
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '[' | ']' | ','))
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use std::io::Write;
  use tempfile::NamedTempFile;

  #[test]
  fn load_missing_lockfile_is_a_distinct_error() {
    let err = Lockfile::load(Path::new("/nonexistent/uv.lock")).unwrap_err();
    assert!(matches!(err, CoreError::LockfileMissing(_)));
  }

  #[test]
  fn load_derives_id_from_content() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"version = 1\n")?;
    file.flush()?;

    let lockfile = Lockfile::load(file.path())?;
    assert_eq!(*lockfile.id(), BuildId::of_bytes(b"version = 1\n"));
    Ok(())
  }

  #[test]
  fn parse_basic_pins() {
    let reqs = Requirements::parse("requests==2.31.0\nurllib3==2.2.1\n").unwrap();
    assert_eq!(reqs.len(), 2);
    assert_eq!(
      reqs.iter().next().unwrap(),
      &Requirement {
        name: "requests".to_string(),
        version: "2.31.0".to_string()
      }
    );
  }

  #[test]
  fn parse_skips_comments_and_blanks() {
    let reqs = Requirements::parse("# exported by uv\n\nrequests==2.31.0\n").unwrap();
    assert_eq!(reqs.len(), 1);
  }

  #[test]
  fn parse_accepts_extras() {
    let reqs = Requirements::parse("uvicorn[standard]==0.30.0\n").unwrap();
    assert_eq!(reqs.iter().next().unwrap().name, "uvicorn[standard]");
  }

  #[test]
  fn parse_rejects_hash_fragments() {
    let err = Requirements::parse("requests==2.31.0 --hash=sha256:deadbeef").unwrap_err();
    assert!(matches!(err, CoreError::Requirement { .. }));
  }

  #[test]
  fn parse_rejects_loose_specifiers() {
    assert!(Requirements::parse("requests>=2.0").is_err());
    assert!(Requirements::parse("requests").is_err());
    assert!(Requirements::parse("==1.0").is_err());
  }

  #[test]
  fn render_is_newline_delimited() {
    let reqs = Requirements::parse("a==1\nb==2").unwrap();
    assert_eq!(reqs.render(), "a==1\nb==2\n");
  }

  proptest! {
    #[test]
    fn parse_render_roundtrip(
      pins in proptest::collection::vec(
        ("[a-z][a-z0-9_-]{0,20}", "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}"),
        0..16,
      )
    ) {
      let text: String = pins
        .iter()
        .map(|(name, version)| format!("{}=={}\n", name, version))
        .collect();

      let parsed = Requirements::parse(&text).unwrap();
      prop_assert_eq!(parsed.render(), text);

      // A second pass over the rendered form is a fixpoint
      let reparsed = Requirements::parse(&parsed.render()).unwrap();
      prop_assert_eq!(reparsed, parsed);
    }
  }
}
