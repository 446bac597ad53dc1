//! Platform and architecture detection.
//!
//! Builds are parameterized over a fixed support matrix: two CPU
//! architectures crossed with two operating systems. Anything else is
//! reported as unsupported rather than guessed at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
  X86_64,
  Aarch64,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  ///
  /// Returns `None` if the architecture is off the support matrix.
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::X86_64),
      "aarch64" => Some(Self::Aarch64),
      _ => None,
    }
  }

  /// Returns the architecture name as used in platform strings
  pub const fn as_str(&self) -> &'static str {
    match self {
      Arch::X86_64 => "x86_64",
      Arch::Aarch64 => "aarch64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
  Linux,
  Darwin,
}

impl Os {
  /// Detect the current operating system at runtime
  ///
  /// Returns `None` if the OS is off the support matrix.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::Darwin),
      _ => None,
    }
  }

  /// Returns the OS name as used in platform strings
  pub const fn as_str(&self) -> &'static str {
    match self {
      Os::Linux => "linux",
      Os::Darwin => "darwin",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Combined platform identifier (e.g., "aarch64-darwin")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  /// Every platform a build may target.
  pub const SUPPORTED: [Platform; 4] = [
    Platform::new(Arch::X86_64, Os::Linux),
    Platform::new(Arch::Aarch64, Os::Linux),
    Platform::new(Arch::X86_64, Os::Darwin),
    Platform::new(Arch::Aarch64, Os::Darwin),
  ];

  /// Create a new platform identifier
  pub const fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform
  ///
  /// Fails with [`PlatformError::Unsupported`] off the support matrix.
  pub fn current() -> Result<Self, PlatformError> {
    let arch = Arch::current().ok_or_else(|| {
      PlatformError::Unsupported(std::env::consts::ARCH.to_string())
    })?;
    let os = Os::current().ok_or_else(|| {
      PlatformError::Unsupported(std::env::consts::OS.to_string())
    })?;
    Ok(Self { arch, os })
  }
}

impl FromStr for Platform {
  type Err = PlatformError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (arch, os) = s
      .split_once('-')
      .ok_or_else(|| PlatformError::InvalidIdentifier(s.to_string()))?;

    let arch = match arch {
      "x86_64" => Arch::X86_64,
      "aarch64" => Arch::Aarch64,
      _ => return Err(PlatformError::InvalidIdentifier(s.to_string())),
    };
    let os = match os {
      "linux" => Os::Linux,
      "darwin" => Os::Darwin,
      _ => return Err(PlatformError::InvalidIdentifier(s.to_string())),
    };

    Ok(Self { arch, os })
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.arch, self.os)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn support_matrix_is_exactly_four_pairs() {
    assert_eq!(Platform::SUPPORTED.len(), 4);
    // Two arches crossed with two OSes, no duplicates
    for (i, a) in Platform::SUPPORTED.iter().enumerate() {
      for b in &Platform::SUPPORTED[i + 1..] {
        assert_ne!(a, b);
      }
    }
  }

  #[test]
  fn platform_string_roundtrip() {
    for platform in Platform::SUPPORTED {
      let parsed: Platform = platform.to_string().parse().unwrap();
      assert_eq!(parsed, platform);
    }
  }

  #[test]
  fn rejects_off_matrix_identifiers() {
    assert!("x86_64-windows".parse::<Platform>().is_err());
    assert!("riscv64-linux".parse::<Platform>().is_err());
    assert!("not-a-platform-at-all".parse::<Platform>().is_err());
    assert!("x86_64".parse::<Platform>().is_err());
  }

  #[test]
  fn macos_uses_darwin_identifier() {
    // Darwin is the expected identifier for macOS in platform strings
    assert_eq!(Os::Darwin.as_str(), "darwin");
    assert_eq!(Platform::new(Arch::Aarch64, Os::Darwin).to_string(), "aarch64-darwin");
  }
}
