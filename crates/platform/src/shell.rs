//! Shell detection and environment script generation

use std::env;
use std::path::PathBuf;

use tracing::debug;

/// Supported shell types
///
/// The support matrix is unix-only, so only POSIX-family shells (plus
/// fish) are handled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Sh,
}

impl Shell {
  /// Detect the current shell from environment
  ///
  /// Checks `$SHELL`, falls back to `sh`.
  pub fn detect() -> Self {
    if let Ok(shell) = env::var("SHELL") {
      let shell_name = PathBuf::from(&shell)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

      return match shell_name.as_str() {
        "zsh" => Shell::Zsh,
        "bash" => Shell::Bash,
        "fish" => Shell::Fish,
        other => {
          debug!(shell = %other, "unrecognized $SHELL, falling back to sh");
          Shell::Sh
        }
      };
    }

    Shell::Sh
  }

  /// Parse a shell name, returning `None` for unknown shells
  pub fn parse(name: &str) -> Option<Self> {
    match name {
      "bash" => Some(Shell::Bash),
      "zsh" => Some(Shell::Zsh),
      "fish" => Some(Shell::Fish),
      "sh" => Some(Shell::Sh),
      _ => None,
    }
  }

  /// Get the shell name as a string
  pub fn as_str(&self) -> &'static str {
    match self {
      Shell::Bash => "bash",
      Shell::Zsh => "zsh",
      Shell::Fish => "fish",
      Shell::Sh => "sh",
    }
  }

  /// Generate an export statement for setting an environment variable
  pub fn export_var(&self, name: &str, value: &str) -> String {
    match self {
      Shell::Fish => format!("set -gx {} {:?}", name, value),
      Shell::Bash | Shell::Zsh | Shell::Sh => format!("export {}={:?}", name, value),
    }
  }

  /// Generate a prepend statement for a PATH-like variable
  pub fn prepend_path(&self, name: &str, value: &str) -> String {
    match self {
      Shell::Fish => format!("set -gx {} {:?} ${}", name, value, name),
      Shell::Bash | Shell::Zsh | Shell::Sh => {
        format!("export {}={:?}:${}", name, value, name)
      }
    }
  }

  /// Generate a comment line
  pub fn comment(&self, text: &str) -> String {
    format!("# {}", text)
  }
}

impl std::fmt::Display for Shell {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
