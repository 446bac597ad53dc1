//! Crate-wide constants.

/// Hex characters kept from a full SHA-256 when forming a build id.
pub const ID_PREFIX_LEN: usize = 12;

/// Receipt file written into an artifact once assembly completes.
pub const RECEIPT_FILENAME: &str = ".kiln-receipt";

/// Receipt format version.
pub const RECEIPT_VERSION: u32 = 1;

/// Project descriptor file looked up at the root of a source tree.
pub const MANIFEST_FILENAME: &str = "kiln.toml";

/// Directory name for installed dependencies inside an artifact.
pub const DEPS_DIRNAME: &str = "deps";

/// Directory name for generated launchers inside an artifact.
pub const BIN_DIRNAME: &str = "bin";

/// Entries never copied from a source tree into an artifact.
pub const SOURCE_EXCLUDES: &[&str] = &[
  ".git",
  ".venv",
  "__pycache__",
  ".pytest_cache",
  ".ruff_cache",
  "out",
];
