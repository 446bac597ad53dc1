use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

/// kiln - hermetic build orchestrator for lockfile-pinned Python projects
#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the project into a sealed, runnable artifact
  Build {
    /// Project directory
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Output root; the artifact lands at <out>/<name>-<id>
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Skip the test gate
    #[arg(long)]
    no_gate: bool,

    /// Reuse the user-level package cache instead of a per-build one
    #[arg(long)]
    shared_cache: bool,
  },

  /// Install the pinned dependency set and run the test suite
  Test {
    /// Project directory
    #[arg(default_value = ".")]
    source: PathBuf,
  },

  /// Format sources with the project's formatter
  Fmt {
    /// Project directory
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Report non-conforming files without rewriting them
    #[arg(long)]
    check: bool,
  },

  /// Probe dev shell tools, or print the activation script
  Shell {
    /// Project directory
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Print the activation script instead of probing
    #[arg(long)]
    print: bool,

    /// Shell to render for (auto-detected if not specified)
    #[arg(short, long)]
    shell: Option<String>,
  },

  /// Print the build identifier derived from a lockfile
  Id {
    /// Path to the lockfile
    lockfile: PathBuf,
  },

  /// Show platform and project information
  Info {
    /// Project directory
    #[arg(default_value = ".")]
    source: PathBuf,
  },

  /// Write a starter kiln.toml
  Init {
    /// Project directory
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Project name (defaults to the directory name)
    #[arg(long)]
    name: Option<String>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // Initialize logging
  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .init();

  match cli.command {
    Commands::Build {
      source,
      out,
      no_gate,
      shared_cache,
    } => cmd::cmd_build(&source, &out, no_gate, shared_cache),
    Commands::Test { source } => cmd::cmd_test(&source),
    Commands::Fmt { source, check } => cmd::cmd_fmt(&source, check),
    Commands::Shell { source, print, shell } => cmd::cmd_shell(&source, shell.as_deref(), print),
    Commands::Id { lockfile } => cmd::cmd_id(&lockfile),
    Commands::Info { source } => cmd::cmd_info(&source),
    Commands::Init { source, name } => cmd::cmd_init(&source, name.as_deref()),
  }
}
