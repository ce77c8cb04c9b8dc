//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use amforge::ops::{DEFAULT_BASENAME, DEFAULT_DESTINATION};
use amforge::util::shell::ColorChoice;

/// Convert a CMake-style ISIS source tree into an autotools tree
#[derive(Parser)]
#[command(name = "amforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root of the legacy tree (the directory holding `src/`)
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Directory to write the converted tree to (must not exist)
    #[arg(long, value_name = "DIR", default_value = DEFAULT_DESTINATION)]
    pub destination: PathBuf,

    /// Base name of the output archive
    #[arg(long, default_value = DEFAULT_BASENAME)]
    pub basename: String,

    /// Do not relocate or build the executables
    #[arg(long, alias = "dont-build-apps")]
    pub no_apps: bool,

    /// Directory with `dist-add/`, `patches/` and `config.options.example`
    #[arg(long, value_name = "DIR")]
    pub resources: Option<PathBuf>,

    /// Configuration file (defaults to the user config)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to write the archive to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub archive_dir: PathBuf,

    /// Stop after generation: no patches, edits or archive
    #[arg(long)]
    pub skip_package: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,
}
