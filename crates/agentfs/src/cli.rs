//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

pub use crate::commands::pack::PackArgs;
pub use crate::commands::size::SizeArgs;
pub use crate::commands::upload::UploadArgs;

/// agentfs - Package agent directories and upload them
#[derive(Parser, Debug)]
#[command(name = "agentfs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding agentfs-runtime.yaml (default: ~/.agentfs)
    #[arg(long, global = true, env = "AGENTFS_CONFIG_DIR")]
    pub config_dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package a directory and upload it to a presigned URL
    Upload(UploadArgs),

    /// Package a directory into a local tar.gz file
    Pack(PackArgs),

    /// Report the bytes a directory would contribute to its archive
    Size(SizeArgs),
}

/// Options shared by every command that walks a source tree.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory to package
    pub dir: Utf8PathBuf,

    /// Additional exclude patterns (glob, matched against paths relative to DIR)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

/// Options shared by commands that build an archive.
#[derive(Args, Debug, Clone)]
pub struct ArchiveArgs {
    /// Compression level (1-9); overrides the configured level
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=9))]
    pub compression: Option<u32>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}
