//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// extval - validate OS extension rootfs trees
#[derive(Parser, Debug)]
#[command(name = "extval")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to an extval config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the extensions rootfs
    Validate(ValidateArgs),
}

// Validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the extension directory (manifest.yaml + rootfs/)
    #[arg(long)]
    pub rootfs: String,

    /// Pkg name defined in the pkg file
    #[arg(long, conflicts_with = "pkg_file")]
    pub pkg_name: Option<String>,

    /// Pkg definition file whose `name` is the expected extension name
    #[arg(long)]
    pub pkg_file: Option<Utf8PathBuf>,

    /// Accepted version formats
    #[arg(long, value_parser = ["permissive", "strict"])]
    pub version_policy: Option<String>,

    /// Platform version to check compatibility constraints against
    #[arg(long)]
    pub platform_version: Option<String>,

    /// Skip platform compatibility constraint checks
    #[arg(long)]
    pub skip_constraints: bool,

    /// Skip rootfs layout and checksum checks
    #[arg(long)]
    pub skip_contents: bool,
}
