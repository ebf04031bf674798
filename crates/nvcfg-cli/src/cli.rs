use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "nvcfg",
    about = "nvcfg: checksummed configuration records on disk",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding one subdirectory per namespace
    #[arg(long, global = true, default_value = ".nvcfg")]
    pub root: PathBuf,

    /// fsync every value file before it replaces the old one
    #[arg(long, global = true)]
    pub sync: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load and print the record (restores defaults if invalid)
    Show(NamespaceArgs),
    /// Increment setting1, toggle enabled, and save
    Bump(NamespaceArgs),
    /// Report stored length and checksums without modifying anything
    Inspect(NamespaceArgs),
    /// Remove every key in the namespace
    Erase(NamespaceArgs),
    /// List namespaces under the root
    List,
    /// Compute the CRC-16 of hex-encoded bytes
    Checksum(ChecksumArgs),
}

#[derive(Args)]
pub struct NamespaceArgs {
    #[arg(default_value = "main")]
    pub namespace: String,
}

#[derive(Args)]
pub struct ChecksumArgs {
    /// Bytes as hex, optionally prefixed with 0x
    pub hex: String,
}
