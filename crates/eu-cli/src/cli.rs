use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "eu",
    about = "Helpers for preparing ENCODE DCC submissions",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print MD5 checksums of files
    Md5sum(Md5sumArgs),
    /// Replace path separators in an alias with underscores
    CleanAlias(AliasArgs),
    /// Remove the lab-name prefix from an alias
    StripPrefix(AliasArgs),
    /// List replicate UUIDs belonging to a library
    Replicates(ReplicatesArgs),
    /// Build registration or patch payloads from a tab-delimited sheet
    Register(RegisterArgs),
}

#[derive(Args)]
pub struct Md5sumArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct AliasArgs {
    pub alias: String,
}

#[derive(Args)]
pub struct ReplicatesArgs {
    /// JSON file holding a replicate list or an experiment record
    pub input: PathBuf,
    /// Library accession to look for
    #[arg(short, long)]
    pub library: String,
    /// Only match this biological replicate number
    #[arg(long)]
    pub bio: Option<u64>,
    /// Only match this technical replicate number
    #[arg(long)]
    pub tech: Option<u64>,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Profile name in lower case, e.g. `biosample`
    #[arg(short, long)]
    pub profile: String,
    /// Local copy of the profile's JSON schema
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Tab-delimited sheet; reads stdin when omitted
    #[arg(short, long)]
    pub infile: Option<PathBuf>,
    /// Build PATCH bodies keyed by `record_id` instead of POST bodies
    #[arg(long)]
    pub patch: bool,
    /// JSON array of current records; array values in patches extend theirs
    #[arg(long, requires = "patch")]
    pub existing: Option<PathBuf>,
    /// Replace array values instead of extending them
    #[arg(short = 'w', long, requires = "patch")]
    pub overwrite_array_values: bool,
    /// TOML file with award/lab defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
