//! Command-line definition.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "seerrsync",
    version,
    about = "Declarative configuration management for Jellyseerr-compatible media-request servers",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file
    #[arg(
        short = 'c',
        long,
        global = true,
        env = "SEERRSYNC_CONFIG",
        default_value = "seerrsync.yml"
    )]
    pub config: PathBuf,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "SEERRSYNC_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Retries for transient connection failures
    #[arg(long, global = true, env = "SEERRSYNC_RETRIES", default_value_t = 3)]
    pub retries: u32,

    /// Maximum instances reconciled concurrently
    #[arg(
        long,
        global = true,
        env = "SEERRSYNC_CONCURRENCY",
        default_value_t = 4
    )]
    pub concurrency: usize,

    /// Connection cache file (defaults to the per-user state directory)
    #[arg(long, global = true, env = "SEERRSYNC_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Disable the connection cache
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the changes an apply would make, without writing anything
    Plan,

    /// Reconcile every configured instance to its desired state
    Apply,

    /// Fetch a running instance's configuration and print it as YAML
    DumpConfig(DumpArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Instance URL, e.g. http://jellyseerr:5055
    pub url: String,

    /// API key, as shown under Settings -> General
    #[arg(long, env = "SEERRSYNC_API_KEY")]
    pub api_key: String,

    /// Instance name to use in the emitted document
    #[arg(long, default_value = "main")]
    pub name: String,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    pub insecure: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
