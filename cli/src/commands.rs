pub mod check;
pub mod probe;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reachr_common::config::Preset;
use reachr_common::target::Target;

#[derive(Parser)]
#[command(name = "reachr")]
#[command(about = "Verifies that links are alive, patiently.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Print less: once hides decorations and per-target logs, twice leaves only the summary
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Skip the start-up banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check every target in a file until each is confirmed live or given up on
    #[command(alias = "c")]
    Check(CheckArgs),
    /// Probe a single URL once
    #[command(alias = "p")]
    Probe {
        target: Target,

        /// Transport timeout in seconds
        #[arg(long, value_name = "N")]
        timeout_secs: Option<u64>,
    },
}

#[derive(Args)]
pub struct CheckArgs {
    /// JSON array or plain-text list of targets
    pub input: PathBuf,

    /// Built-in schedule to start from
    #[arg(long)]
    pub preset: Option<Preset>,

    /// TOML file describing the schedule; flags override its values, and
    /// --width, --delay-ms and --slow-after are rejected if it lists explicit passes
    #[arg(long, value_name = "FILE.toml")]
    pub schedule: Option<PathBuf>,

    /// Probes in flight per chunk on the first pass
    #[arg(long, value_name = "N")]
    pub width: Option<usize>,

    /// Pause between probes once passes turn sequential
    #[arg(long, value_name = "N")]
    pub delay_ms: Option<u64>,

    /// Number of concurrent passes before switching to sequential ones
    #[arg(long, value_name = "N")]
    pub slow_after: Option<usize>,

    /// Hard cap on the number of passes
    #[arg(long, value_name = "N")]
    pub max_passes: Option<usize>,

    /// Attempts per target within a single pass
    #[arg(long, value_name = "K")]
    pub retries: Option<u32>,

    /// Transport timeout in seconds for each request
    #[arg(long, value_name = "N")]
    pub timeout_secs: Option<u64>,

    /// Write unresolved targets to this file as JSON
    #[arg(short, long, value_name = "FILE.json")]
    pub output: Option<PathBuf>,

    /// Exit with status 1 when any target stays unresolved
    #[arg(long)]
    pub fail_on_unresolved: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
