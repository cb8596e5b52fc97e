use clap::{Parser, Subcommand};

use acft::checkpoints::{Lifecycle, Signal};
use acft::diagnosis::SweepMode;
use acft::validation::clap_checkpoint_name_validator;

#[derive(Parser)]
#[command(name = "acft")]
#[command(about = "Agent checkpoints framework toolchain", long_about = None)]
#[command(version)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create project and work root markers in the current directory
    Init,

    /// Scaffold a new checkpoint and emit CHECKPOINT_CREATED
    New {
        /// {branch}_v{version}_{step} checkpoint name
        #[arg(value_parser = clap_checkpoint_name_validator)]
        name: String,

        /// Rooted path to parent checkpoint (sets frontmatter DELEGATE_OF)
        #[arg(long, value_name = "PATH")]
        delegate_of: Option<String>,

        /// Comma-separated tags recorded in frontmatter
        #[arg(long, value_name = "TAG1,TAG2")]
        tags: Vec<String>,

        /// Skip the initial LOG entry
        #[arg(long)]
        no_open: bool,
    },

    /// Flip VALID/SIGNAL/LIFECYCLE and append a LOG entry
    Close {
        /// Target checkpoint (default ::THIS)
        #[arg(long, value_name = "PATH")]
        path: Option<String>,

        /// Desired VALID status
        #[arg(long, value_parser = ["true", "false"])]
        status: String,

        /// Record latest harness verdict
        #[arg(long, value_enum)]
        signal: Option<Signal>,

        /// Override LIFECYCLE
        #[arg(long, value_enum)]
        lifecycle: Option<Lifecycle>,

        /// Custom LOG message describing the status change
        #[arg(long)]
        message: Option<String>,
    },

    /// Append a timestamped LOG entry
    Log {
        /// Message to record
        message: String,

        /// Target checkpoint (default ::THIS)
        #[arg(long, value_name = "PATH")]
        path: Option<String>,
    },

    /// Expand rooted prefixes to absolute paths
    Expand {
        /// Rooted or relative paths to expand
        #[arg(required = true)]
        paths: Vec<String>,

        /// Resolve symbolic links in the expanded output
        #[arg(long)]
        resolve_symlinks: bool,

        /// Allow expanding paths that don't exist yet
        #[arg(short = 'f', long)]
        allow_future: bool,
    },

    /// Lint checkpoint structure
    Validate {
        /// Rooted path (default ::THIS)
        path: Option<String>,

        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Sweep for failure catalogue issues
    Manifest {
        /// Rooted path (default ::THIS)
        path: Option<String>,

        /// quick = target only; full = every checkpoint under the work root
        #[arg(long, value_enum, default_value_t = SweepMode::Quick)]
        mode: SweepMode,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,

        /// Emit MANIFEST_UPDATED with the aggregated severity
        #[arg(long)]
        emit: bool,
    },

    /// Summarise ancestry, peers, children and contract signals
    Orient {
        /// Rooted path (default ::THIS)
        path: Option<String>,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,

        /// Include full section text (comma separated, can repeat)
        #[arg(long, value_name = "SEC1,SEC2")]
        sections: Vec<String>,

        /// Depth for the descendant walk
        #[arg(long, default_value_t = 1)]
        depth: usize,
    },

    /// Execute harness commands documented in MANIFEST
    Verify {
        /// Rooted path (default ::THIS)
        path: Option<String>,

        /// Restrict execution to a MANIFEST sub-heading (case insensitive)
        #[arg(long)]
        section: Option<String>,

        /// Print commands without running them
        #[arg(long)]
        dry_run: bool,

        /// Emit HARNESS_EXECUTED
        #[arg(long)]
        record: bool,
    },

    /// Event stream utilities
    Events {
        #[command(subcommand)]
        command: Option<EventsCommands>,
    },

    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish)
        shell: String,
    },
}

#[derive(Subcommand)]
pub enum EventsCommands {
    /// Stream or list emitted events
    Tail {
        /// ISO 8601 timestamp or relative duration (e.g., -10m)
        #[arg(long, allow_hyphen_values = true)]
        since: Option<String>,

        /// Comma-separated list of TYPE filters (e.g., CHECKPOINT_CREATED)
        #[arg(long)]
        types: Option<String>,

        /// Follow the event log (like tail -f)
        #[arg(long)]
        follow: bool,
    },
}
