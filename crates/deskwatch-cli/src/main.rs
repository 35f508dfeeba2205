#![forbid(unsafe_code)]

mod client;
mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "deskwatch: track your TOPdesk incidents and changes",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to the configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags and environment.
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.json)
    }

    /// Effective config path: flag, then `DESKWATCH_CONFIG`, then default.
    fn config_path(&self) -> PathBuf {
        deskwatch_core::config::resolve_config_path(self.config.as_deref())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Write the configuration file",
        long_about = "Write the configuration file with service URL and credentials.",
        after_help = "EXAMPLES:\n    # API key authentication\n    dw setup --url https://support.example.com --api-key SECRET\n\n    # Operator credentials\n    dw setup --url https://support.example.com --username alice --password s3cret"
    )]
    Setup(cmd::setup::SetupArgs),

    #[command(
        next_help_heading = "Read",
        about = "List open incidents assigned to you",
        long_about = "List the open incidents currently assigned to the authenticated operator.",
        after_help = "EXAMPLES:\n    # List your incidents\n    dw incidents\n\n    # Emit machine-readable output\n    dw incidents --json"
    )]
    Incidents(cmd::incidents::IncidentsArgs),

    #[command(
        next_help_heading = "Read",
        about = "List changes assigned to you",
        long_about = "List the changes currently assigned to the authenticated operator.",
        after_help = "EXAMPLES:\n    # List your changes\n    dw changes\n\n    # Emit machine-readable output\n    dw changes --json"
    )]
    Changes(cmd::changes::ChangesArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one item with its comment thread",
        long_about = "Show full details and the comment thread for a single incident or change.",
        after_help = "EXAMPLES:\n    # Show an incident\n    dw show 28f80de1-7521-4bb6-8998-701d0a077bb2\n\n    # Show a change\n    dw show 5f1e0f24-b28c-4dd7-9a49-740bbabc093c --kind change\n\n    # Emit machine-readable output\n    dw show 28f80de1-7521-4bb6-8998-701d0a077bb2 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Tracking",
        about = "Check for new activity since the last poll",
        long_about = "Fetch your assigned items, compare them against the snapshot, report what changed, and record the new state.",
        after_help = "EXAMPLES:\n    # Poll once\n    dw check\n\n    # Quiet polling from cron\n    dw check --quiet\n\n    # Emit machine-readable output\n    dw check --json"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Tracking",
        about = "Summarize everything tracked so far",
        long_about = "Re-fetch current details for every item the snapshot has ever tracked and print them, most recently updated first.",
        after_help = "EXAMPLES:\n    # Human-readable report\n    dw summary\n\n    # Emit machine-readable output\n    dw summary --json"
    )]
    Summary(cmd::summary::SummaryArgs),

    #[command(
        next_help_heading = "Utilities",
        about = "Generate shell completion scripts",
        long_about = "Generate a completion script for the given shell to stdout.",
        after_help = "EXAMPLES:\n    # Bash\n    dw completions bash > /etc/bash_completion.d/dw\n\n    # Zsh\n    dw completions zsh > \"${fpath[1]}/_dw\""
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DESKWATCH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "deskwatch=debug,info"
        } else {
            "deskwatch=info,warn"
        })
    });

    let format = env::var("DESKWATCH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let config_path = cli.config_path();

    match cli.command {
        Commands::Setup(ref args) => cmd::setup::run_setup(args, output, &config_path),
        Commands::Incidents(ref args) => cmd::incidents::run_incidents(args, output, &config_path),
        Commands::Changes(ref args) => cmd::changes::run_changes(args, output, &config_path),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &config_path),
        Commands::Check(ref args) => cmd::check::run_check(args, output, cli.quiet, &config_path),
        Commands::Summary(ref args) => cmd::summary::run_summary(args, output, &config_path),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
