//! c2ast CLI: explore C translation units into a portable AST.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "c2ast", version, about = "C header exploration for FFI bindings")]
struct Cli {
    /// Log progress of each exploration phase
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explore a dumped translation unit and write its AST as JSON
    Explore {
        /// Translation unit dump (.json)
        #[arg(long)]
        unit: PathBuf,
        /// Explorer configuration (c2ast.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Describe a target triple
    Target {
        /// Target triple (e.g., x86_64-unknown-linux-gnu)
        triple: String,
        /// Output format (default: human-readable, "json" for JSON)
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = init_tracing(cli.quiet, cli.verbose).and_then(|()| run(cli.command));
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Explore {
            unit,
            config,
            output,
        } => commands::explore::run(&unit, config.as_deref(), output.as_deref()),
        Commands::Target { triple, format } => {
            commands::target::describe(&triple, format.as_deref())
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("C2AST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
