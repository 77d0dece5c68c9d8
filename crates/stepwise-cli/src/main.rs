use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use stepwise_config::StopMode;

mod commands;
mod demos;
mod logging;

use demos::DemoKind;

/// Drive stackless resumable routines one call at a time.
///
/// Each demo spawns routines on a round-robin driver and resumes every one
/// of them once per tick until the stop condition holds.
///
/// EXAMPLES:
///     stepwise run                       Run the countdown demo
///     stepwise run scenario --trace      Show every cursor transition
///     stepwise run sieve --json          Print a JSON report
///     stepwise list                      Describe every demo routine
///
/// ENVIRONMENT VARIABLES:
///     STEPWISE_MAX_TICKS  Tick budget for a run
///     STEPWISE_LOG        Log level (off, error, warn, info, debug, trace)
///     STEPWISE_TRACE      Set to '1' to trace cursor transitions
///     STEPWISE_JSON       Set to '1' for JSON output by default
#[derive(Parser)]
#[command(name = "stepwise")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// More log output on stderr (repeat for more)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// No log output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a demo
    ///
    /// Spawns the demo's routines and ticks the driver until every routine
    /// completed or the primary routine's end hook fired.
    ///
    /// EXAMPLES:
    ///     stepwise run expensive --max-ticks 20
    ///     stepwise run --config ./stepwise.toml
    #[command(visible_alias = "r")]
    Run {
        /// Demo to run
        #[arg(value_enum, default_value_t = DemoKind::Expensive)]
        demo: DemoKind,
        /// Give up after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,
        /// Path to stepwise.toml (default: searched from the working directory)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
        /// Stop condition: all-complete or first-ended
        #[arg(long, value_parser = parse_stop)]
        stop: Option<StopMode>,
        /// Print every cursor transition
        #[arg(long, short = 't')]
        trace: bool,
        /// Print a JSON report instead of text
        #[arg(long, env = "STEPWISE_JSON")]
        json: bool,
    },

    /// Describe every demo routine
    #[command(visible_alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long, env = "STEPWISE_JSON")]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     stepwise completions bash > ~/.bash_completions/stepwise.bash
    ///     stepwise completions zsh > ~/.zfunc/_stepwise
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_stop(value: &str) -> Result<StopMode, String> {
    match value {
        "all-complete" => Ok(StopMode::AllComplete),
        "first-ended" => Ok(StopMode::FirstEnded),
        other => Err(format!(
            "unknown stop condition '{}' (expected all-complete or first-ended)",
            other
        )),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            demo,
            max_ticks,
            config,
            stop,
            trace,
            json,
        } => {
            commands::run::run(commands::run::RunArgs {
                demo,
                max_ticks,
                config,
                stop,
                trace,
                json,
                verbose: cli.verbose,
                quiet: cli.quiet,
            })?;
        }
        Commands::List { json } => {
            logging::init(logging::resolve_level(cli.verbose, cli.quiet, None));
            commands::list::run(json)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}
