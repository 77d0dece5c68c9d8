//! Run command - drive a demo until its stop condition

use crate::demos::{DemoKind, Transcript};
use crate::logging;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use stepwise_config::{Config, ConfigLoader, DemoSettings, StopMode};
use stepwise_runtime::{Step, StopPolicy, Tick};

/// Arguments for `stepwise run`
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub demo: DemoKind,
    pub max_ticks: Option<u64>,
    pub config: Option<PathBuf>,
    pub stop: Option<StopMode>,
    pub trace: bool,
    pub json: bool,
    pub verbose: u8,
    pub quiet: bool,
}

/// Effective options after merging flags over configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub max_ticks: u64,
    pub stop: Option<StopMode>,
    pub trace: bool,
}

/// One cursor transition, as printed with `--trace`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    pub tick: u64,
    pub task: usize,
    pub routine: &'static str,
    pub before: u64,
    pub after: u64,
    pub step: Step,
}

/// A routine that completed during the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub routine: &'static str,
    pub tick: u64,
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub demo: DemoKind,
    pub stop: StopMode,
    pub ticks: u64,
    pub completions: Vec<Completion>,
    pub output: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceRecord>,
}

/// Run a demo from the command line
pub fn run(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    logging::init(logging::resolve_level(
        args.verbose,
        args.quiet,
        config.log_level(),
    ));

    let options = RunOptions {
        max_ticks: args.max_ticks.unwrap_or_else(|| config.max_ticks()),
        stop: args.stop.or_else(|| config.stop()),
        trace: args.trace || config.trace(),
    };

    let json = args.json;
    let report = execute(args.demo, &config.demo(), options, |line| {
        if !json {
            println!("{}", line);
        }
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("stopped after {} ticks", report.ticks);
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            loader
                .load_from_directory(&cwd)
                .context("Failed to load stepwise.toml")
        }
    }
}

/// Drive `demo` and report what happened.
///
/// `emit` receives every output and trace line as soon as its tick ends.
pub fn execute<F>(
    demo: DemoKind,
    settings: &DemoSettings,
    options: RunOptions,
    mut emit: F,
) -> Result<RunReport>
where
    F: FnMut(&str),
{
    let out = Transcript::new();
    let mut setup = demo.setup(settings, &out);
    let stop = options.stop.unwrap_or(setup.default_stop);
    let policy = match stop {
        StopMode::AllComplete => StopPolicy::AllComplete,
        StopMode::FirstEnded => StopPolicy::TaskEnded(setup.primary),
    };

    tracing::info!(demo = %demo, %stop, max_ticks = options.max_ticks, "starting run");

    let mut output = Vec::new();
    let mut trace = Vec::new();

    let summary = setup
        .driver
        .run_with(policy, options.max_ticks, |tick: &Tick| {
            for line in out.drain() {
                emit(&line);
                output.push(line);
            }
            if options.trace {
                for step in &tick.steps {
                    let record = TraceRecord {
                        tick: tick.number,
                        task: step.task.index(),
                        routine: step.routine,
                        before: step.before.get(),
                        after: step.after.get(),
                        step: step.step,
                    };
                    emit(&format!(
                        "[tick {}] {} {} -> {} ({})",
                        tick.number, step.routine, step.before, step.after, step.step
                    ));
                    trace.push(record);
                }
            }
        })
        .with_context(|| format!("Demo '{}' did not stop", demo))?;

    Ok(RunReport {
        demo,
        stop,
        ticks: summary.ticks,
        completions: summary
            .completions
            .into_iter()
            .map(|(_, routine, tick)| Completion { routine, tick })
            .collect(),
        output,
        trace,
    })
}
