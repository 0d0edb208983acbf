// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! overstory - Multi-agent orchestrator CLI

mod commands;
mod context;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{
    clean, completions, doctor, init, inspect, log, mail, monitor, nudge, run, sling, status, stop,
    watch, worktree,
};
use context::NotInProject;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "overstory",
    version,
    about = "Overstory - spawn, supervise, and retire fleets of coding agents"
)]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Verbose errors and tracing output
    #[arg(long, global = true)]
    verbose: bool,

    /// Machine-readable JSON output where supported
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize .overstory/ in the current repository
    Init,
    /// Spawn an agent onto a tracker task
    Sling(sling::SlingArgs),
    /// Stop an agent (explicit terminal transition)
    Stop(stop::StopArgs),
    /// Fleet overview: sessions, run, thresholds
    Status,
    /// Detail view of one agent: session, events, current file, mail
    Inspect(inspect::InspectArgs),
    /// Clean retired worktrees (alias of `worktree clean`)
    Clean(worktree::CleanArgs),
    /// Check the environment: git, tmux, tracker, databases
    Doctor,
    /// Tier 2 monitor agent lifecycle
    Monitor(monitor::MonitorArgs),
    /// Inter-agent mail
    Mail(mail::MailArgs),
    /// Nudge a stalled agent by hand
    Nudge(nudge::NudgeArgs),
    /// Worktree management
    Worktree(worktree::WorktreeArgs),
    /// Append an event to the log (hook entry point)
    Log(log::LogArgs),
    /// Show recent events
    Logs(log::LogsArgs),
    /// Event timeline for an agent or task
    Trace(log::TraceArgs),
    /// Watchdog: reconcile declared state with reality
    Watch(watch::WatchArgs),
    /// Run registry
    Run(run::RunArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("overstory=debug,warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    if let Some(dir) = &cli.directory {
        if let Err(e) = std::env::set_current_dir(dir) {
            eprintln!("Error [validation]: cannot change to {}: {e}", dir.display());
            std::process::exit(1);
        }
    }

    let result = dispatch(&cli).await;
    match result {
        Ok(()) => {}
        Err(err) => {
            print_error(&err, cli.verbose);
            std::process::exit(1);
        }
    }
}

async fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Init => init::init().await,
        Commands::Sling(args) => sling::sling(args, cli.json).await,
        Commands::Stop(args) => stop::stop(args).await,
        Commands::Status => status::status(cli.json).await,
        Commands::Inspect(args) => inspect::inspect(args, cli.json).await,
        Commands::Clean(args) => clean::clean(args).await,
        Commands::Doctor => doctor::doctor().await,
        Commands::Monitor(args) => monitor::monitor(args).await,
        Commands::Mail(args) => mail::mail(args, cli.json).await,
        Commands::Nudge(args) => nudge::nudge(args).await,
        Commands::Worktree(args) => worktree::worktree(args).await,
        Commands::Log(args) => log::log(args).await,
        Commands::Logs(args) => log::logs(args, cli.json).await,
        Commands::Trace(args) => log::trace(args, cli.json).await,
        Commands::Watch(args) => watch::watch(args).await,
        Commands::Run(args) => run::run(args, cli.json).await,
        Commands::Completions(args) => {
            completions::completions(args, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_error(err: &anyhow::Error, verbose: bool) {
    if err.downcast_ref::<NotInProject>().is_some() {
        eprintln!("Not in an overstory project. Run 'overstory init' first.");
        return;
    }
    let code = err
        .downcast_ref::<overstory_engine::EngineError>()
        .map(|e| e.code().as_str())
        .unwrap_or("generic");
    eprintln!("Error [{code}]: {err}");
    if verbose {
        eprintln!("{err:?}");
    }
}
