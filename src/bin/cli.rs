//! CLI binary for filepulse.

use clap::{Parser, Subcommand};
use filepulse::collect::{self, Collector};
use filepulse::prompt::{self, TerminalPrompt};
use filepulse::schedule::{AddOutcome, Launchctl, Reconciler, RemoveOutcome, Trigger};
use filepulse::{AppPaths, HttpStatsProvider, Settings, TrackedStore, WebhookDispatcher};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Filepulse: engagement tracking for shared community files.
#[derive(Parser)]
#[command(name = "filepulse", version, about)]
struct Cli {
    /// Data directory override (default: the platform data directory).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Track new files by id or resource URL.
    Add {
        /// File ids or resource URLs.
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Stop tracking files. Without arguments, pick from a list.
    Remove {
        /// File ids or resource URLs.
        files: Vec<String>,
    },

    /// Show tracked files and their latest counters.
    List,

    /// Run one collection pass now.
    Run,

    /// Manage the daily collection schedule.
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },

    /// Manage webhook destinations.
    Webhook {
        #[command(subcommand)]
        command: WebhookCommand,
    },
}

/// Schedule subcommands.
#[derive(Subcommand)]
enum ScheduleCommand {
    /// Add daily run times (24-hour HH:MM).
    Add {
        /// Times of day, e.g. 09:00 21:30.
        #[arg(required = true)]
        times: Vec<String>,
    },

    /// Remove scheduled run times. Without arguments, pick from a list.
    Remove {
        /// Times of day, e.g. 09:00 21:30.
        times: Vec<String>,
    },

    /// Show the configured schedule and whether the job is loaded.
    List,
}

/// Webhook subcommands.
#[derive(Subcommand)]
enum WebhookCommand {
    /// Register destination URLs.
    Add {
        /// Destination URLs.
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Unregister destinations. Without arguments, pick from a list.
    Remove {
        /// Destination URLs.
        urls: Vec<String>,
    },

    /// Show registered destinations.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing. Users can override with RUST_LOG=debug.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("filepulse=info")),
        )
        .init();

    let cli = Cli::parse();
    let paths = AppPaths::resolve(cli.data_dir);

    match cli.command {
        Command::Add { files } => run_add(&paths, &files).await,
        Command::Remove { files } => run_remove(&paths, files),
        Command::List => run_list(&paths),
        Command::Run => run_collection(&paths).await,
        Command::Schedule { command } => run_schedule(&paths, command),
        Command::Webhook { command } => run_webhook(&paths, command),
    }
}

async fn run_add(paths: &AppPaths, files: &[String]) -> anyhow::Result<()> {
    let mut store = TrackedStore::load(paths)?;
    let provider = HttpStatsProvider::from_env()?;
    let dispatcher = WebhookDispatcher::new()?;
    let collector = Collector::new(&provider, &dispatcher);

    let summary = collector.add(&mut store, files, &TerminalPrompt).await?;
    if summary.cancelled {
        println!("add cancelled");
        return Ok(());
    }

    for item in &summary.items {
        match &item.error {
            None => {
                if let (Some(name), Some(id)) = (&item.name, &item.id) {
                    println!("tracking {name} ({id})");
                }
            }
            Some(error) => println!("skipped {}: {error}", item.input),
        }
    }
    Ok(())
}

fn run_remove(paths: &AppPaths, files: Vec<String>) -> anyhow::Result<()> {
    let mut store = TrackedStore::load(paths)?;

    let files = if files.is_empty() {
        if store.is_empty() {
            println!("no files tracked");
            return Ok(());
        }
        let ids = store.ids();
        let options: Vec<String> = store
            .iter()
            .map(|(id, file)| format!("{} ({id})", file.name))
            .collect();
        match prompt::select_from("tracked files", &options) {
            Some(index) => vec![ids[index].clone()],
            None => {
                println!("nothing selected");
                return Ok(());
            }
        }
    } else {
        files
    };

    for item in collect::remove_files(&mut store, &files)? {
        match &item.error {
            None => {
                if let (Some(name), Some(id)) = (&item.name, &item.id) {
                    println!("stopped tracking {name} ({id})");
                }
            }
            Some(error) => println!("skipped {}: {error}", item.input),
        }
    }
    Ok(())
}

fn run_list(paths: &AppPaths) -> anyhow::Result<()> {
    let store = TrackedStore::load(paths)?;
    if store.is_empty() {
        println!("no files tracked");
        return Ok(());
    }

    for (id, file) in store.iter() {
        match file.records.last() {
            Some(latest) => println!(
                "{} ({id}): users:{} likes:{} [{} records]",
                file.name,
                latest.user_count,
                latest.like_count,
                file.records.len()
            ),
            None => println!("{} ({id}): no records yet", file.name),
        }
    }
    Ok(())
}

async fn run_collection(paths: &AppPaths) -> anyhow::Result<()> {
    let mut store = TrackedStore::load(paths)?;
    let settings = Settings::load(paths)?;
    let provider = HttpStatsProvider::from_env()?;
    let dispatcher = WebhookDispatcher::new()?;
    let collector = Collector::new(&provider, &dispatcher);

    let summary = collector.run(&mut store, &settings).await?;
    if let Some(message) = &summary.message {
        println!("{message}");
    }
    for file in &summary.files {
        if let Some(error) = &file.error {
            println!("fetch failed for {} ({}): {error}", file.name, file.id);
        }
    }
    if !summary.dispatch.is_empty() {
        let delivered = summary.dispatch.iter().filter(|o| o.succeeded()).count();
        println!("delivered to {delivered} of {} webhooks", summary.dispatch.len());
    }
    Ok(())
}

fn run_schedule(paths: &AppPaths, command: ScheduleCommand) -> anyhow::Result<()> {
    let control = Launchctl;
    let reconciler = Reconciler::new(paths, &control, &TerminalPrompt);

    match command {
        ScheduleCommand::Add { times } => match reconciler.add(&times)? {
            AddOutcome::Committed { added, all } => {
                if added.is_empty() {
                    println!("already scheduled");
                } else {
                    for time in &added {
                        println!("scheduled {time}");
                    }
                }
                println!("daily runs: {}", join_times(&all));
            }
            AddOutcome::Cancelled => println!("schedule unchanged"),
        },
        ScheduleCommand::Remove { times } => {
            let times = if times.is_empty() {
                let status = reconciler.status()?;
                if status.triggers.is_empty() {
                    println!("no schedule configured");
                    return Ok(());
                }
                let options: Vec<String> =
                    status.triggers.iter().map(ToString::to_string).collect();
                match prompt::select_from("scheduled times", &options) {
                    Some(index) => vec![options[index].clone()],
                    None => {
                        println!("nothing selected");
                        return Ok(());
                    }
                }
            } else {
                times
            };

            match reconciler.remove(&times)? {
                RemoveOutcome::NotConfigured => println!("no schedule configured"),
                RemoveOutcome::Removed {
                    removed,
                    missing,
                    invalid,
                    remaining,
                } => {
                    for time in &removed {
                        println!("unscheduled {time}");
                    }
                    for time in &missing {
                        println!("not scheduled: {time}");
                    }
                    for time in &invalid {
                        println!("skipped {time}: not a valid time");
                    }
                    if remaining.is_empty() {
                        println!("schedule removed");
                    } else {
                        println!("daily runs: {}", join_times(&remaining));
                    }
                }
            }
        }
        ScheduleCommand::List => {
            let status = reconciler.status()?;
            if status.configured {
                println!("daily runs: {}", join_times(&status.triggers));
            } else {
                println!("no schedule configured");
            }
            println!("job {}", if status.active { "loaded" } else { "not loaded" });
        }
    }
    Ok(())
}

fn join_times(times: &[Trigger]) -> String {
    times
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn run_webhook(paths: &AppPaths, command: WebhookCommand) -> anyhow::Result<()> {
    let mut settings = Settings::load(paths)?;

    match command {
        WebhookCommand::Add { urls } => {
            let mut changed = false;
            for url in &urls {
                match settings.add_webhook(url) {
                    Ok(()) => {
                        changed = true;
                        println!("registered {url}");
                    }
                    Err(e) => println!("skipped {url}: {e}"),
                }
            }
            if changed {
                settings.save()?;
            }
        }
        WebhookCommand::Remove { urls } => {
            let urls = if urls.is_empty() {
                let registered = settings.webhooks().to_vec();
                if registered.is_empty() {
                    println!("no webhooks registered");
                    return Ok(());
                }
                match prompt::select_from("registered webhooks", &registered) {
                    Some(index) => vec![registered[index].clone()],
                    None => {
                        println!("nothing selected");
                        return Ok(());
                    }
                }
            } else {
                urls
            };

            let mut changed = false;
            for url in &urls {
                match settings.remove_webhook(url) {
                    Ok(()) => {
                        changed = true;
                        println!("unregistered {url}");
                    }
                    Err(e) => println!("skipped {url}: {e}"),
                }
            }
            if changed {
                settings.save()?;
            }
        }
        WebhookCommand::List => {
            if settings.webhooks().is_empty() {
                println!("no webhooks registered");
            } else {
                for url in settings.webhooks() {
                    println!("{url}");
                }
            }
        }
    }
    Ok(())
}
