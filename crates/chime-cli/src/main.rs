//! CLI binary for chime.
//!
//! Loads goals from a JSON seed file into the in-memory store and runs the
//! dispatcher against them, either until Ctrl-C or for a single tick.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chime_core::domain::{DomainEvent, Goal, UserId};
use chime_core::impls::{ChannelBroadcaster, InMemoryGoalStore, LogSender, TextbeltSender};
use chime_core::ports::{IdGenerator, NotificationSender, SystemClock, UlidGenerator};
use chime_core::{ChimeConfig, DispatcherBuilder, DispatcherHandle};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// chime: polls goals and sends due reminders by SMS.
#[derive(Parser)]
#[command(name = "chime", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file with `users` and `goals` to load into the store.
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Log messages instead of sending them.
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll until interrupted.
    Run,

    /// Run one tick and print its report as JSON.
    Tick,
}

/// Seed file layout. Goals may omit `id`; they get a ULID.
#[derive(Debug, Default, Deserialize)]
struct Seed {
    #[serde(default)]
    users: Vec<UserId>,
    #[serde(default)]
    goals: Vec<serde_json::Value>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chime=info,chime_core=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ChimeConfig::from_file(path)?,
        None => ChimeConfig::default(),
    };

    let store = InMemoryGoalStore::new();
    if let Some(path) = &cli.seed {
        let loaded = load_seed(&store, path).await?;
        info!(goals = loaded, path = %path.display(), "seeded goal store");
    }

    let sender: Arc<dyn NotificationSender> = if cli.dry_run {
        Arc::new(LogSender::new())
    } else {
        if config.sms.resolved_api_key().is_empty() {
            warn!("no SMS API key configured; Textbelt will reject every message");
        }
        Arc::new(TextbeltSender::from_config(&config.sms))
    };

    // subscribe before anything can emit
    let broadcaster = ChannelBroadcaster::default();
    let events = tokio::spawn(log_events(broadcaster.subscribe()));

    let dispatcher = DispatcherBuilder::new()
        .store(Arc::new(store))
        .sender(sender)
        .broadcaster(Arc::new(broadcaster))
        .config(config.dispatcher)
        .build()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let handle = DispatcherHandle::spawn(Arc::new(dispatcher));
            tokio::signal::ctrl_c()
                .await
                .context("cannot listen for Ctrl-C")?;
            info!("shutting down");
            handle.shutdown_and_join().await;
        }
        Command::Tick => {
            let report = dispatcher.tick().await?;
            drop(dispatcher);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    // the dispatcher held the last sender; the log task drains and exits
    if let Err(e) = events.await {
        warn!(error = %e, "event log task failed");
    }
    Ok(())
}

async fn load_seed(store: &InMemoryGoalStore, path: &Path) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read seed file {}", path.display()))?;
    let seed: Seed = serde_json::from_str(&raw)
        .with_context(|| format!("cannot parse seed file {}", path.display()))?;

    for user in seed.users {
        store.insert_user(user).await;
    }

    let ids = UlidGenerator::new(SystemClock);
    let mut loaded = 0;
    for (index, mut value) in seed.goals.into_iter().enumerate() {
        if let Some(fields) = value.as_object_mut() {
            if !fields.contains_key("id") {
                let id = ids.generate_goal_id();
                fields.insert("id".to_string(), serde_json::Value::String(id.to_string()));
            }
        }
        let goal: Goal = serde_json::from_value(value)
            .with_context(|| format!("invalid goal at index {index}"))?;
        store.insert_user(goal.owner_id.clone()).await;
        store.insert_goal(goal).await?;
        loaded += 1;
    }
    Ok(loaded)
}

/// Stand-in for websocket clients: logs every completion event until the
/// broadcaster is dropped.
async fn log_events(mut rx: Receiver<DomainEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => info!(event = event.name(), payload = %event.payload(), "event"),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event log fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}
