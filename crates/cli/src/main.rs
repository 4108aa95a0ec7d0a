use anyhow::Result;
use clap::{Parser, Subcommand};
use mapshapes::store::ShapeStore;
use std::path::PathBuf;
use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

mod session;

#[derive(Parser)]
#[command(name = "mapshapes")]
#[command(about = "Replay drawing sessions and inspect exported shape collections")]
struct Cmd {
    /// Store configuration (JSON); missing fields take their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Apply a JSON-lines event log to an empty collection and write the export
    Replay {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Seed for color picks (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Restore an exported collection and print one row per shape
    Inspect {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Replay { events, out, seed } => replay(cmd.config, events, out, seed),
        Action::Inspect { input } => inspect(cmd.config, input),
        Action::Config => config(cmd.config),
    }
}

fn replay(
    config: Option<PathBuf>,
    events: PathBuf,
    out: PathBuf,
    seed: Option<u64>,
) -> Result<()> {
    let cfg = session::load_cfg(config.as_deref(), seed)?;
    let log = session::read_events(&events)?;
    tracing::info!(events = %events.display(), count = log.len(), "replay");

    let mut store = ShapeStore::new(cfg);
    let summary = session::replay(&mut store, &log);
    session::write_export(&out, &store)?;
    tracing::info!(out = %out.display(), shapes = store.len(), "export written");

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn inspect(config: Option<PathBuf>, input: PathBuf) -> Result<()> {
    let cfg = session::load_cfg(config.as_deref(), None)?;
    let doc = session::read_export(&input)?;
    let store = ShapeStore::restore(cfg, &doc)?;
    tracing::info!(input = %input.display(), shapes = store.len(), "inspect");
    println!("{}", serde_json::to_string_pretty(&session::describe(&store))?);
    Ok(())
}

fn config(config: Option<PathBuf>) -> Result<()> {
    let cfg = session::load_cfg(config.as_deref(), None)?;
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}
