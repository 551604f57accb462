//! Print engine snapshots as JSON.
//!
//! Usage:
//!   cargo run -p imesnap-tools -- --fixture session.toml context
//!   cargo run -p imesnap-tools -- --fixture session.toml candidates --start 5 --limit 10
//!   cargo run -p imesnap-tools -- schemas --settings switcher.toml
//!   cargo run -p imesnap-tools -- select luna_pinyin bopomofo --settings switcher.toml

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imesnap_core::{Config, EngineFixture, MemoryEngine, Runtime, SchemaCatalog, TomlSettingsStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "proto_dump")]
#[command(about = "Dump input engine snapshots as JSON")]
struct Args {
    /// Engine fixture (TOML) describing schemas and one session
    #[arg(short, long, global = true)]
    fixture: Option<PathBuf>,

    /// Snapshot config (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composition, candidate page and raw input
    Context,
    /// Schema identity and mode flags
    Status,
    /// Pending commit text (drained)
    Commit,
    /// Candidates of the current menu from an index
    Candidates {
        #[arg(long, default_value_t = 0)]
        start: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Every schema known to the switcher
    Schemas {
        #[arg(short, long)]
        settings: PathBuf,
    },
    /// Enabled schemas
    Selected {
        #[arg(short, long)]
        settings: PathBuf,
    },
    /// Schemas deployed in the fixture engine
    Deployed,
    /// Replace the enabled schema set
    Select {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(short, long)]
        settings: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => Config::default(),
    };

    let output = match args.command {
        Command::Context => {
            let mut runtime = runtime(args.fixture.as_ref(), config)?;
            let context = runtime.snapshot_context()?;
            serde_json::to_string_pretty(&context)?
        }
        Command::Status => {
            let mut runtime = runtime(args.fixture.as_ref(), config)?;
            serde_json::to_string_pretty(&runtime.snapshot_status())?
        }
        Command::Commit => {
            let mut runtime = runtime(args.fixture.as_ref(), config)?;
            serde_json::to_string_pretty(&runtime.snapshot_commit())?
        }
        Command::Candidates { start, limit } => {
            let mut runtime = runtime(args.fixture.as_ref(), config)?;
            serde_json::to_string_pretty(&runtime.candidates(start, limit))?
        }
        Command::Deployed => {
            let runtime = runtime(args.fixture.as_ref(), config)?;
            serde_json::to_string_pretty(&runtime.schema_list())?
        }
        Command::Schemas { settings } => {
            let catalog = SchemaCatalog::new(TomlSettingsStore::new(settings));
            serde_json::to_string_pretty(&catalog.list_schemas())?
        }
        Command::Selected { settings } => {
            let catalog = SchemaCatalog::new(TomlSettingsStore::new(settings));
            serde_json::to_string_pretty(&catalog.list_selected_schemas())?
        }
        Command::Select { ids, settings } => {
            let catalog = SchemaCatalog::new(TomlSettingsStore::new(settings));
            if !catalog.select_schemas(ids.as_slice()) {
                anyhow::bail!(
                    "could not select schemas {:?} in {}",
                    ids,
                    catalog.store().path().display()
                );
            }
            serde_json::to_string_pretty(&catalog.list_selected_schemas())?
        }
    };

    println!("{}", output);
    Ok(())
}

fn runtime(fixture: Option<&PathBuf>, config: Config) -> Result<Runtime<MemoryEngine>> {
    let path = fixture.context("this command needs --fixture")?;
    let (engine, session) = EngineFixture::load(path)?.build()?;
    tracing::debug!(%session, fixture = %path.display(), "loaded fixture");
    Ok(Runtime::attach(engine, config, session)?)
}
