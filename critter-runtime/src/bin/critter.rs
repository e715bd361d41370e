//! Headless critter.
//!
//! ```text
//! critter [config.toml] [memory.db]
//! ```
//!
//! Runs the activity clock against a SQLite memory file and logs every
//! behavior the creature performs. Host events are read from stdin as JSON
//! lines, one `PetEvent` per line. Ctrl-C stops the clock and flushes memory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use critter_core::persistence::SqliteBackend;
use critter_core::{BehaviorSelector, CritterConfig, MemoryHandle, MemoryStore, PersonalityModel};
use critter_runtime::telemetry;
use critter_runtime::{BehaviorDriver, Creature, PetEvent, TokioScheduler};

const DEFAULT_DB: &str = "critter.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => CritterConfig::from_file(Path::new(&path))
            .with_context(|| format!("loading config from {path}"))?,
        None => CritterConfig::default(),
    };
    let db_path = args.next().map_or_else(|| PathBuf::from(DEFAULT_DB), PathBuf::from);

    telemetry::init_tracing(&config.general)?;

    let backend = SqliteBackend::open(&db_path, &config.persistence)
        .with_context(|| format!("opening memory database {}", db_path.display()))?;
    let memory = MemoryHandle::from(MemoryStore::from_config(backend, &config));
    info!(db = %db_path.display(), memories = memory.lock().len(), "Memory loaded");

    let creature = Creature::new(PersonalityModel::default(), memory.clone());
    let selector = BehaviorSelector::new(memory.clone(), config.selector.clone());
    let driver = BehaviorDriver::new(creature, selector, &config);
    driver.on_behavior(|behavior| info!(behavior = behavior.tag(), "{behavior}"));

    let handle = driver.start(Arc::new(TokioScheduler::current()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match serde_json::from_str::<PetEvent>(&line) {
                    Ok(event) => driver.handle_event(&event),
                    Err(e) => warn!(error = %e, "Ignoring malformed event"),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "Stopped reading events");
                    stdin_open = false;
                }
            },
        }
    }

    handle.stop();
    memory.lock().flush().context("flushing memories")?;
    info!(memories = memory.lock().len(), "Critter stopped");
    Ok(())
}
