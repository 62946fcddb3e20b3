//! Scout - terminal front end for the tender discovery engine.
//!
//! Loads a tender corpus from JSON, applies the requested filters and view
//! mode, and prints one page with its stats. Bookmarks persist between runs.

mod cli;
mod render;

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use scout_core::{Clock, EngineConfig, SystemClock, TenderId};
use scout_engine::{FetchOutcome, TenderEngine, TenderView};
use scout_gateway::{FixtureGateway, TimeoutGateway};
use scout_storage::{DurableStore, FileStore, MemoryStore};

use crate::cli::Cli;
use crate::render::{render_pager, render_stats, render_view, JsonReport};

// =============================================================================
// Setup
// =============================================================================

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    match &cli.config {
        Some(path) => EngineConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            EngineConfig::default()
        })),
    }
}

/// Saved tenders go to disk when possible, memory otherwise.
fn open_store(cli: &Cli) -> Arc<dyn DurableStore> {
    let opened = match &cli.data_dir {
        Some(dir) => FileStore::open(dir),
        None => FileStore::open_default(),
    };
    match opened {
        Ok(store) => {
            tracing::debug!("Saved tenders stored in {}", store.dir().display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Saved tenders will not persist: {}", e);
            Arc::new(MemoryStore::new())
        }
    }
}

// =============================================================================
// Run
// =============================================================================

async fn run(cli: Cli, engine: TenderEngine) -> anyhow::Result<()> {
    for id in &cli.toggle_saved {
        let saved = engine.toggle_saved_tender(&TenderId::from(id.as_str()));
        tracing::info!("{} {}", if saved { "Saved" } else { "Unsaved" }, id);
    }

    // Each setter issues a fetch; only the last one is awaited; the earlier
    // ones would be discarded as stale anyway.
    let industries: BTreeSet<_> = cli.industries.iter().copied().collect();
    drop(engine.set_industries(industries));
    drop(engine.set_province(cli.province));
    let outcome = engine.set_search(cli.search.clone()).await;

    // Mode first: activating a mode resets the page.
    let mode_task = if cli.urgent {
        engine.activate_urgent()
    } else if cli.saved {
        engine.activate_saved()
    } else {
        None
    };
    if let Some(task) = mode_task {
        task.await;
    }

    if cli.page > 1 && outcome == FetchOutcome::Applied {
        match engine.set_page(cli.page) {
            Some(task) => {
                task.await;
            }
            None => tracing::warn!(
                "Page {} is out of range (1..={}), showing page 1",
                cli.page,
                engine.total_pages()
            ),
        }
    }

    let snapshot = engine.snapshot();

    if cli.json {
        let report = JsonReport::new(&snapshot, engine.saved_ids());
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(warning) = &snapshot.warning {
            eprintln!("Warning: {warning}");
        }
        let view = snapshot.view();
        println!(
            "{}",
            render_view(&view, SystemClock.now(), |id| engine.is_saved(id))
        );
        if !matches!(view, TenderView::Failed { .. }) {
            println!();
            println!("{}", render_pager(&snapshot));
            println!("{}", render_stats(&snapshot.stats));
        }
    }

    if let Some(error) = snapshot.error {
        if !snapshot.loaded {
            anyhow::bail!("tender query failed: {error}");
        }
    }
    Ok(())
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    tracing::debug!("Configuration: {:?}", config);

    let fixtures = FixtureGateway::from_json_file(&cli.fixtures)
        .with_context(|| format!("Failed to load tenders from {}", cli.fixtures.display()))?;
    tracing::info!("Loaded {} tenders", fixtures.len());
    let gateway = TimeoutGateway::new(fixtures, config.request_timeout());

    let store = open_store(&cli);
    let engine = TenderEngine::new(Arc::new(gateway), store, config);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to create tokio runtime")?;
    rt.block_on(run(cli, engine))
}
