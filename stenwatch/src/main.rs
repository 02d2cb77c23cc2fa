//! Stenwatch
//!
//! Watches the maintenance output of a paging/intercom exchange and tracks
//! broadcast test campaigns: which stations answered, and when.
//!
//! Usage: `stenwatch [settings.json]`

mod console;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use console::{run_console, ConsoleInputs};
use settings::{initial_options, settings_path, watch_settings, SettingsWatcher};
use sten_engine::{event_channel, AliasFileLoader, ConfigStore, StateEngine};
use sten_link::LineReader;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long shutdown waits for the line worker
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stenwatch=info,sten_protocol=info,sten_link=info,sten_engine=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Stenwatch");

    let path = settings_path(std::env::args().nth(1));
    let options = initial_options(path.as_deref())?;

    let (events, _) = event_channel();
    let store = Arc::new(ConfigStore::new(options, AliasFileLoader, events));
    let cancel = CancellationToken::new();

    // Engine and reader are built here so the console can subscribe first
    let mut engine = StateEngine::new(Arc::clone(&store));
    let reader_store = Arc::clone(&store);
    let mut reader = LineReader::serial(move || reader_store.current().options.link_settings());

    let inputs = ConsoleInputs {
        events: store.subscribe(),
        view: engine.subscribe_view(),
        link: reader.subscribe_state(),
    };
    let console = tokio::spawn(run_console(
        Arc::clone(&store),
        inputs,
        |line: &str| tracing::info!("{}", line),
        cancel.clone(),
    ));

    let watcher = path.map(|path| {
        tokio::spawn(watch_settings(
            SettingsWatcher::new(path),
            Arc::clone(&store),
            cancel.clone(),
        ))
    });

    let worker_rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create worker runtime")?;
    let worker_cancel = cancel.clone();
    let (done_tx, done_rx) = oneshot::channel();
    let worker = std::thread::Builder::new()
        .name("line-worker".into())
        .spawn(move || {
            worker_rt.block_on(reader.run(&mut engine, &worker_cancel));
            let _ = done_tx.send(());
        })
        .context("Failed to spawn line worker")?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    tracing::info!("Shutting down");
    cancel.cancel();

    // The worker only notices cancellation between reads
    match tokio::time::timeout(SHUTDOWN_GRACE, done_rx).await {
        Ok(Ok(())) => {
            if worker.join().is_err() {
                anyhow::bail!("Line worker panicked");
            }
        }
        Ok(Err(_)) => anyhow::bail!("Line worker panicked"),
        Err(_) => tracing::warn!("Line worker still blocked in a read, not waiting for it"),
    }

    if let Some(watcher) = watcher {
        watcher.await.context("Settings watcher failed")?;
    }
    console.await.context("Console failed")?;

    tracing::info!("Stopped");
    Ok(())
}
