//! Shared configuration store
//!
//! Options and the alias directory built from them are published together as
//! one immutable [`ConfigSnapshot`]. Readers clone the `Arc` under a briefly
//! held read lock and keep using that snapshot for as long as they need it,
//! so the line worker never sees options from one reload paired with aliases
//! from another.

use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::alias::{AliasDirectory, AliasLoader};
use crate::classify::format_codes;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::options::Options;

/// Options and aliases that belong together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// Operator options
    pub options: Options,
    /// Aliases loaded from `options.aliases_path`
    pub aliases: AliasDirectory,
}

/// Holder of the current [`ConfigSnapshot`]
pub struct ConfigStore {
    current: RwLock<Arc<ConfigSnapshot>>,
    loader: Box<dyn AliasLoader>,
    events: broadcast::Sender<EngineEvent>,
    reload_lock: Mutex<()>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("current", &self.current())
            .field("loader", &"<loader>")
            .finish()
    }
}

impl ConfigStore {
    /// Create the store, loading aliases for the initial options
    pub fn new<L>(options: Options, loader: L, events: broadcast::Sender<EngineEvent>) -> Self
    where
        L: AliasLoader + 'static,
    {
        let loader: Box<dyn AliasLoader> = Box::new(loader);
        let snapshot = build_snapshot(loader.as_ref(), options);
        log_code_sets(&snapshot.options);

        Self {
            current: RwLock::new(Arc::new(snapshot)),
            loader,
            events,
            reload_lock: Mutex::new(()),
        }
    }

    /// Get the current snapshot
    pub fn current(&self) -> Arc<ConfigSnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the options and rebuild the alias directory
    ///
    /// Safe to call from any thread. Campaign state is not touched.
    pub fn reload(&self, options: Options) {
        // Serialise reloads so a slow alias load cannot overwrite a newer one
        let _reload = self.reload_lock.lock().unwrap_or_else(|e| e.into_inner());

        let snapshot = Arc::new(build_snapshot(self.loader.as_ref(), options));
        log_code_sets(&snapshot.options);

        {
            let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
            *guard = snapshot;
        }

        let _ = self.events.send(EngineEvent::Updated);
        warn!("Configuration reloaded.");
    }

    /// Sender for engine events
    pub fn events(&self) -> &broadcast::Sender<EngineEvent> {
        &self.events
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

fn build_snapshot(loader: &dyn AliasLoader, options: Options) -> ConfigSnapshot {
    let aliases = load_aliases(loader, &options);
    ConfigSnapshot { options, aliases }
}

fn load_aliases(loader: &dyn AliasLoader, options: &Options) -> AliasDirectory {
    match loader.load(&options.aliases_path) {
        Ok(aliases) => {
            info!(
                "Loaded {} number aliases from '{}'",
                aliases.len(),
                options.aliases_path.display()
            );
            aliases
        }
        Err(EngineError::AliasNotFound(path)) => {
            warn!(
                "Couldn't find '{}', no number aliases loaded.",
                path.display()
            );
            AliasDirectory::new()
        }
        Err(e) => {
            error!("{}, no number aliases loaded.", e);
            AliasDirectory::new()
        }
    }
}

fn log_code_sets(options: &Options) {
    info!(
        "Listening for broadcast codes: {}",
        format_codes(&options.codes.broadcast_codes)
    );
    info!(
        "Listening for expected answer codes: {}",
        format_codes(&options.codes.answer_codes)
    );
    info!(
        "Listening for alert codes: {}",
        format_codes(&options.codes.alert_codes)
    );
}
