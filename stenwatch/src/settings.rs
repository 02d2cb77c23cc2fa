//! Settings file loading and hot reload

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use sten_engine::{ConfigStore, Options};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How often the settings file is checked for changes
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Get the XDG config directory for stenwatch
/// Uses $XDG_CONFIG_HOME/stenwatch, falls back to ~/.config/stenwatch
fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config);
        if path.is_absolute() {
            return Some(path.join("stenwatch"));
        }
    }

    dirs::home_dir().map(|h| h.join(".config").join("stenwatch"))
}

/// Settings file path: explicit argument, else the default location
pub fn settings_path(arg: Option<String>) -> Option<PathBuf> {
    arg.map(PathBuf::from)
        .or_else(|| config_dir().map(|p| p.join("settings.json")))
}

/// Load and validate options from a JSON settings file
pub fn load_options(path: &Path) -> Result<Options> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    let options: Options = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse settings {}", path.display()))?;
    options
        .validate()
        .with_context(|| format!("Invalid settings {}", path.display()))?;
    Ok(options)
}

/// Load startup options; a missing file means defaults
pub fn initial_options(path: Option<&Path>) -> Result<Options> {
    match path {
        Some(path) if path.exists() => {
            let options = load_options(path)?;
            info!("Loaded settings from '{}'", path.display());
            Ok(options)
        }
        Some(path) => {
            warn!("Couldn't find '{}', using default settings.", path.display());
            Ok(Options::default())
        }
        None => {
            warn!("No settings path available, using default settings.");
            Ok(Options::default())
        }
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Detects changes to the settings file by modification time
#[derive(Debug)]
pub struct SettingsWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl SettingsWatcher {
    /// Start watching `path` from its current state
    pub fn new(path: PathBuf) -> Self {
        let last_modified = modified_at(&path);
        Self {
            path,
            last_modified,
        }
    }

    /// Path being watched
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check the file once
    ///
    /// Returns new options if the file changed and loaded cleanly. A file
    /// that changed but fails to load is reported once and skipped until it
    /// changes again.
    pub fn poll(&mut self) -> Option<Options> {
        let modified = modified_at(&self.path);
        if modified == self.last_modified {
            return None;
        }
        self.last_modified = modified;

        if modified.is_none() {
            warn!(
                "Settings '{}' disappeared, keeping current options",
                self.path.display()
            );
            return None;
        }

        match load_options(&self.path) {
            Ok(options) => Some(options),
            Err(e) => {
                error!("{:#}; keeping current options", e);
                None
            }
        }
    }
}

/// Poll the settings file until cancelled, reloading `store` on change
pub async fn watch_settings(
    mut watcher: SettingsWatcher,
    store: Arc<ConfigStore>,
    cancel: CancellationToken,
) {
    debug!("Watching '{}' for changes", watcher.path().display());
    let mut interval = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let Some(options) = watcher.poll() else {
            continue;
        };

        // Alias loading reads a file; keep it off the async workers
        let store = Arc::clone(&store);
        if let Err(e) = tokio::task::spawn_blocking(move || store.reload(options)).await {
            error!("Settings reload failed: {}", e);
        }
    }
}
