//! Console sink for engine events
//!
//! Drains the engine's event stream, state views and link state. Aliases are
//! resolved here, against whatever configuration is current when a summary
//! is rendered, so a reload shows up without waiting for the next line.

use std::sync::Arc;

use sten_engine::{
    format_timestamp, AliasDirectory, ConfigStore, EngineEvent, Options, StateView,
};
use sten_link::LinkState;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Receivers the console reads from
pub struct ConsoleInputs {
    pub events: broadcast::Receiver<EngineEvent>,
    pub view: watch::Receiver<StateView>,
    pub link: watch::Receiver<LinkState>,
}

/// One line per call group: `name: answered/total`
pub fn group_progress(options: &Options, view: &StateView) -> Vec<String> {
    options
        .call_groups
        .iter()
        .map(|(name, codes)| {
            let answered = view
                .answered
                .iter()
                .filter(|(code, _)| codes.contains(code))
                .count();
            format!("{}: {}/{}", name, answered, codes.len())
        })
        .collect()
}

/// Summary of the campaign in a view
pub fn campaign_summary(view: &StateView, aliases: &AliasDirectory, format: &str) -> String {
    let answered: Vec<String> = view
        .answered
        .iter()
        .map(|(code, _)| format!("{} {}", code, aliases.resolve(*code)))
        .collect();

    format!(
        "Broadcast to {} started at {}: {} answered [{}]",
        view.campaign.target,
        format_timestamp(&view.campaign.started_at, format),
        answered.len(),
        answered.join(", ")
    )
}

/// Campaign display, re-rendered whenever state or configuration changes
struct CampaignDisplay<E> {
    emit: E,
    last_summary: String,
}

impl<E: FnMut(&str)> CampaignDisplay<E> {
    /// Render `view` against the current configuration, skipping repeats
    fn render(&mut self, store: &ConfigStore, view: &StateView) {
        let config = store.current();
        let summary =
            campaign_summary(view, &config.aliases, &config.options.date_time_format);
        if summary == self.last_summary {
            return;
        }

        (self.emit)(&summary);
        for progress in group_progress(&config.options, view) {
            (self.emit)(&format!("  {}", progress));
        }
        self.last_summary = summary;
    }
}

/// Run until cancelled or the engine goes away
///
/// Campaign summaries go to `emit`, once at start and again whenever the
/// state view or the configuration changes what they would show.
pub async fn run_console<E>(
    store: Arc<ConfigStore>,
    mut inputs: ConsoleInputs,
    emit: E,
    cancel: CancellationToken,
) where
    E: FnMut(&str),
{
    let mut display = CampaignDisplay {
        emit,
        last_summary: String::new(),
    };
    let initial = inputs.view.borrow_and_update().clone();
    display.render(&store, &initial);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            event = inputs.events.recv() => match event {
                Ok(EngineEvent::AlertTriggered { source, target }) => {
                    let config = store.current();
                    warn!(
                        "ALERT {} ({}) dialed {}",
                        source,
                        config.aliases.resolve(source),
                        target
                    );
                }
                // Also sent on configuration reload, which changes no view
                Ok(EngineEvent::Updated) => {
                    let view = inputs.view.borrow().clone();
                    display.render(&store, &view);
                }
                Err(RecvError::Lagged(n)) => warn!("Console missed {} events", n),
                Err(RecvError::Closed) => break,
            },

            changed = inputs.view.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = inputs.view.borrow_and_update().clone();
                if let Some(line) = view.recent_inputs.first() {
                    debug!("Input: {}", line);
                }
                display.render(&store, &view);
            },

            changed = inputs.link.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *inputs.link.borrow_and_update();
                debug!("Serial link {}", state.name());
            },
        }
    }

    debug!("Console stopped");
}
