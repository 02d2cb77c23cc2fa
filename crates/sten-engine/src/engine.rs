//! Campaign state engine
//!
//! Applies decoded call lines to the campaign state. One engine instance is
//! owned by the line worker; all mutation happens there, one line at a time.
//!
//! Reactions by target classification:
//!
//! - **Answer**: first answer per source per campaign is recorded and
//!   persisted, later ones are only logged
//! - **Broadcast**: clears all answers and starts a new campaign
//! - **Alert**: appends to the alert log and emits an alert event
//!
//! Every line, recognised or not, lands in the recent input log first.

use std::sync::Arc;

use chrono::{Local, Utc};
use sten_link::LineSink;
use sten_protocol::{CallRecord, LineParser, ProtocolCode, Rejection};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::classify::Classification;
use crate::config::{ConfigSnapshot, ConfigStore};
use crate::events::EngineEvent;
use crate::snapshot::{alert_line, format_timestamp, SnapshotWriter};
use crate::state::{AnsweredRegistry, BroadcastCampaign, RecentInputLog, StateView};

/// What processing a line did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Line was not a usable call record
    Rejected(Rejection),
    /// First answer from this source in the campaign
    Answered(CallRecord),
    /// Source already answered this campaign
    DuplicateAnswer(CallRecord),
    /// New campaign started
    BroadcastStarted(CallRecord),
    /// Alert logged and announced
    AlertRaised(CallRecord),
    /// Alert could not be written to the alert log
    AlertLogFailed(CallRecord),
    /// Target code has no configured role
    Ignored(CallRecord),
}

/// The campaign state engine
pub struct StateEngine {
    config: Arc<ConfigStore>,
    answered: AnsweredRegistry,
    campaign: BroadcastCampaign,
    recent: RecentInputLog,
    writer: SnapshotWriter,
    events: broadcast::Sender<EngineEvent>,
    view_tx: watch::Sender<StateView>,
}

impl StateEngine {
    /// Create an engine reading configuration from `config`
    ///
    /// Events go to the store's event channel. Until the first broadcast the
    /// campaign is code 0, started now.
    pub fn new(config: Arc<ConfigStore>) -> Self {
        let events = config.events().clone();
        let campaign = BroadcastCampaign::new(ProtocolCode::default(), Local::now());
        let answered = AnsweredRegistry::new();
        let recent = RecentInputLog::new();

        let (view_tx, _) = watch::channel(StateView {
            campaign: campaign.clone(),
            answered: Vec::new(),
            recent_inputs: Vec::new(),
        });

        Self {
            config,
            answered,
            campaign,
            recent,
            writer: SnapshotWriter::new(),
            events,
            view_tx,
        }
    }

    /// Current campaign
    pub fn campaign(&self) -> &BroadcastCampaign {
        &self.campaign
    }

    /// Answers in the current campaign
    pub fn answered(&self) -> &AnsweredRegistry {
        &self.answered
    }

    /// Recent raw input
    pub fn recent_inputs(&self) -> &RecentInputLog {
        &self.recent
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Subscribe to state views, updated after every notification
    pub fn subscribe_view(&self) -> watch::Receiver<StateView> {
        self.view_tx.subscribe()
    }

    /// Build a view of the current state
    pub fn view(&self) -> StateView {
        StateView {
            campaign: self.campaign.clone(),
            answered: self.answered.in_answer_order(),
            recent_inputs: self.recent.iter().map(str::to_string).collect(),
        }
    }

    /// Process one raw line
    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        let config = self.config.current();

        self.recent.push(line);
        self.notify_updated();

        let parser = LineParser::with_policy(config.options.decode_policy());
        let record = match parser.parse(line) {
            Ok(record) => record,
            Err(rejection) => return LineOutcome::Rejected(rejection),
        };
        info!("Parse input: '{}'", line);

        match config.options.codes.classify(record.target) {
            Classification::Answer => self.on_answer(&config, record),
            Classification::Broadcast => self.on_broadcast(&config, record),
            Classification::Alert => self.on_alert(&config, record),
            Classification::Unclassified => {
                debug!(
                    "No role for call from '{}' to '{}'",
                    record.source, record.target
                );
                LineOutcome::Ignored(record)
            }
        }
    }

    fn on_answer(&mut self, config: &ConfigSnapshot, record: CallRecord) -> LineOutcome {
        if !self.answered.try_insert(record.source, Utc::now()) {
            warn!(
                "Duplicate call from '{}' to '{}'",
                record.source, record.target
            );
            return LineOutcome::DuplicateAnswer(record);
        }

        self.persist(config);
        self.notify_updated();
        info!("Call from '{}' to '{}'", record.source, record.target);
        LineOutcome::Answered(record)
    }

    fn on_broadcast(&mut self, config: &ConfigSnapshot, record: CallRecord) -> LineOutcome {
        self.answered.clear();
        self.campaign = BroadcastCampaign::new(record.target, Local::now());

        self.persist(config);
        self.notify_updated();
        info!("Broadcast from '{}' to '{}'", record.source, record.target);
        LineOutcome::BroadcastStarted(record)
    }

    fn on_alert(&mut self, config: &ConfigSnapshot, record: CallRecord) -> LineOutcome {
        let options = &config.options;
        let timestamp = format_timestamp(&Local::now(), &options.date_time_format);
        let entry = alert_line(record.source, record.target, &timestamp);

        if let Err(e) = self.writer.append_alert(&options.alerts_log_path, &entry) {
            error!("{}", e);
            return LineOutcome::AlertLogFailed(record);
        }

        let _ = self.events.send(EngineEvent::AlertTriggered {
            source: record.source,
            target: record.target,
        });
        warn!("{}", entry);
        LineOutcome::AlertRaised(record)
    }

    /// Write the campaign snapshot; failures are logged and dropped
    fn persist(&self, config: &ConfigSnapshot) {
        match self.writer.write_campaign(
            &config.options,
            &config.aliases,
            &self.campaign,
            &self.answered,
        ) {
            Ok(path) => debug!("Saved snapshot '{}'", path.display()),
            Err(e) => error!("{}", e),
        }
    }

    fn notify_updated(&self) {
        self.view_tx.send_replace(self.view());
        let _ = self.events.send(EngineEvent::Updated);
    }
}

impl LineSink for StateEngine {
    fn accept_line(&mut self, line: &str) {
        self.process_line(line);
    }
}
