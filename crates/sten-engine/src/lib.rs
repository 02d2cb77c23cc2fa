//! Broadcast Campaign Engine
//!
//! This crate turns decoded exchange call records into campaign state.
//!
//! # Architecture
//!
//! A campaign starts when a station dials one of the configured broadcast
//! codes. Stations then confirm by dialing an answer code; the first answer
//! per station is recorded and the campaign snapshot file is rewritten.
//! Alert codes are logged independently of any campaign.
//!
//! - [`ConfigStore`] holds the current options and alias directory as one
//!   snapshot and swaps both on reload
//! - [`StateEngine`] owns the campaign state and is driven one line at a
//!   time by the serial worker
//! - All changes are announced through [`EngineEvent`]s, and a
//!   [`StateView`] copy is published for display
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sten_engine::{event_channel, AliasFileLoader, ConfigStore, Options, StateEngine};
//!
//! let (events, _rx) = event_channel();
//! let store = Arc::new(ConfigStore::new(Options::default(), AliasFileLoader, events));
//! let mut engine = StateEngine::new(store);
//!
//! engine.process_line("0501 F023 F089 X Y");
//! ```

pub mod alias;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod options;
pub mod snapshot;
pub mod state;

pub use alias::{parse_aliases, AliasDirectory, AliasFileLoader, AliasLoader, UNKNOWN_ALIAS};
pub use classify::{format_codes, Classification, CodeSet};
pub use config::{ConfigSnapshot, ConfigStore};
pub use engine::{LineOutcome, StateEngine};
pub use error::{EngineError, OptionsError};
pub use events::{event_channel, EngineEvent, EVENT_CHANNEL_CAPACITY};
pub use options::{Options, DEFAULT_DATE_TIME_FORMAT};
pub use snapshot::{alert_line, format_timestamp, snapshot_file_name, SnapshotWriter, LINE_ENDING};
pub use state::{AnsweredRegistry, BroadcastCampaign, RecentInputLog, StateView};
