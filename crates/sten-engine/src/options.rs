//! Operator options
//!
//! An [`Options`] value is an immutable snapshot handed to the engine by the
//! configuration layer. Every field has a default so a partial settings file
//! is accepted.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use sten_link::LinkSettings;
use sten_protocol::{DecodePolicy, ProtocolCode};

use crate::classify::CodeSet;
use crate::error::OptionsError;

/// Default display format for campaign and answer timestamps
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[cfg(windows)]
const DEFAULT_SERIAL_PORT: &str = "COM1";
#[cfg(not(windows))]
const DEFAULT_SERIAL_PORT: &str = "/dev/ttyS0";

/// Options snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Serial port of the exchange's maintenance output
    pub serial_port_name: String,
    /// Seconds to wait before reopening the port after a failure
    pub serial_retry_wait_secs: u64,
    /// Answer, broadcast and alert codes
    #[serde(flatten)]
    pub codes: CodeSet,
    /// chrono strftime format for displayed timestamps
    pub date_time_format: String,
    /// Headerless `number,alias` file
    pub aliases_path: PathBuf,
    /// Append-only alert log
    pub alerts_log_path: PathBuf,
    /// Directory campaign snapshots are written to
    pub snapshot_dir: PathBuf,
    /// Named groups of codes, for display only
    pub call_groups: BTreeMap<String, BTreeSet<ProtocolCode>>,
    /// Reject lines with undecodable codes instead of substituting 0
    pub strict_decoding: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            serial_port_name: DEFAULT_SERIAL_PORT.to_string(),
            serial_retry_wait_secs: 10,
            codes: CodeSet::default(),
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
            aliases_path: PathBuf::from("./aliases-default.csv"),
            alerts_log_path: PathBuf::from("./alerts-log-default.txt"),
            snapshot_dir: PathBuf::from("."),
            call_groups: BTreeMap::new(),
            strict_decoding: false,
        }
    }
}

impl Options {
    /// Wait between serial reconnect attempts
    pub fn serial_retry_wait(&self) -> Duration {
        Duration::from_secs(self.serial_retry_wait_secs)
    }

    /// Settings for the next serial connection attempt
    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            port_name: self.serial_port_name.clone(),
            retry_wait: self.serial_retry_wait(),
        }
    }

    /// Decode policy for code fields
    pub fn decode_policy(&self) -> DecodePolicy {
        DecodePolicy::from_strict(self.strict_decoding)
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !is_valid_format(&self.date_time_format) {
            return Err(OptionsError::InvalidDateFormat(
                self.date_time_format.clone(),
            ));
        }

        for (set, codes) in self.codes.named_sets() {
            if let Some(&code) = codes.iter().find(|c| **c > ProtocolCode::MAX) {
                return Err(OptionsError::CodeOutOfRange { set, code });
            }
        }

        Ok(())
    }
}

/// Whether a strftime format string parses without errors
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}
