//! Campaign snapshot and alert log files
//!
//! A snapshot is a small text report of the current campaign:
//!
//! ```text
//! Broadcast test to 5 started at 2024-03-01 09:00:00
//!
//! 23 Kitchen answered at 2024-03-01 09:00:12
//! 41 ??? answered at 2024-03-01 09:00:40
//! ```
//!
//! Each campaign gets its own file, named after its start time and target,
//! and the file is rewritten on every new answer.

use std::fmt::{self, Write as _};
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use sten_protocol::ProtocolCode;
use tracing::warn;

use crate::alias::AliasDirectory;
use crate::error::EngineError;
use crate::options::{Options, DEFAULT_DATE_TIME_FORMAT};
use crate::state::{AnsweredRegistry, BroadcastCampaign};

/// Line ending used in written files
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Line ending used in written files
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Timestamp format used in snapshot file names
const FILE_NAME_TIME_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

/// Format a timestamp, falling back to the default format if `format` is invalid
pub fn format_timestamp<Tz>(ts: &DateTime<Tz>, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    if write!(out, "{}", ts.format(format)).is_err() {
        warn!("Invalid date/time format {:?}, using default", format);
        out.clear();
        let _ = write!(out, "{}", ts.format(DEFAULT_DATE_TIME_FORMAT));
    }
    out
}

/// Text of one alert log entry (without line ending)
pub fn alert_line(source: ProtocolCode, target: ProtocolCode, timestamp: &str) -> String {
    format!("Alert triggered from {source} to {target} at {timestamp}")
}

/// File name of the snapshot for `campaign`
pub fn snapshot_file_name(campaign: &BroadcastCampaign) -> String {
    format!(
        "broadcast {} to {}.txt",
        format_timestamp(&campaign.started_at, FILE_NAME_TIME_FORMAT),
        campaign.target
    )
}

/// Renders and writes campaign snapshots and alert entries
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotWriter;

impl SnapshotWriter {
    /// Create a writer
    pub fn new() -> Self {
        Self
    }

    /// Render the snapshot document
    pub fn render_campaign(
        &self,
        campaign: &BroadcastCampaign,
        answered: &AnsweredRegistry,
        aliases: &AliasDirectory,
        format: &str,
    ) -> String {
        let mut doc = format!(
            "Broadcast test to {} started at {}{LINE_ENDING}{LINE_ENDING}",
            campaign.target,
            format_timestamp(&campaign.started_at, format)
        );

        for (source, at) in answered.in_answer_order() {
            doc.push_str(&format!(
                "{} {} answered at {}{LINE_ENDING}",
                source,
                aliases.resolve(source),
                format_timestamp(&at.with_timezone(&Local), format)
            ));
        }

        doc
    }

    /// Path of the snapshot for `campaign` under `dir`
    pub fn campaign_path(&self, dir: &Path, campaign: &BroadcastCampaign) -> PathBuf {
        dir.join(snapshot_file_name(campaign))
    }

    /// Write the campaign snapshot, replacing any previous version
    pub fn write_campaign(
        &self,
        options: &Options,
        aliases: &AliasDirectory,
        campaign: &BroadcastCampaign,
        answered: &AnsweredRegistry,
    ) -> Result<PathBuf, EngineError> {
        let path = self.campaign_path(&options.snapshot_dir, campaign);
        let doc = self.render_campaign(campaign, answered, aliases, &options.date_time_format);

        let result = if options.snapshot_dir.as_os_str().is_empty() {
            fs::write(&path, doc)
        } else {
            fs::create_dir_all(&options.snapshot_dir).and_then(|_| fs::write(&path, doc))
        };

        result
            .map(|_| path.clone())
            .map_err(|source| EngineError::SnapshotWrite { path, source })
    }

    /// Append one entry to the alert log
    pub fn append_alert(&self, path: &Path, entry: &str) -> Result<(), EngineError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| write!(file, "{entry}{LINE_ENDING}"))
            .map_err(|source| EngineError::AlertAppend {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn campaign() -> BroadcastCampaign {
        let started_at = Local.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        BroadcastCampaign::new(ProtocolCode(5), started_at)
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            snapshot_file_name(&campaign()),
            "broadcast 2024-03-01 09-00-00 to 5.txt"
        );
    }

    #[test]
    fn test_render_orders_by_answer_time() {
        let campaign = campaign();
        let start = campaign.started_at.with_timezone(&Utc);
        let mut answered = AnsweredRegistry::new();
        answered.try_insert(ProtocolCode(41), start + Duration::seconds(40));
        answered.try_insert(ProtocolCode(23), start + Duration::seconds(12));

        let mut aliases = AliasDirectory::new();
        aliases.insert(ProtocolCode(23), "Kitchen");

        let doc = SnapshotWriter::new().render_campaign(
            &campaign,
            &answered,
            &aliases,
            DEFAULT_DATE_TIME_FORMAT,
        );
        let expected = [
            "Broadcast test to 5 started at 2024-03-01 09:00:00",
            "",
            "23 Kitchen answered at 2024-03-01 09:00:12",
            "41 ??? answered at 2024-03-01 09:00:40",
            "",
        ]
        .join(LINE_ENDING);
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_render_custom_and_invalid_format() {
        let writer = SnapshotWriter::new();
        let answered = AnsweredRegistry::new();
        let aliases = AliasDirectory::new();

        let doc = writer.render_campaign(&campaign(), &answered, &aliases, "%d.%m.%y %H:%M");
        assert!(doc.starts_with("Broadcast test to 5 started at 01.03.24 09:00"));

        let doc = writer.render_campaign(&campaign(), &answered, &aliases, "%Q");
        assert!(doc.starts_with("Broadcast test to 5 started at 2024-03-01 09:00:00"));
    }

    #[test]
    fn test_write_campaign_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let options = Options {
            snapshot_dir: tmp.path().join("snapshots"),
            ..Default::default()
        };
        let writer = SnapshotWriter::new();
        let campaign = campaign();
        let aliases = AliasDirectory::new();
        let mut answered = AnsweredRegistry::new();

        let path = writer
            .write_campaign(&options, &aliases, &campaign, &answered)
            .unwrap();
        answered.try_insert(ProtocolCode(7), Utc::now());
        let again = writer
            .write_campaign(&options, &aliases, &campaign, &answered)
            .unwrap();

        assert_eq!(path, again);
        let doc = fs::read_to_string(&path).unwrap();
        assert!(doc.contains("7 ??? answered at"));
        assert_eq!(fs::read_dir(tmp.path().join("snapshots")).unwrap().count(), 1);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "").unwrap();
        let options = Options {
            snapshot_dir: blocker.join("sub"),
            ..Default::default()
        };

        let result = SnapshotWriter::new().write_campaign(
            &options,
            &AliasDirectory::new(),
            &campaign(),
            &AnsweredRegistry::new(),
        );
        assert!(matches!(result, Err(EngineError::SnapshotWrite { .. })));
    }

    #[test]
    fn test_append_alert() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("alerts.txt");
        let writer = SnapshotWriter::new();

        writer
            .append_alert(&path, &alert_line(ProtocolCode(23), ProtocolCode(99), "t1"))
            .unwrap();
        writer
            .append_alert(&path, &alert_line(ProtocolCode(24), ProtocolCode(99), "t2"))
            .unwrap();

        let log = fs::read_to_string(&path).unwrap();
        assert_eq!(
            log,
            format!(
                "Alert triggered from 23 to 99 at t1{LINE_ENDING}Alert triggered from 24 to 99 at t2{LINE_ENDING}"
            )
        );
    }
}
