//! Campaign state tracking

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Local, Utc};
use sten_protocol::ProtocolCode;

/// Number of raw lines kept for the diagnostic view
pub const RECENT_INPUT_CAPACITY: usize = 200;

/// The most recent broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastCampaign {
    /// Broadcast code dialed
    pub target: ProtocolCode,
    /// When the broadcast was seen
    pub started_at: DateTime<Local>,
}

impl BroadcastCampaign {
    /// Create a campaign record
    pub fn new(target: ProtocolCode, started_at: DateTime<Local>) -> Self {
        Self { target, started_at }
    }
}

/// Sources that answered the current campaign, first answer wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnsweredRegistry {
    answered: HashMap<ProtocolCode, DateTime<Utc>>,
}

impl AnsweredRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer unless `source` already answered
    ///
    /// Returns `true` if the answer was recorded.
    pub fn try_insert(&mut self, source: ProtocolCode, at: DateTime<Utc>) -> bool {
        if self.answered.contains_key(&source) {
            return false;
        }
        self.answered.insert(source, at);
        true
    }

    /// When `source` answered, if it did
    pub fn answered_at(&self, source: ProtocolCode) -> Option<DateTime<Utc>> {
        self.answered.get(&source).copied()
    }

    /// Whether `source` answered
    pub fn contains(&self, source: ProtocolCode) -> bool {
        self.answered.contains_key(&source)
    }

    /// Forget all answers
    pub fn clear(&mut self) {
        self.answered.clear();
    }

    /// Number of answers
    pub fn len(&self) -> usize {
        self.answered.len()
    }

    /// Whether nobody answered yet
    pub fn is_empty(&self) -> bool {
        self.answered.is_empty()
    }

    /// Answers ordered by answer time, ties broken by code
    pub fn in_answer_order(&self) -> Vec<(ProtocolCode, DateTime<Utc>)> {
        let mut entries: Vec<_> = self.answered.iter().map(|(&c, &t)| (c, t)).collect();
        entries.sort_by_key(|&(code, at)| (at, code));
        entries
    }
}

/// Raw input lines, newest first, bounded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentInputLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for RecentInputLog {
    fn default() -> Self {
        Self::with_capacity(RECENT_INPUT_CAPACITY)
    }
}

impl RecentInputLog {
    /// Create a log holding [`RECENT_INPUT_CAPACITY`] lines
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log with a custom bound
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Add a line, evicting the oldest past capacity
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_front(line.into());
        self.lines.truncate(self.capacity);
    }

    /// Lines, newest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Most recent line
    pub fn latest(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    /// Number of lines held
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no line was seen yet
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Read-only copy of the engine state for consumers on other threads
///
/// Aliases are not resolved here; consumers resolve them against the current
/// configuration so a reload is reflected immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateView {
    /// Current campaign
    pub campaign: BroadcastCampaign,
    /// Answers in answer order
    pub answered: Vec<(ProtocolCode, DateTime<Utc>)>,
    /// Raw lines, newest first
    pub recent_inputs: Vec<String>,
}
