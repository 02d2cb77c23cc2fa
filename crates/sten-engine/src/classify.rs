//! Target code classification
//!
//! The operator configures three sets of target codes. A code may appear in
//! more than one set; the first match in the order answer, broadcast, alert
//! wins.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sten_protocol::ProtocolCode;

/// Role of a dialed target code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Station acknowledging the active broadcast
    Answer,
    /// Start of a new broadcast campaign
    Broadcast,
    /// Out-of-band alert
    Alert,
    /// Not a configured code
    Unclassified,
}

impl Classification {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Answer => "Answer",
            Self::Broadcast => "Broadcast",
            Self::Alert => "Alert",
            Self::Unclassified => "Unclassified",
        }
    }
}

/// Configured target code sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSet {
    /// Codes dialed to answer a broadcast
    pub answer_codes: BTreeSet<ProtocolCode>,
    /// Codes that start a broadcast campaign
    pub broadcast_codes: BTreeSet<ProtocolCode>,
    /// Codes that raise an alert
    pub alert_codes: BTreeSet<ProtocolCode>,
}

impl CodeSet {
    /// Classify a target code
    pub fn classify(&self, target: ProtocolCode) -> Classification {
        if self.answer_codes.contains(&target) {
            Classification::Answer
        } else if self.broadcast_codes.contains(&target) {
            Classification::Broadcast
        } else if self.alert_codes.contains(&target) {
            Classification::Alert
        } else {
            Classification::Unclassified
        }
    }

    /// Iterate over each named set
    pub fn named_sets(&self) -> [(&'static str, &BTreeSet<ProtocolCode>); 3] {
        [
            ("answer", &self.answer_codes),
            ("broadcast", &self.broadcast_codes),
            ("alert", &self.alert_codes),
        ]
    }
}

/// Format a code set for log output, e.g. `{5, 89}`
pub fn format_codes(codes: &BTreeSet<ProtocolCode>) -> String {
    let joined: Vec<String> = codes.iter().map(ToString::to_string).collect();
    format!("{{{}}}", joined.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(codes: &[u32]) -> BTreeSet<ProtocolCode> {
        codes.iter().copied().map(ProtocolCode).collect()
    }

    #[test]
    fn test_classify_each_set() {
        let codes = CodeSet {
            answer_codes: set(&[89]),
            broadcast_codes: set(&[5]),
            alert_codes: set(&[99]),
        };

        assert_eq!(codes.classify(ProtocolCode(89)), Classification::Answer);
        assert_eq!(codes.classify(ProtocolCode(5)), Classification::Broadcast);
        assert_eq!(codes.classify(ProtocolCode(99)), Classification::Alert);
        assert_eq!(codes.classify(ProtocolCode(1)), Classification::Unclassified);
    }

    #[test]
    fn test_overlap_priority() {
        let codes = CodeSet {
            answer_codes: set(&[10, 11]),
            broadcast_codes: set(&[10, 12]),
            alert_codes: set(&[10, 11, 12, 13]),
        };

        assert_eq!(codes.classify(ProtocolCode(10)), Classification::Answer);
        assert_eq!(codes.classify(ProtocolCode(11)), Classification::Answer);
        assert_eq!(codes.classify(ProtocolCode(12)), Classification::Broadcast);
        assert_eq!(codes.classify(ProtocolCode(13)), Classification::Alert);
    }

    #[test]
    fn test_empty_sets_classify_nothing() {
        let codes = CodeSet::default();
        assert_eq!(codes.classify(ProtocolCode(0)), Classification::Unclassified);
    }

    #[test]
    fn test_format_codes() {
        assert_eq!(format_codes(&set(&[89, 5])), "{5, 89}");
        assert_eq!(format_codes(&set(&[])), "{}");
    }
}
