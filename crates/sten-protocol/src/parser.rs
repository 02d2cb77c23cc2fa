//! Call line parser
//!
//! A call line is a whitespace-separated record of at least five fields:
//!
//! ```text
//! 0501 F023 F089 X Y
//! ^^^^ ^^^^ ^^^^
//!  |    |    +-- target (dialed code)
//!  |    +------- source (calling station)
//!  +------------ message type, must start with "05"
//! ```
//!
//! Everything else on the link (heartbeats, status frames) is rejected
//! without error.

use tracing::{debug, warn};

use crate::code::ProtocolCode;
use crate::error::{CodeField, DecodeError, Rejection};

/// Minimum number of fields in a call line
pub const MIN_FIELDS: usize = 5;

/// Prefix of the first field that marks a call record
pub const CALL_SENTINEL: &str = "05";

/// One decoded call: who called which code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallRecord {
    /// Calling station
    pub source: ProtocolCode,
    /// Dialed code
    pub target: ProtocolCode,
}

/// How to treat code fields that fail to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Substitute code 0 and keep the record (exchange-compatible default)
    #[default]
    Lenient,
    /// Reject the whole record
    Strict,
}

impl DecodePolicy {
    /// Pick the policy from a strict-mode flag
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            DecodePolicy::Strict
        } else {
            DecodePolicy::Lenient
        }
    }
}

/// Parser for raw exchange lines
#[derive(Debug, Clone, Copy, Default)]
pub struct LineParser {
    policy: DecodePolicy,
}

impl LineParser {
    /// Create a parser with the lenient decode policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with an explicit decode policy
    pub fn with_policy(policy: DecodePolicy) -> Self {
        Self { policy }
    }

    /// Parse a single line (already stripped of framing)
    pub fn parse(&self, line: &str) -> Result<CallRecord, Rejection> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            debug!("Line '{}' has only {} fields", line, fields.len());
            return Err(Rejection::TooFewFields {
                expected: MIN_FIELDS,
                got: fields.len(),
            });
        }

        if !fields[0].starts_with(CALL_SENTINEL) {
            debug!("Ignoring non-call line '{}'", line);
            return Err(Rejection::NotACall(fields[0].to_string()));
        }

        let source = self.decode_field(line, CodeField::Source, fields[1])?;
        let target = self.decode_field(line, CodeField::Target, fields[2])?;

        Ok(CallRecord { source, target })
    }

    fn decode_field(
        &self,
        line: &str,
        field: CodeField,
        token: &str,
    ) -> Result<ProtocolCode, Rejection> {
        match ProtocolCode::decode(token) {
            Ok(code) => Ok(code),
            Err(e) => self.on_decode_error(line, field, e),
        }
    }

    fn on_decode_error(
        &self,
        line: &str,
        field: CodeField,
        error: DecodeError,
    ) -> Result<ProtocolCode, Rejection> {
        warn!(
            "Couldn't parse {} number from '{}': {}",
            field.name(),
            line,
            error
        );
        match self.policy {
            DecodePolicy::Lenient => Ok(ProtocolCode::default()),
            DecodePolicy::Strict => Err(Rejection::BadCode {
                field,
                source: error,
            }),
        }
    }
}

/// Parse a line with the lenient decode policy
pub fn parse_line(line: &str) -> Result<CallRecord, Rejection> {
    LineParser::new().parse(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_line() {
        let record = parse_line("0501 F023 F089 X Y").unwrap();
        assert_eq!(record.source, ProtocolCode(23));
        assert_eq!(record.target, ProtocolCode(89));
    }

    #[test]
    fn test_extra_whitespace_is_ignored() {
        let record = parse_line("  0599\tF001   F005  a b c  ").unwrap();
        assert_eq!(record.source, ProtocolCode(1));
        assert_eq!(record.target, ProtocolCode(5));
    }

    #[test]
    fn test_too_few_fields() {
        assert_eq!(
            parse_line("0501 F023 F089"),
            Err(Rejection::TooFewFields {
                expected: 5,
                got: 3
            })
        );
        assert_eq!(
            parse_line(""),
            Err(Rejection::TooFewFields {
                expected: 5,
                got: 0
            })
        );
    }

    #[test]
    fn test_non_call_prefix() {
        assert_eq!(
            parse_line("0601 F023 F089 X Y"),
            Err(Rejection::NotACall("0601".into()))
        );
        assert_eq!(
            parse_line("5 F023 F089 X Y"),
            Err(Rejection::NotACall("5".into()))
        );
    }

    #[test]
    fn test_lenient_substitutes_zero() {
        let record = parse_line("0501 F0X3 F089 X Y").unwrap();
        assert_eq!(record.source, ProtocolCode(0));
        assert_eq!(record.target, ProtocolCode(89));

        let record = parse_line("0501 F023 F1000 X Y").unwrap();
        assert_eq!(record.source, ProtocolCode(23));
        assert_eq!(record.target, ProtocolCode(0));
    }

    #[test]
    fn test_strict_rejects_bad_code() {
        let parser = LineParser::with_policy(DecodePolicy::Strict);
        let err = parser.parse("0501 F023 FFFF X Y").unwrap_err();
        assert_eq!(
            err,
            Rejection::BadCode {
                field: CodeField::Target,
                source: DecodeError::Empty("FFFF".into()),
            }
        );

        assert!(parser.parse("0501 F023 F089 X Y").is_ok());
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(DecodePolicy::from_strict(true), DecodePolicy::Strict);
        assert_eq!(DecodePolicy::from_strict(false), DecodePolicy::Lenient);
    }
}
