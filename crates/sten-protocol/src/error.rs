//! Error types for exchange line decoding

use thiserror::Error;

/// Errors that can occur while decoding a single code token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Token is not exactly four characters wide
    #[error("token {token:?} is {len} characters wide, expected 4")]
    Width { token: String, len: usize },

    /// Token consists only of `F` padding
    #[error("token {0:?} has no digits after padding")]
    Empty(String),

    /// Token contains something other than decimal digits after the padding
    #[error("token {0:?} contains non-digit characters")]
    NonDigit(String),
}

/// Which field of a call line failed to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeField {
    /// Calling station (field 1)
    Source,
    /// Dialed code (field 2)
    Target,
}

impl CodeField {
    /// Returns a lower-case name for log output
    pub fn name(&self) -> &'static str {
        match self {
            CodeField::Source => "source",
            CodeField::Target => "target",
        }
    }
}

/// Reasons a raw line does not produce a call record
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Line has fewer whitespace-separated fields than a call line
    #[error("expected at least {expected} fields, got {got}")]
    TooFewFields { expected: usize, got: usize },

    /// First field lacks the call sentinel (heartbeat or other traffic)
    #[error("not a call line (first field {0:?})")]
    NotACall(String),

    /// A code field failed to decode and strict decoding is enabled
    #[error("bad {} code: {source}", .field.name())]
    BadCode {
        field: CodeField,
        #[source]
        source: DecodeError,
    },
}
