//! Error types for the campaign engine

use std::io;
use std::path::PathBuf;

use sten_protocol::ProtocolCode;
use thiserror::Error;

/// Errors from engine file I/O
///
/// None of these stop line processing; the engine logs them and moves on.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Campaign snapshot could not be written
    #[error("failed to write snapshot {}: {source}", .path.display())]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Alert line could not be appended
    #[error("failed to append alert to {}: {source}", .path.display())]
    AlertAppend {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Alias source does not exist
    #[error("alias file {} not found", .0.display())]
    AliasNotFound(PathBuf),

    /// Alias source exists but could not be read
    #[error("failed to read alias file {}: {source}", .path.display())]
    AliasRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors found when validating an options snapshot
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// Display format contains an unknown strftime specifier
    #[error("invalid date/time format: {0:?}")]
    InvalidDateFormat(String),

    /// A configured code cannot appear on the wire
    #[error("{set} code {code} is out of range (max {})", ProtocolCode::MAX)]
    CodeOutOfRange {
        set: &'static str,
        code: ProtocolCode,
    },
}
