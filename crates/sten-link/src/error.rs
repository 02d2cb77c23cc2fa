//! Error types for the serial link

use std::io;

use serialport::ErrorKind;
use thiserror::Error;

/// Errors that end a serial link session
#[derive(Debug, Error)]
pub enum LinkError {
    /// Failed to open serial port
    #[error("failed to open port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Failed to discard stale buffers after opening
    #[error("failed to clear buffers on {port}: {source}")]
    Clear {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// I/O error while reading
    #[error("read error: {0}")]
    Read(#[from] io::Error),

    /// Port closed or returned end of stream mid-session
    #[error("port closed unexpectedly")]
    Closed,

    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),
}

impl LinkError {
    /// Whether this error means the configured port does not exist
    pub fn is_port_missing(&self) -> bool {
        match self {
            LinkError::Open { source, .. } => match source.kind() {
                ErrorKind::NoDevice => true,
                ErrorKind::Io(kind) => kind == io::ErrorKind::NotFound,
                _ => false,
            },
            _ => false,
        }
    }
}
