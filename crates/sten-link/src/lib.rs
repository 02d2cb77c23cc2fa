//! Exchange Serial Link Library
//!
//! This crate owns the serial connection to the exchange's maintenance port:
//!
//! - [`framing`]: fixed line settings and record cleanup
//! - [`LineReader`]: open/read/retry lifecycle, forwarding lines to a [`LineSink`]
//! - [`scanner`]: serial port enumeration for diagnostics
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use sten_link::{LineReader, LinkSettings};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() {
//! let cancel = CancellationToken::new();
//! let mut reader = LineReader::serial(|| LinkSettings {
//!     port_name: "/dev/ttyS0".into(),
//!     retry_wait: Duration::from_secs(10),
//! });
//!
//! let mut sink = |line: &str| tracing::info!("{}", line);
//! reader.run(&mut sink, &cancel).await;
//! # }
//! ```

pub mod error;
pub mod framing;
pub mod reader;
pub mod scanner;

pub use error::LinkError;
pub use reader::{Connector, LineReader, LineSink, LinkSettings, LinkState, SerialConnector};
pub use scanner::{enumerate_ports, log_available_ports, PortInfo};
