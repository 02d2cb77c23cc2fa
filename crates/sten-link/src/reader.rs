//! Serial line reader
//!
//! A single long-lived worker that owns the connection to the exchange and
//! feeds every decoded line, in order, to a [`LineSink`]. The connection
//! lifecycle is an explicit state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Streaming -> Backoff -> Disconnected
//!                      |                        ^
//!                      +------ open failed -----+
//! ```
//!
//! Any failure tears the connection down and, after a fixed wait, the reader
//! reconnects. There is no retry limit; the loop only ends when its
//! cancellation token fires. Cancellation is checked before every connection
//! attempt and ends a backoff wait early. A read already in flight is not
//! interrupted.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::watch;
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::LinkError;
use crate::framing::{decode_line, serial_builder, LINE_TERMINATOR, MAX_RECORD_LEN};
use crate::scanner::log_available_ports;

/// Connection state of the line reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No connection, not trying
    Disconnected,
    /// Opening the port
    Connecting,
    /// Port open, reading lines
    Streaming,
    /// Waiting before the next connection attempt
    Backoff,
}

impl LinkState {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Streaming => "Streaming",
            Self::Backoff => "Backoff",
        }
    }
}

/// Per-attempt connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// Serial port name (e.g. /dev/ttyS0, COM1)
    pub port_name: String,
    /// Wait between a failure and the next connection attempt
    pub retry_wait: Duration,
}

/// Receives decoded lines from the reader
///
/// Called inline on the reader task; the next line is not read until this
/// returns.
pub trait LineSink {
    /// Handle one non-empty line
    fn accept_line(&mut self, line: &str);
}

impl<F> LineSink for F
where
    F: FnMut(&str),
{
    fn accept_line(&mut self, line: &str) {
        self(line)
    }
}

/// Opens the byte stream for a connection attempt
pub trait Connector {
    /// Stream type produced by a successful open
    type Stream: AsyncRead + Unpin;

    /// Open the port, ready for reading with stale data discarded
    fn connect(&mut self, port_name: &str) -> Result<Self::Stream, LinkError>;

    /// Tell the operator which ports exist
    ///
    /// Called once at startup and after every failed open.
    fn list_ports(&mut self) {
        log_available_ports();
    }
}

/// Connector for a physical serial port
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    type Stream = SerialStream;

    fn connect(&mut self, port_name: &str) -> Result<SerialStream, LinkError> {
        let stream = serial_builder(port_name)
            .open_native_async()
            .map_err(|source| LinkError::Open {
                port: port_name.to_string(),
                source,
            })?;

        stream
            .clear(ClearBuffer::All)
            .map_err(|source| LinkError::Clear {
                port: port_name.to_string(),
                source,
            })?;

        Ok(stream)
    }
}

/// Resilient line reader
pub struct LineReader<C, F> {
    connector: C,
    settings: F,
    state_tx: watch::Sender<LinkState>,
    buffer: Vec<u8>,
}

impl<F> LineReader<SerialConnector, F>
where
    F: Fn() -> LinkSettings,
{
    /// Create a reader for a physical serial port
    pub fn serial(settings: F) -> Self {
        Self::new(SerialConnector, settings)
    }
}

impl<C, F> LineReader<C, F>
where
    C: Connector,
    F: Fn() -> LinkSettings,
{
    /// Create a reader with a custom connector
    ///
    /// `settings` is called before every connection attempt so that
    /// configuration changes apply on the next reconnect.
    pub fn new(connector: C, settings: F) -> Self {
        let (state_tx, _) = watch::channel(LinkState::Disconnected);
        Self {
            connector,
            settings,
            state_tx,
            buffer: Vec::with_capacity(128),
        }
    }

    /// Get the current link state
    pub fn state(&self) -> LinkState {
        *self.state_tx.borrow()
    }

    /// Subscribe to link state changes
    pub fn subscribe_state(&self) -> watch::Receiver<LinkState> {
        self.state_tx.subscribe()
    }

    /// Get the connector
    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn set_state(&self, state: LinkState) {
        self.state_tx.send_replace(state);
    }

    /// Run the connect/read/retry loop until `cancel` fires
    pub async fn run<S: LineSink>(&mut self, sink: &mut S, cancel: &CancellationToken) {
        info!("Line reader starting");
        self.connector.list_ports();

        loop {
            self.set_state(LinkState::Disconnected);
            if cancel.is_cancelled() {
                break;
            }

            let settings = (self.settings)();
            self.set_state(LinkState::Connecting);

            match self.connector.connect(&settings.port_name) {
                Ok(stream) => {
                    info!("Serial opened '{}'", settings.port_name);
                    self.set_state(LinkState::Streaming);
                    let reason = self.stream_lines(stream, sink).await;
                    error!("Serial link on '{}' failed: {}", settings.port_name, reason);
                }
                Err(e) => {
                    error!("{}", e);
                    if e.is_port_missing() {
                        warn!("Port '{}' does not exist", settings.port_name);
                    }
                    self.connector.list_ports();
                }
            }
            info!("Closing serial port '{}'", settings.port_name);

            if cancel.is_cancelled() {
                break;
            }

            self.set_state(LinkState::Backoff);
            info!("Waiting {:?} before retrying", settings.retry_wait);
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(settings.retry_wait) => {}
            }
        }

        self.set_state(LinkState::Disconnected);
        info!("Line reader stopped");
    }

    /// Read lines until the stream fails, returning why it ended
    async fn stream_lines<S: LineSink>(&mut self, stream: C::Stream, sink: &mut S) -> LinkError {
        let mut reader = BufReader::new(stream);

        loop {
            match read_record(&mut reader, &mut self.buffer).await {
                Ok(Record::Complete) => {
                    if let Some(line) = decode_line(&self.buffer) {
                        sink.accept_line(&line);
                    }
                }
                Ok(Record::Overlong(len)) => {
                    warn!(
                        "Discarded a {} byte record, longer than {} bytes",
                        len, MAX_RECORD_LEN
                    );
                }
                Ok(Record::Eof) => return LinkError::Closed,
                Err(e) => return LinkError::Read(e),
            }
        }
    }
}

/// Result of reading one record
#[derive(Debug, PartialEq, Eq)]
enum Record {
    /// A terminated record is in the buffer
    Complete,
    /// A record past [`MAX_RECORD_LEN`] was skipped, with its length
    Overlong(usize),
    /// End of stream; unterminated bytes are dropped
    Eof,
}

/// Read one terminated record into `buf`, holding at most `MAX_RECORD_LEN` bytes
async fn read_record<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Record>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut discarded = 0;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            if !buf.is_empty() || discarded > 0 {
                debug!("Dropping {} unterminated bytes at close", buf.len() + discarded);
            }
            return Ok(Record::Eof);
        }

        let (used, done) = match available.iter().position(|&b| b == LINE_TERMINATOR) {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };

        if discarded > 0 || buf.len() + used > MAX_RECORD_LEN {
            discarded += buf.len() + used;
            buf.clear();
        } else {
            buf.extend_from_slice(&available[..used]);
        }
        reader.consume(used);

        if done {
            return Ok(if discarded > 0 {
                Record::Overlong(discarded)
            } else {
                Record::Complete
            });
        }
    }
}
