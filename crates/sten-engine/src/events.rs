//! Engine notifications
//!
//! The engine publishes discrete events on a tokio `broadcast` channel.
//! Sending never blocks the line worker: a subscriber that falls more than
//! [`EVENT_CHANNEL_CAPACITY`] events behind loses the oldest ones and sees
//! `RecvError::Lagged` on its next receive.

use sten_protocol::ProtocolCode;
use tokio::sync::broadcast;

/// Events buffered per subscriber before the oldest are dropped
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Notification emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Campaign state, recent inputs or configuration changed
    Updated,

    /// An alert code was dialed and logged
    AlertTriggered {
        /// Station that raised the alert
        source: ProtocolCode,
        /// Alert code dialed
        target: ProtocolCode,
    },
}

/// Create the engine's event channel
pub fn event_channel() -> (
    broadcast::Sender<EngineEvent>,
    broadcast::Receiver<EngineEvent>,
) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}
