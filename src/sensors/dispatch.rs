//! Outbound delivery toward the scripting runtime.
//!
//! Two paths leave the bridge:
//! - [`MessageSink`]: the host's message-send primitive, called with
//!   `(object, method, payload)` where payload is the text list produced by
//!   [`super::payload::format_values`].
//! - [`SensorReading`]: a structured event published on a broadcast channel
//!   for in-process consumers.

use super::kind::SensorKind;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Message-send primitive of the scripting runtime.
///
/// Called synchronously on the platform's event delivery thread, so
/// implementations must not block for long.
pub trait MessageSink: Send + Sync {
    fn send(&self, object: &str, method: &str, payload: &str);
}

/// Structured reading published to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub kind: SensorKind,
    pub values: Vec<f32>,
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    /// Create a reading stamped with the current time.
    pub fn new(kind: SensorKind, values: Vec<f32>) -> Self {
        Self {
            kind,
            values,
            timestamp: Utc::now(),
        }
    }
}

/// A message as the scripting runtime would receive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMessage {
    pub object: String,
    pub method: String,
    pub payload: String,
}

/// Sink that writes every message to the log.
///
/// Used by the demo host where no scripting runtime is attached.
#[derive(Debug, Default)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn send(&self, object: &str, method: &str, payload: &str) {
        info!("[Host] {}.{}({})", object, method, payload);
    }
}

/// Sink that forwards messages over a tokio channel.
///
/// Sending never blocks; messages sent after the receiver is dropped are
/// discarded.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<HostMessage>,
}

impl ChannelSink {
    /// Create a sink and the receiver for its messages.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MessageSink for ChannelSink {
    fn send(&self, object: &str, method: &str, payload: &str) {
        let _ = self.tx.send(HostMessage {
            object: object.to_string(),
            method: method.to_string(),
            payload: payload.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_messages() {
        let (sink, mut rx) = ChannelSink::new();
        sink.send("Player", "OnGyro", "[1.0]");

        let msg = rx.try_recv().unwrap();
        assert_eq!(
            msg,
            HostMessage {
                object: "Player".to_string(),
                method: "OnGyro".to_string(),
                payload: "[1.0]".to_string(),
            }
        );
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.send("Player", "OnGyro", "[1.0]");
    }

    #[test]
    fn test_reading_serializes_kind_by_name() {
        let reading = SensorReading::new(SensorKind::Light, vec![120.5]);
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["kind"], "light");
        assert_eq!(json["values"][0], 120.5);
    }
}
