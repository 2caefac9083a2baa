//! Sensor state shared between host calls and platform event delivery.
//!
//! - `kind`: sensor kinds, name normalization and the platform type catalog
//! - `callback`: scripting callback targets
//! - `listener`: per-kind listener entries that cache and fan out readings
//! - `dispatch`: outbound message sinks and the structured reading type
//! - `payload`: the text rendering of readings sent to callbacks

pub mod callback;
pub mod dispatch;
pub mod kind;
pub mod listener;
pub mod payload;

pub use callback::CallbackTarget;
pub use dispatch::{ChannelSink, HostMessage, LogSink, MessageSink, SensorReading};
pub use kind::{SensorCatalog, SensorKind, SensorType, normalize_kind};
pub use listener::ListenerEntry;
