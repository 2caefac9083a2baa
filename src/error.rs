use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("Bad sensor type: {kind}, available types: [{available}]")]
    UnknownSensorKind { kind: String, available: String },

    #[error("Sensor bridge is not initialized")]
    NotInitialized,

    #[error("Sensor bridge is already initialized")]
    AlreadyInitialized,

    #[error("Invalid sampling period: {0}us")]
    InvalidSamplingPeriod(i64),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
