use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventsError {
    #[error("Event type must not be empty")]
    EmptyEventType,

    #[error("Invalid message envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}
