use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}: {1}")]
    DecodeError(String, #[source] serde_json::Error),

    #[error("{0}: {1}")]
    SerializationError(String, #[source] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to initialize tracer: {0}")]
    TracerInit(String),

    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
