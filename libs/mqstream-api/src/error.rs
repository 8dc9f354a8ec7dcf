use thiserror::Error;

/// Validation failures raised by the outbound record builder.
///
/// All variants are synchronous and local to the offending call — a bad
/// field is rejected at the setter, a missing field at `build()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("stream name must be 1-128 characters of [A-Za-z0-9._-], got {0:?}")]
    InvalidStreamName(String),

    #[error("record data exceeds 1048576 bytes, got {0} bytes")]
    DataTooLarge(usize),

    #[error("partition key must be 1-256 characters, got {0} characters")]
    InvalidPartitionKey(usize),

    #[error("explicit hash key must be a decimal integer in [0, 2^128), got {0:?}")]
    InvalidExplicitHashKey(String),

    #[error("required field '{0}' was never set on the builder")]
    MissingField(&'static str),
}

/// Validation failures raised by the publish builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("publish topic was never set on the builder")]
    MissingTopic,

    #[error("invalid publish topic {topic:?}: {reason}")]
    InvalidTopic { topic: String, reason: &'static str },
}

/// Failures raised by transformer output setters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    #[error("list element at index {index} was not created by this output's builder")]
    ForeignElement { index: usize },
}
