use thiserror::Error;

#[derive(Debug, Error)]
pub enum DonationError {
    #[error("validation: {0}")]
    Validation(String),

    /// Could not reach the gateway (network failure, timeout). Retryable.
    #[error("gateway unavailable: {0}")]
    Gateway(String),

    /// The gateway answered but rejected the request (bad reference,
    /// declined verification). Not retryable as-is.
    #[error("gateway rejected: {0}")]
    GatewayRejected(String),

    #[error("webhook signature: {0}")]
    Signature(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Invariant breach inside the service itself (e.g. an attempt to
    /// attach a second gateway reference). Always a bug, never user input.
    #[error("internal: {0}")]
    Internal(String),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
