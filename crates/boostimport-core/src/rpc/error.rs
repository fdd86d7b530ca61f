/// Failure talking to a Boost service.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Connection, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-2xx HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u32, body: String },
    /// Response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Service answered with an application-level error.
    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },
}
