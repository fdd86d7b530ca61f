//! Transfer error type for a single HTTP exchange.

/// Failure of one GET (whole body or one Range segment).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    /// Non-2xx response status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Server closed the connection before the expected length arrived.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Staging file write failed (disk full, permissions).
    #[error("storage: {0:#}")]
    Storage(anyhow::Error),
    #[error("segment worker panicked")]
    WorkerPanicked,
}
