//! Retry and backoff policy for remote file downloads.
//!
//! Every failed attempt is retried until the attempt budget runs out; the
//! delay doubles each time between a floor and a ceiling.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_with_retry;
