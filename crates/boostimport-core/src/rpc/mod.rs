//! Clients for the two Boost services the importer talks to.
//!
//! - [`BoostGraphql`] lists deals ([`DealSource`]).
//! - [`MarketsRpc`] imports offline deal data over JSON-RPC ([`DealImporter`]).
//!
//! Both sit behind async traits so the scheduler can run against in-memory
//! fakes.

mod error;
mod graphql;
mod jsonrpc;

pub use error::RpcError;
pub use graphql::{BoostGraphql, DealSource, DEALS_QUERY};
pub use jsonrpc::{parse_api_info, ApiInfo, DealImporter, MarketsRpc, IMPORT_METHOD};

use crate::http::{self, HttpResponse};
use std::time::Duration;

/// POST JSON on a blocking thread and map transport failures into [`RpcError`].
async fn post(
    url: String,
    headers: Vec<String>,
    body: Vec<u8>,
    timeout: Duration,
) -> Result<HttpResponse, RpcError> {
    let response = tokio::task::spawn_blocking(move || http::post_json(&url, &headers, &body, timeout))
        .await
        .map_err(|e| RpcError::Transport(format!("worker panicked: {}", e)))?
        .map_err(|e| RpcError::Transport(e.to_string()))?;
    if !response.is_success() {
        return Err(RpcError::Status {
            status: response.status,
            body: response.body_snippet(),
        });
    }
    Ok(response)
}
