//! Offline deal import over the Boost market JSON-RPC API.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{post, RpcError};
use crate::config::ConfigError;

/// Boost method that attaches local piece data to an offline deal.
pub const IMPORT_METHOD: &str = "Filecoin.BoostOfflineDealWithData";

const IMPORT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Hands a local file to the market for one deal.
#[async_trait]
pub trait DealImporter: Send + Sync {
    async fn import_offline_deal(&self, deal_id: &str, path: &Path) -> Result<(), RpcError>;
}

/// Parsed `MARKETS_API_INFO` (`<token>:/ip4/<host>/tcp/<port>/http`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiInfo {
    pub token: String,
    pub host: String,
    pub port: u16,
}

impl ApiInfo {
    pub fn rpc_url(&self) -> String {
        if self.host.contains(':') {
            format!("http://[{}]:{}/rpc/v0", self.host, self.port)
        } else {
            format!("http://{}:{}/rpc/v0", self.host, self.port)
        }
    }
}

/// Parse `<token>:<multiaddr>`. A wildcard listen address is rewritten to loopback.
pub fn parse_api_info(raw: &str) -> Result<ApiInfo, ConfigError> {
    let invalid = || ConfigError::InvalidApiInfo(raw.to_string());
    let (token, multiaddr) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let parts: Vec<&str> = multiaddr.split('/').collect();
    // ["", "ip4", host, "tcp", port, ...]
    let (proto, host, transport, port) = match parts.as_slice() {
        ["", proto, host, transport, port, ..] => (*proto, *host, *transport, *port),
        _ => return Err(invalid()),
    };
    if !matches!(proto, "ip4" | "ip6" | "dns" | "dns4" | "dns6") || transport != "tcp" {
        return Err(invalid());
    }
    let port: u16 = port.parse().map_err(|_| invalid())?;
    let host = match host {
        "0.0.0.0" => "127.0.0.1",
        "::" => "::1",
        other => other,
    };
    if token.is_empty() || host.is_empty() {
        return Err(invalid());
    }
    Ok(ApiInfo {
        token: token.to_string(),
        host: host.to_string(),
        port,
    })
}

/// JSON-RPC client for the market API.
#[derive(Debug)]
pub struct MarketsRpc {
    url: String,
    token: String,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl MarketsRpc {
    pub fn new(info: &ApiInfo) -> Self {
        Self {
            url: info.rpc_url(),
            token: info.token.clone(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Check a JSON-RPC response body for an `error` member or a rejected deal.
pub(crate) fn check_import_response(body: &[u8]) -> Result<(), RpcError> {
    let response: RpcResponse = serde_json::from_slice(body)?;
    if let Some(err) = response.error {
        return Err(RpcError::Remote {
            code: err.code,
            message: err.message,
        });
    }
    // Boost answers with a rejection record; `Accepted: false` carries the reason.
    if let Some(result) = response.result {
        if result.get("Accepted").and_then(|v| v.as_bool()) == Some(false) {
            let reason = result
                .get("Reason")
                .and_then(|v| v.as_str())
                .unwrap_or("deal rejected")
                .to_string();
            return Err(RpcError::Remote {
                code: 0,
                message: reason,
            });
        }
    }
    Ok(())
}

#[async_trait]
impl DealImporter for MarketsRpc {
    async fn import_offline_deal(&self, deal_id: &str, path: &Path) -> Result<(), RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": IMPORT_METHOD,
            "params": [deal_id, path.to_string_lossy(), false],
            "id": id,
        });
        let body = serde_json::to_vec(&request)?;
        let headers = vec![format!("Authorization: Bearer {}", self.token)];
        let response = post(self.url.clone(), headers, body, IMPORT_TIMEOUT).await?;
        check_import_response(&response.body)
    }
}
