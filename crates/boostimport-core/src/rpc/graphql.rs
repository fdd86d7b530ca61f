//! Deal listing over Boost's GraphQL endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{post, RpcError};
use crate::deal::Deal;

/// The listing query. Boost returns newest proposals first.
pub const DEALS_QUERY: &str =
    "{ deals(limit: 10000) { deals { ID PieceCid CreatedAt ClientAddress Message StartEpoch DealDataRoot PieceSize } } }";

const GRAPHQL_TIMEOUT: Duration = Duration::from_secs(60);

/// Source of the per-cycle deal snapshot.
#[async_trait]
pub trait DealSource: Send + Sync {
    async fn list_deals(&self) -> Result<Vec<Deal>, RpcError>;
}

/// GraphQL client for `<endpoint>/graphql/query`.
#[derive(Debug, Clone)]
pub struct BoostGraphql {
    url: String,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<DealsData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct DealsData {
    deals: DealList,
}

#[derive(Deserialize)]
struct DealList {
    deals: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

impl BoostGraphql {
    /// `endpoint` is the server base URL, e.g. `http://127.0.0.1:8080`.
    pub fn new(endpoint: &str) -> Result<Self, url::ParseError> {
        let base = url::Url::parse(endpoint.trim_end_matches('/'))?;
        Ok(Self {
            url: format!("{}/graphql/query", base.as_str().trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Decode a GraphQL response body into the deal list. Records that do not
/// decode are logged and left out; the rest of the snapshot is kept.
pub(crate) fn parse_deals(body: &[u8]) -> Result<Vec<Deal>, RpcError> {
    let response: GraphqlResponse = serde_json::from_slice(body)?;
    if let Some(first) = response.errors.first() {
        return Err(RpcError::Remote {
            code: 0,
            message: first.message.clone(),
        });
    }
    match response.data {
        Some(data) => Ok(data.deals.deals.into_iter().filter_map(decode_deal).collect()),
        None => Err(RpcError::Remote {
            code: 0,
            message: "response has no data".to_string(),
        }),
    }
}

fn decode_deal(raw: serde_json::Value) -> Option<Deal> {
    let id = raw
        .get("ID")
        .and_then(|v| v.as_str())
        .unwrap_or("<unknown>")
        .to_string();
    match serde_json::from_value::<Deal>(raw) {
        Ok(deal) => Some(deal),
        Err(e) => {
            tracing::warn!(deal_id = %id, "skipping undecodable deal record: {}", e);
            None
        }
    }
}

#[async_trait]
impl DealSource for BoostGraphql {
    async fn list_deals(&self) -> Result<Vec<Deal>, RpcError> {
        let body = serde_json::to_vec(&serde_json::json!({ "query": DEALS_QUERY }))?;
        let response = post(self.url.clone(), Vec::new(), body, GRAPHQL_TIMEOUT).await?;
        parse_deals(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_from_endpoint() {
        let c = BoostGraphql::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(c.url(), "http://127.0.0.1:8080/graphql/query");
        let c = BoostGraphql::new("http://boost.local:8080/").unwrap();
        assert_eq!(c.url(), "http://boost.local:8080/graphql/query");
        assert!(BoostGraphql::new("not a url").is_err());
    }

    #[test]
    fn parses_deal_list() {
        let body = br#"{"data":{"deals":{"deals":[{
            "ID":"d1","PieceCid":"baga","DealDataRoot":"bafy",
            "CreatedAt":"2023-04-01T12:00:00Z","ClientAddress":"f1c",
            "Message":"Awaiting Offline Data Import",
            "StartEpoch":{"n":"3000000"},"PieceSize":{"n":"34359738368"}
        }]}}}"#;
        let deals = parse_deals(body).unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].id, "d1");
        assert_eq!(deals[0].piece_size, 34_359_738_368);
    }

    #[test]
    fn bad_record_does_not_drop_the_snapshot() {
        let body = br#"{"data":{"deals":{"deals":[
          {"ID":"d1","PieceCid":"baga","DealDataRoot":"bafy",
           "CreatedAt":"2023-04-01T12:00:00Z","ClientAddress":"f1c",
           "Message":"Awaiting Offline Data Import",
           "StartEpoch":{"n":"3000000"},"PieceSize":{"n":"1024"}},
          {"ID":"d2","PieceCid":"baga2","DealDataRoot":"bafy2",
           "CreatedAt":"","ClientAddress":"f1c","Message":"Sealer: Proving",
           "StartEpoch":{"n":"3000000"},"PieceSize":{"n":"1024"}},
          {"ID":"d3","Message":"Ready to Publish"}
        ]}}}"#;
        let deals = parse_deals(body).unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].id, "d1");
    }

    #[test]
    fn graphql_errors_are_failures() {
        let body = br#"{"data":null,"errors":[{"message":"db locked"}]}"#;
        match parse_deals(body) {
            Err(RpcError::Remote { message, .. }) => assert_eq!(message, "db locked"),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_body_is_decode_error() {
        assert!(matches!(parse_deals(b"<html>"), Err(RpcError::Decode(_))));
    }
}
