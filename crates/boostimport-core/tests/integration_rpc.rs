//! Integration test: GraphQL listing and JSON-RPC import against canned servers.

mod common;

use boostimport_core::rpc::{
    parse_api_info, BoostGraphql, DealImporter, DealSource, MarketsRpc, RpcError, IMPORT_METHOD,
};
use std::path::Path;

const DEALS_BODY: &str = r#"{"data":{"deals":{"deals":[
  {"ID":"d1","PieceCid":"baga1","DealDataRoot":"bafy1","CreatedAt":"2024-02-01T10:00:00Z",
   "ClientAddress":"f1client","Message":"Awaiting Offline Data Import",
   "StartEpoch":{"n":"3700000"},"PieceSize":{"n":"34359738368"}},
  {"ID":"d2","PieceCid":"baga2","DealDataRoot":"bafy2","CreatedAt":"2024-02-01T09:00:00Z",
   "ClientAddress":"f1other","Message":"Sealer: PreCommit1",
   "StartEpoch":{"n":"3700100"},"PieceSize":{"n":"1024"}}
]}}}"#;

#[tokio::test]
async fn graphql_lists_deals_in_listing_order() {
    let server = common::json_server::start(200, DEALS_BODY.to_string());
    let client = BoostGraphql::new(&format!("{}/", server.base)).unwrap();

    let deals = client.list_deals().await.expect("list deals");

    assert_eq!(deals.len(), 2);
    assert_eq!(deals[0].id, "d1");
    assert_eq!(deals[0].piece_size, 34_359_738_368);
    assert_eq!(deals[1].status, "Sealer: PreCommit1");

    let requests = server.requests();
    assert_eq!(requests[0].path, "/graphql/query");
    let query = requests[0].body["query"].as_str().unwrap();
    assert!(query.contains("deals(limit: 10000)"));
}

#[tokio::test]
async fn graphql_errors_are_remote_errors() {
    let server = common::json_server::start(
        200,
        r#"{"data":null,"errors":[{"message":"unauthorized"}]}"#.to_string(),
    );
    let client = BoostGraphql::new(&server.base).unwrap();

    match client.list_deals().await {
        Err(RpcError::Remote { message, .. }) => assert_eq!(message, "unauthorized"),
        other => panic!("unexpected {:?}", other.map(|d| d.len())),
    }
}

#[tokio::test]
async fn graphql_http_failure_is_status_error() {
    let server = common::json_server::start(502, r#"{"message":"bad gateway"}"#.to_string());
    let client = BoostGraphql::new(&server.base).unwrap();

    match client.list_deals().await {
        Err(RpcError::Status { status, body }) => {
            assert_eq!(status, 502);
            assert!(body.contains("bad gateway"));
        }
        other => panic!("unexpected {:?}", other.map(|d| d.len())),
    }
}

#[tokio::test]
async fn import_sends_authorized_jsonrpc_request() {
    let server = common::json_server::start(
        200,
        r#"{"jsonrpc":"2.0","id":1,"result":{"Accepted":true,"Reason":""}}"#.to_string(),
    );
    let info = parse_api_info(&format!("sekrit:/ip4/0.0.0.0/tcp/{}/http", server.port)).unwrap();
    let rpc = MarketsRpc::new(&info);

    rpc.import_offline_deal("d1", Path::new("/srv/cars/baga1.car"))
        .await
        .expect("import");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.path, "/rpc/v0");
    assert_eq!(req.header("authorization"), Some("Bearer sekrit"));
    assert_eq!(req.body["method"], IMPORT_METHOD);
    assert_eq!(
        req.body["params"],
        serde_json::json!(["d1", "/srv/cars/baga1.car", false])
    );
}

#[tokio::test]
async fn import_error_member_is_remote_error() {
    let server = common::json_server::start(
        200,
        r#"{"jsonrpc":"2.0","id":1,"error":{"code":1,"message":"deal not found"}}"#.to_string(),
    );
    let info = parse_api_info(&format!("tok:/ip4/127.0.0.1/tcp/{}/http", server.port)).unwrap();

    let err = MarketsRpc::new(&info)
        .import_offline_deal("d1", Path::new("/srv/cars/baga1.car"))
        .await
        .unwrap_err();

    assert!(matches!(err, RpcError::Remote { code: 1, ref message } if message == "deal not found"));
}
