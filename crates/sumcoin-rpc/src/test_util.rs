//! Shared test fixtures for `sumcoin-rpc` unit tests.
//!
//! Canned daemon replies and a client wired to a [`MockTransport`] so tests
//! across modules build their dummy data one way.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::client::Client;
use crate::config::Config;
use crate::rpc::mock::MockTransport;
use crate::rpc::HttpResponse;

pub const GENESIS_HASH: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
pub const COINBASE_TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

// ==============================================================================
// Canned Replies
// ==============================================================================

pub fn block_header_result() -> Value {
    json!({
        "hash": GENESIS_HASH,
        "confirmations": 449_162,
        "height": 0,
        "version": 1,
        "versionHex": "00000001",
        "merkleroot": COINBASE_TXID,
        "time": 1_231_006_505,
        "mediantime": 1_231_006_505,
        "nonce": 2_083_236_893u64,
        "bits": "1d00ffff",
        "difficulty": 1,
        "chainwork": "0000000000000000000000000000000000000000000000000000000100010001",
        "nextblockhash": "00000000839a8e6886ab5951d76f411475428afc90947ee320161bbf18eb6048"
    })
}

pub fn block_header_reply(id: u64) -> Value {
    json!({ "result": block_header_result(), "error": null, "id": id })
}

pub fn balance_reply(id: u64) -> Value {
    json!({ "result": 0.1, "error": null, "id": id })
}

pub fn raw_transaction_error_reply() -> Value {
    json!({
        "result": null,
        "error": {
            "code": -5,
            "message": "The genesis block coinbase is not considered an ordinary transaction and cannot be retrieved"
        },
        "id": 0
    })
}

pub fn ok(reply: &Value) -> HttpResponse {
    HttpResponse::json(200, reply)
}

// ==============================================================================
// Client Builders
// ==============================================================================

/// Client with default config talking to `mock`.
pub fn mock_client(mock: &Arc<MockTransport>) -> Client {
    mock_client_with(Config::default(), mock)
}

pub fn mock_client_with(config: Config, mock: &Arc<MockTransport>) -> Client {
    Client::with_transport(config, mock.clone())
}
