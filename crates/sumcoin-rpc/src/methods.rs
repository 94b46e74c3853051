//! Method-style bindings for common daemon calls.
//!
//! Each binding is sugar over [`Client::request`] / [`Client::request_async`]
//! with the daemon's camelCase method name, so `preserve_case` applies to it
//! exactly as it does to a hand-written `request`. Methods not listed here
//! are reachable through `request` or `call_named`.

use serde_json::Value;

use crate::client::Client;
use crate::error::ClientError;
use crate::executor::Promise;
use crate::response::FromResponse;

macro_rules! rpc_methods {
    ($($sync:ident, $nonblocking:ident => $wire:literal;)*) => {
        impl<R: FromResponse> Client<R> {
            $(
                #[doc = concat!("Blocking `", $wire, "` call.")]
                pub fn $sync(&self, params: Vec<Value>) -> Result<R, ClientError> {
                    self.request($wire, params)
                }

                #[doc = concat!("Non-blocking `", $wire, "` call.")]
                pub fn $nonblocking(&self, params: Vec<Value>) -> Promise<R> {
                    self.request_async($wire, params)
                }
            )*
        }
    };
}

rpc_methods! {
    // blockchain
    get_best_block_hash, get_best_block_hash_async => "getBestBlockHash";
    get_block, get_block_async => "getBlock";
    get_blockchain_info, get_blockchain_info_async => "getBlockchainInfo";
    get_block_count, get_block_count_async => "getBlockCount";
    get_block_hash, get_block_hash_async => "getBlockHash";
    get_block_header, get_block_header_async => "getBlockHeader";
    get_difficulty, get_difficulty_async => "getDifficulty";
    get_mempool_info, get_mempool_info_async => "getMempoolInfo";
    get_raw_mempool, get_raw_mempool_async => "getRawMempool";
    get_tx_out, get_tx_out_async => "getTxOut";
    // network
    get_network_info, get_network_info_async => "getNetworkInfo";
    get_connection_count, get_connection_count_async => "getConnectionCount";
    get_peer_info, get_peer_info_async => "getPeerInfo";
    // raw transactions
    get_raw_transaction, get_raw_transaction_async => "getRawTransaction";
    decode_raw_transaction, decode_raw_transaction_async => "decodeRawTransaction";
    send_raw_transaction, send_raw_transaction_async => "sendRawTransaction";
    // wallet
    get_balance, get_balance_async => "getBalance";
    get_new_address, get_new_address_async => "getNewAddress";
    get_transaction, get_transaction_async => "getTransaction";
    get_wallet_info, get_wallet_info_async => "getWalletInfo";
    list_unspent, list_unspent_async => "listUnspent";
    list_wallets, list_wallets_async => "listWallets";
    send_to_address, send_to_address_async => "sendToAddress";
    // control
    uptime, uptime_async => "uptime";
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::rpc::mock::MockTransport;
    use crate::test_util::*;

    #[test]
    fn async_binding_sends_folded_name() {
        let transport = Arc::new(
            MockTransport::builder()
                .with_reply(ok(&balance_reply(1)))
                .build(),
        );
        let client = mock_client(&transport);

        let promise = client.wallet("hot.dat").get_balance_async(vec![json!("*"), json!(6)]);
        client.wait();
        assert_eq!(promise.wait().unwrap().result(), &json!(0.1));

        let request = transport.last_request().unwrap();
        assert_eq!(request.path, "/wallet/hot.dat");
        assert_eq!(request.json_body()["method"], json!("getbalance"));
        assert_eq!(request.json_body()["params"], json!(["*", 6]));
    }
}
