//! JSON-RPC envelope building and reply classification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::response::Response;

use super::types::{HttpRequest, HttpResponse, TransportError};

// ==============================================================================
// Envelope
// ==============================================================================

/// Request body as sent on the wire: `{"method", "params", "id"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub method: String,
    pub params: Vec<serde_json::Value>,
    pub id: u64,
}

/// A built request: the envelope plus the path it is posted to.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub path: String,
    pub envelope: Envelope,
}

impl RpcRequest {
    pub fn to_http(&self) -> Result<HttpRequest, ClientError> {
        let body = serde_json::to_vec(&self.envelope)
            .map_err(|e| ClientError::client(format!("encode JSON-RPC request: {e}"), 0))?;
        Ok(HttpRequest::post(self.path.clone(), body))
    }
}

// ==============================================================================
// Request Builder
// ==============================================================================

/// Turns method calls into [`RpcRequest`]s.
///
/// Cloning shares the id counter, so a client and every wallet-scoped copy
/// of it draw from one monotonically increasing sequence.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    next_id: Arc<AtomicU64>,
    preserve_case: bool,
}

impl RequestBuilder {
    pub fn new(preserve_case: bool) -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(1)),
            preserve_case,
        }
    }

    fn reserve_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Build a request. The id is reserved here, not when the request is sent.
    pub fn build(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
        wallet: Option<&str>,
    ) -> Result<RpcRequest, ClientError> {
        if method.trim().is_empty() {
            return Err(ClientError::client("method name must not be empty", 0));
        }

        Ok(RpcRequest {
            path: wallet_path(wallet),
            envelope: Envelope {
                method: fold_method_name(method, self.preserve_case),
                params,
                id: self.reserve_request_id(),
            },
        })
    }
}

/// Method name as it goes on the wire: lower-cased unless case is preserved.
pub fn fold_method_name(method: &str, preserve_case: bool) -> String {
    if preserve_case {
        method.to_owned()
    } else {
        method.to_lowercase()
    }
}

/// `/` for the default wallet, `/wallet/<name>` otherwise. The name is
/// percent-encoded as a single path segment.
pub fn wallet_path(wallet: Option<&str>) -> String {
    let Some(name) = wallet.filter(|name| !name.is_empty()) else {
        return "/".to_owned();
    };

    let mut url = Url::parse("http://localhost/").expect("static base URL is valid");
    url.path_segments_mut()
        .expect("http URLs always have path segments")
        .pop_if_empty()
        .push("wallet")
        .push(name);
    url.path().to_owned()
}

// ==============================================================================
// Reply Classification
// ==============================================================================

/// Map the outcome of one HTTP exchange onto a reply or a [`ClientError`].
///
/// - 2xx with a JSON object body: `BadRemoteCall` if `error` is set, else the
///   reply. A 2xx body that is not a JSON object is a `Connection` error.
/// - non-2xx: `BadRemoteCall` if the body still carries a JSON-RPC error,
///   else `Connection` with the reason phrase and status.
/// - transport failure with a response: same as non-2xx.
/// - transport failure without a response: `Client` with the transport's
///   message and code.
pub fn resolve_outcome(
    outcome: Result<HttpResponse, TransportError>,
) -> Result<Response, ClientError> {
    match outcome {
        Ok(http) if http.is_success() => decode_success(&http),
        Ok(http) => Err(decode_failure(&http)),
        Err(TransportError {
            response: Some(http),
            ..
        }) => Err(decode_failure(&http)),
        Err(TransportError {
            message,
            code,
            response: None,
        }) => Err(ClientError::Client { message, code }),
    }
}

fn decode_success(http: &HttpResponse) -> Result<Response, ClientError> {
    let response = Response::from_slice(&http.body).map_err(|e| ClientError::Connection {
        message: format!("malformed JSON-RPC reply: {e}"),
        code: http.status,
    })?;

    if response.has_error() {
        return Err(ClientError::bad_remote_call(response));
    }
    Ok(response)
}

fn decode_failure(http: &HttpResponse) -> ClientError {
    match Response::from_slice(&http.body) {
        Ok(response) if response.has_error() => ClientError::bad_remote_call(response),
        _ => ClientError::Connection {
            message: http.reason_phrase(),
            code: http.status,
        },
    }
}
