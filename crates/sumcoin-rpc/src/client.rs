//! The dispatch engine: turns method calls into daemon requests and maps the
//! outcome onto a reply or a [`ClientError`].
//!
//! Three surfaces share one pipeline (build → send → classify):
//! - [`Client::request`] blocks until the reply arrives,
//! - [`Client::request_async`] / [`Client::request_async_then`] return a
//!   [`Promise`] and settle at [`Client::wait`] or [`Promise::wait`],
//! - [`Client::call`] is a plain `async fn` for callers already running
//!   inside a tokio runtime.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::ClientError;
use crate::executor::{Executor, Promise};
use crate::response::{FromResponse, Response};
use crate::rpc::protocol::{resolve_outcome, RequestBuilder, RpcRequest};
use crate::rpc::{HttpTransport, Transport};

type OnFulfilled<R> = Box<dyn FnOnce(&R) + Send>;
type OnRejected = Box<dyn FnOnce(&ClientError) + Send>;

/// JSON-RPC client for a Sumcoin daemon.
///
/// `R` is the wrapper every successful reply is converted into; it defaults
/// to [`Response`]. Clones and wallet-scoped copies share the transport, the
/// request id counter and the executor.
pub struct Client<R = Response> {
    transport: Arc<dyn Transport>,
    config: Arc<Config>,
    builder: RequestBuilder,
    wallet: Option<String>,
    executor: Arc<Executor>,
    _response: PhantomData<fn() -> R>,
}

impl<R> Clone for Client<R> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            builder: self.builder.clone(),
            wallet: self.wallet.clone(),
            executor: Arc::clone(&self.executor),
            _response: PhantomData,
        }
    }
}

impl Client<Response> {
    /// Connect to the daemon described by `config` over HTTP.
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Shorthand for `Client::new(Config::from_url(url)?)`.
    pub fn from_url(url: &str) -> Result<Self, ClientError> {
        Self::new(Config::from_url(url)?)
    }

    /// Use a caller-supplied transport (proxy, mock, ...) instead of HTTP.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            builder: RequestBuilder::new(config.preserve_case),
            wallet: config.wallet.clone(),
            config: Arc::new(config),
            executor: Arc::new(Executor::new()),
            _response: PhantomData,
        }
    }
}

impl<R: FromResponse> Client<R> {
    /// Convert successful replies into `R2` instead of `R`.
    pub fn with_response_handler<R2: FromResponse>(self) -> Client<R2> {
        Client {
            transport: self.transport,
            config: self.config,
            builder: self.builder,
            wallet: self.wallet,
            executor: self.executor,
            _response: PhantomData,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Swap the transport for all later calls made through this value.
    /// Requests already in flight keep the transport they were sent with.
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
        self.transport = transport;
        self
    }

    // ==========================================================================
    // Wallet Scoping
    // ==========================================================================

    /// A copy of this client whose requests go to `/wallet/<name>`.
    ///
    /// The receiver is left untouched, so differently scoped copies can be
    /// used side by side. Scoping an already scoped client replaces the name.
    pub fn wallet(&self, name: impl Into<String>) -> Self {
        let mut scoped = self.clone();
        scoped.wallet = Some(name.into());
        scoped
    }

    /// A copy of this client that talks to the daemon's default wallet.
    pub fn without_wallet(&self) -> Self {
        let mut scoped = self.clone();
        scoped.wallet = None;
        scoped
    }

    pub fn wallet_name(&self) -> Option<&str> {
        self.wallet.as_deref()
    }

    // ==========================================================================
    // Dispatch
    // ==========================================================================

    fn prepare(&self, method: &str, params: Vec<Value>) -> Result<RpcRequest, ClientError> {
        self.builder.build(method, params, self.wallet.as_deref())
    }

    /// Send `method` and wait for the reply from async code.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<R, ClientError> {
        let request = self.prepare(method, params)?;
        dispatch(Arc::clone(&self.transport), request).await
    }

    /// Send `method` and block until the reply arrives.
    ///
    /// Must not be called from inside an async runtime; use [`Client::call`]
    /// there.
    pub fn request(&self, method: &str, params: Vec<Value>) -> Result<R, ClientError> {
        self.executor.block_on(self.call(method, params))
    }

    /// Send `method` without blocking. The request id is reserved now; the
    /// exchange runs when the caller next blocks on the client.
    pub fn request_async(&self, method: &str, params: Vec<Value>) -> Promise<R> {
        self.request_async_then(method, params, Callbacks::new())
    }

    /// Like [`Client::request_async`], invoking `callbacks` once the request
    /// settles. Callbacks of concurrent requests run in completion order.
    pub fn request_async_then(
        &self,
        method: &str,
        params: Vec<Value>,
        callbacks: Callbacks<R>,
    ) -> Promise<R> {
        let prepared = self.prepare(method, params);
        let transport = Arc::clone(&self.transport);

        self.executor.spawn(async move {
            let outcome = match prepared {
                Ok(request) => dispatch(transport, request).await,
                Err(err) => Err(err),
            };
            callbacks.settle(&outcome);
            outcome
        })
    }

    /// Join point: block until every request started with `request_async*`
    /// on this client (or any copy sharing its executor) has settled.
    pub fn wait(&self) {
        self.executor.wait_all();
    }

    /// Requests started asynchronously that have not settled yet.
    pub fn pending_requests(&self) -> usize {
        self.executor.pending()
    }

    /// Call a daemon method by name, the way a method-style binding would.
    ///
    /// `"getBlockHeader"` becomes a blocking `getblockheader` request (case
    /// is kept when `preserve_case` is set); a trailing `Async` suffix, as in
    /// `"getBlockHeaderAsync"`, starts the request asynchronously instead.
    pub fn call_named(&self, name: &str, params: Vec<Value>) -> Dispatched<R> {
        match name.strip_suffix("Async") {
            Some(method) if !method.is_empty() => {
                Dispatched::Pending(self.request_async(method, params))
            }
            _ => Dispatched::Completed(self.request(name, params)),
        }
    }
}

async fn dispatch<R: FromResponse>(
    transport: Arc<dyn Transport>,
    request: RpcRequest,
) -> Result<R, ClientError> {
    let id = request.envelope.id;
    debug!(
        rpc.id = id,
        rpc.method = %request.envelope.method,
        rpc.params = request.envelope.params.len(),
        rpc.path = %request.path,
        "rpc call"
    );

    let outcome = transport.send(request.to_http()?).await;
    match &outcome {
        Ok(http) => debug!(
            rpc.id = id,
            status = http.status,
            body_len = http.body.len(),
            "rpc response"
        ),
        Err(err) => debug!(rpc.id = id, error = %err, "rpc transport failure"),
    }

    R::from_response(resolve_outcome(outcome)?)
}

// ==============================================================================
// Callbacks & Named Dispatch
// ==============================================================================

/// Optional handlers run when an asynchronous request settles.
pub struct Callbacks<R> {
    on_fulfilled: Option<OnFulfilled<R>>,
    on_rejected: Option<OnRejected>,
}

impl<R> Callbacks<R> {
    pub fn new() -> Self {
        Self {
            on_fulfilled: None,
            on_rejected: None,
        }
    }

    pub fn on_fulfilled(mut self, f: impl FnOnce(&R) + Send + 'static) -> Self {
        self.on_fulfilled = Some(Box::new(f));
        self
    }

    pub fn on_rejected(mut self, f: impl FnOnce(&ClientError) + Send + 'static) -> Self {
        self.on_rejected = Some(Box::new(f));
        self
    }

    fn settle(self, outcome: &Result<R, ClientError>) {
        match outcome {
            Ok(value) => {
                if let Some(f) = self.on_fulfilled {
                    f(value);
                }
            }
            Err(err) => {
                if let Some(f) = self.on_rejected {
                    f(err);
                }
            }
        }
    }
}

impl<R> Default for Callbacks<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`Client::call_named`].
pub enum Dispatched<R> {
    Completed(Result<R, ClientError>),
    Pending(Promise<R>),
}

impl<R> Dispatched<R> {
    /// The reply, blocking first if the call was asynchronous.
    pub fn wait(self) -> Result<R, ClientError> {
        match self {
            Self::Completed(outcome) => outcome,
            Self::Pending(promise) => promise.wait(),
        }
    }
}
