//! Runtime backing the blocking and promise-based client surfaces.
//!
//! The runtime is a single-threaded tokio runtime created on first use, so a
//! client that is only ever driven through `Client::call` from an existing
//! async context never starts one. Spawned requests make progress only while
//! some caller blocks on the runtime: in `Client::request`, `Promise::wait`
//! or the `Client::wait` join point.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::task::{Context, Poll};

use futures::future::join_all;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::ClientError;

pub(crate) struct Executor {
    runtime: OnceLock<Runtime>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Executor {
    pub(crate) fn new() -> Self {
        Self {
            runtime: OnceLock::new(),
            pending: Mutex::new(Vec::new()),
        }
    }

    fn runtime(&self) -> &Runtime {
        self.runtime.get_or_init(|| {
            Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("current-thread runtime uses valid static config")
        })
    }

    /// Drive `future` to completion on the calling thread.
    ///
    /// Panics when called from inside an async runtime, like every blocking
    /// HTTP client.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime().block_on(future)
    }

    pub(crate) fn spawn<T, F>(self: &Arc<Self>, future: F) -> Promise<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let handle = self.runtime().spawn(async move {
            // The promise may have been dropped; the request still ran.
            let _ = tx.send(future.await);
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);

        Promise {
            rx,
            executor: Arc::clone(self),
        }
    }

    /// Number of spawned requests that have not settled yet.
    pub(crate) fn pending(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.len()
    }

    /// Block until every spawned request, including ones spawned by
    /// callbacks while waiting, has settled.
    pub(crate) fn wait_all(&self) {
        loop {
            let handles =
                std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
            if handles.is_empty() {
                return;
            }

            for joined in self.block_on(join_all(handles)) {
                if let Err(err) = joined {
                    warn!(error = %err, "pending rpc task did not complete");
                }
            }
        }
    }
}

// ==============================================================================
// Promise
// ==============================================================================

/// Handle to a request running on the client's executor.
///
/// It is a `Future`, so async code can `.await` it; blocking code calls
/// [`Promise::wait`].
pub struct Promise<T> {
    rx: oneshot::Receiver<Result<T, ClientError>>,
    executor: Arc<Executor>,
}

impl<T> Promise<T> {
    /// Block until this request settles.
    pub fn wait(self) -> Result<T, ClientError> {
        let executor = Arc::clone(&self.executor);
        executor.block_on(self)
    }
}

impl<T> Future for Promise<T> {
    type Output = Result<T, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(ClientError::client(
                    "request task ended before producing a result",
                    0,
                ))
            })
        })
    }
}
