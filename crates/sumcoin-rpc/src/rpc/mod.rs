//! Transport seam between the dispatch engine and the network.
//!
//! Defines the [`Transport`] trait and provides an HTTP implementation
//! ([`HttpTransport`]) plus a scripted test double (`mock::MockTransport`).
//! The JSON-RPC envelope and reply mapping live in [`protocol`].

mod http_adapter;
#[cfg(test)]
pub mod mock;
pub mod protocol;
pub mod types;

pub use http_adapter::HttpTransport;
pub use types::{HttpRequest, HttpResponse, TransportError};

use async_trait::async_trait;
use reqwest::Url;

/// Anything that can carry one HTTP exchange to the daemon.
///
/// A transport resolves with whatever HTTP response it received, whatever the
/// status. It rejects only when the exchange itself failed; the rejection may
/// still carry a response (e.g. a proxy that turns 5xx into errors).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Base URL requests are sent to, when the transport has one.
    fn base_url(&self) -> Option<&Url> {
        None
    }
}
