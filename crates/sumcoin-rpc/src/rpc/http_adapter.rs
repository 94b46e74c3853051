use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{header, Certificate, Url};
use serde_json::json;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::ClientError;

use super::types::{HttpRequest, HttpResponse, TransportError};
use super::Transport;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

// ==============================================================================
// HttpTransport: reqwest-backed transport for the daemon's RPC port
// ==============================================================================

/// Sends requests to the daemon over HTTP(S) with `reqwest`.
///
/// Handles basic auth, an optional custom root certificate, and an optional
/// per-request rate limit. Every status code is returned as a response;
/// classification is left to the dispatch engine.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    auth: Option<(String, String)>,
    limiter: Option<DirectRateLimiter>,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        config.validate()?;
        let base_url = config.base_url()?;
        let auth = config.auth()?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true);

        if let Some(ca) = &config.ca {
            let fragment = || json!({ "ca": ca.display().to_string() });
            let pem = std::fs::read(ca).map_err(|e| {
                ClientError::bad_configuration(
                    fragment(),
                    format!("failed to read CA certificate {}: {e}", ca.display()),
                )
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|e| {
                ClientError::bad_configuration(
                    fragment(),
                    format!("invalid CA certificate {}: {e}", ca.display()),
                )
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::client(format!("build HTTP client: {e}"), 0))?;

        let limiter = config
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|limit| RateLimiter::direct(Quota::per_second(limit)));

        Ok(Self {
            client,
            base_url,
            auth,
            limiter,
        })
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Append a request path to the base URL, keeping any path prefix the
    /// base URL already has (e.g. behind a reverse proxy).
    fn url_for(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            self.base_url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.wait_for_rate_limit().await;

        let url = self.url_for(&request.path);
        debug!(http.method = %request.method, %url, body_len = request.body.len(), "http request");

        let mut builder = self
            .client
            .request(request.method, url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(request.body);
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await?;
        let status = response.status();

        let body = response.bytes().await?;
        debug!(%url, %status, body_len = body.len(), "http response");
        trace!(%url, body = %String::from_utf8_lossy(&body), "http response body");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_owned),
            body: body.to_vec(),
        })
    }

    fn base_url(&self) -> Option<&Url> {
        Some(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(url: &str) -> HttpTransport {
        HttpTransport::new(&Config::from_url(url).expect("config must parse"))
            .expect("transport must build")
    }

    #[test]
    fn base_url_comes_from_config() {
        let transport = transport("http://old_client.org:8332");
        assert_eq!(
            transport.base_url().and_then(Url::host_str),
            Some("old_client.org")
        );
    }

    #[test]
    fn wallet_path_is_appended_to_base() {
        let transport = transport("http://127.0.0.1:8332");
        assert_eq!(
            transport.url_for("/wallet/testwallet.dat").as_str(),
            "http://127.0.0.1:8332/wallet/testwallet.dat"
        );
        assert_eq!(transport.url_for("/").as_str(), "http://127.0.0.1:8332/");
    }

    #[test]
    fn missing_ca_file_is_bad_configuration() {
        let config = Config {
            ca: Some("/nonexistent/ca.pem".into()),
            ..Config::default()
        };
        let err = HttpTransport::new(&config)
            .err()
            .expect("missing CA must fail");
        assert_eq!(err.kind(), "bad_configuration");
    }
}
