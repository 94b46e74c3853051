//! HTTP-level values exchanged with a [`Transport`](super::Transport).

use reqwest::{Method, StatusCode};

/// One outbound HTTP request. `path` is relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body,
        }
    }

    /// Body decoded as JSON, `Null` if it is not valid JSON.
    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase sent by the server, if the transport exposes one.
    pub reason: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            reason: None,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Reason phrase, falling back to the canonical one for the status.
    pub fn reason_phrase(&self) -> String {
        if let Some(reason) = self.reason.as_deref().filter(|r| !r.is_empty()) {
            return reason.to_owned();
        }
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("HTTP status {}", self.status))
    }
}

/// A failed exchange. `response` is set when the failure still produced an
/// HTTP response worth inspecting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub code: i64,
    pub response: Option<HttpResponse>,
}

impl TransportError {
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            code,
            response: None,
        }
    }

    pub fn with_response(mut self, response: HttpResponse) -> Self {
        self.response = Some(response);
        self
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let code = err.status().map(|s| i64::from(s.as_u16())).unwrap_or(0);
        Self::new(err.to_string(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_phrase_falls_back_to_canonical() {
        assert_eq!(HttpResponse::new(500, "").reason_phrase(), "Internal Server Error");
        assert_eq!(HttpResponse::new(599, "").reason_phrase(), "HTTP status 599");

        let mut custom = HttpResponse::new(503, "");
        custom.reason = Some("Warming up".into());
        assert_eq!(custom.reason_phrase(), "Warming up");
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
