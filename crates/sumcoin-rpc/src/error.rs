use serde::{Deserialize, Serialize};

use crate::response::Response;

/// Every failure the client can surface.
///
/// Each variant stores exactly the fields needed to rebuild it, so an error
/// can be serialized (for logging or replay tooling) and deserialized back
/// into an equal value.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientError {
    /// Malformed connection URL or options.
    #[error("{message}")]
    BadConfiguration {
        config: serde_json::Value,
        message: String,
    },

    /// Non-daemon HTTP failure: non-2xx status without a JSON-RPC error body,
    /// or a body that could not be decoded at all.
    #[error("{message}")]
    Connection { message: String, code: u16 },

    /// The daemon executed the call and answered with a JSON-RPC error.
    #[error("{}", .response.error_message())]
    BadRemoteCall { response: Box<Response> },

    /// Generic fallback, e.g. a transport failure that never produced an
    /// HTTP response (DNS failure, connection refused).
    #[error("{message}")]
    Client { message: String, code: i64 },
}

impl ClientError {
    pub fn bad_configuration(config: serde_json::Value, message: impl Into<String>) -> Self {
        Self::BadConfiguration {
            config,
            message: message.into(),
        }
    }

    pub fn bad_remote_call(response: Response) -> Self {
        Self::BadRemoteCall {
            response: Box::new(response),
        }
    }

    pub fn client(message: impl Into<String>, code: i64) -> Self {
        Self::Client {
            message: message.into(),
            code,
        }
    }

    /// Short, stable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadConfiguration { .. } => "bad_configuration",
            Self::Connection { .. } => "connection",
            Self::BadRemoteCall { .. } => "bad_remote_call",
            Self::Client { .. } => "client",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Numeric code: the HTTP status for `Connection`, the daemon's
    /// `error.code` for `BadRemoteCall`, the transport's code for `Client`.
    pub fn code(&self) -> i64 {
        match self {
            Self::BadConfiguration { .. } => 0,
            Self::Connection { code, .. } => i64::from(*code),
            Self::BadRemoteCall { response } => {
                response.remote_error().map(|e| e.code).unwrap_or(0)
            }
            Self::Client { code, .. } => *code,
        }
    }

    /// Full daemon reply, for `BadRemoteCall` only.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::BadRemoteCall { response } => Some(response.as_ref()),
            _ => None,
        }
    }

    /// Offending configuration fragment, for `BadConfiguration` only.
    pub fn config(&self) -> Option<&serde_json::Value> {
        match self {
            Self::BadConfiguration { config, .. } => Some(config),
            _ => None,
        }
    }
}
