//! Read-only container around a decoded daemon reply.
//!
//! A [`Response`] holds the whole JSON-RPC reply body (`result`, `error`,
//! `id`) and offers lookups into `result`. Missing keys never panic: the
//! `Index` impls hand back [`Value::Null`] and the `Option`-returning
//! lookups hand back `None`.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

static NULL: Value = Value::Null;

// ==============================================================================
// Response Handler Hook
// ==============================================================================

/// Conversion applied to every successful reply before it reaches the caller.
///
/// The client is generic over this trait; the default wrapper is [`Response`]
/// itself. Custom wrappers can validate or decode the reply and reject it
/// with any [`ClientError`].
pub trait FromResponse: Sized + Send + 'static {
    fn from_response(response: Response) -> Result<Self, ClientError>;
}

impl FromResponse for Response {
    fn from_response(response: Response) -> Result<Self, ClientError> {
        Ok(response)
    }
}

// ==============================================================================
// Remote Error
// ==============================================================================

/// The `error` member of a JSON-RPC reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub code: i64,
    pub message: String,
}

// ==============================================================================
// Response
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Response {
    container: Value,
}

impl Response {
    /// Wrap an already decoded reply body. The body must be a JSON object.
    pub fn from_value(container: Value) -> Result<Self, ClientError> {
        if !container.is_object() {
            return Err(ClientError::client(
                format!("JSON-RPC reply must be an object, got: {container}"),
                0,
            ));
        }
        Ok(Self { container })
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, ClientError> {
        let container: Value = serde_json::from_slice(body)
            .map_err(|e| ClientError::client(format!("decode JSON-RPC reply: {e}"), 0))?;
        Self::from_value(container)
    }

    /// Raw decoded `result`, or `Null` when the reply carried none.
    pub fn result(&self) -> &Value {
        self.container.get("result").unwrap_or(&NULL)
    }

    pub fn into_result(self) -> Value {
        match self.container {
            Value::Object(mut map) => map.remove("result").unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// The whole reply body, including `error` and `id`.
    pub fn container(&self) -> &Value {
        &self.container
    }

    pub fn id(&self) -> &Value {
        self.container.get("id").unwrap_or(&NULL)
    }

    pub fn has_error(&self) -> bool {
        self.container.get("error").is_some_and(|e| !e.is_null())
    }

    /// Decode the `error` member. Daemons that send a non-standard error
    /// shape still produce a `RemoteError`: missing codes become 0 and the
    /// raw JSON stands in for a missing message.
    pub fn remote_error(&self) -> Option<RemoteError> {
        match self.container.get("error")? {
            Value::Null => None,
            Value::Object(map) => Some(RemoteError {
                code: map.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: map
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
            }),
            Value::String(message) => Some(RemoteError {
                code: 0,
                message: message.clone(),
            }),
            other => Some(RemoteError {
                code: 0,
                message: other.to_string(),
            }),
        }
    }

    pub fn error_message(&self) -> String {
        self.remote_error().map(|e| e.message).unwrap_or_default()
    }

    /// Look up a key or dot-separated path inside `result`, e.g.
    /// `"softforks.csv.type"` or `"vout.0.value"`. A top-level key that
    /// itself contains dots (`"127.0.0.1:8333"`) is matched literally before
    /// the path is split. An empty path yields the whole result.
    pub fn value(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self.result());
        }
        if let Some(found) = self.result().as_object().and_then(|map| map.get(path)) {
            return Some(found);
        }

        path.split('.').try_fold(self.result(), |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// True when `path` resolves to a non-null value.
    pub fn has(&self, path: &str) -> bool {
        self.value(path).is_some_and(|v| !v.is_null())
    }

    /// True when `path` resolves, even to `null`.
    pub fn exists(&self, path: &str) -> bool {
        self.value(path).is_some()
    }

    /// Number of top-level elements of a structured result, 0 otherwise.
    pub fn count(&self) -> usize {
        match self.result() {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Object keys, or stringified indices for an array result.
    pub fn keys(&self) -> Vec<String> {
        match self.result() {
            Value::Object(map) => map.keys().cloned().collect(),
            Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        match self.result() {
            Value::Object(map) => Iter::Object(map.values()),
            Value::Array(items) => Iter::Array(items.iter()),
            _ => Iter::Empty,
        }
    }

    pub fn values(&self) -> Vec<&Value> {
        self.iter().collect()
    }

    pub fn first(&self) -> Option<&Value> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<&Value> {
        self.iter().last()
    }

    pub fn contains(&self, needle: &Value) -> bool {
        self.iter().any(|v| v == needle)
    }

    /// Sum of the numeric top-level elements; non-numbers are skipped.
    pub fn sum(&self) -> f64 {
        self.iter().filter_map(Value::as_f64).sum()
    }
}

impl TryFrom<Value> for Response {
    type Error = ClientError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Response> for Value {
    fn from(response: Response) -> Self {
        response.container
    }
}

impl Index<&str> for Response {
    type Output = Value;

    fn index(&self, path: &str) -> &Value {
        self.value(path).unwrap_or(&NULL)
    }
}

impl Index<usize> for Response {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        match self.result() {
            Value::Array(items) => items.get(index).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.container)
    }
}

impl<'a> IntoIterator for &'a Response {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Iterator over the top-level elements of a structured result.
pub enum Iter<'a> {
    Object(serde_json::map::Values<'a>),
    Array(std::slice::Iter<'a, Value>),
    Empty,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        match self {
            Self::Object(values) => values.next(),
            Self::Array(items) => items.next(),
            Self::Empty => None,
        }
    }
}
