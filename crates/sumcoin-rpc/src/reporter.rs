//! Reporting of errors that reach the top of a program unhandled.
//!
//! Build one [`ErrorReporter`] at startup and pass it to whatever needs to
//! report; there is no global instance.

use tracing::error;

use crate::error::ClientError;

type Handler = Box<dyn Fn(&ClientError) + Send + Sync>;

#[derive(Default)]
pub struct ErrorReporter {
    handlers: Vec<Handler>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler; handlers run in registration order after logging.
    pub fn register_handler(&mut self, handler: impl Fn(&ClientError) + Send + Sync + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Log `err` with its full record and hand it to every handler.
    pub fn report(&self, err: &ClientError) {
        let record = serde_json::to_string(err).unwrap_or_else(|e| format!("<unserializable: {e}>"));
        error!(
            kind = err.kind(),
            code = err.code(),
            message = %err,
            record = %record,
            "unhandled rpc client error"
        );

        for handler in &self.handlers {
            handler(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn handlers_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut reporter = ErrorReporter::new();

        for tag in ["first", "second"] {
            let sink = Arc::clone(&seen);
            reporter.register_handler(move |err| {
                sink.lock().unwrap().push(format!("{tag}:{}", err.code()));
            });
        }

        reporter.report(&ClientError::Connection {
            message: "Service Unavailable".into(),
            code: 503,
        });

        assert_eq!(*seen.lock().unwrap(), vec!["first:503", "second:503"]);
    }

    #[test]
    fn handlers_can_rebuild_the_error() {
        let rebuilt = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&rebuilt);
        let mut reporter = ErrorReporter::new();
        reporter.register_handler(move |err| {
            let record = serde_json::to_value(err).unwrap();
            *sink.lock().unwrap() = serde_json::from_value::<ClientError>(record).ok();
        });

        let err = ClientError::client("connection refused", 111);
        reporter.report(&err);
        assert_eq!(rebuilt.lock().unwrap().as_ref(), Some(&err));
    }
}
