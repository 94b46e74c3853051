use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use super::types::{HttpRequest, HttpResponse, TransportError};
use super::Transport;

/// A scripted transport for tests. Replies are handed out in the order they
/// were queued, and every request sent is recorded in a history.
pub struct MockTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    history: Mutex<Vec<HttpRequest>>,
    base_url: Option<Url>,
}

struct ScriptedReply {
    delay: Duration,
    outcome: Result<HttpResponse, TransportError>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            replies: VecDeque::new(),
            base_url: None,
        }
    }

    pub fn history(&self) -> Vec<HttpRequest> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.history().pop()
    }
}

pub struct MockTransportBuilder {
    replies: VecDeque<ScriptedReply>,
    base_url: Option<Url>,
}

impl MockTransportBuilder {
    pub fn with_reply(self, response: HttpResponse) -> Self {
        self.with_delayed_outcome(Duration::ZERO, Ok(response))
    }

    pub fn with_failure(self, error: TransportError) -> Self {
        self.with_delayed_outcome(Duration::ZERO, Err(error))
    }

    pub fn with_delayed_reply(self, delay: Duration, response: HttpResponse) -> Self {
        self.with_delayed_outcome(delay, Ok(response))
    }

    fn with_delayed_outcome(
        mut self,
        delay: Duration,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Self {
        self.replies.push_back(ScriptedReply { delay, outcome });
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = Some(Url::parse(url).expect("mock base url must parse"));
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            replies: Mutex::new(self.replies),
            history: Mutex::new(Vec::new()),
            base_url: self.base_url,
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let scripted = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let Some(ScriptedReply { delay, outcome }) = scripted else {
            return Err(TransportError::new("mock transport has no reply queued", 0));
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }

    fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_are_served_in_order_and_recorded() {
        let mock = MockTransport::builder()
            .with_reply(HttpResponse::new(200, "first"))
            .with_failure(TransportError::new("second", 7))
            .build();

        let first = mock
            .send(HttpRequest::post("/", b"a".to_vec()))
            .await
            .expect("first reply");
        assert_eq!(first.body, b"first");

        let second = mock
            .send(HttpRequest::post("/wallet/w", b"b".to_vec()))
            .await
            .expect_err("second is a failure");
        assert_eq!(second.code, 7);

        let exhausted = mock.send(HttpRequest::post("/", Vec::new())).await;
        assert!(exhausted.is_err());

        assert_eq!(mock.history().len(), 3);
        assert_eq!(
            mock.history()[1].path,
            "/wallet/w",
            "history keeps send order"
        );
    }
}
