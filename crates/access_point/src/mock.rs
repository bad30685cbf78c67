use super::transport::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use dzfp_core::TransportError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::{sleep, Duration};

/// In-memory transport that replays queued replies and records what was
/// sent. Clones share the same queues.
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    latency: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, to simulate network latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn push_reply(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.push(Ok(HttpResponse {
            status,
            body: body.into(),
        }));
    }

    pub fn push_error(&self, err: TransportError) {
        self.push(Err(err));
    }

    fn push(&self, reply: Result<HttpResponse, TransportError>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        if let Some(latency) = self.latency {
            sleep(latency).await;
        }
        reply.unwrap_or_else(|| Err(TransportError::Request("no reply queued".to_string())))
    }
}
