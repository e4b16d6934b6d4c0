//! In-memory transport for client tests
#![allow(dead_code)]

use async_trait::async_trait;
use sdui_client::{App, ClientConfig, EventStream, HttpRequest, HttpResponse, RequestError, Transport};
use sdui_renderer::Renderer;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio_stream::wrappers::ReceiverStream;

enum Scripted {
    Ready(HttpResponse),
    Gated(oneshot::Receiver<HttpResponse>),
}

/// Answers requests from per-url scripts. The last scripted response for a
/// url repeats; unscripted urls answer 404. Every request is recorded.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    streams: Mutex<HashMap<String, VecDeque<Vec<Result<String, RequestError>>>>>,
    requests: Mutex<Vec<HttpRequest>>,
    stream_opens: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.push(url, Scripted::Ready(HttpResponse::new(status, body)));
    }

    pub fn respond_json(&self, url: &str, status: u16, body: Value) {
        self.respond(url, status, &body.to_string());
    }

    /// Hold the response for `url` until the returned sender fires
    pub fn gate(&self, url: &str) -> oneshot::Sender<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.push(url, Scripted::Gated(rx));
        tx
    }

    /// Script one connection of a stream; unscripted connections fail
    pub fn stream(&self, url: &str, messages: Vec<Result<String, RequestError>>) {
        self.streams
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(messages);
    }

    fn push(&self, url: &str, scripted: Scripted) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(scripted);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made to `url` (query included)
    pub fn count(&self, url: &str) -> usize {
        self.requests().iter().filter(|request| request.full_url() == url).count()
    }

    pub fn stream_opens(&self, url: &str) -> usize {
        self.stream_opens.lock().unwrap().iter().filter(|opened| *opened == url).count()
    }

    fn next(&self, url: &str) -> Scripted {
        let mut responses = self.responses.lock().unwrap();
        let Some(queue) = responses.get_mut(url) else {
            return Scripted::Ready(HttpResponse::new(404, r#"{"detail": "Not Found"}"#));
        };
        match queue.front() {
            Some(Scripted::Ready(response)) if queue.len() == 1 => Scripted::Ready(response.clone()),
            Some(_) => queue.pop_front().unwrap(),
            None => Scripted::Ready(HttpResponse::new(404, r#"{"detail": "Not Found"}"#)),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let url = request.full_url();
        self.requests.lock().unwrap().push(request);
        match self.next(&url) {
            Scripted::Ready(response) => Ok(response),
            Scripted::Gated(rx) => rx.await.map_err(|_| RequestError::Transport {
                reason: "gate dropped".to_string(),
            }),
        }
    }

    async fn open_stream(&self, request: HttpRequest) -> Result<EventStream, RequestError> {
        let url = request.full_url();
        self.stream_opens.lock().unwrap().push(url.clone());
        let messages = self.streams.lock().unwrap().get_mut(&url).and_then(VecDeque::pop_front);
        let Some(messages) = messages else {
            return Err(RequestError::Transport {
                reason: "connection refused".to_string(),
            });
        };

        let (tx, rx) = tokio::sync::mpsc::channel(messages.len().max(1));
        for message in messages {
            let _ = tx.try_send(message);
        }
        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

pub fn app(transport: &Arc<MockTransport>, path: &str) -> App {
    app_with(transport, path, Renderer::new(ClientConfig::default().endpoint()), ClientConfig::default())
}

pub fn app_with(transport: &Arc<MockTransport>, path: &str, renderer: Renderer, config: ClientConfig) -> App {
    let transport: Arc<dyn Transport> = Arc::clone(transport) as Arc<dyn Transport>;
    App::new(renderer, transport, config, path)
}
