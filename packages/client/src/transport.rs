//! HTTP seam.
//!
//! Everything above this module talks to a [`Transport`]; the real one is
//! [`HttpTransport`] over `reqwest`, tests substitute an in-memory one.

use crate::error::{ClientResult, RequestError};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, trace};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Form fields; url encoded unless `files` is non-empty
    pub form: Option<Vec<(String, String)>>,
    /// File fields, sending the form as `multipart/form-data`
    pub files: Vec<FilePart>,
    pub headers: Vec<(String, String)>,
}

/// A file field of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Form field name
    pub name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(name: impl Into<String>, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            form: None,
            files: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Url including the encoded query
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish();
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase of the status, `"Not Found"`
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason_phrase(status).to_string(),
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("")
}

/// `data` payloads of a server-sent event stream
pub type EventStream = Pin<Box<dyn Stream<Item = Result<String, RequestError>> + Send + 'static>>;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError>;

    /// Open a server-sent event stream. A non-2xx answer is an error.
    async fn open_stream(&self, request: HttpRequest) -> Result<EventStream, RequestError>;
}

/// [`Transport`] over `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    origin: Option<Url>,
}

impl HttpTransport {
    /// `origin` resolves relative urls; without one every url must be absolute.
    pub fn new(origin: Option<&str>) -> ClientResult<Self> {
        let origin = origin.map(Url::parse).transpose()?;
        Ok(Self {
            client: reqwest::Client::new(),
            origin,
        })
    }

    fn resolve(&self, url: &str) -> Result<Url, RequestError> {
        let resolved = match self.origin {
            Some(ref origin) => origin.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|err| RequestError::Transport {
            reason: format!("{}: {}", url, err),
        })
    }

    fn build(&self, request: &HttpRequest) -> Result<reqwest::RequestBuilder, RequestError> {
        let url = self.resolve(&request.url)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = self.client.request(method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !request.files.is_empty() {
            builder = builder.multipart(multipart_form(request)?);
        } else if let Some(ref form) = request.form {
            builder = builder.form(form);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        Ok(builder)
    }
}

fn multipart_form(request: &HttpRequest) -> Result<Form, RequestError> {
    let mut form = Form::new();
    for (name, value) in request.form.iter().flatten() {
        form = form.text(name.clone(), value.clone());
    }
    for file in &request.files {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(ref content_type) = file.content_type {
            part = part.mime_str(content_type).map_err(transport_error)?;
        }
        form = form.part(file.name.clone(), part);
    }
    Ok(form)
}

fn transport_error(err: reqwest::Error) -> RequestError {
    RequestError::Transport {
        reason: err.to_string(),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let response = self.build(&request)?.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        trace!(url = %request.url, status = status.as_u16(), "Response received");
        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }

    async fn open_stream(&self, request: HttpRequest) -> Result<EventStream, RequestError> {
        let response = self
            .build(&request)?
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::UnexpectedStatus {
                status: status.as_u16(),
                detail: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let (tx, rx) = mpsc::channel(16);
        let mut bytes = response.bytes_stream();
        tokio::spawn(async move {
            let mut decoder = SseDecoder::default();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        for message in decoder.feed(&chunk) {
                            if tx.send(Ok(message)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(Err(transport_error(err))).await;
                        return;
                    }
                }
            }
            debug!("Event stream closed by server");
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Incremental `text/event-stream` parser yielding the `data` of each event.
/// Other fields (`event`, `id`, `retry`) and comments are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut messages = Vec::new();

        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(|c| c == '\n' || c == '\r');

            if line.is_empty() {
                if !self.data.is_empty() {
                    messages.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }
        messages
    }
}
