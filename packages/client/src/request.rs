//! Requests with expected statuses, the auth header and error reporting.

use crate::error::RequestError;
use crate::transport::{EventStream, FilePart, HttpRequest, HttpResponse, Method, Transport};
use sdui_renderer::auth::AuthSlot;
use sdui_renderer::{ErrorDetails, ErrorSlot};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Title of the error panel for failed requests
pub const REQUEST_ERROR_TITLE: &str = "Request Error";

#[derive(Debug, Clone, PartialEq)]
pub struct RequestArgs {
    pub method: Method,
    pub url: String,
    /// Accepted statuses; empty means any 2xx
    pub expected_status: Vec<u16>,
    pub query: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
    pub files: Vec<FilePart>,
}

impl RequestArgs {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            expected_status: Vec::new(),
            query: Vec::new(),
            form: None,
            files: Vec::new(),
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            form: Some(form),
            ..Self::get(url)
        }
    }

    /// Attach file fields, turning the body into a multipart form
    pub fn with_files(mut self, files: Vec<FilePart>) -> Self {
        self.files = files;
        self
    }

    pub fn expect(mut self, statuses: &[u16]) -> Self {
        self.expected_status = statuses.to_vec();
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    fn accepts(&self, status: u16) -> bool {
        if self.expected_status.is_empty() {
            (200..300).contains(&status)
        } else {
            self.expected_status.contains(&status)
        }
    }
}

/// Sends requests through a [`Transport`], adding the auth header.
/// [`Requester::request`] reports failures to the error slot before returning
/// them, [`Requester::send`] leaves reporting to the caller.
#[derive(Clone)]
pub struct Requester {
    transport: Arc<dyn Transport>,
    auth: Arc<AuthSlot>,
    errors: Arc<ErrorSlot>,
}

impl Requester {
    pub fn new(transport: Arc<dyn Transport>, auth: Arc<AuthSlot>, errors: Arc<ErrorSlot>) -> Self {
        Self {
            transport,
            auth,
            errors,
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn errors(&self) -> &Arc<ErrorSlot> {
        &self.errors
    }

    /// Send a request and decode its JSON body, returning the status with it
    #[instrument(skip_all, fields(url = %args.url))]
    pub async fn request(&self, args: RequestArgs) -> Result<(u16, Value), RequestError> {
        let result = self.send(args).await;
        if let Err(ref err) = result {
            self.report(err);
        }
        result
    }

    /// Show a request failure in the error slot
    pub fn report(&self, err: &RequestError) {
        let mut details = ErrorDetails::new(REQUEST_ERROR_TITLE, err.to_string());
        if err.status() != 0 {
            details = details.with_status(err.status());
        }
        self.errors.set(Some(details));
    }

    /// Open an event stream. Failures are returned but never reported; a
    /// dropped stream is retried silently by its caller.
    pub async fn open_stream(&self, url: &str) -> Result<EventStream, RequestError> {
        let request = self.with_auth(HttpRequest::get(url));
        self.transport.open_stream(request).await
    }

    fn with_auth(&self, mut request: HttpRequest) -> HttpRequest {
        if let Some(authorization) = self.auth.authorization() {
            request.headers.push(("Authorization".to_string(), authorization));
        }
        request
    }

    /// Like [`Requester::request`] without touching the error slot
    pub async fn send(&self, args: RequestArgs) -> Result<(u16, Value), RequestError> {
        let request = self.with_auth(HttpRequest {
            method: args.method,
            url: args.url.clone(),
            query: args.query.clone(),
            form: args.form.clone(),
            files: args.files.clone(),
            headers: Vec::new(),
        });
        let response = self.transport.send(request).await?;
        let status = response.status;

        if !args.accepts(status) {
            return Err(RequestError::UnexpectedStatus {
                status,
                detail: error_detail(&args.url, &response),
            });
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(data) => {
                debug!(status, json = %data, "Response JSON");
                Ok((status, data))
            }
            Err(_) => {
                warn!(status, "Response not valid JSON");
                Err(RequestError::InvalidJson { status })
            }
        }
    }
}

/// `detail` of a JSON error body, else the raw body, else the reason phrase
fn error_detail(url: &str, response: &HttpResponse) -> String {
    let detail = match serde_json::from_str::<Value>(&response.body) {
        Ok(json) => {
            warn!(url, status = response.status, json = %json, "Unexpected status");
            json.get("detail").and_then(Value::as_str).map(str::to_string)
        }
        Err(_) => {
            warn!(url, status = response.status, content = %response.body, "Unexpected status");
            Some(response.body.clone())
        }
    };
    detail
        .filter(|detail| !detail.is_empty())
        .unwrap_or_else(|| response.reason.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(status, body)
    }

    #[test]
    fn test_error_detail_sources() {
        assert_eq!(error_detail("/x", &response(400, r#"{"detail": "bad thing"}"#)), "bad thing");
        assert_eq!(error_detail("/x", &response(500, "Internal failure")), "Internal failure");
        assert_eq!(
            error_detail("/x", &response(422, r#"{"detail": {"form": []}}"#)),
            "Unprocessable Entity"
        );
        assert_eq!(error_detail("/x", &response(503, "")), "Service Unavailable");
    }

    #[test]
    fn test_expected_statuses() {
        let args = RequestArgs::get("/x");
        assert!(args.accepts(204));
        assert!(!args.accepts(404));
        let args = args.expect(&[200, 404]);
        assert!(args.accepts(404));
        assert!(!args.accepts(201));
    }
}
