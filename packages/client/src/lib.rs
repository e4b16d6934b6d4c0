//! Network side of a server-driven UI.
//!
//! [`App`] owns the [`UiState`](sdui_renderer::UiState), renders it and runs
//! the loads, streams, form submissions and searches the rendered tree asks
//! for, over a pluggable [`Transport`].

pub mod app;
pub mod config;
pub mod dev;
pub mod error;
pub mod forms;
pub mod load;
pub mod request;
pub mod search;
pub mod transport;

pub use app::App;
pub use config::ClientConfig;
pub use dev::DevReload;
pub use error::{ClientError, ClientResult, RequestError};
pub use forms::FormValues;
pub use load::{LoadUpdate, RetryPolicy};
pub use request::{RequestArgs, Requester};
pub use search::SearchDebouncer;
pub use transport::{EventStream, FilePart, HttpRequest, HttpResponse, HttpTransport, Method, SseDecoder, Transport};
