use sdui_model::ModelError;
use thiserror::Error;

/// Failure of a single HTTP exchange.
///
/// The `Display` form is what ends up in the "Request Error" panel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    /// The request never produced a response
    #[error("fetch failed")]
    Transport { reason: String },

    /// The status was not in the expected set. `detail` is the backend's
    /// `detail` string, the raw body, or the status reason.
    #[error("{detail} ({status})")]
    UnexpectedStatus { status: u16, detail: String },

    #[error("Response not valid JSON")]
    InvalidJson { status: u16 },
}

impl RequestError {
    /// HTTP status, 0 when there was no response
    pub fn status(&self) -> u16 {
        match self {
            RequestError::Transport { .. } => 0,
            RequestError::UnexpectedStatus { status, .. } | RequestError::InvalidJson { status } => *status,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The backend answered with a body of the wrong shape
    #[error("{0}")]
    Protocol(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("No form mounted at {0:?}")]
    UnknownForm(String),

    #[error("Form {0:?} is already submitting")]
    FormBusy(String),

    #[error("Invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
