use sdui_model::SubstitutionError;
use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

/// Failure while rendering a single node. Always caught at the node boundary and
/// shown in place as a "Render Error" panel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("{0}")]
    Substitution(#[from] SubstitutionError),

    #[error("Invalid \"{tag}\" component: {message}")]
    InvalidNode { tag: String, message: String },

    #[error("Invalid regex {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("{0}")]
    Custom(String),
}

impl From<String> for RenderError {
    fn from(s: String) -> Self {
        RenderError::Custom(s)
    }
}

impl From<&str> for RenderError {
    fn from(s: &str) -> Self {
        RenderError::Custom(s.to_string())
    }
}
