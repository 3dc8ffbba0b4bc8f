use thiserror::Error;

use crate::api::ApiError;

/// Classified fetch failure consumed by the state machines.
///
/// Repositories turn raw transport/HTTP failures into this taxonomy; the
/// state machines only ever see these variants and their display text,
/// never status codes or `reqwest` internals.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("could not reach the server: {0}")]
    Transport(String),
    #[error("{0} was not found")]
    NotFound(String),
    #[error("the server reported an error (status {0})")]
    Server(u16),
    #[error("{0}")]
    Unknown(String),
}

impl From<ApiError> for FetchError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Transport(e) => FetchError::Transport(e.to_string()),
            ApiError::NotFound { resource } => FetchError::NotFound(resource),
            ApiError::Server { status } => FetchError::Server(status),
            ApiError::Unexpected { status, resource } => {
                FetchError::Unknown(format!("unexpected status {} from {}", status, resource))
            }
            ApiError::Decode(e) => FetchError::Unknown(e.to_string()),
        }
    }
}
