//! Request-level errors and their HTTP rendering.

use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use log::error;
use thiserror::Error;

use crate::source::ChainError;

#[derive(Error, Debug)]
pub enum ExplorerError {
    /// The requested transaction or block is unknown upstream.
    #[error("Not found")]
    NotFound,
    /// Upstream error carrying a daemon error code.
    #[error("{message}. Code:{code}")]
    Rpc { code: i32, message: String },
    /// Any other upstream failure.
    #[error("{0}")]
    Upstream(String),
    /// Bad or missing request parameter, raised before any upstream call.
    #[error("{message}")]
    Validation { message: String, code: Option<i32> },
    /// The upstream record is missing data every transaction must have.
    #[error("Malformed transaction record: {0}")]
    Structural(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

impl ExplorerError {
    /// Maps the "unknown id" daemon code to [`ExplorerError::NotFound`]. Used
    /// for the lookup a request is about; failures further down keep their
    /// code.
    pub fn lookup(err: ChainError) -> Self {
        if err.is_not_found() {
            ExplorerError::NotFound
        } else {
            err.into()
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ExplorerError::Validation {
            message: message.into(),
            code: None,
        }
    }

    pub fn missing_parameter(message: impl Into<String>) -> Self {
        ExplorerError::Validation {
            message: message.into(),
            code: Some(1),
        }
    }

    fn body(&self) -> String {
        match self {
            ExplorerError::Validation {
                message,
                code: Some(code),
            } => format!("{}. Code:{}", message, code),
            other => other.to_string(),
        }
    }
}

impl From<ChainError> for ExplorerError {
    fn from(err: ChainError) -> Self {
        match err.code {
            Some(code) => ExplorerError::Rpc {
                code,
                message: err.message,
            },
            None => ExplorerError::Upstream(err.message),
        }
    }
}

impl ResponseError for ExplorerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ExplorerError::NotFound => StatusCode::NOT_FOUND,
            ExplorerError::Rpc { .. } | ExplorerError::Validation { .. } => StatusCode::BAD_REQUEST,
            ExplorerError::Upstream(_) | ExplorerError::Structural(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }
        HttpResponse::build(status)
            .content_type(ContentType::plaintext())
            .body(self.body())
    }
}
