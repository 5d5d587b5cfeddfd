use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;
use tracing::error;

use crate::api::response::ApiResponse;
use crate::store::StoreError;
use crate::validation::FieldErrors;

pub const DUPLICATE_CODE_MESSAGE: &str = "Employee with this Employee ID already exists.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors surfaced by the repositories and rendered by the HTTP layer.
#[derive(Debug, Error)]
pub enum HrError {
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Reference rejected by its shape, before any lookup
    #[error("{0}")]
    InvalidFormat(String),

    /// Well-formed reference that matches nothing
    #[error("{0}")]
    NotFound(String),

    #[error("duplicate employee code {0:?}")]
    DuplicateCode(String),

    #[error("{0}")]
    DuplicateDate(String),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for HrError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Malformed(detail) => HrError::MalformedRecord(detail),
            other => HrError::Store(other),
        }
    }
}

impl ResponseError for HrError {
    fn status_code(&self) -> StatusCode {
        match self {
            HrError::Validation(_)
            | HrError::InvalidFormat(_)
            | HrError::DuplicateCode(_)
            | HrError::DuplicateDate(_) => StatusCode::BAD_REQUEST,
            HrError::NotFound(_) => StatusCode::NOT_FOUND,
            HrError::MalformedRecord(_) | HrError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            HrError::Validation(errors) => ApiResponse::invalid(errors.clone()),
            HrError::DuplicateCode(_) => {
                ApiResponse::invalid(FieldErrors::single("employee_id", DUPLICATE_CODE_MESSAGE))
            }
            HrError::InvalidFormat(message)
            | HrError::NotFound(message)
            | HrError::DuplicateDate(message) => ApiResponse::failure(message.clone()),
            HrError::MalformedRecord(_) | HrError::Store(_) => {
                // details stay in the log, never in the response
                error!(error = %self, "Request failed");
                ApiResponse::failure(INTERNAL_ERROR_MESSAGE)
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
