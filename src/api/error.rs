//! HTTP error responses.

use crate::Error;
use crate::models::TitleRejection;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Body shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Error returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request was well-formed HTTP but its content is unacceptable.
    Validation(String),
    /// The addressed task does not exist.
    NotFound,
    /// Anything the client cannot fix. The cause is logged, never returned.
    Internal(String),
}

impl ApiError {
    /// Status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(self) -> String {
        match self {
            Self::Validation(detail) => detail,
            Self::NotFound => "Task not found".to_string(),
            Self::Internal(cause) => {
                tracing::error!(cause = %cause, "Request failed");
                "Internal server error".to_string()
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(detail) => Self::Validation(detail),
            Error::NotFound(_) => Self::NotFound,
            other @ (Error::LoadFailed { .. } | Error::OperationFailed { .. }) => {
                Self::Internal(other.to_string())
            },
        }
    }
}

impl From<TitleRejection> for ApiError {
    fn from(rejection: TitleRejection) -> Self {
        Self::Validation(rejection.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                detail: self.detail(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Error::InvalidInput("bad".into()), StatusCode::UNPROCESSABLE_ENTITY; "invalid input")]
    #[test_case(Error::NotFound("t1".into()), StatusCode::NOT_FOUND; "not found")]
    #[test_case(Error::operation("write_tasks_file", "disk full"), StatusCode::INTERNAL_SERVER_ERROR; "operation failed")]
    #[test_case(
        Error::LoadFailed { path: "tasks.json".into(), cause: "eof".into() },
        StatusCode::INTERNAL_SERVER_ERROR;
        "load failed"
    )]
    fn test_status_mapping(err: Error, expected: StatusCode) {
        assert_eq!(ApiError::from(err).status(), expected);
    }

    #[test]
    fn test_internal_detail_is_generic() {
        let err = ApiError::from(Error::operation("write_tasks_file", "disk full"));
        assert_eq!(err.detail(), "Internal server error");
    }

    #[test]
    fn test_title_rejection_detail() {
        let err = ApiError::from(TitleRejection::TooShort { min: 3, actual: 2 });
        assert_eq!(err.detail(), "Title must be at least 3 characters.");

        let blank = ApiError::from(TitleRejection::Empty);
        assert_eq!(blank.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(blank.detail(), "Title must be at least 3 characters.");
    }
}
