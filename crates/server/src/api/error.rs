//! API 错误类型。

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use filedock_api_types::ErrorResponse;
use filedock_core::DomainError;
use filedock_storage::StorageError;
use tracing::error;

/// API 错误类型。
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub code: String,
    pub status: StatusCode,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError {
            message: message.into(),
            code: "INTERNAL_ERROR".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 存储错误对应的错误码与 HTTP 状态码。
pub fn classify(err: &StorageError) -> (&'static str, StatusCode) {
    match err {
        StorageError::NotFound(_) => ("PATH_NOT_FOUND", StatusCode::NOT_FOUND),
        StorageError::AlreadyExists(_) => ("ALREADY_EXISTS", StatusCode::CONFLICT),
        StorageError::NotADirectory(_) => ("NOT_A_DIRECTORY", StatusCode::BAD_REQUEST),
        StorageError::IsADirectory(_) => ("IS_A_DIRECTORY", StatusCode::BAD_REQUEST),
        StorageError::OutsideRoot(_) => ("OUTSIDE_ROOT", StatusCode::FORBIDDEN),
        StorageError::Domain(DomainError::InvalidPath(_)) => {
            ("INVALID_PATH", StatusCode::BAD_REQUEST)
        }
        StorageError::Domain(DomainError::InvalidName(_)) => {
            ("INVALID_NAME", StatusCode::BAD_REQUEST)
        }
        StorageError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            ("PERMISSION_DENIED", StatusCode::FORBIDDEN)
        }
        StorageError::Io(_) => ("IO_ERROR", StatusCode::INTERNAL_SERVER_ERROR),
        StorageError::Archive(_) | StorageError::Walk(_) => {
            ("ARCHIVE_ERROR", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let (code, status) = classify(&err);
        ApiError {
            message: err.to_string(),
            code: code.to_string(),
            status,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        StorageError::from(err).into()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError {
            message: err.body_text(),
            code: "INVALID_MULTIPART".to_string(),
            status: err.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = %self.code, message = %self.message, "request failed");
        }

        let body = Json(ErrorResponse {
            code: self.code,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
