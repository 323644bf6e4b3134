use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::application::admin::AdminError;
use crate::application::catalog::CatalogError;

pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const DUPLICATE: &str = "DUPLICATE";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INTERNAL: &str = "INTERNAL";
}

/// JSON error envelope for both surfaces. `current` is populated only on
/// optimistic-lock conflicts, carrying the server-side entity.
#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<Value>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    current: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            current: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "admin token required",
        )
    }

    pub fn conflict(current: Value) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code: codes::CONFLICT,
            message: "entity was modified by another editor".to_string(),
            current: Some(current),
        }
    }

    /// Internal failures get a generic message; detail goes to the log only.
    fn internal(source: &'static str, err: impl std::fmt::Display) -> Self {
        error!(target: "corale::http", source, error = %err, "request failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            "internal error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
            code: self.code,
            current: self.current,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { entity } => Self::not_found(format!("{entity} not found")),
            other => Self::internal("catalog", other),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::NotFound { entity } => Self::not_found(format!("{entity} not found")),
            AdminError::Conflict { current } => Self::conflict(current),
            AdminError::Repo(crate::application::repos::RepoError::Duplicate { constraint }) => {
                Self::new(
                    StatusCode::CONFLICT,
                    codes::DUPLICATE,
                    format!("duplicate record violates `{constraint}`"),
                )
            }
            other => Self::internal("admin", other),
        }
    }
}
