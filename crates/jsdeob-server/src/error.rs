//! Converts every crate's error type into the `{success:false, error,
//! stack?}` wire shape and HTTP status codes from §7's propagation policy,
//! via a single [`IntoResponse`] impl — `quarto-hub::error::Error`'s
//! boundary-conversion pattern applied across a multi-crate stack instead
//! of a single one.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use jsdeob_ast::error::AstError;
use jsdeob_pipeline::error::PipelineError;
use jsdeob_runtime::error::RuntimeError;
use jsdeob_store::error::StoreError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

/// The API-layer error: a status code plus the `{success:false, error,
/// stack?}` body §6/§7 specify for every non-2xx response.
pub struct ApiError {
    status: StatusCode,
    message: String,
    stack: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), stack: None }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_stack(mut self, stack: Option<String>) -> Self {
        self.stack = stack;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { success: false, error: self.message, stack: self.stack };
        (self.status, Json(body)).into_response()
    }
}

impl From<AstError> for ApiError {
    fn from(e: AstError) -> Self {
        match e {
            AstError::Parse(_) | AstError::DeeplyNested { .. } | AstError::InvalidAst(_) => {
                ApiError::bad_request(e.to_string())
            }
            AstError::Codegen(_) => ApiError::internal(e.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Parse(_) | PipelineError::DeeplyNested | PipelineError::Unsupported(_) => {
                ApiError::bad_request(e.to_string())
            }
            PipelineError::StepFailure(_) => ApiError::bad_request(e.to_string()),
            PipelineError::Internal(_) => ApiError::internal(e.to_string()),
        }
    }
}

impl From<RuntimeError> for ApiError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::TransformValidation { message } => ApiError::bad_request(message),
            RuntimeError::TransformRuntimeError { message, stack } => {
                ApiError::bad_request(message).with_stack(stack)
            }
            RuntimeError::Internal(_) | RuntimeError::Json(_) => ApiError::internal(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::not_found(e.to_string()),
            StoreError::TransformValidation(_) => ApiError::bad_request(e.to_string()),
            StoreError::Storage(_) => ApiError::internal(e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
