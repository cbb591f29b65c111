use crate::application::chat::ChatError;
use crate::application::error::{ErrorReport, llm_status};
use crate::application::export::ExportError;
use crate::application::generation::GenerationError;
use crate::domain::error::DomainError;
use crate::infra::llm::LlmError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const MISSING_FIELD: &str = "missing_field";
    pub const UNSUPPORTED_FORMAT: &str = "unsupported_format";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const RENDER: &str = "render_error";
    pub const GENERATION_UNAUTHORIZED: &str = "generation_unauthorized";
    pub const QUOTA_EXHAUSTED: &str = "quota_exhausted";
    pub const MODEL_UNAVAILABLE: &str = "model_unavailable";
    pub const GENERATION_FAILED: &str = "generation_failed";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::MISSING_FIELD,
            "required field missing",
            Some(field.to_string()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let hint = self.hint.clone();
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        // Attach a structured report so shared logging middleware can emit rich diagnostics.
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {}", self.code, hint.as_deref().unwrap_or(self.message)),
        )
        .attach(&mut response);
        response
    }
}

fn domain_to_api(error: DomainError) -> ApiError {
    match error {
        DomainError::MissingField { field } => ApiError::missing_field(field),
        DomainError::Validation { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "invalid input",
            Some(message),
        ),
        DomainError::Invariant { message } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            "internal error",
            Some(message),
        ),
    }
}

fn llm_to_api(error: &LlmError) -> ApiError {
    let status = llm_status(error);
    match error {
        LlmError::Unauthorized => ApiError::new(
            status,
            codes::GENERATION_UNAUTHORIZED,
            "generative API rejected the configured key",
            None,
        ),
        LlmError::QuotaExhausted => ApiError::new(
            status,
            codes::QUOTA_EXHAUSTED,
            "generative API quota exhausted",
            None,
        ),
        LlmError::ModelUnavailable { model } => ApiError::new(
            status,
            codes::MODEL_UNAVAILABLE,
            "no configured model is available",
            Some(format!("model `{model}` not available")),
        ),
        LlmError::Network(source) => ApiError::new(
            status,
            codes::GENERATION_FAILED,
            "generative API unreachable",
            Some(source.to_string()),
        ),
        LlmError::Api { status: code, detail } => ApiError::new(
            status,
            codes::GENERATION_FAILED,
            "generative API call failed",
            Some(format!("upstream status {code}: {detail}")),
        ),
        LlmError::EmptyResponse => ApiError::new(
            status,
            codes::GENERATION_FAILED,
            "generative API returned no text",
            None,
        ),
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        domain_to_api(error)
    }
}

impl From<GenerationError> for ApiError {
    fn from(error: GenerationError) -> Self {
        match error {
            GenerationError::Domain(err) => domain_to_api(err),
            GenerationError::Llm(err) => llm_to_api(&err),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::Domain(err) => domain_to_api(err),
            ChatError::Llm(err) => llm_to_api(&err),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(error: ExportError) -> Self {
        match error {
            ExportError::MissingField { field } => ApiError::missing_field(field),
            ExportError::UnsupportedFormat { token } => ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::UNSUPPORTED_FORMAT,
                "unsupported export format",
                Some(format!("unknown format token `{token}`")),
            ),
            ExportError::EmptySteps(source) => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                codes::INVALID_INPUT,
                "SOP failed validation",
                Some(source.to_string()),
            ),
            ExportError::Render { format, source } => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::RENDER,
                "export rendering failed",
                Some(format!("{format}: {source}")),
            ),
        }
    }
}
