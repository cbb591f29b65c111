use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{chat::ChatError, export::ExportError, generation::GenerationError},
    domain::error::DomainError,
    infra::{error::InfraError, llm::LlmError},
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(err) => domain_status(err),
            AppError::Generation(GenerationError::Domain(err)) => domain_status(err),
            AppError::Generation(GenerationError::Llm(err)) => llm_status(err),
            AppError::Chat(ChatError::Domain(err)) => domain_status(err),
            AppError::Chat(ChatError::Llm(err)) => llm_status(err),
            AppError::Export(err) => export_status(err),
            AppError::Infra(InfraError::HttpClient { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Infra(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Domain(DomainError::Invariant { .. }) => "Unexpected error occurred",
            AppError::Domain(_) => "Request could not be processed",
            AppError::Generation(GenerationError::Domain(_))
            | AppError::Chat(ChatError::Domain(_)) => "Request could not be processed",
            AppError::Generation(GenerationError::Llm(err))
            | AppError::Chat(ChatError::Llm(err)) => llm_message(err),
            AppError::Export(ExportError::Render { .. }) => "Export rendering failed",
            AppError::Export(ExportError::EmptySteps(_)) => "SOP has no usable steps",
            AppError::Export(_) => "Request could not be processed",
            AppError::Infra(InfraError::Configuration { .. }) => "Service misconfigured",
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::HttpClient { .. }) => "Outbound HTTP client failed",
            AppError::Infra(InfraError::Io(_)) => "I/O failure during request",
        }
    }
}

/// Upstream failure classes keep their HTTP-status-like shape on our own
/// surface; the body code disambiguates who was unauthorized.
pub fn llm_status(error: &LlmError) -> StatusCode {
    match error {
        LlmError::Unauthorized => StatusCode::UNAUTHORIZED,
        LlmError::QuotaExhausted => StatusCode::TOO_MANY_REQUESTS,
        LlmError::ModelUnavailable { .. } => StatusCode::NOT_FOUND,
        LlmError::Network(_) | LlmError::Api { .. } | LlmError::EmptyResponse => {
            StatusCode::BAD_GATEWAY
        }
    }
}

pub fn domain_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::MissingField { .. } | DomainError::Validation { .. } => {
            StatusCode::BAD_REQUEST
        }
        DomainError::Invariant { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn export_status(error: &ExportError) -> StatusCode {
    match error {
        ExportError::MissingField { .. } | ExportError::UnsupportedFormat { .. } => {
            StatusCode::BAD_REQUEST
        }
        ExportError::EmptySteps(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ExportError::Render { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn llm_message(error: &LlmError) -> &'static str {
    match error {
        LlmError::Unauthorized => "Generative API rejected the configured key",
        LlmError::QuotaExhausted => "Generative API quota exhausted",
        LlmError::ModelUnavailable { .. } => "No configured model is available",
        LlmError::Network(_) => "Generative API unreachable",
        LlmError::Api { .. } | LlmError::EmptyResponse => "SOP generation failed",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.presentation_message();
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = (status, message).into_response();
        report.attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_classes_map_to_distinct_statuses() {
        assert_eq!(llm_status(&LlmError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            llm_status(&LlmError::QuotaExhausted),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            llm_status(&LlmError::ModelUnavailable {
                model: "gemini-2.0-flash".into()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(llm_status(&LlmError::EmptyResponse), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn domain_errors_split_client_and_server_fault() {
        assert_eq!(
            domain_status(&DomainError::missing_field("category")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            domain_status(&DomainError::validation("unknown severity")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            domain_status(&DomainError::invariant("completion above 100%")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn export_errors_split_client_and_server_fault() {
        assert_eq!(
            export_status(&ExportError::UnsupportedFormat {
                token: "xlsx".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            export_status(&ExportError::EmptySteps(DomainError::validation(
                "immediate steps must not be empty"
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
