//! SOP document export engine.
//!
//! One block plan, four sinks. [`export_document`] validates the SOP,
//! dispatches to an emitter, and wraps the payload with its content type
//! and download filename. Emitters never mutate their inputs, so the same
//! `(sop, completed, generated_at)` triple always produces the same bytes.

pub mod blocks;
pub mod docx;
pub mod html;
pub mod layout;
pub mod pdf;
pub mod text;

use std::str::FromStr;

use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::domain::{
    error::DomainError,
    sop::{CompletedSteps, Sop},
};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Failure inside a single emitter.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("docx archive failed: {0}")]
    Docx(#[from] zip::result::ZipError),
    #[error("document state could not be serialized: {0}")]
    State(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Terminal export failures. There is no internal retry and no partial
/// output; callers map these onto API error codes.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("required field `{field}` is missing")]
    MissingField { field: &'static str },
    #[error("unsupported export format `{token}`")]
    UnsupportedFormat { token: String },
    #[error("SOP failed pre-export validation")]
    EmptySteps(#[source] DomainError),
    #[error("failed to assemble the {format} document")]
    Render {
        format: &'static str,
        #[source]
        source: RenderError,
    },
}

impl ExportError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Html,
    Clipboard,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pdf,
        ExportFormat::Docx,
        ExportFormat::Html,
        ExportFormat::Clipboard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Html => "html",
            ExportFormat::Clipboard => "clipboard",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            "html" => Ok(ExportFormat::Html),
            "clipboard" => Ok(ExportFormat::Clipboard),
            _ => Err(ExportError::UnsupportedFormat {
                token: token.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutput {
    Document {
        bytes: Vec<u8>,
        content_type: &'static str,
        filename: String,
    },
    Clipboard {
        text: String,
    },
}

pub fn export_document(
    sop: &Sop,
    completed: &CompletedSteps,
    format: ExportFormat,
    generated_at: OffsetDateTime,
) -> Result<ExportOutput, ExportError> {
    sop.validate().map_err(ExportError::EmptySteps)?;

    let output = match format {
        ExportFormat::Pdf => {
            let bytes = pdf::render(sop, completed, generated_at).map_err(|source| {
                ExportError::Render {
                    format: "pdf",
                    source,
                }
            })?;
            ExportOutput::Document {
                bytes,
                content_type: PDF_CONTENT_TYPE,
                filename: export_filename(&sop.title, "pdf"),
            }
        }
        ExportFormat::Docx => {
            let bytes = docx::render(sop, completed, generated_at).map_err(|source| {
                ExportError::Render {
                    format: "docx",
                    source,
                }
            })?;
            ExportOutput::Document {
                bytes,
                content_type: DOCX_CONTENT_TYPE,
                filename: export_filename(&sop.title, "docx"),
            }
        }
        ExportFormat::Html => {
            let markup = html::render(sop, completed, generated_at).map_err(|source| {
                ExportError::Render {
                    format: "html",
                    source,
                }
            })?;
            ExportOutput::Document {
                bytes: markup.into_bytes(),
                content_type: HTML_CONTENT_TYPE,
                filename: export_filename(&sop.title, "html"),
            }
        }
        ExportFormat::Clipboard => {
            let text = text::render(sop, completed, generated_at).map_err(|source| {
                ExportError::Render {
                    format: "clipboard",
                    source,
                }
            })?;
            ExportOutput::Clipboard { text }
        }
    };

    counter!("sopforge_export_total", "format" => format.as_str()).increment(1);
    info!(
        format = format.as_str(),
        steps = sop.total_steps(),
        completion = sop.completion_percent(completed),
        "SOP exported"
    );
    Ok(output)
}

/// Download name for a rendered document: the title stripped to ASCII
/// alphanumerics and lower-cased, with `sop` as the fallback when nothing
/// survives.
pub fn export_filename(title: &str, extension: &str) -> String {
    let mut base: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if base.is_empty() {
        base.push_str("sop");
    }
    format!("{base}.{extension}")
}
