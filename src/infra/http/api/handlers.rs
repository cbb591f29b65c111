use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use metrics::counter;
use time::OffsetDateTime;
use tracing::info;

use crate::application::export::{self, ExportFormat, ExportOutput};

use super::error::ApiError;
use super::models::*;
use super::state::ApiState;

pub async fn generate_sop(
    State(state): State<ApiState>,
    Json(payload): Json<IncidentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let incident = payload.into_incident();
    let sop = state.generation.generate(&incident).await?;
    Ok(Json(SopEnvelope { sop }))
}

pub async fn export_sop(Json(payload): Json<ExportRequest>) -> Result<Response, ApiError> {
    let sop = payload
        .sop
        .ok_or_else(|| ApiError::missing_field("sop"))?;
    let format: ExportFormat = payload
        .format
        .as_deref()
        .ok_or_else(|| ApiError::missing_field("format"))?
        .parse()?;

    let output = export::export_document(
        &sop,
        &payload.completed_steps,
        format,
        OffsetDateTime::now_utc(),
    )?;

    match output {
        ExportOutput::Document {
            bytes,
            content_type,
            filename,
        } => Ok(attachment_response(bytes, content_type, &filename)),
        ExportOutput::Clipboard { text } => Ok(Json(ClipboardResponse { text }).into_response()),
    }
}

pub async fn chat(
    State(state): State<ApiState>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = payload
        .message
        .ok_or_else(|| ApiError::missing_field("message"))?;
    let answer = state.chat.answer(&message).await?;
    Ok(Json(ChatResponse {
        reply: answer.markdown,
    }))
}

pub async fn dashboard(
    State(state): State<ApiState>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let overview = state.dashboard.overview(query.range.as_deref())?;
    Ok(Json(DashboardPayload::from(overview)))
}

/// Acknowledges the incident without storing it anywhere. The body is
/// validated and logged so the caller gets the same contract a persisting
/// backend would offer.
pub async fn store_incident(
    Json(payload): Json<IncidentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let incident = payload.into_incident();
    incident.validate().map_err(ApiError::from)?;

    counter!("sopforge_incident_store_total").increment(1);
    info!(
        incident_id = %incident.id,
        category = incident.category.as_str(),
        severity = incident.severity.as_str(),
        "incident acknowledged without persistence"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(StoreAck {
            status: "accepted",
            id: incident.id,
        }),
    ))
}

fn attachment_response(bytes: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
