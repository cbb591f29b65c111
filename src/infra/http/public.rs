use std::sync::Arc;

use axum::{
    Router,
    extract::{Form, Query, RawForm, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use time::OffsetDateTime;
use url::form_urlencoded;
use uuid::Uuid;

use crate::{
    application::{
        chat::{ChatError, ChatService},
        dashboard::DashboardService,
        error::{ErrorReport, HttpError, domain_status, llm_status},
        generation::{GenerationError, GenerationService},
    },
    domain::{
        error::DomainError,
        incident::{Incident, IncidentCategory, Severity, StandardAction},
    },
    presentation::views::{
        ChatTemplate, ChatView, DashboardTemplate, DashboardView, IncidentFormView, IndexTemplate,
        SopPageView, SopTemplate, render_error_response, render_template_response,
    },
};

use super::{
    RouterState,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub generation: Arc<GenerationService>,
    pub chat: Arc<ChatService>,
    pub dashboard: DashboardService,
}

pub fn build_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/", get(index))
        .route("/sop", post(submit_incident))
        .route("/dashboard", get(dashboard))
        .route("/chat", get(chat_page).post(chat_submit))
        .route("/static/{*path}", get(crate::infra::assets::serve))
        .route("/_health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn index() -> Response {
    render_template_response(
        IndexTemplate {
            view: IncidentFormView::new(),
        },
        StatusCode::OK,
    )
}

async fn submit_incident(
    State(state): State<HttpState>,
    RawForm(bytes): RawForm,
) -> Response {
    let incident = match IncidentSubmission::from_form(&bytes).into_incident() {
        Ok(incident) => incident,
        Err(err) => {
            return render_error_response(
                StatusCode::BAD_REQUEST,
                "Invalid incident report",
                &err.to_string(),
            );
        }
    };

    match state.generation.generate(&incident).await {
        Ok(sop) => match SopPageView::build(&sop) {
            Ok(view) => render_template_response(SopTemplate { view }, StatusCode::OK),
            Err(err) => HttpError::from_error(
                "infra::http::public::submit_incident",
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to prepare the checklist page",
                &err,
            )
            .into_response(),
        },
        Err(err) => generation_failure_page(&err),
    }
}

fn generation_failure_page(err: &GenerationError) -> Response {
    let (status, message) = match err {
        GenerationError::Domain(domain) => (domain_status(domain), domain.to_string()),
        GenerationError::Llm(llm) => (llm_status(llm), llm.to_string()),
    };
    render_error_response(status, "SOP generation failed", &message)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RangeQuery {
    range: Option<String>,
}

async fn dashboard(State(state): State<HttpState>, Query(query): Query<RangeQuery>) -> Response {
    match state.dashboard.overview(query.range.as_deref()) {
        Ok(overview) => render_template_response(
            DashboardTemplate {
                view: DashboardView::new(overview),
            },
            StatusCode::OK,
        ),
        Err(err) => render_error_response(
            StatusCode::BAD_REQUEST,
            "Unknown dashboard range",
            &err.to_string(),
        ),
    }
}

async fn chat_page() -> Response {
    render_template_response(
        ChatTemplate {
            view: ChatView::empty(),
        },
        StatusCode::OK,
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatForm {
    question: String,
}

async fn chat_submit(State(state): State<HttpState>, Form(form): Form<ChatForm>) -> Response {
    let question = form.question.trim().to_string();
    match state.chat.answer(&question).await {
        Ok(answer) => render_template_response(
            ChatTemplate {
                view: ChatView::answered(question, answer.html),
            },
            StatusCode::OK,
        ),
        Err(err) => {
            let (status, message) = match &err {
                ChatError::Domain(domain) => (domain_status(domain), domain.to_string()),
                ChatError::Llm(llm) => (llm_status(llm), llm.to_string()),
            };
            let mut response = render_template_response(
                ChatTemplate {
                    view: ChatView::failed(question, message.clone()),
                },
                status,
            );
            ErrorReport::from_message("infra::http::public::chat_submit", status, message)
                .attach(&mut response);
            response
        }
    }
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Raw intake form fields before token parsing. Checkbox groups arrive as
/// repeated keys, which is why this is fed from the raw body instead of a
/// serde form.
#[derive(Debug, Default)]
struct IncidentSubmission {
    category: Option<String>,
    custom_category: Option<String>,
    severity: Option<String>,
    actions: Vec<String>,
    custom_actions: Option<String>,
    description: Option<String>,
    affected_systems: Option<String>,
    estimated_impact: Option<String>,
}

impl IncidentSubmission {
    fn from_form(bytes: &[u8]) -> Self {
        let mut submission = Self::default();
        for (key, value) in form_urlencoded::parse(bytes) {
            match key.as_ref() {
                "category" => submission.category = Some(value.into_owned()),
                "custom_category" => submission.custom_category = non_blank(&value),
                "severity" => submission.severity = Some(value.into_owned()),
                "actions" => submission.actions.push(value.into_owned()),
                "custom_actions" => submission.custom_actions = non_blank(&value),
                "description" => submission.description = non_blank(&value),
                "affected_systems" => submission.affected_systems = Some(value.into_owned()),
                "estimated_impact" => submission.estimated_impact = non_blank(&value),
                _ => {}
            }
        }
        submission
    }

    fn into_incident(self) -> Result<Incident, DomainError> {
        let category_token = self
            .category
            .ok_or(DomainError::missing_field("category"))?;
        let category = IncidentCategory::try_from(category_token.as_str())
            .map_err(|()| DomainError::validation(format!("unknown category: {category_token}")))?;

        let severity_token = self
            .severity
            .ok_or(DomainError::missing_field("severity"))?;
        let severity = Severity::try_from(severity_token.as_str())
            .map_err(|()| DomainError::validation(format!("unknown severity: {severity_token}")))?;

        let mut actions_taken = Vec::with_capacity(self.actions.len());
        for token in &self.actions {
            let action = StandardAction::try_from(token.as_str())
                .map_err(|()| DomainError::validation(format!("unknown action: {token}")))?;
            actions_taken.push(action);
        }

        let affected_systems = self
            .affected_systems
            .map(|raw| split_systems(&raw))
            .unwrap_or_default();

        let incident = Incident {
            id: Uuid::new_v4(),
            category,
            custom_category: self.custom_category,
            severity,
            actions_taken,
            custom_actions: self.custom_actions,
            description: self.description,
            affected_systems,
            estimated_impact: self.estimated_impact,
            created_at: OffsetDateTime::now_utc(),
        };
        incident.validate()?;
        Ok(incident)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The form takes affected systems as free text, one per comma or line.
fn split_systems(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
