use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::dashboard::DashboardOverview;
use crate::application::error::{ErrorReport, HttpError};
use crate::domain::{
    incident::{IncidentCategory, Severity, StandardAction},
    policy,
    sop::Sop,
};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Render the shared error page and attach a report for the logging
/// middleware.
pub fn render_error_response(status: StatusCode, title: &str, message: &str) -> Response {
    let template = ErrorTemplate {
        view: ErrorPageView {
            title: title.to_owned(),
            message: message.to_owned(),
        },
    };
    let mut response = render_template_response(template, status);
    ErrorReport::from_message(
        "presentation::views::render_error_response",
        status,
        format!("{title}: {message}"),
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub struct IncidentFormView {
    pub categories: Vec<SelectOption>,
    pub severities: Vec<SelectOption>,
    pub actions: Vec<SelectOption>,
}

impl IncidentFormView {
    pub fn new() -> Self {
        let categories = [
            IncidentCategory::ServerDown,
            IncidentCategory::Performance,
            IncidentCategory::Security,
            IncidentCategory::Database,
            IncidentCategory::Network,
            IncidentCategory::Custom,
        ]
        .into_iter()
        .map(|category| SelectOption {
            value: category.as_str(),
            label: category.label(),
        })
        .collect();

        let severities = [Severity::Low, Severity::Medium, Severity::High]
            .into_iter()
            .map(|severity| SelectOption {
                value: severity.as_str(),
                label: severity.label(),
            })
            .collect();

        let actions = [
            StandardAction::RestartedService,
            StandardAction::CheckedLogs,
            StandardAction::NotifiedTeam,
            StandardAction::Escalated,
            StandardAction::RolledBack,
            StandardAction::AppliedHotfix,
        ]
        .into_iter()
        .map(|action| SelectOption {
            value: action.as_str(),
            label: action.label(),
        })
        .collect();

        Self {
            categories,
            severities,
            actions,
        }
    }
}

impl Default for IncidentFormView {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: IncidentFormView,
}

#[derive(Clone)]
pub struct StepView {
    pub id: String,
    pub ordinal: usize,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub owner: String,
    pub priority: String,
}

/// Everything the interactive checklist page needs, including the SOP
/// serialized once so the page script can post it back to the export API.
pub struct SopPageView {
    pub title: String,
    pub category_label: String,
    pub severity_label: &'static str,
    pub risk_label: &'static str,
    pub accent_color: &'static str,
    pub responsible_team: String,
    pub trigger: String,
    pub total_steps: usize,
    pub immediate: Vec<StepView>,
    pub preventive: Vec<StepView>,
    pub sop_json: String,
}

impl SopPageView {
    pub fn build(sop: &Sop) -> Result<Self, serde_json::Error> {
        // The payload feeds `JSON.parse` inside a script element; guard the
        // closing-tag sequence the same way the HTML exporter does.
        let sop_json = serde_json::to_string(sop)?.replace("</", "<\\/");
        Ok(Self {
            title: sop.title.clone(),
            category_label: sop.category_label.clone(),
            severity_label: sop.severity.label(),
            risk_label: policy::risk_label(sop.severity),
            accent_color: policy::accent_color(sop.severity),
            responsible_team: sop.responsible_team.clone(),
            trigger: sop.trigger.clone(),
            total_steps: sop.total_steps(),
            immediate: step_views(&sop.immediate_steps),
            preventive: step_views(&sop.preventive_actions),
            sop_json,
        })
    }
}

fn step_views(steps: &[crate::domain::sop::SopStep]) -> Vec<StepView> {
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| StepView {
            id: step.id.clone(),
            ordinal: index + 1,
            title: step.title.clone(),
            description: step.description.clone(),
            duration: step
                .estimated_duration
                .clone()
                .unwrap_or_else(|| "TBD".to_owned()),
            owner: step.responsible.clone().unwrap_or_default(),
            priority: step
                .priority
                .map(|p| p.display_label().to_owned())
                .unwrap_or_default(),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "sop.html")]
pub struct SopTemplate {
    pub view: SopPageView,
}

pub struct DashboardView {
    pub overview: DashboardOverview,
    pub ranges: Vec<RangeTab>,
}

#[derive(Clone)]
pub struct RangeTab {
    pub token: &'static str,
    pub label: &'static str,
    pub active: bool,
}

impl DashboardView {
    pub fn new(overview: DashboardOverview) -> Self {
        let ranges = crate::application::dashboard::TimeRange::ALL
            .into_iter()
            .map(|range| RangeTab {
                token: range.as_str(),
                label: range.label(),
                active: range == overview.range,
            })
            .collect();
        Self { overview, ranges }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub view: DashboardView,
}

pub struct ChatView {
    pub question: Option<String>,
    pub answer_html: Option<String>,
    pub error: Option<String>,
}

impl ChatView {
    pub fn empty() -> Self {
        Self {
            question: None,
            answer_html: None,
            error: None,
        }
    }

    pub fn answered(question: String, answer_html: String) -> Self {
        Self {
            question: Some(question),
            answer_html: Some(answer_html),
            error: None,
        }
    }

    pub fn failed(question: String, error: String) -> Self {
        Self {
            question: Some(question),
            answer_html: None,
            error: Some(error),
        }
    }
}

#[derive(Template)]
#[template(path = "chat.html")]
pub struct ChatTemplate {
    pub view: ChatView,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: ErrorPageView,
}
