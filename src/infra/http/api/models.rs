use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::dashboard::{DashboardOverview, RecentIncident};
use crate::domain::incident::{Incident, IncidentCategory, Severity, StandardAction};
use crate::domain::sop::{CompletedSteps, Sop};

/// Incident intake payload. Identity and timestamps are assigned server-side.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRequest {
    pub category: IncidentCategory,
    #[serde(default)]
    pub custom_category: Option<String>,
    pub severity: Severity,
    #[serde(default)]
    pub actions_taken: Vec<StandardAction>,
    #[serde(default)]
    pub custom_actions: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub affected_systems: Vec<String>,
    #[serde(default)]
    pub estimated_impact: Option<String>,
}

impl IncidentRequest {
    pub fn into_incident(self) -> Incident {
        Incident {
            id: Uuid::new_v4(),
            category: self.category,
            custom_category: self.custom_category,
            severity: self.severity,
            actions_taken: self.actions_taken,
            custom_actions: self.custom_actions,
            description: self.description,
            affected_systems: self.affected_systems,
            estimated_impact: self.estimated_impact,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SopEnvelope {
    pub sop: Sop,
}

/// Export payload. `sop` and `format` stay optional so their absence maps to
/// a `missing_field` error instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub sop: Option<Sop>,
    pub format: Option<String>,
    #[serde(default)]
    pub completed_steps: CompletedSteps,
}

#[derive(Debug, Serialize)]
pub struct ClipboardResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAck {
    pub status: &'static str,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub range: &'static str,
    pub range_label: &'static str,
    pub total_incidents: u32,
    pub resolved_incidents: u32,
    pub mean_resolution_minutes: u32,
    pub availability_percent: f64,
    pub severity_breakdown: Vec<BreakdownSlice>,
    pub category_breakdown: Vec<BreakdownSlice>,
    pub recent_incidents: Vec<RecentIncidentPayload>,
}

#[derive(Debug, Serialize)]
pub struct BreakdownSlice {
    pub label: &'static str,
    pub count: u32,
    pub percent: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentIncidentPayload {
    pub title: &'static str,
    pub category: &'static str,
    pub severity: &'static str,
    pub age: String,
    pub status: &'static str,
}

impl From<DashboardOverview> for DashboardPayload {
    fn from(overview: DashboardOverview) -> Self {
        Self {
            range: overview.range.as_str(),
            range_label: overview.range.label(),
            total_incidents: overview.total_incidents,
            resolved_incidents: overview.resolved_incidents,
            mean_resolution_minutes: overview.mean_resolution_minutes,
            availability_percent: overview.availability_percent,
            severity_breakdown: overview
                .severity_breakdown
                .iter()
                .map(|slice| BreakdownSlice {
                    label: slice.severity.label(),
                    count: slice.count,
                    percent: slice.percent,
                })
                .collect(),
            category_breakdown: overview
                .category_breakdown
                .iter()
                .map(|slice| BreakdownSlice {
                    label: slice.category.label(),
                    count: slice.count,
                    percent: slice.percent,
                })
                .collect(),
            recent_incidents: overview
                .recent_incidents
                .iter()
                .map(recent_incident_payload)
                .collect(),
        }
    }
}

fn recent_incident_payload(incident: &RecentIncident) -> RecentIncidentPayload {
    RecentIncidentPayload {
        title: incident.title,
        category: incident.category.label(),
        severity: incident.severity.label(),
        age: incident.age_label(),
        status: incident.status,
    }
}
