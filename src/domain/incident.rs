//! Incident intake model.
//!
//! An incident is the immutable input to SOP generation. It is consumed
//! exactly once and never persisted.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl TryFrom<&str> for Severity {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentCategory {
    ServerDown,
    Performance,
    Security,
    Database,
    Network,
    Custom,
}

impl IncidentCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentCategory::ServerDown => "server_down",
            IncidentCategory::Performance => "performance",
            IncidentCategory::Security => "security",
            IncidentCategory::Database => "database",
            IncidentCategory::Network => "network",
            IncidentCategory::Custom => "custom",
        }
    }

    /// Human-facing label used in document headers and the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            IncidentCategory::ServerDown => "Server Down",
            IncidentCategory::Performance => "Performance Degradation",
            IncidentCategory::Security => "Security Incident",
            IncidentCategory::Database => "Database Issue",
            IncidentCategory::Network => "Network Outage",
            IncidentCategory::Custom => "Custom Incident",
        }
    }
}

impl TryFrom<&str> for IncidentCategory {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "server_down" => Ok(IncidentCategory::ServerDown),
            "performance" => Ok(IncidentCategory::Performance),
            "security" => Ok(IncidentCategory::Security),
            "database" => Ok(IncidentCategory::Database),
            "network" => Ok(IncidentCategory::Network),
            "custom" => Ok(IncidentCategory::Custom),
            _ => Err(()),
        }
    }
}

/// Actions the intake form lets a reporter tick off before submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardAction {
    RestartedService,
    CheckedLogs,
    NotifiedTeam,
    Escalated,
    RolledBack,
    AppliedHotfix,
}

impl StandardAction {
    pub fn as_str(self) -> &'static str {
        match self {
            StandardAction::RestartedService => "restarted_service",
            StandardAction::CheckedLogs => "checked_logs",
            StandardAction::NotifiedTeam => "notified_team",
            StandardAction::Escalated => "escalated",
            StandardAction::RolledBack => "rolled_back",
            StandardAction::AppliedHotfix => "applied_hotfix",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StandardAction::RestartedService => "Restarted the affected service",
            StandardAction::CheckedLogs => "Checked system logs",
            StandardAction::NotifiedTeam => "Notified the on-call team",
            StandardAction::Escalated => "Escalated to senior engineers",
            StandardAction::RolledBack => "Rolled back the last deployment",
            StandardAction::AppliedHotfix => "Applied a hotfix",
        }
    }
}

impl TryFrom<&str> for StandardAction {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "restarted_service" => Ok(StandardAction::RestartedService),
            "checked_logs" => Ok(StandardAction::CheckedLogs),
            "notified_team" => Ok(StandardAction::NotifiedTeam),
            "escalated" => Ok(StandardAction::Escalated),
            "rolled_back" => Ok(StandardAction::RolledBack),
            "applied_hotfix" => Ok(StandardAction::AppliedHotfix),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: Uuid,
    pub category: IncidentCategory,
    pub custom_category: Option<String>,
    pub severity: Severity,
    pub actions_taken: Vec<StandardAction>,
    pub custom_actions: Option<String>,
    pub description: Option<String>,
    pub affected_systems: Vec<String>,
    pub estimated_impact: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Incident {
    /// Checks the intake invariants. A `custom` category without a label is
    /// the one shape the form cannot rule out on its own.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.category == IncidentCategory::Custom
            && self
                .custom_category
                .as_deref()
                .is_none_or(|value| value.trim().is_empty())
        {
            return Err(DomainError::missing_field("custom_category"));
        }
        Ok(())
    }

    /// Label shown wherever the incident category appears in prose. For
    /// `custom` incidents this is the reporter-supplied name.
    pub fn category_label(&self) -> &str {
        if self.category == IncidentCategory::Custom {
            if let Some(custom) = self.custom_category.as_deref() {
                let trimmed = custom.trim();
                if !trimmed.is_empty() {
                    return trimmed;
                }
            }
        }
        self.category.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn incident(category: IncidentCategory, custom: Option<&str>) -> Incident {
        Incident {
            id: Uuid::new_v4(),
            category,
            custom_category: custom.map(str::to_owned),
            severity: Severity::High,
            actions_taken: vec![StandardAction::CheckedLogs],
            custom_actions: None,
            description: None,
            affected_systems: Vec::new(),
            estimated_impact: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn custom_category_requires_a_label() {
        let missing = incident(IncidentCategory::Custom, None);
        assert!(missing.validate().is_err());

        let blank = incident(IncidentCategory::Custom, Some("   "));
        assert!(blank.validate().is_err());

        let named = incident(IncidentCategory::Custom, Some("CDN meltdown"));
        assert!(named.validate().is_ok());
        assert_eq!(named.category_label(), "CDN meltdown");
    }

    #[test]
    fn builtin_categories_ignore_custom_label() {
        let it = incident(IncidentCategory::Database, Some("ignored"));
        assert!(it.validate().is_ok());
        assert_eq!(it.category_label(), "Database Issue");
    }

    #[test]
    fn severity_round_trips_through_wire_tokens() {
        for severity in [Severity::Low, Severity::Medium, Severity::High] {
            assert_eq!(Severity::try_from(severity.as_str()), Ok(severity));
        }
        assert!(Severity::try_from("urgent").is_err());
    }
}
