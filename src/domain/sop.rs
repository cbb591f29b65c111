//! Standard Operating Procedure model.
//!
//! A `Sop` is produced once by generation and then only ever read: the
//! checklist page, the export engine, and the JSON API all borrow it.
//! Completion state lives outside the document in [`CompletedSteps`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{error::DomainError, incident::Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPriority {
    High,
    Medium,
    Low,
}

impl StepPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            StepPriority::High => "high",
            StepPriority::Medium => "medium",
            StepPriority::Low => "low",
        }
    }

    /// Upper-case form used in rendered documents.
    pub fn display_label(self) -> &'static str {
        match self {
            StepPriority::High => "HIGH",
            StepPriority::Medium => "MEDIUM",
            StepPriority::Low => "LOW",
        }
    }
}

impl TryFrom<&str> for StepPriority {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "high" => Ok(StepPriority::High),
            "medium" => Ok(StepPriority::Medium),
            "low" => Ok(StepPriority::Low),
            _ => Err(()),
        }
    }
}

/// One checklist entry in either the immediate or the preventive list.
///
/// `completed` is whatever the generator happened to emit; rendering always
/// consults the caller-supplied [`CompletedSteps`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SopStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_duration: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub priority: Option<StepPriority>,
    #[serde(default)]
    pub completed: bool,
}

/// Stable id for the Nth immediate step (1-based).
pub fn immediate_step_id(ordinal: usize) -> String {
    format!("step_{ordinal}")
}

/// Stable id for the Nth preventive action (1-based).
pub fn preventive_step_id(ordinal: usize) -> String {
    format!("prev_{ordinal}")
}

// Wire names are camelCase end to end: the checklist page embeds this
// serialization and posts it back through the export API unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sop {
    pub id: Uuid,
    pub title: String,
    pub trigger: String,
    pub immediate_steps: Vec<SopStep>,
    pub preventive_actions: Vec<SopStep>,
    pub responsible_team: String,
    pub severity: Severity,
    pub category_label: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Sop {
    /// Both step lists must be non-empty before the document is displayed or
    /// exported. Generation guarantees this; payloads arriving over the API
    /// are re-checked.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.immediate_steps.is_empty() {
            return Err(DomainError::validation(
                "SOP has no immediate action steps",
            ));
        }
        if self.preventive_actions.is_empty() {
            return Err(DomainError::validation("SOP has no preventive actions"));
        }
        Ok(())
    }

    pub fn total_steps(&self) -> usize {
        self.immediate_steps.len() + self.preventive_actions.len()
    }

    /// Percentage of steps (across both lists) whose id is in `completed`,
    /// rounded to the nearest whole percent. Ids in the set that do not name
    /// a step in this document are ignored.
    pub fn completion_percent(&self, completed: &CompletedSteps) -> u8 {
        let total = self.total_steps();
        if total == 0 {
            return 0;
        }
        let done = self
            .immediate_steps
            .iter()
            .chain(&self.preventive_actions)
            .filter(|step| completed.contains(&step.id))
            .count();
        ((done as f64 / total as f64) * 100.0).round() as u8
    }
}

/// Caller-owned snapshot of which step ids are ticked off.
///
/// The export engine and the views only ever borrow this; toggling happens
/// on the client and a fresh set is posted with each export request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedSteps(BTreeSet<String>);

impl CompletedSteps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.0.insert(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
