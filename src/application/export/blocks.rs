//! Format-neutral document plan.
//!
//! `build_document_plan` walks an SOP exactly once and produces the ordered
//! blocks every emitter consumes. All user-visible text is finalized here:
//! step defaults are filled in, priorities are upper-cased, and the
//! completion marker is appended. Emitters only decide typography, never
//! wording, which is what keeps the four formats textually identical.

use time::{OffsetDateTime, UtcOffset, macros::format_description};

use crate::domain::{
    incident::Severity,
    policy,
    sop::{CompletedSteps, Sop, SopStep},
};

/// Literal suffix appended to a step title when the step is ticked off.
/// ASCII on purpose so the marker survives every encoding the emitters use.
pub const COMPLETION_MARKER: &str = " [DONE]";

pub const DEFAULT_IMMEDIATE_OWNER: &str = "Operations Team";
pub const DEFAULT_PREVENTIVE_OWNER: &str = "DevOps Team";
pub const DEFAULT_DURATION: &str = "TBD";

#[derive(Debug, Clone, PartialEq)]
pub struct StepCard {
    pub id: String,
    pub ordinal: usize,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub duration: String,
    pub priority: String,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    Field { label: String, value: String },
    Bullets(Vec<String>),
    Step(StepCard),
}

/// Everything an emitter needs: banner metadata plus the ordered blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPlan {
    pub title: String,
    pub severity: Severity,
    pub risk_label: String,
    pub accent_color: String,
    pub generated_on: String,
    pub completion_percent: u8,
    pub blocks: Vec<Block>,
}

pub fn build_document_plan(
    sop: &Sop,
    completed: &CompletedSteps,
    generated_at: OffsetDateTime,
) -> DocumentPlan {
    let severity = sop.severity;
    let severity_label = severity.label().to_uppercase();
    let risk = policy::risk_label(severity);
    let generated_on = format_timestamp(generated_at);
    let percent = sop.completion_percent(completed);
    let done = sop
        .immediate_steps
        .iter()
        .chain(&sop.preventive_actions)
        .filter(|step| completed.contains(&step.id))
        .count();

    let mut blocks = Vec::new();

    blocks.push(Block::Heading("Classification".to_owned()));
    blocks.push(field("Severity", severity_label));
    blocks.push(field("Category", sop.category_label.clone()));
    blocks.push(field("Responsible Team", sop.responsible_team.clone()));

    blocks.push(Block::Heading("Executive Summary".to_owned()));
    blocks.push(Block::Paragraph(format!(
        "This Standard Operating Procedure covers the response to {} incidents of {} severity. \
         It defines {} immediate action steps and {} preventive actions. \
         {}% of the checklist was complete when this document was generated.",
        sop.category_label,
        severity.label().to_uppercase(),
        sop.immediate_steps.len(),
        sop.preventive_actions.len(),
        percent,
    )));

    blocks.push(Block::Heading("Risk Assessment".to_owned()));
    blocks.push(field("Risk Classification", risk.to_owned()));
    blocks.push(Block::Paragraph(risk_narrative(severity).to_owned()));

    blocks.push(Block::Heading("Trigger Condition".to_owned()));
    blocks.push(Block::Paragraph(sop.trigger.clone()));

    blocks.push(Block::Heading("Immediate Action Steps".to_owned()));
    for (index, step) in sop.immediate_steps.iter().enumerate() {
        blocks.push(Block::Step(step_card(
            step,
            index + 1,
            DEFAULT_IMMEDIATE_OWNER,
            "HIGH",
            completed,
        )));
    }

    blocks.push(Block::Heading("Escalation Ladder".to_owned()));
    blocks.push(Block::Bullets(vec![
        "Level 1: On-call engineer acknowledges the incident and starts triage.".to_owned(),
        format!(
            "Level 2: Escalate to the {} if there is no progress within 15 minutes.",
            sop.responsible_team
        ),
        format!(
            "Level 3: Engage engineering leadership and communicate status to stakeholders; \
             target resolution {}.",
            policy::resolution_target(severity)
        ),
    ]));

    blocks.push(Block::Heading("Preventive Actions".to_owned()));
    for (index, step) in sop.preventive_actions.iter().enumerate() {
        blocks.push(Block::Step(step_card(
            step,
            index + 1,
            DEFAULT_PREVENTIVE_OWNER,
            "MEDIUM",
            completed,
        )));
    }

    blocks.push(Block::Heading("Performance Metrics".to_owned()));
    blocks.push(field(
        "Target Resolution Time",
        policy::resolution_target(severity).to_owned(),
    ));
    blocks.push(field(
        "Availability Target",
        policy::availability_target(severity).to_owned(),
    ));
    blocks.push(field(
        "Checklist Completion",
        format!("{}% ({} of {} steps)", percent, done, sop.total_steps()),
    ));

    blocks.push(Block::Heading("Document Control".to_owned()));
    blocks.push(field("Document ID", sop.id.to_string()));
    blocks.push(field("Created", format_timestamp(sop.created_at)));
    blocks.push(field("Exported", generated_on.clone()));
    blocks.push(field("Owner", sop.responsible_team.clone()));
    blocks.push(field("Review Cycle", "After each activation".to_owned()));

    DocumentPlan {
        title: sop.title.clone(),
        severity,
        risk_label: risk.to_owned(),
        accent_color: policy::accent_color(severity).to_owned(),
        generated_on,
        completion_percent: percent,
        blocks,
    }
}

fn field(label: &str, value: String) -> Block {
    Block::Field {
        label: label.to_owned(),
        value,
    }
}

fn step_card(
    step: &SopStep,
    ordinal: usize,
    default_owner: &str,
    default_priority: &str,
    completed: &CompletedSteps,
) -> StepCard {
    let done = completed.contains(&step.id);
    let mut title = step.title.clone();
    if done {
        title.push_str(COMPLETION_MARKER);
    }
    let owner = step
        .responsible
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default_owner)
        .to_owned();
    let duration = step
        .estimated_duration
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_DURATION)
        .to_owned();
    let priority = step
        .priority
        .map(|p| p.display_label().to_owned())
        .unwrap_or_else(|| default_priority.to_owned());

    StepCard {
        id: step.id.clone(),
        ordinal,
        title,
        description: step.description.trim().to_owned(),
        owner,
        duration,
        priority,
        done,
    }
}

fn risk_narrative(severity: Severity) -> &'static str {
    match severity {
        Severity::High => {
            "Immediate engagement is mandatory. Unresolved incidents at this level risk a \
             material service outage with customer-facing impact."
        }
        Severity::Medium => {
            "Timely engagement is required. Unresolved incidents at this level degrade \
             service quality and can escalate if left unattended."
        }
        Severity::Low => {
            "Handle within normal operations. Impact is limited, but recurring incidents \
             should feed the preventive actions below."
        }
    }
}

fn format_timestamp(value: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    value
        .to_offset(UtcOffset::UTC)
        .format(&fmt)
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sop::{Sop, SopStep, StepPriority};
    use time::macros::datetime;
    use uuid::Uuid;

    fn step(id: &str, title: &str) -> SopStep {
        SopStep {
            id: id.to_owned(),
            title: title.to_owned(),
            description: "Do the thing.".to_owned(),
            estimated_duration: None,
            responsible: None,
            priority: None,
            completed: false,
        }
    }

    fn sample_sop() -> Sop {
        Sop {
            id: Uuid::nil(),
            title: "SOP: Server Down Response Procedure".to_owned(),
            trigger: "Primary health check fails for 3 consecutive probes.".to_owned(),
            immediate_steps: vec![step("step_1", "Assess impact"), step("step_2", "Mitigate")],
            preventive_actions: vec![step("prev_1", "Add alerting")],
            responsible_team: "Operations Team".to_owned(),
            severity: Severity::High,
            category_label: "Server Down".to_owned(),
            created_at: datetime!(2025-01-10 09:00 UTC),
        }
    }

    fn cards(plan: &DocumentPlan) -> Vec<&StepCard> {
        plan.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Step(card) => Some(card),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn marker_appended_only_for_completed_ids() {
        let sop = sample_sop();
        let completed = CompletedSteps::from_ids(["step_2"]);
        let plan = build_document_plan(&sop, &completed, datetime!(2025-01-15 14:30 UTC));

        let cards = cards(&plan);
        assert_eq!(cards[0].title, "Assess impact");
        assert_eq!(cards[1].title, format!("Mitigate{COMPLETION_MARKER}"));
        assert!(cards[1].done);
        assert!(!cards[2].done);
    }

    #[test]
    fn step_defaults_differ_per_list() {
        let mut sop = sample_sop();
        sop.immediate_steps[0].responsible = Some("DBA on call".to_owned());
        sop.immediate_steps[0].estimated_duration = Some("5 min".to_owned());
        sop.immediate_steps[0].priority = Some(StepPriority::Low);

        let plan = build_document_plan(&sop, &CompletedSteps::new(), datetime!(2025-01-15 14:30 UTC));
        let cards = cards(&plan);

        assert_eq!(cards[0].owner, "DBA on call");
        assert_eq!(cards[0].duration, "5 min");
        assert_eq!(cards[0].priority, "LOW");

        assert_eq!(cards[1].owner, DEFAULT_IMMEDIATE_OWNER);
        assert_eq!(cards[1].duration, DEFAULT_DURATION);
        assert_eq!(cards[1].priority, "HIGH");

        assert_eq!(cards[2].owner, DEFAULT_PREVENTIVE_OWNER);
        assert_eq!(cards[2].priority, "MEDIUM");
    }

    #[test]
    fn ordinals_restart_for_preventive_actions() {
        let sop = sample_sop();
        let plan = build_document_plan(&sop, &CompletedSteps::new(), datetime!(2025-01-15 14:30 UTC));
        let ordinals: Vec<usize> = cards(&plan).iter().map(|card| card.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 1]);
    }

    #[test]
    fn plan_is_deterministic_for_fixed_inputs() {
        let sop = sample_sop();
        let completed = CompletedSteps::from_ids(["prev_1"]);
        let at = datetime!(2025-01-15 14:30 UTC);
        assert_eq!(
            build_document_plan(&sop, &completed, at),
            build_document_plan(&sop, &completed, at)
        );
    }

    #[test]
    fn nine_sections_in_document_order() {
        let sop = sample_sop();
        let plan = build_document_plan(&sop, &CompletedSteps::new(), datetime!(2025-01-15 14:30 UTC));
        let headings: Vec<&str> = plan
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headings,
            vec![
                "Classification",
                "Executive Summary",
                "Risk Assessment",
                "Trigger Condition",
                "Immediate Action Steps",
                "Escalation Ladder",
                "Preventive Actions",
                "Performance Metrics",
                "Document Control",
            ]
        );
    }
}
