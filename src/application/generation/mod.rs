//! SOP generation service.
//!
//! Consumes an incident exactly once and always hands back a usable SOP or
//! a classed upstream error. A model call that succeeds but produces an
//! undecodable payload is absorbed by the fallback skeleton; callers never
//! see a parse failure.

pub mod parse;
pub mod prompts;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::domain::{
    error::DomainError,
    incident::Incident,
    sop::{self, Sop, SopStep},
};
use crate::infra::llm::{LlmError, TextGenerator};

use self::parse::{GeneratedSop, GeneratedStep};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("SOP generation failed upstream")]
    Llm(#[source] LlmError),
}

#[derive(Clone)]
pub struct GenerationService {
    generator: Arc<dyn TextGenerator>,
}

impl GenerationService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn generate(&self, incident: &Incident) -> Result<Sop, GenerationError> {
        incident.validate()?;

        let prompt = prompts::build_sop_prompt(incident);
        let started = Instant::now();
        let raw = match self.generator.generate(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                counter!("sopforge_generate_total", "outcome" => "failed").increment(1);
                return Err(GenerationError::Llm(err));
            }
        };
        histogram!("sopforge_generate_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        let sop = match parse::decode_generated_sop(&raw) {
            Ok(generated) => {
                counter!("sopforge_generate_total", "outcome" => "parsed").increment(1);
                assemble_sop(incident, generated)
            }
            Err(err) => {
                warn!(error = %err, "model payload rejected, substituting fallback SOP");
                counter!("sopforge_generate_total", "outcome" => "fallback").increment(1);
                fallback_sop(incident)
            }
        };

        info!(
            sop_id = %sop.id,
            immediate = sop.immediate_steps.len(),
            preventive = sop.preventive_actions.len(),
            "SOP generated"
        );
        Ok(sop)
    }
}

fn assemble_sop(incident: &Incident, generated: GeneratedSop) -> Sop {
    Sop {
        id: incident.id,
        title: generated.title,
        trigger: generated.trigger,
        immediate_steps: number_steps(generated.immediate_steps, sop::immediate_step_id),
        preventive_actions: number_steps(generated.preventive_actions, sop::preventive_step_id),
        responsible_team: generated.responsible_team,
        severity: incident.severity,
        category_label: incident.category_label().to_owned(),
        created_at: OffsetDateTime::now_utc(),
    }
}

/// Positional ids keep checklist state stable across renders no matter what
/// ids the model invented.
fn number_steps(steps: Vec<GeneratedStep>, id_for: fn(usize) -> String) -> Vec<SopStep> {
    steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| {
            let priority = step.parsed_priority();
            SopStep {
                id: id_for(index + 1),
                title: step.title,
                description: step.description,
                estimated_duration: step.estimated_duration,
                responsible: step.responsible,
                priority,
                completed: false,
            }
        })
        .collect()
}

/// Fixed skeleton used whenever the model payload cannot be decoded. Three
/// steps per list, generic enough for any category.
pub fn fallback_sop(incident: &Incident) -> Sop {
    let category = incident.category_label();
    let immediate = [
        (
            "Assess the current impact",
            "Confirm which systems and users are affected and how severely.",
            "10 min",
        ),
        (
            "Notify the response channel",
            "Page the on-call engineer and open an incident channel.",
            "5 min",
        ),
        (
            "Apply the standard mitigation",
            "Restart or roll back the affected component and verify recovery.",
            "20 min",
        ),
    ];
    let preventive = [
        (
            "Hold a post-incident review",
            "Walk through the timeline and record contributing factors.",
            "1 hour",
        ),
        (
            "Improve monitoring coverage",
            "Add alerts for the signals that would have caught this earlier.",
            "1 day",
        ),
        (
            "Update the runbook",
            "Fold what was learned into the standard procedure.",
            "2 hours",
        ),
    ];

    Sop {
        id: incident.id,
        title: format!("SOP: {category} Response Procedure"),
        trigger: format!(
            "A {} severity {category} incident has been reported.",
            incident.severity.as_str()
        ),
        immediate_steps: skeleton_steps(&immediate, sop::immediate_step_id),
        preventive_actions: skeleton_steps(&preventive, sop::preventive_step_id),
        responsible_team: "Operations Team".to_owned(),
        severity: incident.severity,
        category_label: category.to_owned(),
        created_at: OffsetDateTime::now_utc(),
    }
}

fn skeleton_steps(
    entries: &[(&str, &str, &str)],
    id_for: fn(usize) -> String,
) -> Vec<SopStep> {
    entries
        .iter()
        .enumerate()
        .map(|(index, (title, description, duration))| SopStep {
            id: id_for(index + 1),
            title: (*title).to_owned(),
            description: (*description).to_owned(),
            estimated_duration: Some((*duration).to_owned()),
            responsible: None,
            priority: None,
            completed: false,
        })
        .collect()
}
