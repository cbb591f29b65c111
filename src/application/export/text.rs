//! Plain-text emitter.
//!
//! Produces the fixed-width report and doubles as the clipboard payload.
//! Lines are not hard-wrapped; viewers and paste targets handle that.

use time::OffsetDateTime;

use crate::application::export::{
    RenderError,
    blocks::{self, Block, DocumentPlan},
};
use crate::domain::sop::{CompletedSteps, Sop};

const RULE_WIDTH: usize = 72;

pub fn render(
    sop: &Sop,
    completed: &CompletedSteps,
    generated_at: OffsetDateTime,
) -> Result<String, RenderError> {
    let plan = blocks::build_document_plan(sop, completed, generated_at);
    Ok(render_plan(&plan))
}

fn render_plan(plan: &DocumentPlan) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&rule);
    out.push('\n');
    out.push_str("STANDARD OPERATING PROCEDURE\n");
    out.push_str(&plan.title);
    out.push('\n');
    out.push_str(&format!("Risk Classification: {}\n", plan.risk_label));
    out.push_str(&format!("Generated: {}\n", plan.generated_on));

    for block in &plan.blocks {
        match block {
            Block::Heading(text) => {
                out.push('\n');
                out.push_str(&rule);
                out.push('\n');
                out.push_str(&text.to_uppercase());
                out.push_str("\n\n");
            }
            Block::Paragraph(text) => {
                out.push_str(text);
                out.push('\n');
            }
            Block::Field { label, value } => {
                out.push_str(&format!("{label}: {value}\n"));
            }
            Block::Bullets(items) => {
                for item in items {
                    out.push_str(&format!("- {item}\n"));
                }
            }
            Block::Step(card) => {
                out.push_str(&format!("{}. {}\n", card.ordinal, card.title));
                if !card.description.is_empty() {
                    out.push_str(&format!("   {}\n", card.description));
                }
                out.push_str(&format!(
                    "   Owner: {} | Duration: {} | Priority: {}\n",
                    card.owner, card.duration, card.priority
                ));
            }
        }
    }

    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        incident::Severity,
        sop::{Sop, SopStep},
    };
    use time::macros::datetime;
    use uuid::Uuid;

    fn step(id: &str, title: &str) -> SopStep {
        SopStep {
            id: id.to_owned(),
            title: title.to_owned(),
            description: "Follow the runbook.".to_owned(),
            estimated_duration: Some("10 min".to_owned()),
            responsible: None,
            priority: None,
            completed: false,
        }
    }

    fn sop() -> Sop {
        Sop {
            id: Uuid::nil(),
            title: "SOP: Database Issue Response Procedure".to_owned(),
            trigger: "Replication lag exceeds five minutes.".to_owned(),
            immediate_steps: vec![step("step_1", "Check replica status")],
            preventive_actions: vec![step("prev_1", "Tune autovacuum")],
            responsible_team: "Operations Team".to_owned(),
            severity: Severity::Medium,
            category_label: "Database Issue".to_owned(),
            created_at: datetime!(2025-02-01 08:00 UTC),
        }
    }

    #[test]
    fn report_carries_banner_and_section_rules() {
        let text = render(&sop(), &CompletedSteps::new(), datetime!(2025-02-02 12:00 UTC))
            .expect("text render");
        assert!(text.starts_with(&"=".repeat(72)));
        assert!(text.contains("STANDARD OPERATING PROCEDURE"));
        assert!(text.contains("Risk Classification: MODERATE"));
        assert!(text.contains("\nIMMEDIATE ACTION STEPS\n"));
        assert!(text.contains("1. Check replica status\n"));
        assert!(text.contains("Owner: Operations Team | Duration: 10 min | Priority: HIGH"));
        assert!(text.ends_with(&format!("{}\n", "=".repeat(72))));
    }

    #[test]
    fn completed_step_carries_the_marker() {
        let completed = CompletedSteps::from_ids(["prev_1"]);
        let text = render(&sop(), &completed, datetime!(2025-02-02 12:00 UTC)).expect("text render");
        assert!(text.contains("1. Tune autovacuum [DONE]\n"));
        assert!(text.contains("1. Check replica status\n"));
    }

    #[test]
    fn same_inputs_render_identical_bytes() {
        let completed = CompletedSteps::from_ids(["step_1"]);
        let at = datetime!(2025-02-02 12:00 UTC);
        let first = render(&sop(), &completed, at).expect("text render");
        let second = render(&sop(), &completed, at).expect("text render");
        assert_eq!(first, second);
    }
}
