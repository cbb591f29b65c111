//! Prompt construction for SOP generation and chat.

use crate::domain::{incident::Incident, policy};

/// Preamble shared by every generation request. The wire format has no
/// system role, so it rides at the top of the prompt text.
const SOP_PREAMBLE: &str = "You are an experienced incident response engineer writing \
Standard Operating Procedures. Respond with JSON only: no prose, no markdown fences, \
no commentary before or after the object.";

const CHAT_PREAMBLE: &str = "You are an operations assistant for an incident response \
team. Answer concisely and practically. Markdown formatting is allowed.";

pub fn build_sop_prompt(incident: &Incident) -> String {
    let quota = policy::step_quota(incident.severity);
    let mut prompt = String::new();

    prompt.push_str(SOP_PREAMBLE);
    prompt.push_str("\n\nWrite a Standard Operating Procedure for the incident below.\n\n");
    prompt.push_str(&format!("Category: {}\n", incident.category_label()));
    prompt.push_str(&format!("Severity: {}\n", incident.severity.label()));

    if let Some(description) = trimmed(incident.description.as_deref()) {
        prompt.push_str(&format!("Description: {description}\n"));
    }
    if !incident.actions_taken.is_empty() {
        let actions: Vec<&str> = incident
            .actions_taken
            .iter()
            .map(|action| action.label())
            .collect();
        prompt.push_str(&format!("Actions already taken: {}\n", actions.join("; ")));
    }
    if let Some(custom) = trimmed(incident.custom_actions.as_deref()) {
        prompt.push_str(&format!("Other actions taken: {custom}\n"));
    }
    if !incident.affected_systems.is_empty() {
        prompt.push_str(&format!(
            "Affected systems: {}\n",
            incident.affected_systems.join(", ")
        ));
    }
    if let Some(impact) = trimmed(incident.estimated_impact.as_deref()) {
        prompt.push_str(&format!("Estimated impact: {impact}\n"));
    }

    prompt.push_str(&format!(
        "\nProvide exactly {quota} immediate response steps and {quota} preventive \
         actions. Every step needs a short imperative title, a one or two sentence \
         description, an estimated duration, a responsible party, and a priority of \
         high, medium, or low.\n"
    ));
    prompt.push_str(
        "\nReturn a JSON object with this exact shape:\n\
         {\n\
         \x20 \"title\": \"SOP: <category> Response Procedure\",\n\
         \x20 \"trigger\": \"<one sentence describing when to activate this SOP>\",\n\
         \x20 \"immediate_steps\": [\n\
         \x20   {\"title\": \"...\", \"description\": \"...\", \"estimated_duration\": \"...\", \
         \"responsible\": \"...\", \"priority\": \"high\"}\n\
         \x20 ],\n\
         \x20 \"preventive_actions\": [\n\
         \x20   {\"title\": \"...\", \"description\": \"...\", \"estimated_duration\": \"...\", \
         \"responsible\": \"...\", \"priority\": \"medium\"}\n\
         \x20 ],\n\
         \x20 \"responsible_team\": \"<team name>\"\n\
         }\n",
    );
    prompt
}

pub fn build_chat_prompt(question: &str) -> String {
    format!("{CHAT_PREAMBLE}\n\nQuestion: {}", question.trim())
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::incident::{IncidentCategory, Severity, StandardAction};
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn incident() -> Incident {
        Incident {
            id: Uuid::new_v4(),
            category: IncidentCategory::ServerDown,
            custom_category: None,
            severity: Severity::High,
            actions_taken: vec![StandardAction::RestartedService, StandardAction::CheckedLogs],
            custom_actions: None,
            description: Some("API pods crash looping after deploy".to_owned()),
            affected_systems: vec!["api-gateway".to_owned(), "billing".to_owned()],
            estimated_impact: Some("All checkout traffic".to_owned()),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn prompt_carries_incident_facts_and_quota() {
        let prompt = build_sop_prompt(&incident());
        assert!(prompt.contains("Category: Server Down"));
        assert!(prompt.contains("Severity: High"));
        assert!(prompt.contains("exactly 5 immediate response steps"));
        assert!(prompt.contains("Restarted the affected service; Checked system logs"));
        assert!(prompt.contains("api-gateway, billing"));
        assert!(prompt.contains("\"immediate_steps\""));
    }

    #[test]
    fn optional_sections_are_omitted_when_empty() {
        let mut bare = incident();
        bare.description = None;
        bare.actions_taken.clear();
        bare.affected_systems.clear();
        bare.estimated_impact = None;

        let prompt = build_sop_prompt(&bare);
        assert!(!prompt.contains("Description:"));
        assert!(!prompt.contains("Actions already taken:"));
        assert!(!prompt.contains("Affected systems:"));
        assert!(!prompt.contains("Estimated impact:"));
    }

    #[test]
    fn chat_prompt_wraps_the_question() {
        let prompt = build_chat_prompt("  How do I rotate the pager schedule?  ");
        assert!(prompt.starts_with(CHAT_PREAMBLE));
        assert!(prompt.ends_with("Question: How do I rotate the pager schedule?"));
    }
}
