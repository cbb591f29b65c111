//! Decoding of raw model output into a generated SOP shape.
//!
//! Models wrap JSON in markdown fences or chat around it, so decoding first
//! strips fences and slices out the outermost object. Failures here are
//! never surfaced to callers; the service substitutes the fallback SOP.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::sop::StepPriority;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoJsonObject,
    #[error("model JSON did not match the SOP shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("model SOP has an empty `{list}` list")]
    EmptyList { list: &'static str },
}

/// SOP as the model wrote it. Wire names accept both snake_case and the
/// camelCase some models prefer.
#[derive(Debug, Deserialize)]
pub struct GeneratedSop {
    pub title: String,
    pub trigger: String,
    #[serde(alias = "immediateSteps")]
    pub immediate_steps: Vec<GeneratedStep>,
    #[serde(alias = "preventiveActions")]
    pub preventive_actions: Vec<GeneratedStep>,
    #[serde(alias = "responsibleTeam")]
    pub responsible_team: String,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedStep {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "estimatedDuration")]
    pub estimated_duration: Option<String>,
    #[serde(default, alias = "responsibleParty")]
    pub responsible: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl GeneratedStep {
    /// Priority tokens arrive in whatever casing the model chose; anything
    /// unrecognizable falls back to the render-time default.
    pub fn parsed_priority(&self) -> Option<StepPriority> {
        self.priority
            .as_deref()
            .map(str::trim)
            .map(str::to_ascii_lowercase)
            .and_then(|token| StepPriority::try_from(token.as_str()).ok())
    }
}

pub fn decode_generated_sop(raw: &str) -> Result<GeneratedSop, ParseError> {
    let stripped = strip_code_fences(raw);
    let object = extract_json_object(stripped).ok_or(ParseError::NoJsonObject)?;
    let generated: GeneratedSop = serde_json::from_str(object)?;
    if generated.immediate_steps.is_empty() {
        return Err(ParseError::EmptyList {
            list: "immediate_steps",
        });
    }
    if generated.preventive_actions.is_empty() {
        return Err(ParseError::EmptyList {
            list: "preventive_actions",
        });
    }
    Ok(generated)
}

/// Drops a leading ```/```json line and a trailing ``` line if present.
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.split_once('\n') {
            Some((_lang, body)) => body,
            None => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Slice from the first `{` to the last `}`, inclusive. Good enough for a
/// single object surrounded by chat; nested braces inside the object are
/// balanced by construction.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "title": "SOP: Server Down Response Procedure",
        "trigger": "Service health checks fail",
        "immediate_steps": [
            {"title": "Check status page", "description": "Look", "priority": "HIGH"}
        ],
        "preventive_actions": [
            {"title": "Add monitoring", "estimatedDuration": "2 days"}
        ],
        "responsible_team": "Platform Team"
    }"#;

    #[test]
    fn decodes_a_plain_json_object() {
        let sop = decode_generated_sop(VALID).expect("decode");
        assert_eq!(sop.title, "SOP: Server Down Response Procedure");
        assert_eq!(sop.immediate_steps.len(), 1);
        assert_eq!(
            sop.immediate_steps[0].parsed_priority(),
            Some(StepPriority::High)
        );
        assert_eq!(
            sop.preventive_actions[0].estimated_duration.as_deref(),
            Some("2 days")
        );
    }

    #[test]
    fn strips_markdown_fences_and_surrounding_chat() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(decode_generated_sop(&fenced).is_ok());

        let chatty = format!("Sure! Here is the procedure you asked for:\n{VALID}\nHope it helps.");
        assert!(decode_generated_sop(&chatty).is_ok());
    }

    #[test]
    fn camel_case_list_names_are_accepted() {
        let camel = r#"{
            "title": "t", "trigger": "g",
            "immediateSteps": [{"title": "a"}],
            "preventiveActions": [{"title": "b"}],
            "responsibleTeam": "Ops"
        }"#;
        let sop = decode_generated_sop(camel).expect("decode");
        assert_eq!(sop.responsible_team, "Ops");
    }

    #[test]
    fn rejects_prose_missing_fields_and_empty_lists() {
        assert!(matches!(
            decode_generated_sop("I could not produce a procedure."),
            Err(ParseError::NoJsonObject)
        ));
        assert!(matches!(
            decode_generated_sop(r#"{"title": "t"}"#),
            Err(ParseError::Shape(_))
        ));
        let empty = r#"{
            "title": "t", "trigger": "g",
            "immediate_steps": [],
            "preventive_actions": [{"title": "b"}],
            "responsible_team": "Ops"
        }"#;
        assert!(matches!(
            decode_generated_sop(empty),
            Err(ParseError::EmptyList { list: "immediate_steps" })
        ));
    }

    #[test]
    fn unknown_priority_tokens_fall_back_to_none() {
        let step = GeneratedStep {
            title: "t".to_owned(),
            description: String::new(),
            estimated_duration: None,
            responsible: None,
            priority: Some("urgent".to_owned()),
        };
        assert_eq!(step.parsed_priority(), None);
    }
}
