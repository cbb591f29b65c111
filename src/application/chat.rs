//! Operational Q&A chat service.
//!
//! Unlike SOP generation there is no fallback payload here: a failed model
//! call surfaces to the caller so the page can show a retry hint.

use std::sync::Arc;

use metrics::counter;
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::info;

use crate::application::generation::prompts;
use crate::domain::error::DomainError;
use crate::infra::llm::{LlmError, TextGenerator};

static MARKDOWN_OPTIONS: Lazy<comrak::Options<'static>> = Lazy::new(markdown_options);

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("chat answer failed upstream")]
    Llm(#[source] LlmError),
}

/// Answer in both shapes the callers need: raw markdown for the JSON API,
/// rendered HTML for the page.
#[derive(Debug, Clone)]
pub struct ChatAnswer {
    pub markdown: String,
    pub html: String,
}

#[derive(Clone)]
pub struct ChatService {
    generator: Arc<dyn TextGenerator>,
}

impl ChatService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn answer(&self, question: &str) -> Result<ChatAnswer, ChatError> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("question must not be blank").into());
        }

        let prompt = prompts::build_chat_prompt(trimmed);
        let markdown = match self.generator.generate(&prompt).await {
            Ok(markdown) => markdown,
            Err(err) => {
                counter!("sopforge_chat_total", "outcome" => "failed").increment(1);
                return Err(ChatError::Llm(err));
            }
        };
        counter!("sopforge_chat_total", "outcome" => "answered").increment(1);

        let html = comrak::markdown_to_html(&markdown, &MARKDOWN_OPTIONS);
        info!(question_chars = trimmed.len(), "chat question answered");
        Ok(ChatAnswer { markdown, html })
    }
}

/// Raw HTML in model output is escaped rather than passed through, so the
/// rendered answer can be embedded without a sanitiser pass.
fn markdown_options() -> comrak::Options<'static> {
    let mut options = comrak::Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;

    let render = &mut options.render;
    render.escape = true;
    render.gfm_quirks = true;

    options
}
