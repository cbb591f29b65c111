//! sopforge turns free-form incident reports into Standard Operating
//! Procedure documents: generation through a generative-language API,
//! an interactive checklist UI, and export to PDF, DOCX, HTML, or
//! clipboard text from a single format-neutral document plan.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
