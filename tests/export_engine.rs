//! End-to-end coverage of the export engine: one block plan, four sinks.
//!
//! The wording checks grep every format a test can read back (plain text,
//! HTML, the DOCX document part, decompressed PDF content streams); the
//! clipboard payload is pinned with a snapshot.

use std::io::{Cursor, Read};

use insta::assert_snapshot;
use lopdf::Document;
use sopforge::application::export::{self, ExportFormat, ExportOutput, docx, html, pdf, text};
use sopforge::domain::{
    incident::Severity,
    sop::{CompletedSteps, Sop, SopStep},
};
use time::macros::datetime;
use uuid::Uuid;
use zip::ZipArchive;

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

fn server_down_sop() -> Sop {
    Sop {
        id: Uuid::nil(),
        title: "SOP: Server Down Response Procedure".to_owned(),
        trigger: "Health checks fail on the primary.".to_owned(),
        immediate_steps: vec![
            step("step_1", "Assess impact"),
            step("step_2", "Restart the service"),
        ],
        preventive_actions: vec![step("prev_1", "Add capacity alerts")],
        responsible_team: "Operations Team".to_owned(),
        severity: Severity::High,
        category_label: "Server Down".to_owned(),
        created_at: datetime!(2025-06-01 00:00 UTC),
    }
}

fn six_step_sop() -> Sop {
    Sop {
        immediate_steps: vec![
            step("step_1", "Assess impact"),
            step("step_2", "Restart the service"),
            step("step_3", "Verify recovery"),
        ],
        preventive_actions: vec![
            step("prev_1", "Add capacity alerts"),
            step("prev_2", "Automate failover"),
            step("prev_3", "Schedule a review"),
        ],
        ..server_down_sop()
    }
}

fn docx_document_part(bytes: Vec<u8>) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("zip archive");
    let mut part = archive.by_name("word/document.xml").expect("document part");
    let mut xml = String::new();
    part.read_to_string(&mut xml).expect("utf-8 part");
    xml
}

fn pdf_content_streams(bytes: &[u8]) -> String {
    let doc = Document::load_mem(bytes).expect("reload pdf");
    let mut streams = String::new();
    for page_id in doc.get_pages().into_values() {
        let content = doc.get_page_content(page_id).expect("page content");
        streams.push_str(&String::from_utf8_lossy(&content));
    }
    streams
}

#[test]
fn all_four_formats_carry_the_same_wording() {
    let sop = server_down_sop();
    let completed = CompletedSteps::from_ids(["step_1"]);
    let at = datetime!(2025-06-02 08:30 UTC);

    let text = text::render(&sop, &completed, at).expect("text render");
    let html = html::render(&sop, &completed, at).expect("html render");
    let docx = docx_document_part(docx::render(&sop, &completed, at).expect("docx render"));
    let pdf = pdf_content_streams(&pdf::render(&sop, &completed, at).expect("pdf render"));

    let summary = "This Standard Operating Procedure covers the response to Server Down \
                   incidents of HIGH severity. It defines 2 immediate action steps and \
                   1 preventive actions. 33% of the checklist was complete when this \
                   document was generated.";
    for haystack in [&text, &html, &docx] {
        assert!(haystack.contains("1. Assess impact [DONE]"));
        assert!(haystack.contains("2. Restart the service"));
        assert!(haystack.contains("Owner: Operations Team | Duration: 10 min | Priority: HIGH"));
        assert!(haystack.contains("Owner: DevOps Team | Duration: 10 min | Priority: MEDIUM"));
        assert!(haystack.contains("Generated: 2025-06-02 08:30 UTC"));
        assert!(haystack.contains(summary));
    }

    // Long paragraphs wrap in the PDF, so only single-line strings are
    // greppable there.
    assert!(pdf.contains("1. Assess impact [DONE]"));
    assert!(pdf.contains("Owner: Operations Team | Duration: 10 min | Priority: HIGH"));
    assert!(pdf.contains("Generated: 2025-06-02 08:30 UTC"));
}

#[test]
fn engine_output_is_identical_for_a_frozen_timestamp() {
    let sop = server_down_sop();
    let completed = CompletedSteps::from_ids(["step_1"]);
    let at = datetime!(2025-06-02 08:30 UTC);

    for format in ExportFormat::ALL {
        let first = export::export_document(&sop, &completed, format, at).expect("export");
        let second = export::export_document(&sop, &completed, format, at).expect("export");
        assert_eq!(
            first,
            second,
            "{} output drifted between renders",
            format.as_str()
        );
    }
}

#[test]
fn completion_accounting_counts_only_known_ids() {
    let sop = six_step_sop();
    let at = datetime!(2025-06-02 08:30 UTC);
    let completed = CompletedSteps::from_ids(["step_1", "prev_2"]);

    let text = text::render(&sop, &completed, at).expect("text render");
    assert_eq!(text.matches(" [DONE]").count(), 2);
    assert!(text.contains("1. Assess impact [DONE]\n"));
    assert!(text.contains("2. Automate failover [DONE]\n"));
    assert!(text.contains("Checklist Completion: 33% (2 of 6 steps)"));

    let with_ghosts = CompletedSteps::from_ids(["step_1", "prev_2", "step_99", "bogus"]);
    let second = text::render(&sop, &with_ghosts, at).expect("text render");
    assert_eq!(text, second, "ids that name no step must not change output");
}

#[test]
fn step_numbering_restarts_for_preventive_actions() {
    let sop = six_step_sop();
    let text = text::render(&sop, &CompletedSteps::new(), datetime!(2025-06-02 08:30 UTC))
        .expect("text render");

    for ordinal in ["\n1. ", "\n2. ", "\n3. "] {
        assert_eq!(
            text.matches(ordinal).count(),
            2,
            "ordinal {ordinal:?} must open a step in each list"
        );
    }
    assert!(!text.contains("\n4. "));
}

#[test]
fn policy_table_drives_risk_label_targets_and_accent() {
    let at = datetime!(2025-06-02 08:30 UTC);
    let cases = [
        (Severity::High, "CRITICAL", "< 30 minutes", "99.9%", "#dc2626"),
        (Severity::Medium, "MODERATE", "< 60 minutes", "99.5%", "#d97706"),
        (Severity::Low, "LOW", "< 120 minutes", "99.0%", "#16a34a"),
    ];

    for (severity, risk, target, availability, accent) in cases {
        let mut sop = server_down_sop();
        sop.severity = severity;

        let text = text::render(&sop, &CompletedSteps::new(), at).expect("text render");
        assert!(text.contains(&format!("Risk Classification: {risk}")));
        assert!(text.contains(&format!("Target Resolution Time: {target}")));
        assert!(text.contains(&format!("Availability Target: {availability}")));

        let html = html::render(&sop, &CompletedSteps::new(), at).expect("html render");
        assert!(html.contains(&format!("--accent: {accent};")));
    }
}

#[test]
fn long_checklists_paginate_the_pdf_with_a_footer_on_every_page() {
    let mut sop = server_down_sop();
    sop.immediate_steps = (1..=15)
        .map(|n| step(&format!("step_{n}"), &format!("Immediate step {n}")))
        .collect();
    sop.preventive_actions = (1..=15)
        .map(|n| step(&format!("prev_{n}"), &format!("Preventive action {n}")))
        .collect();

    let output = export::export_document(
        &sop,
        &CompletedSteps::new(),
        ExportFormat::Pdf,
        datetime!(2025-06-02 08:30 UTC),
    )
    .expect("export");
    let bytes = match output {
        ExportOutput::Document { bytes, .. } => bytes,
        ExportOutput::Clipboard { .. } => panic!("expected a document payload"),
    };
    assert!(bytes.starts_with(b"%PDF"));

    let doc = Document::load_mem(&bytes).expect("reload pdf");
    let pages = doc.get_pages();
    let total = pages.len();
    assert!(total > 1, "30 step cards cannot fit one A4 page");
    for (index, page_id) in pages.into_values().enumerate() {
        let content = doc.get_page_content(page_id).expect("page content");
        let haystack = String::from_utf8_lossy(&content);
        assert!(haystack.contains(&format!("Page {} of {total}", index + 1)));
    }
}

#[test]
fn clipboard_text_snapshot_is_stable() {
    let sop = server_down_sop();
    let completed = CompletedSteps::from_ids(["step_1"]);
    let text = text::render(&sop, &completed, datetime!(2025-06-02 08:30 UTC))
        .expect("text render");
    assert_snapshot!("clipboard_text", text);
}
