//! DOCX emitter.
//!
//! Builds the smallest WordprocessingML package a word processor accepts:
//! content types, one package relationship, and `word/document.xml`. Word
//! paginates natively, so no layout pass runs here.

use std::io::{Cursor, Write};

use time::OffsetDateTime;
use zip::{CompressionMethod, write::SimpleFileOptions, write::ZipWriter};

use crate::application::export::{
    RenderError,
    blocks::{self, Block, DocumentPlan},
};
use crate::domain::sop::{CompletedSteps, Sop};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>
"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>
"#;

const GRAY: &str = "6B7280";

// Font sizes in half-points.
const SIZE_KICKER: u16 = 18;
const SIZE_TITLE: u16 = 40;
const SIZE_HEADING: u16 = 28;
const SIZE_BODY: u16 = 22;
const SIZE_META: u16 = 18;

pub fn render(
    sop: &Sop,
    completed: &CompletedSteps,
    generated_at: OffsetDateTime,
) -> Result<Vec<u8>, RenderError> {
    let plan = blocks::build_document_plan(sop, completed, generated_at);
    let document = document_xml(&plan);

    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    archive.start_file("[Content_Types].xml", options)?;
    archive.write_all(CONTENT_TYPES.as_bytes())?;
    archive.start_file("_rels/.rels", options)?;
    archive.write_all(PACKAGE_RELS.as_bytes())?;
    archive.start_file("word/document.xml", options)?;
    archive.write_all(document.as_bytes())?;

    Ok(archive.finish()?.into_inner())
}

struct Run<'a> {
    text: &'a str,
    size: u16,
    bold: bool,
    italic: bool,
    color: Option<&'a str>,
}

impl<'a> Run<'a> {
    fn plain(text: &'a str, size: u16) -> Self {
        Self {
            text,
            size,
            bold: false,
            italic: false,
            color: None,
        }
    }

    fn bold(text: &'a str, size: u16) -> Self {
        Self {
            bold: true,
            ..Self::plain(text, size)
        }
    }

    fn colored(text: &'a str, size: u16, color: &'a str) -> Self {
        Self {
            color: Some(color),
            ..Self::plain(text, size)
        }
    }
}

fn paragraph(xml: &mut String, props: &str, runs: &[Run<'_>]) {
    xml.push_str("<w:p>");
    if !props.is_empty() {
        xml.push_str("<w:pPr>");
        xml.push_str(props);
        xml.push_str("</w:pPr>");
    }
    for run in runs {
        xml.push_str("<w:r><w:rPr>");
        if run.bold {
            xml.push_str("<w:b/>");
        }
        if run.italic {
            xml.push_str("<w:i/>");
        }
        xml.push_str(&format!("<w:sz w:val=\"{}\"/>", run.size));
        if let Some(color) = run.color {
            xml.push_str(&format!("<w:color w:val=\"{color}\"/>"));
        }
        xml.push_str("</w:rPr><w:t xml:space=\"preserve\">");
        xml.push_str(&xml_escape(run.text));
        xml.push_str("</w:t></w:r>");
    }
    xml.push_str("</w:p>");
}

fn document_xml(plan: &DocumentPlan) -> String {
    let accent = plan.accent_color.trim_start_matches('#').to_uppercase();
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>",
    );

    paragraph(
        &mut xml,
        "",
        &[Run::colored(
            "STANDARD OPERATING PROCEDURE",
            SIZE_KICKER,
            GRAY,
        )],
    );
    paragraph(
        &mut xml,
        "<w:spacing w:after=\"120\"/>",
        &[Run::bold(&plan.title, SIZE_TITLE)],
    );
    let banner_meta = format!(" | Generated: {}", plan.generated_on);
    paragraph(
        &mut xml,
        "<w:spacing w:after=\"240\"/>",
        &[
            Run {
                bold: true,
                ..Run::colored(&plan.risk_label, SIZE_BODY, &accent)
            },
            Run::colored(&banner_meta, SIZE_META, GRAY),
        ],
    );

    for block in &plan.blocks {
        match block {
            Block::Heading(text) => {
                paragraph(
                    &mut xml,
                    "<w:spacing w:before=\"240\" w:after=\"120\"/>",
                    &[Run {
                        bold: true,
                        ..Run::colored(text, SIZE_HEADING, &accent)
                    }],
                );
            }
            Block::Paragraph(text) => {
                paragraph(
                    &mut xml,
                    "<w:spacing w:after=\"120\"/>",
                    &[Run::plain(text, SIZE_BODY)],
                );
            }
            Block::Field { label, value } => {
                let label = format!("{label}: ");
                paragraph(
                    &mut xml,
                    "",
                    &[Run::bold(&label, SIZE_BODY), Run::plain(value, SIZE_BODY)],
                );
            }
            Block::Bullets(items) => {
                for item in items {
                    let line = format!("- {item}");
                    paragraph(
                        &mut xml,
                        "<w:ind w:left=\"360\"/>",
                        &[Run::plain(&line, SIZE_BODY)],
                    );
                }
            }
            Block::Step(card) => {
                let title = format!("{}. {}", card.ordinal, card.title);
                paragraph(
                    &mut xml,
                    "<w:spacing w:before=\"120\"/>",
                    &[Run::bold(&title, SIZE_BODY)],
                );
                if !card.description.is_empty() {
                    paragraph(
                        &mut xml,
                        "<w:ind w:left=\"360\"/>",
                        &[Run::plain(&card.description, SIZE_BODY)],
                    );
                }
                let meta = format!(
                    "Owner: {} | Duration: {} | Priority: {}",
                    card.owner, card.duration, card.priority
                );
                paragraph(
                    &mut xml,
                    "<w:ind w:left=\"360\"/>",
                    &[Run {
                        italic: true,
                        ..Run::colored(&meta, SIZE_META, GRAY)
                    }],
                );
            }
        }
    }

    // A4 with a 2cm margin, in twentieths of a point.
    xml.push_str(
        "<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>\
         <w:pgMar w:top=\"1134\" w:right=\"1134\" w:bottom=\"1134\" w:left=\"1134\"/>\
         </w:sectPr></w:body></w:document>",
    );
    xml
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
