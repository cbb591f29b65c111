//! PDF emitter.
//!
//! Assembles the document object by object with `lopdf`: base-14 Helvetica
//! with WinAnsi encoding, one content stream per page, and a footer pass
//! stamped once the final page count is known. All positioning goes through
//! the [`layout`] cursor so the footer band is never painted over.

use lopdf::{
    Document, Object, Stream, StringFormat,
    content::{Content, Operation},
    dictionary,
};
use time::OffsetDateTime;

use crate::application::export::{
    RenderError,
    blocks::{self, Block, DocumentPlan, StepCard},
    layout::{self, PageCursor},
};
use crate::domain::sop::{CompletedSteps, Sop};

const TITLE_SIZE: f32 = 18.0;
const KICKER_SIZE: f32 = 8.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;
const META_SIZE: f32 = 8.0;

const BANNER_HEIGHT: f32 = 24.0;
const CARD_PAD: f32 = 8.0;
const CARD_INSET: f32 = 10.0;
const BULLET_INDENT: f32 = 14.0;

type Rgb = (f32, f32, f32);

const INK: Rgb = (0.12, 0.16, 0.22);
const GRAY: Rgb = (0.42, 0.45, 0.50);
const RULE_GRAY: Rgb = (0.90, 0.91, 0.92);
const CARD_FILL: Rgb = (0.976, 0.980, 0.984);
const CARD_EDGE: Rgb = (0.90, 0.91, 0.92);
const DONE_FILL: Rgb = (0.941, 0.992, 0.957);
const DONE_EDGE: Rgb = (0.086, 0.639, 0.290);
const WHITE: Rgb = (1.0, 1.0, 1.0);

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

pub fn render(
    sop: &Sop,
    completed: &CompletedSteps,
    generated_at: OffsetDateTime,
) -> Result<Vec<u8>, RenderError> {
    let plan = blocks::build_document_plan(sop, completed, generated_at);
    let pages = paint_pages(&plan);
    assemble(pages)
}

/// One content stream under construction.
struct PagePainter {
    ops: Vec<Operation>,
}

impl PagePainter {
    fn new() -> Self {
        Self { ops: Vec::new() }
    }

    fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.name().into(), real(size)]));
        self.ops.push(Operation::new("Td", vec![real(x), real(y)]));
        self.ops.push(Operation::new(
            "rg",
            vec![real(color.0), real(color.1), real(color.2)],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_winansi(text),
                StringFormat::Literal,
            )],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.ops.push(Operation::new(
            "rg",
            vec![real(color.0), real(color.1), real(color.2)],
        ));
        self.ops.push(Operation::new(
            "re",
            vec![real(x), real(y), real(width), real(height)],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb, line: f32) {
        self.ops.push(Operation::new(
            "RG",
            vec![real(color.0), real(color.1), real(color.2)],
        ));
        self.ops.push(Operation::new("w", vec![real(line)]));
        self.ops.push(Operation::new(
            "re",
            vec![real(x), real(y), real(width), real(height)],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, width: f32) {
        self.ops.push(Operation::new(
            "RG",
            vec![real(color.0), real(color.1), real(color.2)],
        ));
        self.ops.push(Operation::new("w", vec![real(width)]));
        self.ops.push(Operation::new("m", vec![real(x1), real(y1)]));
        self.ops.push(Operation::new("l", vec![real(x2), real(y2)]));
        self.ops.push(Operation::new("S", vec![]));
    }
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

/// WinAnsi covers the first 256 codepoints closely enough for this report;
/// anything outside becomes `?`. Generated copy is ASCII, so this only
/// touches free text that arrived from the model.
fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let codepoint = c as u32;
            if codepoint <= 0xFF { codepoint as u8 } else { b'?' }
        })
        .collect()
}

fn hex_rgb(hex: &str) -> Rgb {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| -> f32 {
        digits
            .get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .unwrap_or(0) as f32
            / 255.0
    };
    (channel(0..2), channel(2..4), channel(4..6))
}

fn painter_for(pages: &mut Vec<PagePainter>, page: usize) -> &mut PagePainter {
    while pages.len() <= page {
        pages.push(PagePainter::new());
    }
    &mut pages[page]
}

fn paint_pages(plan: &DocumentPlan) -> Vec<PagePainter> {
    let accent = hex_rgb(&plan.accent_color);
    let width = layout::content_width();
    let mut pages = vec![PagePainter::new()];
    let mut cursor = PageCursor::new();

    paint_banner(plan, accent, &mut pages, &mut cursor);

    for block in &plan.blocks {
        match block {
            Block::Heading(text) => {
                let estimate = layout::line_height(HEADING_SIZE) + 12.0;
                cursor.ensure_room(estimate);
                let painter = painter_for(&mut pages, cursor.page());
                cursor.advance(layout::line_height(HEADING_SIZE));
                painter.text(
                    layout::MARGIN,
                    cursor.baseline(),
                    Font::Bold,
                    HEADING_SIZE,
                    INK,
                    text,
                );
                cursor.advance(4.0);
                painter.line(
                    layout::MARGIN,
                    cursor.baseline(),
                    layout::MARGIN + width,
                    cursor.baseline(),
                    accent,
                    1.2,
                );
                cursor.advance(8.0);
            }
            Block::Paragraph(text) => {
                let lines = layout::wrap(text, BODY_SIZE, width);
                let estimate =
                    lines.len() as f32 * layout::line_height(BODY_SIZE) + 6.0;
                cursor.ensure_room(estimate);
                let painter = painter_for(&mut pages, cursor.page());
                for line in &lines {
                    cursor.advance(layout::line_height(BODY_SIZE));
                    painter.text(
                        layout::MARGIN,
                        cursor.baseline(),
                        Font::Regular,
                        BODY_SIZE,
                        INK,
                        line,
                    );
                }
                cursor.advance(6.0);
            }
            Block::Field { label, value } => {
                let label_text = format!("{label}: ");
                let label_width = layout::text_width(&label_text, BODY_SIZE);
                let lines = layout::wrap(value, BODY_SIZE, width - label_width);
                let line_count = lines.len().max(1);
                let estimate =
                    line_count as f32 * layout::line_height(BODY_SIZE) + 3.0;
                cursor.ensure_room(estimate);
                let painter = painter_for(&mut pages, cursor.page());
                cursor.advance(layout::line_height(BODY_SIZE));
                painter.text(
                    layout::MARGIN,
                    cursor.baseline(),
                    Font::Bold,
                    BODY_SIZE,
                    INK,
                    &label_text,
                );
                if let Some(first) = lines.first() {
                    painter.text(
                        layout::MARGIN + label_width,
                        cursor.baseline(),
                        Font::Regular,
                        BODY_SIZE,
                        INK,
                        first,
                    );
                }
                for line in lines.iter().skip(1) {
                    cursor.advance(layout::line_height(BODY_SIZE));
                    painter.text(
                        layout::MARGIN + label_width,
                        cursor.baseline(),
                        Font::Regular,
                        BODY_SIZE,
                        INK,
                        line,
                    );
                }
                cursor.advance(3.0);
            }
            Block::Bullets(items) => {
                for item in items {
                    let lines =
                        layout::wrap(item, BODY_SIZE, width - BULLET_INDENT);
                    let estimate =
                        lines.len() as f32 * layout::line_height(BODY_SIZE) + 3.0;
                    cursor.ensure_room(estimate);
                    let painter = painter_for(&mut pages, cursor.page());
                    for (index, line) in lines.iter().enumerate() {
                        cursor.advance(layout::line_height(BODY_SIZE));
                        if index == 0 {
                            painter.text(
                                layout::MARGIN + 2.0,
                                cursor.baseline(),
                                Font::Regular,
                                BODY_SIZE,
                                INK,
                                "-",
                            );
                        }
                        painter.text(
                            layout::MARGIN + BULLET_INDENT,
                            cursor.baseline(),
                            Font::Regular,
                            BODY_SIZE,
                            INK,
                            line,
                        );
                    }
                    cursor.advance(3.0);
                }
                cursor.advance(4.0);
            }
            Block::Step(card) => {
                paint_step_card(card, width, &mut pages, &mut cursor);
            }
        }
    }

    let total = pages.len();
    for (index, painter) in pages.iter_mut().enumerate() {
        paint_footer(painter, plan, index + 1, total);
    }
    pages
}

fn paint_banner(
    plan: &DocumentPlan,
    accent: Rgb,
    pages: &mut Vec<PagePainter>,
    cursor: &mut PageCursor,
) {
    let width = layout::content_width();
    let painter = painter_for(pages, cursor.page());

    cursor.advance(layout::line_height(KICKER_SIZE));
    painter.text(
        layout::MARGIN,
        cursor.baseline(),
        Font::Regular,
        KICKER_SIZE,
        GRAY,
        "STANDARD OPERATING PROCEDURE",
    );
    cursor.advance(2.0);

    for line in layout::wrap(&plan.title, TITLE_SIZE, width) {
        cursor.advance(layout::line_height(TITLE_SIZE));
        painter.text(
            layout::MARGIN,
            cursor.baseline(),
            Font::Bold,
            TITLE_SIZE,
            INK,
            &line,
        );
    }

    cursor.advance(6.0);
    let banner_top = cursor.offset();
    painter.fill_rect(
        layout::MARGIN,
        layout::PAGE_HEIGHT - banner_top - BANNER_HEIGHT,
        width,
        BANNER_HEIGHT,
        accent,
    );
    let text_baseline = layout::PAGE_HEIGHT - banner_top - BANNER_HEIGHT + 8.0;
    painter.text(
        layout::MARGIN + CARD_INSET,
        text_baseline,
        Font::Bold,
        BODY_SIZE,
        WHITE,
        &plan.risk_label,
    );
    let generated = format!("Generated: {}", plan.generated_on);
    let generated_x = layout::MARGIN + width
        - CARD_INSET
        - layout::text_width(&generated, META_SIZE);
    painter.text(
        generated_x,
        text_baseline,
        Font::Regular,
        META_SIZE,
        WHITE,
        &generated,
    );
    cursor.advance(BANNER_HEIGHT + 14.0);
}

fn paint_step_card(
    card: &StepCard,
    width: f32,
    pages: &mut Vec<PagePainter>,
    cursor: &mut PageCursor,
) {
    let inner_width = width - 2.0 * CARD_INSET;
    let title = format!("{}. {}", card.ordinal, card.title);
    let title_lines = layout::wrap(&title, BODY_SIZE, inner_width);
    let desc_lines = layout::wrap(&card.description, BODY_SIZE, inner_width);
    let meta = format!(
        "Owner: {} | Duration: {} | Priority: {}",
        card.owner, card.duration, card.priority
    );
    let meta_lines = layout::wrap(&meta, META_SIZE, inner_width);

    let inner_height = (title_lines.len() + desc_lines.len()) as f32
        * layout::line_height(BODY_SIZE)
        + meta_lines.len() as f32 * layout::line_height(META_SIZE);
    let card_height = inner_height + 2.0 * CARD_PAD;
    cursor.ensure_room(card_height + 6.0);

    let painter = painter_for(pages, cursor.page());
    let top = cursor.offset();
    let rect_y = layout::PAGE_HEIGHT - top - card_height;
    let (fill, edge) = if card.done {
        (DONE_FILL, DONE_EDGE)
    } else {
        (CARD_FILL, CARD_EDGE)
    };
    painter.fill_rect(layout::MARGIN, rect_y, width, card_height, fill);
    painter.stroke_rect(layout::MARGIN, rect_y, width, card_height, edge, 0.8);

    cursor.advance(CARD_PAD);
    let text_x = layout::MARGIN + CARD_INSET;
    for line in &title_lines {
        cursor.advance(layout::line_height(BODY_SIZE));
        painter.text(text_x, cursor.baseline(), Font::Bold, BODY_SIZE, INK, line);
    }
    for line in &desc_lines {
        cursor.advance(layout::line_height(BODY_SIZE));
        painter.text(
            text_x,
            cursor.baseline(),
            Font::Regular,
            BODY_SIZE,
            INK,
            line,
        );
    }
    for line in &meta_lines {
        cursor.advance(layout::line_height(META_SIZE));
        painter.text(text_x, cursor.baseline(), Font::Regular, META_SIZE, GRAY, line);
    }
    cursor.advance(CARD_PAD + 6.0);
}

fn paint_footer(painter: &mut PagePainter, plan: &DocumentPlan, page: usize, total: usize) {
    let width = layout::content_width();
    let rule_y = layout::MARGIN + layout::FOOTER_RESERVE - 8.0;
    painter.line(
        layout::MARGIN,
        rule_y,
        layout::MARGIN + width,
        rule_y,
        RULE_GRAY,
        0.8,
    );
    let text_y = rule_y - 12.0;
    let left = format!("Generated {} | {}", plan.generated_on, plan.risk_label);
    painter.text(
        layout::MARGIN,
        text_y,
        Font::Regular,
        META_SIZE,
        GRAY,
        &left,
    );
    let page_label = format!("Page {page} of {total}");
    let page_x =
        layout::MARGIN + width - layout::text_width(&page_label, META_SIZE);
    painter.text(page_x, text_y, Font::Regular, META_SIZE, GRAY, &page_label);
}

fn assemble(pages: Vec<PagePainter>) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_regular,
            "F2" => font_bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    let page_count = pages.len();
    for painter in pages {
        let content = Content {
            operations: painter.ops,
        };
        let stream_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => stream_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            real(layout::PAGE_WIDTH),
            real(layout::PAGE_HEIGHT),
        ],
    };
    doc.objects
        .insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
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
            description: "A reasonably verbose description so cards have body text \
                          and wrapping gets exercised on narrow widths."
                .to_owned(),
            estimated_duration: Some("10 min".to_owned()),
            responsible: None,
            priority: None,
            completed: false,
        }
    }

    fn sop(immediate: usize, preventive: usize) -> Sop {
        Sop {
            id: Uuid::nil(),
            title: "SOP: Server Down Response Procedure".to_owned(),
            trigger: "Health checks fail across two availability zones.".to_owned(),
            immediate_steps: (1..=immediate)
                .map(|n| step(&format!("step_{n}"), &format!("Immediate step {n}")))
                .collect(),
            preventive_actions: (1..=preventive)
                .map(|n| step(&format!("prev_{n}"), &format!("Preventive action {n}")))
                .collect(),
            responsible_team: "Operations Team".to_owned(),
            severity: Severity::High,
            category_label: "Server Down".to_owned(),
            created_at: datetime!(2025-05-01 00:00 UTC),
        }
    }

    #[test]
    fn produces_a_parseable_single_page_document() {
        let bytes = render(
            &sop(2, 2),
            &CompletedSteps::new(),
            datetime!(2025-05-02 00:00 UTC),
        )
        .expect("pdf render");
        assert!(bytes.starts_with(b"%PDF"));

        let doc = Document::load_mem(&bytes).expect("reload pdf");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn long_documents_spill_onto_multiple_pages_with_footers() {
        let bytes = render(
            &sop(14, 14),
            &CompletedSteps::new(),
            datetime!(2025-05-02 00:00 UTC),
        )
        .expect("pdf render");
        let doc = Document::load_mem(&bytes).expect("reload pdf");
        let pages = doc.get_pages();
        assert!(pages.len() > 1, "28 step cards cannot fit one A4 page");

        let first = pages.values().next().copied().expect("first page id");
        let content = doc.get_page_content(first).expect("page content");
        let haystack = String::from_utf8_lossy(&content);
        assert!(haystack.contains(&format!("Page 1 of {}", pages.len())));
    }

    #[test]
    fn winansi_replaces_unencodable_characters() {
        assert_eq!(encode_winansi("abc"), b"abc".to_vec());
        assert_eq!(encode_winansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_winansi("done \u{2713}"), b"done ?".to_vec());
    }

    #[test]
    fn accent_hex_parses_to_unit_range() {
        let (r, g, b) = hex_rgb("#dc2626");
        assert!((r - 0.863).abs() < 0.01);
        assert!(g < r && b < r);
        assert_eq!(hex_rgb("bogus"), (0.0, 0.0, 0.0));
    }
}
