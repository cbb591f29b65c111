//! Print layout arithmetic for the PDF emitter.
//!
//! Heights are estimates: wrapped line count times a fixed line factor, with
//! glyph widths approximated at half an em. That is deliberate policy, not a
//! shortcut to fix later; the emitter accepts a block that overflows after it
//! has started and never backtracks.

/// A4 in PostScript points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

pub const MARGIN: f32 = 48.0;
/// Band at the bottom of every page kept free for the footer line.
pub const FOOTER_RESERVE: f32 = 36.0;

pub const LINE_FACTOR: f32 = 1.15;
const GLYPH_FACTOR: f32 = 0.5;

pub fn content_width() -> f32 {
    PAGE_WIDTH - 2.0 * MARGIN
}

pub fn line_height(font_size: f32) -> f32 {
    font_size * LINE_FACTOR
}

/// Estimated advance width of `text` at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * GLYPH_FACTOR
}

/// Greedy word wrap against the estimated glyph width. A single word wider
/// than `max_width` gets its own line and is allowed to overflow.
pub fn wrap(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate_width = text_width(&current, font_size)
            + text_width(" ", font_size)
            + text_width(word, font_size);
        if candidate_width > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Estimated height of `text` wrapped at `max_width`.
pub fn text_height(text: &str, font_size: f32, max_width: f32) -> f32 {
    wrap(text, font_size, max_width).len() as f32 * line_height(font_size)
}

/// Lowest top-based offset at which a block may still start.
pub fn start_floor() -> f32 {
    PAGE_HEIGHT - MARGIN - FOOTER_RESERVE
}

/// Top-based vertical cursor across pages.
///
/// `offset` grows downward from the top edge; [`PageCursor::baseline`]
/// converts to the bottom-origin coordinate PDF content streams use.
#[derive(Debug, Clone, Copy)]
pub struct PageCursor {
    page: usize,
    offset: f32,
}

impl PageCursor {
    pub fn new() -> Self {
        Self {
            page: 0,
            offset: MARGIN,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// PDF y coordinate of the current cursor position.
    pub fn baseline(&self) -> f32 {
        PAGE_HEIGHT - self.offset
    }

    /// Breaks to a fresh page when `estimate` does not fit above the footer
    /// band. Returns true when a break happened so the caller can start a
    /// new content stream.
    pub fn ensure_room(&mut self, estimate: f32) -> bool {
        if self.offset + estimate > start_floor() && self.offset > MARGIN {
            self.page += 1;
            self.offset = MARGIN;
            return true;
        }
        false
    }

    pub fn advance(&mut self, height: f32) {
        self.offset += height;
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_is_greedy_and_keeps_long_words_whole() {
        let lines = wrap("alpha beta gamma delta", 10.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(!line.is_empty());
        }

        let lines = wrap("supercalifragilistic", 10.0, 20.0);
        assert_eq!(lines, vec!["supercalifragilistic".to_owned()]);

        assert!(wrap("   ", 10.0, 100.0).is_empty());
    }

    #[test]
    fn text_height_scales_with_line_count() {
        let one = text_height("short", 10.0, 400.0);
        let many = text_height(
            "a considerably longer paragraph that will certainly wrap into \
             several lines at this width",
            10.0,
            120.0,
        );
        assert_eq!(one, line_height(10.0));
        assert!(many > one * 2.0);
    }

    #[test]
    fn blocks_never_start_below_the_footer_band() {
        let mut cursor = PageCursor::new();
        let heights = [120.0, 300.0, 45.0, 610.0, 12.0, 500.0, 90.0, 240.0];
        for estimate in heights {
            cursor.ensure_room(estimate);
            assert!(
                cursor.offset() <= start_floor(),
                "block started at {} past floor {}",
                cursor.offset(),
                start_floor()
            );
            cursor.advance(estimate);
        }
        assert!(cursor.page() > 0);
    }

    #[test]
    fn oversized_block_breaks_once_and_overflows() {
        let mut cursor = PageCursor::new();
        cursor.advance(200.0);
        let broke = cursor.ensure_room(PAGE_HEIGHT * 2.0);
        assert!(broke);
        assert_eq!(cursor.offset(), MARGIN);
        let broke_again = cursor.ensure_room(PAGE_HEIGHT * 2.0);
        assert!(!broke_again, "a block at the top of a page must be accepted");
    }

    #[test]
    fn ensure_room_is_a_no_op_when_content_fits() {
        let mut cursor = PageCursor::new();
        assert!(!cursor.ensure_room(100.0));
        assert_eq!(cursor.page(), 0);
        assert_eq!(cursor.offset(), MARGIN);
    }
}
