use pdf_writer::{Content, Name, Str};

use crate::fonts::{FontEntry, to_winansi_bytes};

/// Points per millimetre. The layout grid is specified in millimetres,
/// matching the paper coordinates the report was designed on.
pub(super) const MM: f32 = 72.0 / 25.4;

// A4 portrait.
pub(super) const PAGE_WIDTH: f32 = 210.0 * MM;
pub(super) const PAGE_HEIGHT: f32 = 297.0 * MM;

/// Left content margin; the info grid and table hang off this edge.
pub(super) const MARGIN_X: f32 = 14.0 * MM;
/// Cursor position at the top of the first page.
pub(super) const FIRST_PAGE_TOP: f32 = 15.0 * MM;
/// Cursor position after a page break.
pub(super) const CONTINUATION_TOP: f32 = 20.0 * MM;
/// Baselines at or past this offset move to a fresh page; everything below
/// is reserved for the footer.
pub(super) const PAGE_BREAK_LIMIT: f32 = 275.0 * MM;
/// Footer baseline.
pub(super) const FOOTER_Y: f32 = 285.0 * MM;
/// Horizontal centre of the page, where the footer disclaimer sits.
pub(super) const CENTER_X: f32 = 105.0 * MM;
/// Right edge the page-number label aligns against.
pub(super) const RIGHT_EDGE_X: f32 = 190.0 * MM;

// Header region.
pub(super) const LOGO_WIDTH: f32 = 40.0 * MM;
pub(super) const LOGO_HEIGHT: f32 = 20.0 * MM;
/// Title column centre, clear of the logo band on the left.
pub(super) const TITLE_X: f32 = 115.0 * MM;
pub(super) const TITLE_DROP: f32 = 10.0 * MM;
pub(super) const TIMESTAMP_DROP: f32 = 18.0 * MM;
pub(super) const HEADER_ADVANCE: f32 = 40.0 * MM;

// Patient info grid: two columns of exactly INFO_ROWS lines each.
pub(super) const INFO_HEADING_ADVANCE: f32 = 8.0 * MM;
pub(super) const INFO_RIGHT_X: f32 = 105.0 * MM;
pub(super) const INFO_LINE_SPACING: f32 = 6.0 * MM;
pub(super) const INFO_ROWS: usize = 5;
pub(super) const INFO_GAP: f32 = 10.0 * MM;

// Results table and interpretation block.
pub(super) const SECTION_HEADING_ADVANCE: f32 = 6.0 * MM;
pub(super) const TABLE_START_GAP: f32 = 2.0 * MM;
pub(super) const TABLE_GAP_AFTER: f32 = 10.0 * MM;
pub(super) const TEXT_WRAP_WIDTH: f32 = 180.0 * MM;
pub(super) const TEXT_LINE_HEIGHT: f32 = 5.0 * MM;

// Font sizes, in points.
pub(super) const TITLE_SIZE: f32 = 16.0;
pub(super) const SECTION_SIZE: f32 = 12.0;
pub(super) const BODY_SIZE: f32 = 10.0;
pub(super) const TABLE_SIZE: f32 = 9.0;
pub(super) const FOOTER_SIZE: f32 = 9.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum Align {
    Left,
    Center,
    Right,
}

/// Draw one line of text. `y` is the baseline offset from the page top;
/// centred/right-aligned text is positioned relative to `x` using the
/// measured width.
pub(super) fn draw_text(
    content: &mut Content,
    font: &FontEntry,
    size: f32,
    align: Align,
    x: f32,
    y: f32,
    text: &str,
) {
    let x = match align {
        Align::Left => x,
        Align::Center => x - font.text_width(text, size) / 2.0,
        Align::Right => x - font.text_width(text, size),
    };
    let bytes = to_winansi_bytes(text);
    content
        .begin_text()
        .set_font(Name(font.pdf_name.as_bytes()), size)
        .next_line(x, PAGE_HEIGHT - y)
        .show(Str(&bytes))
        .end_text();
}

/// Greedy word wrap against a fixed width. Explicit newlines are respected;
/// a single word wider than the limit gets a line of its own rather than
/// being split mid-word.
pub(super) fn wrap_text(text: &str, font: &FontEntry, size: f32, max_width: f32) -> Vec<String> {
    let space_w = font.space_width(size);
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut current_w = 0.0f32;
        for word in raw_line.split_whitespace() {
            let word_w = font.text_width(word, size);
            if current.is_empty() {
                current.push_str(word);
                current_w = word_w;
            } else if current_w + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_w = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_w += space_w + word_w;
            }
        }
        lines.push(current);
    }
    lines
}

/// Owns the cursor and the page set for one render call. Every region that
/// can cross a page boundary consults this one authority, so the table and
/// the free-text block can never disagree about where a page ends.
pub(super) struct PageComposer {
    finished: Vec<Content>,
    current: Content,
    cursor: f32,
}

impl PageComposer {
    pub(super) fn new() -> Self {
        PageComposer {
            finished: Vec::new(),
            current: Content::new(),
            cursor: FIRST_PAGE_TOP,
        }
    }

    /// Vertical offset from the page top where the next element lands.
    pub(super) fn cursor(&self) -> f32 {
        self.cursor
    }

    pub(super) fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    pub(super) fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    pub(super) fn content(&mut self) -> &mut Content {
        &mut self.current
    }

    pub(super) fn start_new_page(&mut self) {
        self.finished
            .push(std::mem::replace(&mut self.current, Content::new()));
        self.cursor = CONTINUATION_TOP;
        log::debug!("started page {}", self.finished.len() + 1);
    }

    fn at_page_top(&self) -> bool {
        (self.cursor - FIRST_PAGE_TOP).abs() < 0.5 || (self.cursor - CONTINUATION_TOP).abs() < 0.5
    }

    /// Page break before drawing a baseline at the cursor. The limit is
    /// inclusive: a baseline landing exactly on it moves to the next page.
    pub(super) fn break_if_at_limit(&mut self) -> bool {
        if self.cursor >= PAGE_BREAK_LIMIT {
            self.start_new_page();
            true
        } else {
            false
        }
    }

    /// Page break before drawing a box of `height` below the cursor. A box
    /// taller than a whole page still draws at the top rather than breaking
    /// forever.
    pub(super) fn ensure_room(&mut self, height: f32) -> bool {
        if !self.at_page_top() && self.cursor + height > PAGE_BREAK_LIMIT {
            self.start_new_page();
            true
        } else {
            false
        }
    }

    pub(super) fn finish(mut self) -> Vec<Content> {
        self.finished.push(self.current);
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts;
    use pdf_writer::{Pdf, Ref};

    fn test_fonts() -> fonts::Fonts {
        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };
        fonts::register_builtin(&mut pdf, &mut alloc)
    }

    #[test]
    fn break_limit_is_inclusive() {
        let mut composer = PageComposer::new();
        composer.set_cursor(PAGE_BREAK_LIMIT);
        assert!(composer.break_if_at_limit());
        assert_eq!(composer.cursor(), CONTINUATION_TOP);

        let mut composer = PageComposer::new();
        composer.set_cursor(PAGE_BREAK_LIMIT - 0.1);
        assert!(!composer.break_if_at_limit());
    }

    #[test]
    fn ensure_room_breaks_unless_already_at_top() {
        let mut composer = PageComposer::new();
        composer.set_cursor(PAGE_BREAK_LIMIT - 10.0);
        assert!(composer.ensure_room(20.0));
        assert_eq!(composer.cursor(), CONTINUATION_TOP);

        // An oversized box at a fresh page top draws without another break.
        assert!(!composer.ensure_room(2.0 * PAGE_HEIGHT));
    }

    #[test]
    fn finish_counts_started_pages() {
        let mut composer = PageComposer::new();
        composer.start_new_page();
        composer.start_new_page();
        assert_eq!(composer.finish().len(), 3);
    }

    #[test]
    fn wrapped_lines_fit_the_width() {
        let fonts = test_fonts();
        let text = "skin prick testing measures the wheal response to a panel \
                    of common antigens applied to the forearm";
        let lines = wrap_text(text, &fonts.regular, BODY_SIZE, 60.0 * MM);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(fonts.regular.text_width(line, BODY_SIZE) <= 60.0 * MM);
        }
        // round-trips every word in order
        let rejoined = lines.join(" ");
        assert_eq!(
            rejoined.split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn wrap_respects_explicit_newlines() {
        let fonts = test_fonts();
        let lines = wrap_text("first\n\nsecond", &fonts.regular, BODY_SIZE, TEXT_WRAP_WIDTH);
        assert_eq!(lines, vec!["first".to_string(), String::new(), "second".to_string()]);
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let fonts = test_fonts();
        let lines = wrap_text(
            "a Dermatophagoides-pteronyssinus b",
            &fonts.regular,
            BODY_SIZE,
            10.0 * MM,
        );
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Dermatophagoides-pteronyssinus");
    }
}
