use pdf_writer::Content;

use crate::fonts::{FontEntry, Fonts};

use super::layout::{
    Align, MARGIN_X, MM, PAGE_HEIGHT, PageComposer, TABLE_SIZE, draw_text, wrap_text,
};

/// Column widths spanning the printable width: row label, antigen, wheal
/// diameter, remarks.
const COL_WIDTHS: [f32; 4] = [24.0 * MM, 74.0 * MM, 44.0 * MM, 40.0 * MM];
/// Identity columns read left-aligned; measurements and remarks centred.
const COL_ALIGNS: [Align; 4] = [Align::Left, Align::Left, Align::Center, Align::Center];

const CELL_PADDING: f32 = 2.0 * MM;
const CELL_LINE_HEIGHT: f32 = TABLE_SIZE * 1.15;
/// Baseline drop from the top of a cell's text area.
const CELL_ASCENT: f32 = TABLE_SIZE * 0.75;

const HEAD_FILL_GRAY: f32 = 220.0 / 255.0;
const DIVIDER_FILL_GRAY: f32 = 240.0 / 255.0;
const RULE_WIDTH: f32 = 0.5;

pub(super) const TABLE_HEAD: [&str; 4] = ["Test Row", "Antigen", "Wheal Diameter (mm)", "Remarks"];

/// One laid-out table row: either four plain cells, or a single divider cell
/// spanning all columns.
pub(super) enum BodyRow {
    Cells([String; 4]),
    Merged(String),
}

fn table_width() -> f32 {
    COL_WIDTHS.iter().sum()
}

fn col_x(index: usize) -> f32 {
    MARGIN_X + COL_WIDTHS[..index].iter().sum::<f32>()
}

fn wrapped_cells(cells: &[String; 4], font: &FontEntry) -> [Vec<String>; 4] {
    let mut out: [Vec<String>; 4] = Default::default();
    for (i, cell) in cells.iter().enumerate() {
        out[i] = wrap_text(cell, font, TABLE_SIZE, COL_WIDTHS[i] - 2.0 * CELL_PADDING);
    }
    out
}

fn row_height(line_count: usize) -> f32 {
    2.0 * CELL_PADDING + line_count.max(1) as f32 * CELL_LINE_HEIGHT
}

/// Shade, rule, and fill one row box spanning the full table width.
fn draw_row_box(content: &mut Content, top: f32, height: f32, fill_gray: Option<f32>, col_edges: bool) {
    let y = PAGE_HEIGHT - (top + height);
    if let Some(gray) = fill_gray {
        content.set_fill_gray(gray);
        content.rect(MARGIN_X, y, table_width(), height);
        content.fill_nonzero();
        content.set_fill_gray(0.0);
    }
    content.save_state();
    content.set_line_width(RULE_WIDTH);
    content.rect(MARGIN_X, y, table_width(), height);
    content.stroke();
    if col_edges {
        for i in 1..COL_WIDTHS.len() {
            content.move_to(col_x(i), y);
            content.line_to(col_x(i), y + height);
            content.stroke();
        }
    }
    content.restore_state();
}

fn draw_cells(content: &mut Content, font: &FontEntry, top: f32, cells: &[Vec<String>; 4]) {
    for (i, lines) in cells.iter().enumerate() {
        for (line_no, line) in lines.iter().enumerate() {
            let y = top + CELL_PADDING + CELL_ASCENT + line_no as f32 * CELL_LINE_HEIGHT;
            let (x, align) = match COL_ALIGNS[i] {
                Align::Left => (col_x(i) + CELL_PADDING, Align::Left),
                _ => (col_x(i) + COL_WIDTHS[i] / 2.0, Align::Center),
            };
            draw_text(content, font, TABLE_SIZE, align, x, y, line);
        }
    }
}

fn draw_head(composer: &mut PageComposer, fonts: &Fonts) {
    let head: [String; 4] = TABLE_HEAD.map(str::to_string);
    let cells = wrapped_cells(&head, &fonts.bold);
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
    let height = row_height(lines);
    let top = composer.cursor();
    draw_row_box(composer.content(), top, height, Some(HEAD_FILL_GRAY), true);
    draw_cells(composer.content(), &fonts.bold, top, &cells);
    composer.advance(height);
}

/// Lay out the bordered results grid starting at the composer's cursor.
/// Paginates through the shared composer, repeating the head row at the top
/// of every continuation page, and leaves the cursor at the grid's final
/// vertical extent.
pub(super) fn render_table(composer: &mut PageComposer, fonts: &Fonts, body: &[BodyRow]) {
    composer.ensure_room(row_height(1) * 2.0);
    draw_head(composer, fonts);

    for row in body {
        match row {
            BodyRow::Cells(cells) => {
                let wrapped = wrapped_cells(cells, &fonts.regular);
                let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);
                let height = row_height(lines);
                if composer.ensure_room(height) {
                    draw_head(composer, fonts);
                }
                let top = composer.cursor();
                draw_row_box(composer.content(), top, height, None, true);
                draw_cells(composer.content(), &fonts.regular, top, &wrapped);
                composer.advance(height);
            }
            BodyRow::Merged(label) => {
                let lines = wrap_text(
                    label,
                    &fonts.bold,
                    TABLE_SIZE,
                    table_width() - 2.0 * CELL_PADDING,
                );
                let height = row_height(lines.len());
                if composer.ensure_room(height) {
                    draw_head(composer, fonts);
                }
                let top = composer.cursor();
                draw_row_box(composer.content(), top, height, Some(DIVIDER_FILL_GRAY), false);
                for (line_no, line) in lines.iter().enumerate() {
                    let y = top + CELL_PADDING + CELL_ASCENT + line_no as f32 * CELL_LINE_HEIGHT;
                    draw_text(
                        composer.content(),
                        &fonts.bold,
                        TABLE_SIZE,
                        Align::Center,
                        MARGIN_X + table_width() / 2.0,
                        y,
                        line,
                    );
                }
                composer.advance(height);
            }
        }
    }
}
