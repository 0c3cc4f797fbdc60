mod layout;
mod table;

use chrono::{DateTime, NaiveDateTime};
use pdf_writer::{Filter, Name, Pdf, Rect, Ref};

use crate::config::ReportConfig;
use crate::fonts::{self, Fonts};
use crate::model::{PLACEHOLDER, ReportRequest, TestRow, remark_text};

use layout::{
    Align, BODY_SIZE, CENTER_X, FOOTER_SIZE, FOOTER_Y, HEADER_ADVANCE, INFO_GAP,
    INFO_HEADING_ADVANCE, INFO_LINE_SPACING, INFO_RIGHT_X, INFO_ROWS, LOGO_HEIGHT, LOGO_WIDTH,
    MARGIN_X, PAGE_HEIGHT, PAGE_WIDTH, PageComposer, RIGHT_EDGE_X, SECTION_HEADING_ADVANCE,
    SECTION_SIZE, TABLE_GAP_AFTER, TABLE_START_GAP, TEXT_LINE_HEIGHT, TEXT_WRAP_WIDTH, TIMESTAMP_DROP,
    TITLE_DROP, TITLE_SIZE, TITLE_X, draw_text, wrap_text,
};
use table::{BodyRow, render_table};

const REPORT_TITLE: &str = "ALLERGY TEST REPORT";
const DISCLAIMER: &str = "This report is generated electronically and is valid without signature.";

#[derive(Debug)]
struct Logo {
    pdf_name: &'static str,
    xobject_ref: Ref,
}

#[derive(Debug)]
enum LogoError {
    /// The bytes match no known image container.
    Unrecognized,
    Unsupported(image::ImageFormat),
    Decode(image::ImageError),
}

impl std::fmt::Display for LogoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogoError::Unrecognized => write!(f, "unrecognized image data"),
            LogoError::Unsupported(format) => write!(f, "unsupported image format {format:?}"),
            LogoError::Decode(e) => write!(f, "image failed to decode: {e}"),
        }
    }
}

/// Lay out the whole report. Regions run strictly in order (header, patient
/// info, results table, interpretation); the footer pass runs last because
/// the total page count is only known once everything is placed.
pub(crate) fn render(request: &ReportRequest, results_text: &str, config: &ReportConfig) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    let fonts = fonts::register_builtin(&mut pdf, &mut alloc);

    // Logo failures are cosmetic: log the outcome and render without one.
    let logo = match config.effective_logo() {
        Some(data) => match embed_logo(&mut pdf, &mut alloc, data) {
            Ok(logo) => Some(logo),
            Err(e) => {
                log::warn!("skipping report logo: {e}");
                None
            }
        },
        None => None,
    };

    let mut composer = PageComposer::new();
    render_header(&mut composer, &fonts, logo.as_ref(), &request.generated_at);
    render_patient_info(&mut composer, &fonts, request);
    render_results(&mut composer, &fonts, &request.test_items);
    render_interpretation(&mut composer, &fonts, results_text);

    let mut contents = composer.finish();
    let total = contents.len();
    for (i, content) in contents.iter_mut().enumerate() {
        draw_footer(content, &fonts, i + 1, total);
    }

    let page_ids: Vec<Ref> = (0..total).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..total).map(|_| alloc()).collect();

    for (i, content) in contents.into_iter().enumerate() {
        pdf.stream(content_ids[i], &content.finish());
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(total as i32);

    for i in 0..total {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[i]);
        {
            let mut resources = page.resources();
            {
                let mut font_res = resources.fonts();
                for (name, font_ref) in fonts.resource_pairs() {
                    font_res.pair(Name(name.as_bytes()), font_ref);
                }
            }
            if let Some(logo) = &logo {
                resources
                    .x_objects()
                    .pair(Name(logo.pdf_name.as_bytes()), logo.xobject_ref);
            }
        }
    }

    let bytes = pdf.finish();
    log::info!("Laid out {total} page(s), {} bytes", bytes.len());
    bytes
}

/// Logo band on the left, centred title and generation stamp to its right.
fn render_header(composer: &mut PageComposer, fonts: &Fonts, logo: Option<&Logo>, generated_at: &str) {
    let top = composer.cursor();
    if let Some(logo) = logo {
        let content = composer.content();
        content.save_state();
        content.transform([
            LOGO_WIDTH,
            0.0,
            0.0,
            LOGO_HEIGHT,
            MARGIN_X,
            PAGE_HEIGHT - (top + LOGO_HEIGHT),
        ]);
        content.x_object(Name(logo.pdf_name.as_bytes()));
        content.restore_state();
    }

    draw_text(
        composer.content(),
        &fonts.bold,
        TITLE_SIZE,
        Align::Center,
        TITLE_X,
        top + TITLE_DROP,
        REPORT_TITLE,
    );
    let stamp = format!("Generated on: {}", long_timestamp(generated_at));
    draw_text(
        composer.content(),
        &fonts.regular,
        BODY_SIZE,
        Align::Center,
        TITLE_X,
        top + TIMESTAMP_DROP,
        &stamp,
    );
    composer.set_cursor(top + HEADER_ADVANCE);
}

/// Two parallel columns of five labelled fields each. Blank fields render
/// the placeholder dash, so the grid height never varies.
fn render_patient_info(composer: &mut PageComposer, fonts: &Fonts, request: &ReportRequest) {
    let cursor = composer.cursor();
    draw_text(
        composer.content(),
        &fonts.bold,
        SECTION_SIZE,
        Align::Left,
        MARGIN_X,
        cursor,
        "Patient Information",
    );
    composer.advance(INFO_HEADING_ADVANCE);

    let (left, right) = request.info_columns();
    let top = composer.cursor();
    for (i, line) in left.iter().enumerate() {
        draw_text(
            composer.content(),
            &fonts.regular,
            BODY_SIZE,
            Align::Left,
            MARGIN_X,
            top + i as f32 * INFO_LINE_SPACING,
            line,
        );
    }
    for (i, line) in right.iter().enumerate() {
        draw_text(
            composer.content(),
            &fonts.regular,
            BODY_SIZE,
            Align::Left,
            INFO_RIGHT_X,
            top + i as f32 * INFO_LINE_SPACING,
            line,
        );
    }
    composer.advance(INFO_ROWS as f32 * INFO_LINE_SPACING + INFO_GAP);
}

fn render_results(composer: &mut PageComposer, fonts: &Fonts, items: &[TestRow]) {
    composer.break_if_at_limit();
    let cursor = composer.cursor();
    draw_text(
        composer.content(),
        &fonts.bold,
        SECTION_SIZE,
        Align::Left,
        MARGIN_X,
        cursor,
        "Test Results",
    );
    composer.advance(SECTION_HEADING_ADVANCE + TABLE_START_GAP);

    let body: Vec<BodyRow> = items
        .iter()
        .map(|item| match item {
            TestRow::Heading { label } => BodyRow::Merged(if label.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                label.clone()
            }),
            TestRow::Data {
                row_label,
                antigen,
                wheal_diameter,
                is_positive,
            } => BodyRow::Cells([
                row_label.or_dash().to_string(),
                antigen.or_dash().to_string(),
                wheal_diameter.or_dash().to_string(),
                remark_text(*is_positive).to_string(),
            ]),
        })
        .collect();

    render_table(composer, fonts, &body);
    composer.advance(TABLE_GAP_AFTER);
}

/// The wrapped free-text block. Before each line the composer is consulted,
/// so text flowing past the limit continues on a fresh page.
fn render_interpretation(composer: &mut PageComposer, fonts: &Fonts, results_text: &str) {
    composer.break_if_at_limit();
    let cursor = composer.cursor();
    draw_text(
        composer.content(),
        &fonts.bold,
        SECTION_SIZE,
        Align::Left,
        MARGIN_X,
        cursor,
        "Results / Interpretation",
    );
    composer.advance(SECTION_HEADING_ADVANCE);

    for line in wrap_text(results_text, &fonts.regular, BODY_SIZE, TEXT_WRAP_WIDTH) {
        composer.break_if_at_limit();
        let cursor = composer.cursor();
        draw_text(
            composer.content(),
            &fonts.regular,
            BODY_SIZE,
            Align::Left,
            MARGIN_X,
            cursor,
            &line,
        );
        composer.advance(TEXT_LINE_HEIGHT);
    }
}

fn draw_footer(content: &mut pdf_writer::Content, fonts: &Fonts, page: usize, total: usize) {
    draw_text(
        content,
        &fonts.regular,
        FOOTER_SIZE,
        Align::Center,
        CENTER_X,
        FOOTER_Y,
        DISCLAIMER,
    );
    draw_text(
        content,
        &fonts.regular,
        FOOTER_SIZE,
        Align::Right,
        RIGHT_EDGE_X,
        FOOTER_Y,
        &format!("Page {page} of {total}"),
    );
}

/// "August 6, 2026 at 3:45 PM". Derived only from the supplied timestamp so
/// re-rendering the same request stays byte-identical; anything unparseable
/// is shown verbatim.
fn long_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map(|dt| dt.format("%B %-d, %Y at %-I:%M %p").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Embed the logo as an image XObject. JPEG data passes through with a
/// `DctDecode` filter; PNG is decoded and recompressed as raw zlib pixels
/// with an optional soft mask for transparency.
fn embed_logo(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    data: &[u8],
) -> Result<Logo, LogoError> {
    let reader = image::ImageReader::new(std::io::Cursor::new(data))
        .with_guessed_format()
        .map_err(|_| LogoError::Unrecognized)?;
    let format = reader.format().ok_or(LogoError::Unrecognized)?;

    let xobject_ref = match format {
        image::ImageFormat::Jpeg => {
            let (width, height) = reader.into_dimensions().map_err(LogoError::Decode)?;
            let xobject_ref = alloc();
            let mut xobj = pdf.image_xobject(xobject_ref, data);
            xobj.filter(Filter::DctDecode);
            xobj.width(width as i32);
            xobj.height(height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            xobject_ref
        }
        image::ImageFormat::Png => {
            let decoded = reader.decode().map_err(LogoError::Decode)?;
            let rgba = decoded.to_rgba8();
            let (width, height) = (rgba.width(), rgba.height());
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

            let rgb: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
            let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb, 6);

            let smask_ref = if has_alpha {
                let alpha: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(width as i32);
                mask.height(height as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                Some(mask_ref)
            } else {
                None
            };

            let xobject_ref = alloc();
            let mut xobj = pdf.image_xobject(xobject_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(width as i32);
            xobj.height(height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
            xobject_ref
        }
        other => return Err(LogoError::Unsupported(other)),
    };

    Ok(Logo {
        pdf_name: "Im1",
        xobject_ref,
    })
}
