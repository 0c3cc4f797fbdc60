use std::path::PathBuf;

use skinprick_report::{ReportConfig, ReportRequest};

/// The end-to-end scenario request: one divider row and one measurement.
pub fn jane_doe_request() -> ReportRequest {
    ReportRequest::from_json(
        r#"{
            "patientName": "Jane Doe",
            "patientId": "CH-1042",
            "age": 7,
            "sex": "F",
            "testName": "Skin Prick Panel",
            "doctorName": "Dr. Rao",
            "mobile": "98450 00000",
            "timeIn": "10:15",
            "timeOut": "10:45",
            "diagnosis": "Allergic rhinitis",
            "generatedAt": "2026-08-06T15:45:00",
            "testItems": [
                { "kind": "heading", "label": "Food Panel" },
                { "kind": "data", "rowLabel": "1", "antigen": "Peanut",
                  "whealDiameter": "8mm", "isPositive": true }
            ]
        }"#,
    )
    .expect("sample request parses")
}

pub fn render(request: &ReportRequest, results_text: &str) -> Vec<u8> {
    skinprick_report::render_report(request, results_text, &ReportConfig::default())
}

/// Scratch directory for written reports, kept out of the source tree.
pub fn output_dir() -> PathBuf {
    let dir = PathBuf::from("tests/output");
    std::fs::create_dir_all(&dir).expect("create tests/output");
    dir
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Total page count, read from the page tree's `/Count`.
pub fn page_count(pdf: &[u8]) -> usize {
    let pos = find(pdf, b"/Count ").expect("page tree present");
    pdf[pos + b"/Count ".len()..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0usize, |n, b| n * 10 + (b - b'0') as usize)
}

fn winansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| match c as u32 {
            0x0020..=0x007E => Some(c as u8),
            0x00A0..=0x00FF => Some(c as u8),
            0x2014 => Some(0x97), // em dash, the blank-field placeholder
            _ => None,
        })
        .collect()
}

fn literal_escaped(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}

fn hex(bytes: &[u8], upper: bool) -> Vec<u8> {
    let digits: &[u8; 16] = if upper {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(digits[(b >> 4) as usize]);
        out.push(digits[(b & 0x0F) as usize]);
    }
    out
}

/// Every byte sequence the writer could emit for a drawn string: a literal
/// with escapes, a raw literal, or a hex string (either case) once a byte
/// like the em-dash placeholder is involved. Deduplicated so plain ASCII
/// text yields one literal needle.
fn encodings(text: &str) -> Vec<Vec<u8>> {
    let bytes = winansi(text);
    let mut needles = vec![
        literal_escaped(&bytes),
        bytes.clone(),
        hex(&bytes, true),
        hex(&bytes, false),
    ];
    needles.dedup();
    needles
}

/// Locate a drawn string in the document's content streams.
pub fn find_string(pdf: &[u8], text: &str) -> Option<usize> {
    encodings(text)
        .iter()
        .filter_map(|needle| find(pdf, needle))
        .min()
}

pub fn has_string(pdf: &[u8], text: &str) -> bool {
    find_string(pdf, text).is_some()
}

pub fn count_string(pdf: &[u8], text: &str) -> usize {
    let mut total = 0;
    for needle in encodings(text) {
        let mut rest: &[u8] = pdf;
        while let Some(pos) = find(rest, &needle) {
            total += 1;
            rest = &rest[pos + needle.len()..];
        }
    }
    total
}
