// src/services/certificate.rs

//! Certificate renderer.
//!
//! Layout happens in two steps: `CertificateLayout::plan` places every
//! shape and line of text on a single A4 page in top-down coordinates,
//! then `render` turns the plan into `printpdf` operations. The plan is
//! pure and deterministic given the certificate id.
//!
//! Text uses the builtin Helvetica faces, which are WinAnsi-encoded.
//! printpdf writes the UTF-8 bytes of the string as-is, so the saved
//! document is re-encoded with `lopdf` before it leaves the renderer.
//! Text with characters outside WinAnsi is rejected as invalid input.

use std::fmt;

use axum::body::Bytes;
use chrono::{DateTime, Datelike, Utc};
use lopdf::{Object, content::Content};
use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Pt, Rgb, TextItem,
};
use rand::{Rng, rngs::OsRng};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, instrument, warn};

use crate::error::AppError;

// A4: 210 x 297 mm, in points.
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 40.0;
const INNER_INSET: f32 = 15.0;
const CORNER_SIZE: f32 = 30.0;
const SEAL_RADIUS: f32 = 40.0;
const MIN_FONT_SIZE: f32 = 10.0;

const CERT_ID_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CERT_ID_LENGTH: usize = 8;

/// Size of the byte chunks pushed to the response body.
const STREAM_CHUNK_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    InvalidInput(String),
    Render(String),
}

impl fmt::Display for CertificateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateError::InvalidInput(msg) => write!(f, "invalid certificate input: {}", msg),
            CertificateError::Render(msg) => write!(f, "certificate rendering failed: {}", msg),
        }
    }
}

impl std::error::Error for CertificateError {}

impl From<CertificateError> for AppError {
    fn from(err: CertificateError) -> Self {
        match err {
            CertificateError::InvalidInput(_) => AppError::BadRequest(err.to_string()),
            CertificateError::Render(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

/// Read-only projection of a result joined with quiz title and user name.
#[derive(Debug, Clone)]
pub struct CertificateInput {
    pub student_name: String,
    pub quiz_title: String,
    pub score_percent: i32,
    pub passed: bool,
    pub issued_at: DateTime<Utc>,
    pub org_name: String,
}

impl CertificateInput {
    pub fn validate(&self) -> Result<(), CertificateError> {
        if self.student_name.trim().is_empty() {
            return Err(CertificateError::InvalidInput("student name is empty".into()));
        }
        if self.quiz_title.trim().is_empty() {
            return Err(CertificateError::InvalidInput("quiz title is empty".into()));
        }
        if self.org_name.trim().is_empty() {
            return Err(CertificateError::InvalidInput("organization name is empty".into()));
        }
        if !(0..=100).contains(&self.score_percent) {
            return Err(CertificateError::InvalidInput(format!(
                "score {} is outside 0-100",
                self.score_percent
            )));
        }
        for (field, text) in [
            ("student name", &self.student_name),
            ("quiz title", &self.quiz_title),
            ("organization name", &self.org_name),
        ] {
            if let Some(c) = text.chars().find(|&c| win_ansi_byte(c).is_none()) {
                return Err(CertificateError::InvalidInput(format!(
                    "{} contains {:?}, which the certificate font cannot print",
                    field, c
                )));
            }
        }
        Ok(())
    }

    pub fn score_line(&self) -> String {
        let verdict = if self.passed { "PASSED" } else { "DID NOT PASS" };
        format!("Score: {}% - {}", self.score_percent, verdict)
    }

    /// e.g. "Issued on January 5, 2024".
    pub fn issued_line(&self) -> String {
        format!("Issued on {}", format_long_date(&self.issued_at))
    }
}

pub fn format_long_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `CERT-` followed by eight random upper-case alphanumerics.
pub fn generate_certificate_id() -> String {
    let mut rng = OsRng;
    let suffix: String = (0..CERT_ID_LENGTH)
        .map(|_| CERT_ID_CHARSET[rng.gen_range(0..CERT_ID_CHARSET.len())] as char)
        .collect();

    format!("CERT-{}", suffix)
}

// -- Layout plan --------------------------------------------------------------

/// Coordinates are in points from the top-left corner of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect { x: f32, y: f32, w: f32, h: f32, width: f32, gray: f32 },
    Segment { from: (f32, f32), to: (f32, f32), width: f32 },
    Circle { cx: f32, cy: f32, r: f32, width: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub bold: bool,
    pub size: f32,
    /// Left edge after centring.
    pub x: f32,
    /// Baseline, top-down.
    pub baseline: f32,
    pub gray: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificateLayout {
    pub certificate_id: String,
    pub shapes: Vec<Shape>,
    pub lines: Vec<TextLine>,
}

impl CertificateLayout {
    pub fn plan(input: &CertificateInput, certificate_id: &str) -> Result<Self, CertificateError> {
        input.validate()?;

        let content_width = PAGE_WIDTH - 2.0 * MARGIN;
        let content_height = PAGE_HEIGHT - 2.0 * MARGIN;
        let inner = MARGIN + INNER_INSET;
        let mut shapes = Vec::new();
        let mut lines = Vec::new();

        shapes.push(Shape::Rect {
            x: MARGIN,
            y: MARGIN,
            w: content_width,
            h: content_height,
            width: 4.0,
            gray: 0.0,
        });
        shapes.push(Shape::Rect {
            x: inner,
            y: inner,
            w: content_width - 2.0 * INNER_INSET,
            h: content_height - 2.0 * INNER_INSET,
            width: 1.0,
            gray: 0.4,
        });

        let far_x = PAGE_WIDTH - inner - CORNER_SIZE;
        let far_y = PAGE_HEIGHT - inner - CORNER_SIZE;
        for (x, y) in [(inner, inner), (far_x, inner), (inner, far_y), (far_x, far_y)] {
            shapes.push(Shape::Rect {
                x,
                y,
                w: CORNER_SIZE,
                h: CORNER_SIZE,
                width: 2.0,
                gray: 0.0,
            });
        }

        let page_center = PAGE_WIDTH / 2.0;
        // Text is kept clear of the corner ornaments.
        let text_width = content_width - 2.0 * (INNER_INSET + CORNER_SIZE);
        let mut centered = |text: &str, bold: bool, size: f32, baseline: f32| {
            let size = fit_font_size(text, bold, size, text_width);
            lines.push(TextLine {
                text: text.to_string(),
                bold,
                size,
                x: page_center - text_width_pt(text, bold, size) / 2.0,
                baseline,
                gray: 0.0,
            });
        };

        let header_y = MARGIN + 60.0;
        centered(&input.org_name, true, 32.0, header_y + 26.0);
        centered("CERTIFICATE OF ACHIEVEMENT", true, 18.0, header_y + 62.0);

        let body_y = header_y + 120.0;
        centered("This is to certify that", false, 14.0, body_y + 12.0);
        centered(&input.student_name, true, 28.0, body_y + 58.0);
        centered(
            "has successfully completed the certification examination for",
            false,
            14.0,
            body_y + 98.0,
        );
        centered(&input.quiz_title, true, 20.0, body_y + 138.0);
        centered(&input.score_line(), false, 12.0, body_y + 182.0);
        centered(&input.issued_line(), false, 12.0, body_y + 202.0);
        centered(
            "This certification validates the holder's knowledge and competency",
            false,
            10.0,
            body_y + 246.0,
        );
        centered(
            "in the subject matter as assessed by our rigorous examination standards.",
            false,
            10.0,
            body_y + 260.0,
        );

        // Signature block.
        let footer_y = PAGE_HEIGHT - MARGIN - 100.0;
        let signature_x = MARGIN + 80.0;
        let signature_w = 200.0;
        shapes.push(Shape::Segment {
            from: (signature_x, footer_y),
            to: (signature_x + signature_w, footer_y),
            width: 1.0,
        });
        let signature_center = signature_x + signature_w / 2.0;
        for (text, bold, size, baseline) in [
            (input.org_name.as_str(), true, 12.0, footer_y + 20.0),
            ("Certification Authority", false, 10.0, footer_y + 34.0),
        ] {
            let size = fit_font_size(text, bold, size, signature_w);
            lines.push(TextLine {
                text: text.to_string(),
                bold,
                size,
                x: signature_center - text_width_pt(text, bold, size) / 2.0,
                baseline,
                gray: 0.0,
            });
        }

        // Seal.
        let seal_x = PAGE_WIDTH - MARGIN - 120.0;
        let seal_y = footer_y - 20.0;
        shapes.push(Shape::Circle {
            cx: seal_x,
            cy: seal_y,
            r: SEAL_RADIUS,
            width: 3.0,
        });
        shapes.push(Shape::Circle {
            cx: seal_x,
            cy: seal_y,
            r: SEAL_RADIUS - 8.0,
            width: 1.0,
        });
        let year = input.issued_at.year().to_string();
        for (text, size, baseline) in [
            ("CERTIFIED", 8.0, seal_y - 9.0),
            (year.as_str(), 14.0, seal_y + 5.0),
            ("AUTHENTIC", 8.0, seal_y + 17.0),
        ] {
            lines.push(TextLine {
                text: text.to_string(),
                bold: true,
                size,
                x: seal_x - text_width_pt(text, true, size) / 2.0,
                baseline,
                gray: 0.0,
            });
        }

        let id_text = format!("Certificate ID: {}", certificate_id);
        lines.push(TextLine {
            x: page_center - text_width_pt(&id_text, false, 8.0) / 2.0,
            text: id_text,
            bold: false,
            size: 8.0,
            baseline: PAGE_HEIGHT - inner - 8.0,
            gray: 0.4,
        });

        Ok(Self {
            certificate_id: certificate_id.to_string(),
            shapes,
            lines,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }

    fn to_ops(&self) -> Vec<Op> {
        let mut ops = Vec::new();

        for shape in &self.shapes {
            match *shape {
                Shape::Rect { x, y, w, h, width, gray } => {
                    push_stroke_style(&mut ops, width, gray);
                    ops.push(Op::DrawLine {
                        line: closed_path(&[(x, y), (x + w, y), (x + w, y + h), (x, y + h)]),
                    });
                }
                Shape::Segment { from, to, width } => {
                    push_stroke_style(&mut ops, width, 0.0);
                    ops.push(Op::DrawLine {
                        line: Line {
                            points: vec![line_point(from.0, from.1), line_point(to.0, to.1)],
                            is_closed: false,
                        },
                    });
                }
                Shape::Circle { cx, cy, r, width } => {
                    push_stroke_style(&mut ops, width, 0.0);
                    ops.push(Op::DrawLine {
                        line: closed_path(&circle_points(cx, cy, r)),
                    });
                }
            }
        }

        for line in &self.lines {
            ops.push(Op::StartTextSection);
            ops.push(Op::SetFillColor { col: gray(line.gray) });
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(line.x),
                    y: Pt(PAGE_HEIGHT - line.baseline),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(line.size),
                font: builtin_font(line.bold),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.text.clone())],
                font: builtin_font(line.bold),
            });
            ops.push(Op::EndTextSection);
        }

        ops
    }
}

fn builtin_font(bold: bool) -> BuiltinFont {
    if bold {
        BuiltinFont::HelveticaBold
    } else {
        BuiltinFont::Helvetica
    }
}

fn gray(level: f32) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

fn push_stroke_style(ops: &mut Vec<Op>, width: f32, level: f32) {
    ops.push(Op::SetOutlineThickness { pt: Pt(width) });
    ops.push(Op::SetOutlineColor { col: gray(level) });
}

/// Converts a top-down coordinate into a PDF point.
fn line_point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point {
            x: Pt(x),
            y: Pt(PAGE_HEIGHT - y),
        },
        bezier: false,
    }
}

fn closed_path(points: &[(f32, f32)]) -> Line {
    Line {
        points: points.iter().map(|&(x, y)| line_point(x, y)).collect(),
        is_closed: true,
    }
}

/// Polygonal approximation, fine enough to look round when printed.
fn circle_points(cx: f32, cy: f32, r: f32) -> Vec<(f32, f32)> {
    const SEGMENTS: usize = 72;
    (0..SEGMENTS)
        .map(|i| {
            let angle = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
            (cx + r * angle.cos(), cy + r * angle.sin())
        })
        .collect()
}

/// Approximate Helvetica advance width of `text` in points.
fn text_width_pt(text: &str, bold: bool, size: f32) -> f32 {
    let units: f32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '.' | ',' | '\'' | '!' | '|' | ':' | ';' => 0.278,
            ' ' | 'f' | 't' | 'I' | '/' | '-' | '(' | ')' => 0.333,
            'r' => 0.389,
            'm' | 'M' => 0.833,
            'w' | 'W' => 0.778,
            '%' => 0.889,
            '0'..='9' => 0.556,
            c if c.is_uppercase() => 0.70,
            _ => 0.556,
        })
        .sum();
    let weight = if bold { 1.06 } else { 1.0 };
    units * size * weight
}

/// Shrinks `preferred` until `text` fits in `max_width`, down to a floor.
fn fit_font_size(text: &str, bold: bool, preferred: f32, max_width: f32) -> f32 {
    let width = text_width_pt(text, bold, preferred);
    if width <= max_width {
        return preferred;
    }
    (preferred * max_width / width).max(MIN_FONT_SIZE)
}

// -- WinAnsi text encoding ---------------------------------------------------

/// WinAnsiEncoding (cp1252) byte for `c`, for printable characters only.
fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(byte)
}

/// Rewrites a UTF-8 string operand in place. Operands that are not valid
/// UTF-8 or not representable are left untouched.
fn win_ansi_operand(object: &mut Object) {
    match object {
        Object::String(bytes, _) => {
            let encoded: Option<Vec<u8>> = std::str::from_utf8(bytes)
                .ok()
                .and_then(|text| text.chars().map(win_ansi_byte).collect());
            if let Some(encoded) = encoded {
                *bytes = encoded;
            }
        }
        Object::Array(items) => items.iter_mut().for_each(win_ansi_operand),
        _ => {}
    }
}

fn render_error(err: impl fmt::Display) -> CertificateError {
    CertificateError::Render(err.to_string())
}

/// Re-encodes the operands of every text-showing operator as WinAnsi.
fn encode_text_as_win_ansi(pdf: &[u8]) -> Result<Vec<u8>, CertificateError> {
    let mut doc = lopdf::Document::load_mem(pdf).map_err(render_error)?;
    let page_ids: Vec<lopdf::ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let raw = doc.get_page_content(page_id).map_err(render_error)?;
        let mut content = Content::decode(&raw).map_err(render_error)?;
        for operation in &mut content.operations {
            if matches!(operation.operator.as_str(), "Tj" | "TJ" | "'" | "\"") {
                operation.operands.iter_mut().for_each(win_ansi_operand);
            }
        }
        let encoded = content.encode().map_err(render_error)?;
        doc.change_page_content(page_id, encoded).map_err(render_error)?;
    }

    doc.compress();
    let mut output = Vec::new();
    doc.save_to(&mut output).map_err(render_error)?;
    Ok(output)
}

// -- Rendering ----------------------------------------------------------------

/// Renders a certificate with a freshly generated id.
pub fn render(input: &CertificateInput) -> Result<Vec<u8>, CertificateError> {
    render_with_id(input, &generate_certificate_id())
}

#[instrument(skip(input), fields(quiz_title = %input.quiz_title, passed = input.passed))]
pub fn render_with_id(
    input: &CertificateInput,
    certificate_id: &str,
) -> Result<Vec<u8>, CertificateError> {
    let layout = CertificateLayout::plan(input, certificate_id)?;

    let mut doc = PdfDocument::new(&format!("Certificate - {}", input.quiz_title));
    let page = PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), layout.to_ops());
    doc.with_pages(vec![page]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "PDF serialisation produced warnings");
    }
    let output = encode_text_as_win_ansi(&output)?;

    debug!(
        certificate_id,
        shapes = layout.shapes.len(),
        lines = layout.lines.len(),
        bytes = output.len(),
        "Certificate rendered"
    );

    Ok(output)
}

/// Renders on the blocking pool and streams the document in chunks.
///
/// Input is validated up front so callers can still answer with a proper
/// error status. If the receiver is dropped (client disconnected) the
/// remaining chunks are discarded.
pub fn render_stream(
    input: CertificateInput,
) -> Result<ReceiverStream<Result<Bytes, std::io::Error>>, CertificateError> {
    input.validate()?;

    let (tx, rx) = mpsc::channel(4);
    tokio::task::spawn_blocking(move || {
        let bytes = match render(&input) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx.blocking_send(Err(std::io::Error::other(e.to_string())));
                return;
            }
        };

        for chunk in bytes.chunks(STREAM_CHUNK_SIZE) {
            if tx.blocking_send(Ok(Bytes::copy_from_slice(chunk))).is_err() {
                debug!("Certificate stream receiver dropped");
                return;
            }
        }
    });

    Ok(ReceiverStream::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio_stream::StreamExt;

    fn input(passed: bool) -> CertificateInput {
        CertificateInput {
            student_name: "Ada Lovelace".into(),
            quiz_title: "JavaScript Fundamentals".into(),
            score_percent: if passed { 80 } else { 40 },
            passed,
            issued_at: Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap(),
            org_name: "CertifyPro".into(),
        }
    }

    #[test]
    fn long_date_has_no_zero_padding() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(format_long_date(&date), "January 5, 2024");
    }

    #[test]
    fn layout_contains_content_verbatim() {
        let layout = CertificateLayout::plan(&input(true), "CERT-ABCDEFGH").unwrap();
        let texts: Vec<&str> = layout.texts().collect();

        for expected in [
            "CertifyPro",
            "CERTIFICATE OF ACHIEVEMENT",
            "Ada Lovelace",
            "JavaScript Fundamentals",
            "Score: 80% - PASSED",
            "Issued on January 5, 2024",
            "2024",
            "Certificate ID: CERT-ABCDEFGH",
        ] {
            assert!(texts.contains(&expected), "missing {:?}", expected);
        }
    }

    #[test]
    fn failed_results_still_render_with_verdict() {
        let layout = CertificateLayout::plan(&input(false), "CERT-00000000").unwrap();
        assert!(layout.texts().any(|t| t == "Score: 40% - DID NOT PASS"));
    }

    #[test]
    fn layout_is_deterministic_for_a_fixed_id() {
        let a = CertificateLayout::plan(&input(true), "CERT-12345678").unwrap();
        let b = CertificateLayout::plan(&input(true), "CERT-12345678").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn layout_has_borders_corners_and_seal() {
        let layout = CertificateLayout::plan(&input(true), "CERT-12345678").unwrap();
        let rects = layout.shapes.iter().filter(|s| matches!(s, Shape::Rect { .. })).count();
        let circles = layout.shapes.iter().filter(|s| matches!(s, Shape::Circle { .. })).count();
        let segments = layout.shapes.iter().filter(|s| matches!(s, Shape::Segment { .. })).count();
        assert_eq!(rects, 6); // outer, inner, four corners
        assert_eq!(circles, 2);
        assert_eq!(segments, 1);
    }

    #[test]
    fn long_names_shrink_to_stay_on_the_page() {
        let mut long = input(true);
        long.student_name = "Maximiliana Theodora Wilhelmina von Ravensberg-Hohenzollern".into();
        let layout = CertificateLayout::plan(&long, "CERT-12345678").unwrap();
        let name = layout.lines.iter().find(|l| l.text == long.student_name).unwrap();

        assert!(name.size < 28.0);
        assert!(name.x >= MARGIN);
        assert!(name.x + text_width_pt(&name.text, true, name.size) <= PAGE_WIDTH - MARGIN);
    }

    #[test]
    fn rejects_invalid_input() {
        let mut bad = input(true);
        bad.student_name = "  ".into();
        assert!(matches!(
            CertificateLayout::plan(&bad, "CERT-1"),
            Err(CertificateError::InvalidInput(_))
        ));

        let mut bad = input(true);
        bad.score_percent = 101;
        assert!(render(&bad).is_err());
    }

    #[test]
    fn certificate_ids_are_well_formed() {
        let id = generate_certificate_id();
        assert_eq!(id.len(), 5 + CERT_ID_LENGTH);
        assert!(id.starts_with("CERT-"));
        assert!(id[5..].bytes().all(|b| CERT_ID_CHARSET.contains(&b)));
    }

    #[test]
    fn renders_a_single_page_pdf() {
        let bytes = render_with_id(&input(true), "CERT-ABCDEFGH").unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let doc = lopdf::Document::load_mem(&bytes).expect("valid PDF");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn rendered_text_extracts_verbatim() {
        let mut accented = input(true);
        accented.student_name = "José Müller".into();
        accented.quiz_title = "Café Français – Niveau 1".into();

        let bytes = render_with_id(&accented, "CERT-ABCDEFGH").unwrap();
        let doc = lopdf::Document::load_mem(&bytes).expect("valid PDF");
        let text = doc.extract_text(&[1]).expect("extractable text");

        for expected in [
            "José Müller",
            "Café Français – Niveau 1",
            "Score: 80% - PASSED",
            "Issued on January 5, 2024",
            "Certificate ID: CERT-ABCDEFGH",
        ] {
            assert!(text.contains(expected), "missing {:?} in {:?}", expected, text);
        }
    }

    #[test]
    fn text_outside_the_font_encoding_is_rejected() {
        let mut cjk = input(true);
        cjk.student_name = "李雷".into();
        assert!(matches!(render(&cjk), Err(CertificateError::InvalidInput(_))));

        let mut emoji = input(true);
        emoji.quiz_title = "Rust 🦀".into();
        assert!(matches!(emoji.validate(), Err(CertificateError::InvalidInput(_))));
    }

    #[test]
    fn win_ansi_covers_latin1_and_typographic_punctuation() {
        assert_eq!(win_ansi_byte('A'), Some(b'A'));
        assert_eq!(win_ansi_byte('é'), Some(0xe9));
        assert_eq!(win_ansi_byte('ü'), Some(0xfc));
        assert_eq!(win_ansi_byte('€'), Some(0x80));
        assert_eq!(win_ansi_byte('–'), Some(0x96));
        assert_eq!(win_ansi_byte('\n'), None);
        assert_eq!(win_ansi_byte('李'), None);
    }

    #[test]
    fn certificate_id_characters_spread_over_the_charset() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.extend(generate_certificate_id()[5..].bytes());
        }
        // 1600 uniform draws from 36 symbols leave none unseen in practice.
        assert_eq!(seen.len(), CERT_ID_CHARSET.len());
    }

    #[tokio::test]
    async fn stream_yields_the_whole_document() {
        let mut stream = render_stream(input(true)).unwrap();
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk.unwrap());
        }
        assert!(bytes.starts_with(b"%PDF"));
        assert!(lopdf::Document::load_mem(&bytes).is_ok());
    }

    #[test]
    fn stream_rejects_invalid_input_before_spawning() {
        let mut bad = input(true);
        bad.quiz_title = String::new();
        assert!(render_stream(bad).is_err());
    }
}
