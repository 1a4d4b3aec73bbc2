//! A4 PDF export of a report, one page per test.
//!
//! Mirrors the printable HTML view: clinic header, patient table, the
//! test's result table and the signatory blocks at the foot of the page.

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use crate::catalog::ReportLayout;
use crate::config::ClinicProfile;
use crate::models::{AssembledTest, ReportPayload};
use crate::report::{document_title, format_report_date};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const SIGNATURE_TOP_MM: f32 = 60.0;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Report has no tests to export")]
    Empty,
    #[error("PDF error: {0}")]
    Pdf(String),
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Render the payload to PDF bytes.
pub fn generate_report_pdf(
    payload: &ReportPayload,
    clinic: &ClinicProfile,
) -> Result<Vec<u8>, ExportError> {
    let (first, rest) = payload.tests().split_first().ok_or(ExportError::Empty)?;

    let title = document_title(payload);
    let (doc, page1, layer1) = PdfDocument::new(
        &title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Report",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(format!("font: {e}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(format!("font: {e}")))?,
    };

    draw_test_page(&doc.get_page(page1).get_layer(layer1), payload, first, clinic, &fonts);
    for test in rest {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Report");
        draw_test_page(&doc.get_page(page).get_layer(layer), payload, test, clinic, &fonts);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("save: {e}")))?;
    let bytes = buf
        .into_inner()
        .map_err(|e| ExportError::Pdf(format!("buffer: {e}")))?;

    tracing::debug!(bytes = bytes.len(), pages = payload.tests().len(), "report PDF rendered");
    Ok(bytes)
}

fn draw_test_page(
    layer: &PdfLayerReference,
    payload: &ReportPayload,
    item: &AssembledTest,
    clinic: &ClinicProfile,
    fonts: &Fonts,
) {
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    // Header
    layer.use_text(clinic.facility_name.as_str(), 20.0, Mm(MARGIN_MM), Mm(y), &fonts.bold);
    y -= 8.0;
    layer.use_text(clinic.location.as_str(), 12.0, Mm(MARGIN_MM), Mm(y), &fonts.regular);
    y -= 6.0;
    if !clinic.department.is_empty() {
        layer.use_text(clinic.department.as_str(), 11.0, Mm(MARGIN_MM), Mm(y), &fonts.regular);
        y -= 6.0;
    }
    rule(layer, y);
    y -= 8.0;

    // Patient table
    let patient = payload.patient_info();
    let gender = patient.gender.map(|g| g.as_str()).unwrap_or_default();
    let rows = [
        ("Name", patient.name.clone(), "Reg. No", patient.registration_label().to_string()),
        ("Age", format!("{} Years", patient.age.trim()), "Sex", gender.to_string()),
        (
            "Sample",
            clinic.sample_type.clone(),
            "Date",
            format_report_date(payload.generated_at()),
        ),
        ("Refd. by", String::new(), "", String::new()),
    ];
    for (l1, v1, l2, v2) in rows {
        layer.use_text(l1, 10.0, Mm(MARGIN_MM), Mm(y), &fonts.bold);
        layer.use_text(v1, 10.0, Mm(MARGIN_MM + 25.0), Mm(y), &fonts.regular);
        if !l2.is_empty() {
            layer.use_text(l2, 10.0, Mm(110.0), Mm(y), &fonts.bold);
            layer.use_text(v2, 10.0, Mm(135.0), Mm(y), &fonts.regular);
        }
        y -= 6.0;
    }
    y -= 10.0;

    // Test title
    layer.use_text(item.test.name.to_uppercase(), 14.0, Mm(MARGIN_MM), Mm(y), &fonts.bold);
    y -= 10.0;

    // Result table
    let kind = item.kind();
    let columns: &[f32] = match kind.layout() {
        ReportLayout::TestResult => &[MARGIN_MM, 120.0],
        ReportLayout::NameResultRange => &[MARGIN_MM, 100.0, 140.0],
    };
    for (x, header) in columns.iter().zip(kind.layout().headers()) {
        layer.use_text(*header, 10.0, Mm(*x), Mm(y), &fonts.bold);
    }
    y -= 2.5;
    rule(layer, y);
    y -= 6.0;
    for row in kind.report_rows(&item.results) {
        let mut cells = vec![row.name, row.result];
        if let Some(range) = row.normal_range {
            cells.push(range);
        }
        for (x, cell) in columns.iter().zip(cells) {
            layer.use_text(cell, 10.0, Mm(*x), Mm(y), &fonts.regular);
        }
        y -= 2.5;
        rule(layer, y);
        y -= 6.0;
    }

    // Signatories
    let slot = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / clinic.signatories.len().max(1) as f32;
    for (i, sig) in clinic.signatories.iter().enumerate() {
        let x = MARGIN_MM + slot * i as f32;
        let mut sy = SIGNATURE_TOP_MM;
        segment(layer, x, x + slot - 10.0, sy + 5.0);
        layer.use_text(sig.name.as_str(), 10.0, Mm(x), Mm(sy), &fonts.bold);
        for line in [
            sig.qualification.as_str(),
            sig.title.as_str(),
            clinic.facility_name.as_str(),
            clinic.location.as_str(),
        ] {
            sy -= 4.5;
            layer.use_text(line, 8.0, Mm(x), Mm(sy), &fonts.regular);
        }
    }
}

fn rule(layer: &PdfLayerReference, y: f32) {
    segment(layer, MARGIN_MM, PAGE_WIDTH_MM - MARGIN_MM, y);
}

fn segment(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32) {
    layer.set_outline_thickness(0.5);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
}
