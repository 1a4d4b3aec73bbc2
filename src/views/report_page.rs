//! Printable A4 report: one page per test, each with the clinic header,
//! patient table, result table and signatory footer.

use std::fmt::Write as _;

use uuid::Uuid;

use crate::catalog::ReportLayout;
use crate::config::ClinicProfile;
use crate::models::{AssembledTest, ReportPayload};
use crate::report::{document_title, format_report_date};
use crate::views::{escape_html, BASE_CSS};

const PRINT_CSS: &str = r#"
@page{size:A4;margin:0}
.layout{display:grid;grid-template-columns:3fr 1fr;min-height:100vh}
.preview{background:#e7e5e4;padding:32px 16px}
.sheet{width:210mm;min-height:297mm;margin:0 auto 24px;padding:20mm;background:#fff;display:flex;flex-direction:column;box-shadow:0 4px 16px rgba(0,0,0,.1)}
.sheet header{text-align:center;margin-bottom:20px}
.sheet header h1{margin:0;font-size:2.25rem;font-weight:500;font-family:Georgia,'Times New Roman',serif}
.sheet header p{margin:4px 0 0;font-size:1.5rem;font-family:Georgia,'Times New Roman',serif}
.sheet header p.department{font-size:1.1rem;font-style:italic}
table{width:100%;border-collapse:collapse;page-break-inside:avoid;break-inside:avoid}
td,th{border:1px solid #000;padding:8px 14px;text-align:left}
th,td.label{background:#f5f5f4;font-weight:600}
tr{page-break-inside:avoid;break-inside:avoid}
.test-title{text-align:center;margin:40px 0 16px;font-size:1.25rem;font-weight:700;text-decoration:underline}
.signatures{margin-top:auto;display:flex;justify-content:space-between;gap:24px;padding-top:48px;page-break-inside:avoid}
.signature{flex:1;font-size:.8rem;line-height:1.4}
.signature .name{border-top:1px solid #000;padding-top:6px;font-weight:700;font-size:.9rem}
.sidebar{padding:32px 16px;display:flex;flex-direction:column;gap:12px}
.sidebar .btn{text-align:center;width:100%}
@media print{
  body{margin:0;padding:0;background:#fff}
  .layout{display:block}
  .preview{padding:0;background:#fff}
  .sidebar{display:none}
  .sheet{margin:0;box-shadow:none}
  .sheet+.sheet{page-break-before:always;break-before:page}
}
"#;

/// Render the report. `report_id` enables the edit and PDF actions, which
/// need a stored payload.
pub fn render_report_page(
    payload: &ReportPayload,
    clinic: &ClinicProfile,
    report_id: Option<Uuid>,
) -> String {
    let mut sheets = String::new();
    for item in payload.tests() {
        sheets.push_str(&render_sheet(payload, item, clinic));
    }

    let mut actions = String::new();
    if let Some(id) = report_id {
        let _ = write!(
            actions,
            r#"<a href="/print-report/{id}/edit" class="btn">Edit Report</a>
<a href="/print-report/{id}/pdf" class="btn">Download PDF</a>
"#
        );
    }
    actions.push_str(
        r#"<button type="button" class="btn btn-primary" onclick="window.print()">Print Report</button>
<a href="/lab-form" class="btn">New Report</a>"#,
    );

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
{base_css}
{print_css}
</style>
</head>
<body>
<div class="layout">
<main class="preview">
{sheets}
</main>
<aside class="sidebar">
{actions}
</aside>
</div>
</body>
</html>"##,
        title = escape_html(&document_title(payload)),
        base_css = BASE_CSS,
        print_css = PRINT_CSS,
        sheets = sheets,
        actions = actions,
    )
}

fn render_sheet(payload: &ReportPayload, item: &AssembledTest, clinic: &ClinicProfile) -> String {
    let patient = payload.patient_info();
    let gender = patient.gender.map(|g| g.as_str()).unwrap_or_default();

    format!(
        r#"<section class="sheet">
<header><h1>{facility}</h1><p>{location}</p><p class="department">{department}</p></header>
<table class="patient">
<tr><td class="label">Name</td><td>{name}</td><td class="label">Reg. No</td><td>{reg}</td></tr>
<tr><td class="label">Age</td><td>{age} Years</td><td class="label">Sex</td><td>{gender}</td></tr>
<tr><td class="label">Sample</td><td>{sample}</td><td class="label">Date</td><td>{date}</td></tr>
<tr><td class="label">Refd. by</td><td colspan="3"></td></tr>
</table>
<h2 class="test-title">{test_name}</h2>
{results}
{signatures}
</section>
"#,
        facility = escape_html(&clinic.facility_name),
        location = escape_html(&clinic.location),
        department = escape_html(&clinic.department),
        name = escape_html(&patient.name),
        reg = escape_html(patient.registration_label()),
        age = escape_html(patient.age.trim()),
        gender = gender,
        sample = escape_html(&clinic.sample_type),
        date = escape_html(&format_report_date(payload.generated_at())),
        test_name = escape_html(&item.test.name.to_uppercase()),
        results = render_results_table(item),
        signatures = render_signatures(clinic),
    )
}

fn render_results_table(item: &AssembledTest) -> String {
    let kind = item.kind();
    let layout = kind.layout();
    let mut html = String::from("<table class=\"results\">\n<tr>");
    for header in layout.headers() {
        let _ = write!(html, "<th>{header}</th>");
    }
    html.push_str("</tr>\n");

    for row in kind.report_rows(&item.results) {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td>",
            escape_html(&row.name),
            escape_html(&row.result)
        );
        if layout == ReportLayout::NameResultRange {
            let _ = write!(
                html,
                "<td>{}</td>",
                escape_html(row.normal_range.as_deref().unwrap_or_default())
            );
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>");
    html
}

fn render_signatures(clinic: &ClinicProfile) -> String {
    if clinic.signatories.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<div class="signatures">"#);
    for sig in &clinic.signatories {
        let _ = write!(
            html,
            r#"<div class="signature"><div class="name">{}</div><div>{}</div><div>{}</div><div>{}</div><div>{}</div></div>"#,
            escape_html(&sig.name),
            escape_html(&sig.qualification),
            escape_html(&sig.title),
            escape_html(&clinic.facility_name),
            escape_html(&clinic.location),
        );
    }
    html.push_str("</div>");
    html
}

/// Recovery page when there is no report to show.
pub fn render_missing_report() -> String {
    render_message_page(
        "No Report Data Found",
        "Please complete the lab form first.",
    )
}

/// A payload was supplied but cannot be printed.
pub fn render_report_problem(detail: &str) -> String {
    render_message_page("Report Cannot Be Displayed", detail)
}

fn render_message_page(heading: &str, message: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{heading}</title>
<style>
{base_css}
.center{{display:flex;align-items:center;justify-content:center;min-height:100vh;text-align:center}}
h1{{font-size:1.75rem;color:#57534e;margin:0 0 12px}}
p{{color:#78716c;margin:0 0 24px}}
</style>
</head>
<body>
<div class="center">
<div>
<h1>{heading}</h1>
<p>{message}</p>
<a href="/lab-form" class="btn btn-primary">Go to Lab Form</a>
</div>
</div>
</body>
</html>"##,
        base_css = BASE_CSS,
        heading = escape_html(heading),
        message = escape_html(message),
    )
}
