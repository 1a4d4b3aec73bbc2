//! The lab intake form, rendered from a `LabForm`.
//!
//! Field names follow the url-encoded submission contract read by
//! `FormSubmission::from_fields`; the `action` button value picks what the
//! POST handler does with it.

use std::fmt::Write as _;

use crate::catalog::InputWidget;
use crate::config::ClinicProfile;
use crate::form::{Completion, GenerationBlocked, LabForm};
use crate::models::submission::RESULT_FIELD_SEPARATOR;
use crate::models::{FormMode, Gender, Parameter, TestKind};
use crate::normalize::TITER_PREFIX;
use crate::views::{escape_html, BASE_CSS};

/// Message shown above the form after a POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNotice {
    Blocked(GenerationBlocked),
    Error(String),
    Info(String),
}

/// `Generate Report (N test[s])`
pub fn generate_button_label(count: usize) -> String {
    let plural = if count > 1 { "s" } else { "" };
    format!("Generate Report ({count} test{plural})")
}

pub fn render_form_page(
    form: &LabForm,
    clinic: &ClinicProfile,
    notice: Option<&FormNotice>,
) -> String {
    let completion = form.completion();

    let edit_banner = if form.is_edit_mode() {
        r#"<div class="banner">Edit Mode Active</div>"#
    } else {
        ""
    };
    let edit_field = if form.is_edit_mode() {
        r#"<input type="hidden" name="edit" value="1">"#
    } else {
        ""
    };

    let notice_html = match notice {
        Some(FormNotice::Blocked(reason)) => format!(
            r#"<div class="notice notice-error">Cannot generate report: {}</div>"#,
            escape_html(&reason.to_string())
        ),
        Some(FormNotice::Error(message)) => format!(
            r#"<div class="notice notice-error">{}</div>"#,
            escape_html(message)
        ),
        Some(FormNotice::Info(message)) => format!(
            r#"<div class="notice notice-info">{}</div>"#,
            escape_html(message)
        ),
        None => String::new(),
    };

    let selected_count = form.selected_tests().len();
    let generate_button = if selected_count > 0 {
        let disabled = if completion.can_generate { "" } else { " disabled" };
        format!(
            r#"<button type="submit" name="action" value="report" class="btn btn-primary"{disabled}>{}</button>"#,
            generate_button_label(selected_count)
        )
    } else {
        String::new()
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Lab Test Form</title>
<style>
{base_css}
.page{{max-width:880px;margin:0 auto;padding:24px}}
header{{background:#0f766e;color:#fff;border-radius:12px;padding:24px;text-align:center;margin-bottom:24px}}
header h1{{margin:0 0 4px;font-size:1.75rem}}
header p{{margin:0}}
.banner{{display:inline-block;margin-top:12px;background:#facc15;color:#713f12;padding:6px 16px;border-radius:999px;font-weight:600}}
section{{background:#fff;border-radius:12px;padding:24px;margin-bottom:24px;box-shadow:0 2px 12px rgba(0,0,0,.05)}}
section h2{{margin:0 0 16px;font-size:1.25rem}}
.grid{{display:grid;grid-template-columns:1fr 1fr;gap:16px}}
label{{display:block;font-weight:600;margin-bottom:4px}}
input[type=text],select{{width:100%;padding:8px 10px;border:1px solid #d6d3d1;border-radius:6px;font-size:1rem}}
.row{{display:flex;gap:8px;align-items:center}}
.choices label{{display:inline-flex;gap:6px;font-weight:400;margin-right:16px}}
.test-pick label{{display:flex;gap:8px;font-weight:400;padding:6px 0}}
fieldset{{border:1px solid #e7e5e4;border-radius:8px;padding:16px;margin:0 0 16px}}
legend{{font-weight:700;padding:0 6px}}
.param{{display:grid;grid-template-columns:1fr 1fr 1fr;gap:12px;align-items:center;padding:8px 0;border-bottom:1px solid #f5f5f4}}
.param:last-child{{border:none}}
.hint{{color:#78716c;font-size:.85rem}}
.prefix{{font-weight:700}}
.fixed{{font-weight:600;color:#0f766e}}
.status-complete{{color:#15803d}}
.status-incomplete{{color:#b45309}}
.actions{{display:flex;gap:12px;justify-content:center}}
</style>
</head>
<body>
<div class="page">
<header>
  <h1>{facility}</h1>
  <p>{location}</p>
  {edit_banner}
</header>
{notice_html}
<form method="post" action="/lab-form">
{edit_field}
<section>
  <h2>Patient Information</h2>
  {patient}
</section>
<section>
  <h2>Select Tests</h2>
  {mode_switch}
  {test_pick}
</section>
{result_sections}
{status}
<div class="actions">
  <button type="submit" name="action" value="refresh" class="btn">Update</button>
  {generate_button}
</div>
</form>
</div>
</body>
</html>"##,
        base_css = BASE_CSS,
        facility = escape_html(&clinic.facility_name),
        location = escape_html(&clinic.location),
        edit_banner = edit_banner,
        notice_html = notice_html,
        edit_field = edit_field,
        patient = render_patient_fields(form),
        mode_switch = render_mode_switch(form.mode()),
        test_pick = render_test_pick(form),
        result_sections = render_result_sections(form),
        status = render_status(&completion),
        generate_button = generate_button,
    )
}

fn render_patient_fields(form: &LabForm) -> String {
    let patient = form.patient();
    let mut gender_options = String::from(r#"<option value="">Select Gender</option>"#);
    for gender in Gender::ALL {
        let selected = if patient.gender == Some(*gender) { " selected" } else { "" };
        let _ = write!(
            gender_options,
            r#"<option value="{0}"{selected}>{0}</option>"#,
            gender.as_str()
        );
    }

    format!(
        r#"<div class="grid">
    <div><label for="name">Patient Name *</label><input type="text" id="name" name="name" value="{name}"></div>
    <div><label for="age">Age *</label><input type="text" id="age" name="age" value="{age}"></div>
    <div><label for="gender">Sex *</label><select id="gender" name="gender">{gender_options}</select></div>
    <div><label for="patient_id">Reg. No</label><div class="row"><input type="text" id="patient_id" name="patient_id" value="{patient_id}"><button type="submit" name="action" value="patient_id" class="btn">Generate ID</button></div></div>
  </div>"#,
        name = escape_html(&patient.name),
        age = escape_html(&patient.age),
        patient_id = escape_html(&patient.patient_id),
    )
}

fn render_mode_switch(mode: FormMode) -> String {
    let mut html = String::from(r#"<div class="choices">"#);
    for (value, label) in [(FormMode::Single, "Single test"), (FormMode::Multiple, "Multiple tests")] {
        let checked = if value == mode { " checked" } else { "" };
        let _ = write!(
            html,
            r#"<label><input type="radio" name="mode" value="{}"{checked}>{label}</label>"#,
            value.as_str()
        );
    }
    html.push_str("</div>");
    html
}

fn render_test_pick(form: &LabForm) -> String {
    let input_type = match form.mode() {
        FormMode::Single => "radio",
        FormMode::Multiple => "checkbox",
    };
    let mut html = String::from(r#"<div class="test-pick">"#);
    for kind in TestKind::ALL {
        let checked = if form.is_selected(*kind) { " checked" } else { "" };
        let _ = write!(
            html,
            r#"<label><input type="{input_type}" name="test" value="{}"{checked}>{}</label>"#,
            kind.as_str(),
            escape_html(&kind.definition().name)
        );
    }
    html.push_str("</div>");
    html
}

fn render_result_sections(form: &LabForm) -> String {
    if form.selected_tests().is_empty() {
        return String::new();
    }
    let mut html = String::from("<section>\n  <h2>Test Results</h2>\n");
    for kind in form.selected_tests() {
        let _ = write!(
            html,
            "<fieldset><legend>{}</legend>",
            escape_html(&kind.definition().name)
        );
        for parameter in &kind.definition().parameters {
            let value = form
                .results_for(*kind)
                .and_then(|r| r.get(&parameter.name))
                .unwrap_or_default();
            html.push_str(&render_parameter(*kind, parameter, value));
        }
        html.push_str("</fieldset>\n");
    }
    html.push_str("</section>");
    html
}

fn render_parameter(kind: TestKind, parameter: &Parameter, value: &str) -> String {
    let field = escape_html(&format!(
        "{}{RESULT_FIELD_SEPARATOR}{}",
        kind.as_str(),
        parameter.name
    ));
    let input = match kind.input_widget(&parameter.name) {
        InputWidget::Titer { max_digits } => {
            let digits = value.trim().strip_prefix(TITER_PREFIX).unwrap_or(value.trim());
            format!(
                r#"<div class="row"><span class="prefix">{TITER_PREFIX}</span><input type="text" name="{field}" value="{}" inputmode="numeric" pattern="[0-9]*" maxlength="{max_digits}"></div>"#,
                escape_html(digits)
            )
        }
        InputWidget::Select(choices) => {
            let mut options = String::from(r#"<option value="">Select</option>"#);
            for choice in choices {
                let selected = if *choice == value { " selected" } else { "" };
                let _ = write!(
                    options,
                    r#"<option value="{0}"{selected}>{0}</option>"#,
                    escape_html(choice)
                );
            }
            format!(r#"<select name="{field}">{options}</select>"#)
        }
        InputWidget::Radio(choices) => {
            let mut radios = String::from(r#"<div class="choices">"#);
            for choice in choices {
                let checked = if *choice == value { " checked" } else { "" };
                let _ = write!(
                    radios,
                    r#"<label><input type="radio" name="{field}" value="{0}"{checked}>{0}</label>"#,
                    escape_html(choice)
                );
            }
            radios.push_str("</div>");
            radios
        }
        InputWidget::Text => format!(
            r#"<input type="text" name="{field}" value="{}">"#,
            escape_html(value)
        ),
        InputWidget::Fixed => format!(
            r#"<span class="fixed">{}</span> <span class="hint">(fixed)</span>"#,
            escape_html(parameter.fixed_value.as_deref().unwrap_or_default())
        ),
    };

    format!(
        r#"<div class="param"><div>{name}</div><div>{input}</div><div class="hint">{range}</div></div>"#,
        name = escape_html(&parameter.name),
        range = escape_html(&parameter.normal_range),
    )
}

/// The page has no script, so status and the Generate button only change on submit.
const UPDATE_HINT: &str =
    r#"<p class="hint">Click Update after changing any field to refresh this status and enable Generate Report.</p>"#;

fn render_status(completion: &Completion) -> String {
    if completion.complete_tests.is_empty() && completion.incomplete_tests.is_empty() {
        return String::new();
    }
    let mut html = String::from("<section>\n  <h2>Status</h2>\n<ul>");
    if !completion.patient_complete {
        let missing: Vec<&str> = completion
            .missing_patient_fields
            .iter()
            .map(|f| f.label())
            .collect();
        let _ = write!(
            html,
            r#"<li class="status-incomplete">Missing patient information: {}</li>"#,
            missing.join(", ")
        );
    }
    for kind in &completion.complete_tests {
        let _ = write!(
            html,
            r#"<li class="status-complete">{}: complete</li>"#,
            escape_html(&kind.definition().name)
        );
    }
    for kind in &completion.incomplete_tests {
        let _ = write!(
            html,
            r#"<li class="status-incomplete">{}: results missing</li>"#,
            escape_html(&kind.definition().name)
        );
    }
    html.push_str("</ul>\n");
    html.push_str(UPDATE_HINT);
    html.push_str("\n</section>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::params;
    use crate::models::PatientField;

    fn filled_form() -> LabForm {
        let mut form = LabForm::new(FormMode::Multiple);
        form.set_patient_field(PatientField::Name, "Jane <Doe>").unwrap();
        form.set_patient_field(PatientField::Age, "30").unwrap();
        form.set_patient_field(PatientField::Gender, "Female").unwrap();
        form.select_test(TestKind::Widal);
        form.set_result(TestKind::Widal, params::TYPHI_TO, "160").unwrap();
        form.set_result(TestKind::Widal, params::TYPHI_TH, "80").unwrap();
        form
    }

    #[test]
    fn button_label_pluralizes() {
        assert_eq!(generate_button_label(1), "Generate Report (1 test)");
        assert_eq!(generate_button_label(3), "Generate Report (3 tests)");
    }

    #[test]
    fn blank_form_has_no_generate_button() {
        let html = render_form_page(&LabForm::new(FormMode::Multiple), &ClinicProfile::default(), None);
        assert!(html.contains("Patient Information"));
        assert!(!html.contains(r#"value="report""#));
        assert!(!html.contains("Edit Mode Active"));
    }

    #[test]
    fn patient_values_are_escaped() {
        let html = render_form_page(&filled_form(), &ClinicProfile::default(), None);
        assert!(html.contains("Jane &lt;Doe&gt;"));
        assert!(!html.contains("Jane <Doe>"));
        assert!(html.contains(r#"<option value="Female" selected>"#));
    }

    #[test]
    fn result_fields_use_test_and_parameter_names() {
        let html = render_form_page(&filled_form(), &ClinicProfile::default(), None);
        assert!(html.contains(r#"name="widal_test::S. Typhi - TO" value="160""#));
        assert!(html.contains("1:80"));
        assert!(html.contains("(fixed)"));
    }

    #[test]
    fn generate_enabled_once_gate_opens() {
        let html = render_form_page(&filled_form(), &ClinicProfile::default(), None);
        assert!(html.contains(r#"value="report" class="btn btn-primary">Generate Report (1 test)"#));
    }

    #[test]
    fn generate_disabled_while_blocked() {
        let mut form = filled_form();
        form.set_patient_field(PatientField::Age, "").unwrap();
        let html = render_form_page(&form, &ClinicProfile::default(), None);
        assert!(html.contains(" disabled>Generate Report (1 test)"));
        assert!(html.contains("Missing patient information: Age"));
    }

    #[test]
    fn status_tells_user_to_click_update() {
        let html = render_form_page(&filled_form(), &ClinicProfile::default(), None);
        assert!(html.contains("Click Update after changing any field"));

        let blank = render_form_page(&LabForm::new(FormMode::Multiple), &ClinicProfile::default(), None);
        assert!(!blank.contains("Click Update after changing any field"));
    }

    #[test]
    fn single_mode_uses_radio_test_pick() {
        let html = render_form_page(&LabForm::new(FormMode::Single), &ClinicProfile::default(), None);
        assert!(html.contains(r#"<input type="radio" name="test" value="crp_test">"#));
    }

    #[test]
    fn stored_titer_prefix_not_doubled_in_input() {
        let mut form = filled_form();
        let payload = form.assemble(chrono::Utc::now().naive_local()).unwrap();
        form = LabForm::from_edit(FormMode::Multiple, &crate::models::EditRequest::from_payload(&payload));
        let html = render_form_page(&form, &ClinicProfile::default(), None);
        assert!(html.contains("Edit Mode Active"));
        assert!(html.contains(r#"name="edit" value="1""#));
        assert!(html.contains(r#"name="widal_test::S. Typhi - TO" value="160""#));
    }

    #[test]
    fn blocked_notice_names_reason() {
        let notice = FormNotice::Blocked(GenerationBlocked::NoTestSelected);
        let html = render_form_page(&LabForm::new(FormMode::Multiple), &ClinicProfile::default(), Some(&notice));
        assert!(html.contains("Cannot generate report: no test selected"));
    }
}
