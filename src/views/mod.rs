//! Server-rendered HTML pages: the lab form and the printable report.
//!
//! Pages are self-contained (inline CSS, no scripts required) so they can
//! be printed straight from the browser.

pub mod form_page;
pub mod report_page;

pub use form_page::{render_form_page, FormNotice};
pub use report_page::{render_missing_report, render_report_page, render_report_problem};

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Shared page chrome.
pub(crate) const BASE_CSS: &str = r#"
*,*::before,*::after{box-sizing:border-box}
body{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#f5f5f4;color:#1c1917}
.btn{display:inline-block;padding:10px 18px;border:none;border-radius:8px;font-size:.95rem;font-weight:600;cursor:pointer;text-decoration:none;background:#e7e5e4;color:#1c1917}
.btn-primary{background:#0f766e;color:#fff}
.btn[disabled]{opacity:.5;cursor:not-allowed}
.notice{border-radius:8px;padding:12px 16px;margin-bottom:16px;font-size:.9rem}
.notice-error{background:#fef2f2;border:1px solid #fecaca;color:#991b1b}
.notice-info{background:#f0fdfa;border:1px solid #99f6e4;color:#115e59}
"#;
