//! Result rendering
//!
//! Turns a [`RunReport`] into console text, JSON, or a standalone HTML page.

use crate::error::Result;
use crate::pipeline::RunReport;
use htmlescape::{encode_attribute, encode_minimal};
use std::fmt::Write;

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Console text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// Standalone HTML page
    Html,
}

const SEPARATOR: &str = "--------------------------------------------------";

/// Upload form served at `/`, naming the two required columns
pub fn upload_form(reference_column: &str, label_column: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Editorial Scan</title>
</head>
<body>
<h1>Editorial Scan</h1>
<p>Upload a workbook with the columns <code>{}</code> and <code>{}</code>.</p>
<form method="post" enctype="multipart/form-data">
<input type="file" name="excel_file" accept=".xlsx,.xls,.ods">
<button type="submit">Scan</button>
</form>
</body>
</html>
"#,
        encode_minimal(reference_column),
        encode_minimal(label_column)
    )
}

/// Render `report` in `format`
pub fn render(report: &RunReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => render_json(report),
        ReportFormat::Html => Ok(render_html(report)),
    }
}

/// `Title:` line, one line per link, then a separator, for each record
pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    for record in &report.records {
        let _ = writeln!(out, "Title: {}", record.title);
        for url in &record.links {
            let _ = writeln!(out, "Editorial Image URL: {}", url);
        }
        let _ = writeln!(out, "{}", SEPARATOR);
    }
    out
}

/// Pretty-printed JSON of the whole report
pub fn render_json(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Standalone results page
pub fn render_html(report: &RunReport) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Editorial Scan Results</title>\n</head>\n<body>\n\
         <h1>Extracted Editorial Images</h1>\n",
    );

    if report.records.is_empty() {
        out.push_str("<p>No editorial-use links found.</p>\n");
    }

    for record in &report.records {
        let _ = writeln!(out, "<section>\n<h2>{}</h2>\n<ul>", encode_minimal(&record.title));
        for url in &record.links {
            let _ = writeln!(
                out,
                "<li><a href=\"{}\">{}</a></li>",
                encode_attribute(url),
                encode_minimal(url)
            );
        }
        out.push_str("</ul>\n</section>\n");
    }

    let _ = writeln!(
        out,
        "<p>{} of {} rows with editorial links.</p>\n<p><a href=\"/\">Scan another file</a></p>\n</body>\n</html>",
        report.records.len(),
        report.rows_total
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ResultRecord, SkipReason, SkippedRow};
    use chrono::Utc;

    fn report() -> RunReport {
        RunReport {
            records: vec![ResultRecord {
                title: "site.example/page".to_string(),
                links: vec![
                    "https://www.123rf.com/photo_1.html".to_string(),
                    "https://www.123rf.com/photo_2.html?a=1&b=<2>".to_string(),
                ],
            }],
            skipped: vec![SkippedRow {
                index: 2,
                reason: SkipReason::MissingField,
            }],
            rows_total: 2,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&report());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Title: site.example/page");
        assert_eq!(lines[1], "Editorial Image URL: https://www.123rf.com/photo_1.html");
        assert_eq!(lines[3], SEPARATOR);
    }

    #[test]
    fn test_render_html_escapes() {
        let html = render_html(&report());
        assert!(html.contains("<h2>site.example/page</h2>"));
        assert!(html.contains("&lt;2&gt;"));
        assert!(!html.contains("b=<2>"));
        assert!(html.contains("1 of 2 rows"));
    }

    #[test]
    fn test_render_html_empty() {
        let mut empty = report();
        empty.records.clear();
        assert!(render_html(&empty).contains("No editorial-use links found."));
    }

    #[test]
    fn test_upload_form_names_columns() {
        let form = upload_form("Doc <link>", "Site");
        assert!(form.contains("<code>Doc &lt;link&gt;</code>"));
        assert!(form.contains("<code>Site</code>"));
        assert!(form.contains("name=\"excel_file\""));
    }

    #[test]
    fn test_render_json() {
        let json = render(&report(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["records"][0]["title"], "site.example/page");
        assert_eq!(value["skipped"][0]["reason"], "missing_field");
    }
}
