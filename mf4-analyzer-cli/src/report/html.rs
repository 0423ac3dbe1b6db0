//! HTML report with inline CSS and embedded plot images

use super::{ReportContext, TABLE_HEADERS};
use std::fmt::Write;

const STYLE: &str = "body { font-family: Helvetica, Arial, sans-serif; margin: 2em; color: #222; }
h1 { font-size: 1.6em; margin-bottom: 0.2em; }
.meta { color: #666; margin-top: 0; }
table { border-collapse: collapse; margin: 1em 0; }
th, td { border: 1px solid #999; padding: 4px 10px; }
th { background: #eee; text-align: left; }
td.num { text-align: right; }
.skipped { color: #a33; }
img { display: block; max-width: 100%; margin: 1em 0; }";

/// Escape text for element content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();
    let title = format!("MF4 Analysis Report - {}", escape(&ctx.log.file_name));

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{}</title>", title);
    let _ = writeln!(out, "<style>\n{}\n</style>\n</head>\n<body>", STYLE);

    let _ = writeln!(out, "<h1>MF4 Analysis Report</h1>");
    let _ = writeln!(
        out,
        "<p class=\"meta\">Logfile: {}<br>Generated: {}</p>",
        escape(&ctx.log.file_name),
        ctx.generated_at()
    );

    let _ = writeln!(out, "<h2>Summary</h2>\n<ul>");
    for (label, value) in ctx.analysis.summary.iter() {
        let _ = writeln!(out, "<li><b>{}</b>: {}</li>", escape(label), escape(value));
    }
    let _ = writeln!(out, "</ul>");

    let _ = writeln!(out, "<h2>Metrics</h2>\n<table>\n<tr>");
    for header in TABLE_HEADERS {
        let _ = writeln!(out, "<th>{}</th>", header);
    }
    let _ = writeln!(out, "</tr>");
    for row in ctx.table_rows() {
        let _ = write!(out, "<tr>");
        for (index, cell) in row.iter().enumerate() {
            let class = if index >= 3 { " class=\"num\"" } else { "" };
            let _ = write!(out, "<td{}>{}</td>", class, escape(cell));
        }
        let _ = writeln!(out, "</tr>");
    }
    let _ = writeln!(out, "</table>");

    if !ctx.analysis.skipped.is_empty() {
        let _ = writeln!(out, "<h2>Skipped signals</h2>\n<ul class=\"skipped\">");
        for skipped in &ctx.analysis.skipped {
            let _ = writeln!(
                out,
                "<li>{} [{}]: {}</li>",
                escape(&skipped.name),
                escape(&skipped.metric),
                escape(&skipped.reason.to_string())
            );
        }
        let _ = writeln!(out, "</ul>");
    }

    let refs = ctx.plot_refs();
    if !refs.is_empty() {
        let _ = writeln!(out, "<h2>Plots</h2>");
        for plot in refs {
            let src = escape(&plot);
            let _ = writeln!(out, "<img src=\"{}\" alt=\"{}\">", src, src);
        }
    }

    let _ = writeln!(out, "</body>\n</html>");
    out
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape("40.00 -> 55.00"), "40.00 -&gt; 55.00");
    }

    #[test]
    fn test_html_report_sections() {
        let analysis = charging_analysis();
        let info = log_info();
        let plots = vec![
            PathBuf::from("out/R&D_charge_current.svg"),
            PathBuf::from("out/R&D_charge_soc.svg"),
        ];
        let ctx = ReportContext::new(&info, &analysis, &plots);

        let html = render(&ctx);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>MF4 Analysis Report</h1>"));
        assert!(html.contains("Logfile: R&amp;D_charge.csv"));
        assert!(html.contains("<li><b>Mode</b>: Charging</li>"));
        assert!(html.contains("<th>Metric</th>"));
        assert!(html.contains("<td>CellTempMax</td>"));
        assert!(html.contains("<img src=\"R&amp;D_charge_current.svg\""));
        assert!(html.contains("<img src=\"R&amp;D_charge_soc.svg\""));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
