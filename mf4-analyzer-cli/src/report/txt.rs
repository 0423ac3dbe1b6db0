//! Plain-text report with an ASCII metrics table

use super::{ReportContext, TABLE_HEADERS};
use std::fmt::Write;

const RULE: &str = "==============================================================";

pub fn render(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();

    // writeln! into a String cannot fail
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  MF4 Analysis Report");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Logfile:   {}", ctx.log.file_name);
    let _ = writeln!(out, "Generated: {}", ctx.generated_at());
    let _ = writeln!(out);

    for (label, value) in ctx.analysis.summary.iter() {
        let _ = writeln!(out, "- {:<25}: {}", label, value);
    }
    let _ = writeln!(out);

    let rows = ctx.table_rows();
    // Widths in characters; units such as "°C" are wider in bytes
    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let _ = writeln!(out, "+{}+", separator);
    write_row(&mut out, &TABLE_HEADERS[..], &widths);
    let _ = writeln!(out, "+{}+", separator);
    for row in &rows {
        write_row(&mut out, &row[..], &widths);
    }
    let _ = writeln!(out, "+{}+", separator);

    if !ctx.analysis.skipped.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Skipped signals:");
        for skipped in &ctx.analysis.skipped {
            let _ = writeln!(out, "  {} [{}]: {}", skipped.name, skipped.metric, skipped.reason);
        }
    }

    if !ctx.plots.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Plots:");
        for plot in ctx.plot_refs() {
            let _ = writeln!(out, "  {}", plot);
        }
    }

    out
}

fn write_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize; 5]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(out, " {:<width$} |", cell.as_ref(), width = *width);
    }
    out.push('\n');
}
