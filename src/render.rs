use crate::report::Report;
use chrono::{Duration, NaiveDate};
use polars::prelude::{AnyValue, DataFrame, PolarsResult};
use std::fmt::Write;

const RULE_WIDTH: usize = 80;

/// `1234567.891` -> `1,234,567.89`
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

fn date_from_i32(days: i32) -> NaiveDate {
    NaiveDate::default() + Duration::days(i64::from(days))
}

fn format_cell(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => "N/A".to_string(),
        AnyValue::Float64(v) => format_amount(*v),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Date(days) => date_from_i32(*days).format("%Y-%m-%d").to_string(),
        other => other.to_string(),
    }
}

/// Grid-style text table over every column of `df`.
pub fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| format_cell(&av)).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, row: &[String]| {
        out.push('|');
        for (ci, cell) in row.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(cell.chars().count())));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, col_names.as_slice());
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_row(&mut out, row.as_slice());
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn section(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "\n{rule}\n{title}\n{rule}");
}

/// The full console report: scorecard, allocation, milestones, risk grid and
/// warnings.
pub fn render_report(report: &Report) -> PolarsResult<String> {
    let mut out = String::new();

    section(&mut out, "PROJECT PERFORMANCE REPORT");
    out.push_str("\nEXECUTIVE SUMMARY\n");
    out.push_str(&render_df_as_text_table(&report.summary_frame()?));
    out.push_str("\nPERFORMANCE INDICATORS\n");
    out.push_str(&render_df_as_text_table(&report.indicator_frame()?));
    out.push_str("\nTASK-LEVEL PERFORMANCE\n");
    out.push_str(&render_df_as_text_table(&report.task_frame()?));

    section(&mut out, "RESOURCE ALLOCATION ANALYSIS");
    out.push_str(&render_df_as_text_table(&report.allocation_frame()?));
    let allocation = report.allocation();
    let flagged: Vec<_> = allocation.over_allocated().collect();
    if flagged.is_empty() {
        out.push_str("\nAll resources are within normal allocation limits.\n");
    } else {
        let _ = writeln!(
            out,
            "\nCRITICAL: the following resources are overallocated (>{} active tasks):",
            allocation.threshold
        );
        for load in flagged {
            let _ = writeln!(out, "   - {}: {} active tasks", load.resource_name, load.active_tasks);
        }
    }

    let milestones = report.milestones();
    if !milestones.milestones.is_empty() {
        section(&mut out, "MILESTONE TRACKING");
        out.push_str(&render_df_as_text_table(&report.milestone_frame()?));
        let counts = milestones.counts;
        let _ = writeln!(
            out,
            "\nCompleted: {}  In Progress: {}  Not Started: {}",
            counts.completed, counts.in_progress, counts.not_started
        );
        if !milestones.blocked.is_empty() {
            let _ = writeln!(out, "Waiting on dependencies: {}", milestones.blocked.join(", "));
        }
    }

    section(&mut out, "RISK DISTRIBUTION BY DEPARTMENT");
    if report.risk_matrix().is_empty() {
        out.push_str("No tasks to aggregate.\n");
    } else {
        out.push_str(&render_df_as_text_table(&report.risk_matrix().to_dataframe()?));
    }

    if !report.warnings().is_empty() {
        section(&mut out, "WARNINGS");
        for warning in report.warnings() {
            let _ = writeln!(out, "  - {warning}");
        }
    }

    Ok(out)
}
