//! Terminal and JSON renderings of a run.

use std::fmt::Write as _;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use serde::Serialize;
use serde_json::Value;

use nofhir_model::{DocRefs, Finding, Severity};

use crate::report::{RunReport, SectionReport, SectionStatus};
use crate::section::{Section, SectionGroup};

/// One findings table per section, grouped under their headings.
pub fn render_table(run: &RunReport, show_source: bool) -> String {
    let mut out = String::new();
    if let Some(server) = &run.server {
        let _ = writeln!(out, "Server: {server}");
    }
    for_each_section(run, &mut out, |out, report| {
        let section = report.section();
        let _ = writeln!(out, "{section}");
        if let Some(description) = section.description() {
            let _ = writeln!(out, "{description}");
        }
        write_links(out, &section.references());

        if report.status() == SectionStatus::Loading {
            let _ = writeln!(out, "Loading...");
            return;
        }

        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Severity"),
            header_cell("Message"),
            header_cell("References"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 0, CellAlignment::Center);
        for finding in report.ranked() {
            table.add_row(vec![
                severity_cell(finding.severity()),
                Cell::new(finding.message()),
                refs_cell(finding.references()),
            ]);
        }
        let _ = writeln!(out, "{table}");
        if show_source {
            write_source(out, report.payload());
        }
    });
    let _ = writeln!(out, "{}", render_summary(run));
    out
}

/// Plain lines without box drawing, for logs and pipes.
pub fn render_text(run: &RunReport, show_source: bool) -> String {
    let mut out = String::new();
    if let Some(server) = &run.server {
        let _ = writeln!(out, "Server: {server}");
    }
    for_each_section(run, &mut out, |out, report| {
        let _ = writeln!(out, "{}", report.section());
        if report.status() == SectionStatus::Loading {
            let _ = writeln!(out, "  loading");
            return;
        }
        for finding in report.ranked() {
            let _ = writeln!(
                out,
                "  {:<8} {}",
                finding.severity().label(),
                finding.message()
            );
        }
        if show_source {
            write_source(out, report.payload());
        }
    });
    let _ = writeln!(
        out,
        "\nSummary: {} error(s), {} warning(s)",
        run.error_count(),
        run.warning_count()
    );
    out
}

fn for_each_section(
    run: &RunReport,
    out: &mut String,
    mut render: impl FnMut(&mut String, &SectionReport),
) {
    let mut current_group: Option<SectionGroup> = None;
    for report in run.sections() {
        let group = report.section().group();
        if current_group != Some(group) {
            let _ = writeln!(out, "\n{}", group.title());
            current_group = Some(group);
        }
        out.push('\n');
        render(out, report);
    }
}

fn write_links(out: &mut String, refs: &DocRefs) {
    for (label, url) in refs.links() {
        let _ = writeln!(out, "{label}: {url}");
    }
}

fn write_source(out: &mut String, payload: Option<&Value>) {
    if let Some(payload) = payload {
        let _ = writeln!(out, "Source:\n{}", pretty_source(payload));
    }
}

/// Pretty-printed payload for the debug view.
pub fn pretty_source(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

/// Per-section counts with a total row.
pub fn render_summary(run: &RunReport) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Section"),
        header_cell("Status"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Info"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);

    for report in run.sections() {
        let section = report.section();
        table.add_row(vec![
            dim_cell(section.index()),
            Cell::new(section.title()),
            status_cell(report.status()),
            count_cell(report.error_count(), Color::Red),
            count_cell(report.warning_count(), Color::Yellow),
            count_cell(report.count(Severity::Info), Color::Blue),
        ]);
    }
    table.add_row(vec![
        dim_cell("-"),
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(run.error_count(), Color::Red).add_attribute(Attribute::Bold),
        count_cell(run.warning_count(), Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table.to_string()
}

/// The section catalogue, for `nofhir sections`.
pub fn render_catalogue() -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Key"),
        header_cell("Section"),
        header_cell("Group"),
        header_cell("Writes"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for section in Section::ALL {
        table.add_row(vec![
            dim_cell(section.index()),
            Cell::new(section.key()),
            Cell::new(section.title()),
            Cell::new(section.group().title()),
            if section.is_write() {
                Cell::new("yes").fg(Color::Yellow)
            } else {
                dim_cell("no")
            },
        ]);
    }
    table.to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRun<'a> {
    generated_at: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    server: Option<&'a str>,
    errors: usize,
    warnings: usize,
    sections: Vec<JsonSection<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSection<'a> {
    index: usize,
    key: &'static str,
    title: &'static str,
    group: &'static str,
    status: SectionStatus,
    findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a Value>,
}

impl<'a> JsonSection<'a> {
    fn new(report: &'a SectionReport) -> Self {
        let section: Section = report.section();
        Self {
            index: section.index(),
            key: section.key(),
            title: section.title(),
            group: section.group().title(),
            status: report.status(),
            findings: report.ranked(),
            payload: report.payload(),
        }
    }
}

/// The whole run, findings ranked, as one JSON document.
pub fn render_json(run: &RunReport) -> serde_json::Result<String> {
    let doc = JsonRun {
        generated_at: &run.generated_at,
        server: run.server.as_deref(),
        errors: run.error_count(),
        warnings: run.warning_count(),
        sections: run.sections().iter().map(JsonSection::new).collect(),
    };
    serde_json::to_string_pretty(&doc)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(9)),
        ColumnConstraint::UpperBoundary(Width::Percentage(60)),
        ColumnConstraint::UpperBoundary(Width::Percentage(30)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn severity_cell(severity: Severity) -> Cell {
    let cell = Cell::new(severity.label());
    match severity {
        Severity::Error => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Severity::Warning => cell.fg(Color::Yellow),
        Severity::Info => cell.fg(Color::Blue),
        Severity::Ok => cell.fg(Color::Green),
    }
}

fn status_cell(status: SectionStatus) -> Cell {
    match status {
        SectionStatus::Loading => dim_cell("loading"),
        SectionStatus::Failed => Cell::new("fetch failed").fg(Color::Red),
        SectionStatus::Validated => Cell::new("validated").fg(Color::Green),
    }
}

fn refs_cell(refs: &DocRefs) -> Cell {
    if refs.is_empty() {
        return dim_cell("-");
    }
    let lines: Vec<String> = refs
        .links()
        .map(|(label, url)| format!("{label}: {url}"))
        .collect();
    Cell::new(lines.join("\n"))
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
