pub mod report;

use colored::Colorize;
use itertools::Itertools;
use tracing::error;

use crate::dashboard::DashboardSnapshot;
use crate::filters::{salary_bucket_label, FilterField, Filters, SALARY_BUCKETS};
use crate::model::{EmployeeStatus, FilterData};
use crate::table::format::COLUMNS;
use crate::table::{Tag, TableRow};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".csv") {
        return Some(OutputFormat::Csv);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn render(format: OutputFormat, snapshot: &DashboardSnapshot) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(snapshot).into_bytes(),
        OutputFormat::Json => render_json(snapshot),
        OutputFormat::Csv => render_csv(&snapshot.rows).unwrap_or_else(|e| {
            error!("failed to write csv: {e}");
            Vec::new()
        }),
        OutputFormat::Html => report::render_html(snapshot),
    }
}

const MAX_CELL_WIDTH: usize = 32;

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        return value.to_string();
    }
    let mut out: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{value}{}", " ".repeat(width.saturating_sub(len)))
}

fn paint_tag(tag: &Tag, padded: &str) -> String {
    let (r, g, b) = tag.color.rgb();
    padded.truecolor(r, g, b).to_string()
}

fn display_values(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn filter_line(filters: &Filters, field: FilterField) -> String {
    let values = filters.values(field);
    match field {
        FilterField::SalaryRange if !values.is_empty() => {
            let labels = values
                .iter()
                .map(|v| salary_bucket_label(v).unwrap_or(v.as_str()).to_string())
                .join(", ");
            format!(
                "{labels} (salaryMin={} salaryMax={})",
                filters.salary_min, filters.salary_max
            )
        }
        _ => display_values(&values),
    }
}

fn option_count(snapshot: &DashboardSnapshot, field: FilterField) -> Option<usize> {
    let catalog = &snapshot.catalog;
    match field {
        FilterField::LegalEntity => Some(catalog.legal_entities.len()),
        FilterField::SubEntity => Some(snapshot.available_sub_entities.len()),
        FilterField::Department => Some(catalog.departments.len()),
        FilterField::Designation => Some(catalog.designations.len()),
        FilterField::Skills => Some(catalog.skills.len()),
        FilterField::Status | FilterField::SalaryRange => None,
    }
}

fn render_panel(out: &mut String, snapshot: &DashboardSnapshot) {
    if !snapshot.panel_open {
        out.push_str(&format!("{} {}\n", "Filters".bold(), "[collapsed]".dimmed()));
        return;
    }
    let mut heading = format!("{}", "Filters".bold());
    if snapshot.unapplied_changes {
        heading.push_str(&format!(" {}", "(unapplied changes)".yellow()));
    }
    out.push_str(&heading);
    out.push('\n');
    for field in FilterField::ALL {
        let mut line = format!("  {:<15}: {}", field.label(), filter_line(&snapshot.filters, field));
        if let Some(count) = option_count(snapshot, field) {
            line.push_str(&format!("  {}", format!("({count} options)").dimmed()));
        }
        out.push_str(&line);
        out.push('\n');
    }
}

fn render_table(out: &mut String, rows: &[TableRow]) {
    let clipped: Vec<[String; 8]> = rows
        .iter()
        .map(|r| r.cells().map(|c| clip(&c)))
        .collect();

    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for cells in clipped.iter() {
        for (idx, cell) in cells.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let header = COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, c)| pad(c, widths[idx]))
        .join("  ");
    out.push_str(&format!("{}\n", header.bold()));
    out.push_str(&format!(
        "{}\n",
        widths.iter().map(|w| "─".repeat(*w)).join("  ").dimmed()
    ));

    for (row, cells) in rows.iter().zip(clipped.iter()) {
        let mut line: Vec<String> = Vec::with_capacity(cells.len());
        for (idx, cell) in cells.iter().enumerate() {
            let padded = pad(cell, widths[idx]);
            let painted = match idx {
                6 => paint_tag(&row.status, &padded),
                7 if !row.skills.is_empty() => paint_tag(&row.skills[0], &padded),
                _ => padded,
            };
            line.push(painted);
        }
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
}

pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", snapshot.title.bold()));
    out.push_str(&format!(":: Location : {}\n\n", snapshot.location));

    render_panel(&mut out, snapshot);
    out.push('\n');

    let mut heading = format!(
        "{} {}",
        "Employees".bold(),
        format!("({} selected)", snapshot.total_employees).dimmed()
    );
    if !snapshot.search.is_empty() {
        heading.push_str(&format!("  search: \"{}\"", snapshot.search));
    }
    if let Some(sort) = snapshot.sort {
        heading.push_str(&format!("  sort: {} ({})", sort.label(), sort.as_str()));
    }
    out.push_str(&heading);
    out.push('\n');

    if let Some(error) = snapshot.error.as_deref() {
        out.push_str(&format!(
            "{} {} {}\n",
            "error:".bold().red(),
            error,
            "(use `retry` to try again)".dimmed()
        ));
    }

    if snapshot.loading && !snapshot.loaded {
        out.push_str("Loading...\n");
        return out;
    }

    if snapshot.rows.is_empty() {
        out.push_str(&format!("{}\n", "No data".dimmed()));
    } else {
        render_table(&mut out, &snapshot.rows);
    }

    out.push('\n');
    out.push_str(&format!(
        ":: Page {} of {} :: {} per page :: showing {} row{}{}\n",
        snapshot.page,
        snapshot.page_count,
        snapshot.page_size,
        snapshot.visible_count,
        if snapshot.visible_count == 1 { "" } else { "s" },
        if snapshot.loading { " :: loading..." } else { "" }
    ));
    out
}

/// Every option the filter panel offers, one field per block.
pub fn render_catalog(catalog: &FilterData) -> String {
    let mut out = String::new();
    let mut block = |title: &str, values: Vec<String>| {
        out.push_str(&format!("{}\n", title.bold()));
        if values.is_empty() {
            out.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for v in values {
            out.push_str(&format!("  {v}\n"));
        }
    };
    block("Legal Entities", catalog.legal_entities.clone());
    block(
        "Sub Entities",
        catalog
            .sub_entities
            .iter()
            .map(|(entity, subs)| format!("{entity}: {}", subs.join(", ")))
            .collect(),
    );
    block("Departments", catalog.departments.clone());
    block("Designations", catalog.designations.clone());
    block("Skills", catalog.skills.clone());
    block(
        "Status",
        EmployeeStatus::OPTIONS.iter().map(|s| s.to_string()).collect(),
    );
    block(
        "Salary Range",
        SALARY_BUCKETS
            .iter()
            .map(|b| format!("{:<15} {}", b.value, b.label))
            .collect(),
    );
    out
}

pub fn render_json(snapshot: &DashboardSnapshot) -> Vec<u8> {
    serde_json::to_vec_pretty(snapshot).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_csv(rows: &[TableRow]) -> csv::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        let cells = row.cells();
        let skills = row.skills.iter().map(|t| t.label.as_str()).join(";");
        writer.write_record(cells[..7].iter().map(String::as_str).chain([skills.as_str()]))?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error().into())
}
