use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::{Employee, EmployeeStatus};
use crate::utils;

pub const DATE_PLACEHOLDER: &str = "-";
pub const CURRENCY_PREFIX: &str = "$";

pub const COLUMNS: [&str; 8] = [
    "Name",
    "Email",
    "Department",
    "Designation",
    "Joining Date",
    "Salary",
    "Status",
    "Skills",
];

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Calendar date as it should be displayed (timestamps keep the date of
/// their own offset).
fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// Point in time used for chronological ordering, normalized to UTC.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// `DD Mon YYYY`, or `-` when the date is missing or unreadable.
pub fn format_date(value: Option<&str>) -> String {
    let raw = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return DATE_PLACEHOLDER.to_string(),
    };
    match parse_calendar_date(raw) {
        Some(date) => date.format("%d %b %Y").to_string(),
        None => DATE_PLACEHOLDER.to_string(),
    }
}

pub fn format_salary(salary: f64) -> String {
    format!("{CURRENCY_PREFIX}{}", utils::group_thousands(salary))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    Green,
    Volcano,
    Blue,
}

impl TagColor {
    pub fn hex(self) -> &'static str {
        match self {
            Self::Green => "#52c41a",
            Self::Volcano => "#fa541c",
            Self::Blue => "#1677ff",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Green => (82, 196, 26),
            Self::Volcano => (250, 84, 28),
            Self::Blue => (22, 119, 255),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub label: String,
    pub color: TagColor,
}

pub fn status_tag(status: &EmployeeStatus) -> Tag {
    Tag {
        label: status.as_str().to_string(),
        color: if status.is_active() {
            TagColor::Green
        } else {
            TagColor::Volcano
        },
    }
}

pub fn skill_tags(skills: &[String]) -> Vec<Tag> {
    skills
        .iter()
        .map(|s| Tag {
            label: s.clone(),
            color: TagColor::Blue,
        })
        .collect()
}

/// One rendered table row; every cell already formatted for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub key: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
    pub joining_date: String,
    pub salary: String,
    pub status: Tag,
    pub skills: Vec<Tag>,
}

impl TableRow {
    pub fn cells(&self) -> [String; 8] {
        [
            self.name.clone(),
            self.email.clone(),
            self.department.clone(),
            self.designation.clone(),
            self.joining_date.clone(),
            self.salary.clone(),
            self.status.label.clone(),
            self.skills
                .iter()
                .map(|t| t.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ]
    }
}

impl From<&Employee> for TableRow {
    fn from(e: &Employee) -> Self {
        Self {
            key: e.id.to_string(),
            name: e.name.clone(),
            email: e.email.clone(),
            department: e.department.clone(),
            designation: e.designation.clone(),
            joining_date: format_date(e.joining_date.as_deref()),
            salary: format_salary(e.salary),
            status: status_tag(&e.status),
            skills: skill_tags(&e.skills),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_date_zero_pads_day() {
        assert_eq!(format_date(Some("2024-03-05")), "05 Mar 2024");
        assert_eq!(format_date(Some("2021-12-25")), "25 Dec 2021");
    }

    #[test]
    fn format_date_missing_renders_placeholder() {
        assert_eq!(format_date(None), "-");
        assert_eq!(format_date(Some("")), "-");
        assert_eq!(format_date(Some("not a date")), "-");
    }

    #[test]
    fn format_date_accepts_timestamps() {
        assert_eq!(format_date(Some("2023-07-01T09:30:00Z")), "01 Jul 2023");
        assert_eq!(format_date(Some("2023-07-01T09:30:00.000")), "01 Jul 2023");
    }

    #[test]
    fn parse_instant_orders_offsets_in_utc() {
        let a = parse_instant("2023-07-01T01:00:00+05:00").unwrap();
        let b = parse_instant("2023-06-30T21:00:00Z").unwrap();
        assert!(a < b);
        assert!(parse_instant("").is_none());
    }

    #[test]
    fn salary_has_prefix_and_separators() {
        assert_eq!(format_salary(75000.0), "$75,000");
        assert_eq!(format_salary(1250000.0), "$1,250,000");
        assert_eq!(format_salary(0.0), "$0");
    }

    #[test]
    fn status_tag_colors() {
        assert_eq!(status_tag(&EmployeeStatus::Active).color, TagColor::Green);
        assert_eq!(status_tag(&EmployeeStatus::Inactive).color, TagColor::Volcano);
        assert_eq!(
            status_tag(&EmployeeStatus::Other("On Leave".to_string())).color,
            TagColor::Volcano
        );
    }

    #[test]
    fn row_renders_one_tag_per_skill() {
        let e = Employee {
            name: "Alice".to_string(),
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            salary: 1000.0,
            joining_date: Some("2024-03-05".to_string()),
            ..Default::default()
        };
        let row = TableRow::from(&e);
        assert_eq!(row.skills.len(), 2);
        assert!(row.skills.iter().all(|t| t.color == TagColor::Blue));
        assert_eq!(row.cells()[4], "05 Mar 2024");
        assert_eq!(row.cells()[5], "$1,000");
        assert_eq!(row.cells()[7], "Rust, SQL");
    }
}
