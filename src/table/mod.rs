pub mod format;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use icu_collator::{Collator, CollatorOptions};
use serde::Serialize;

use crate::model::{Employee, EmployeePage};

pub use format::{format_date, format_salary, Tag, TagColor, TableRow};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SortKey {
    #[serde(rename = "name-asc")]
    NameAsc,
    #[serde(rename = "name-desc")]
    NameDesc,
    #[serde(rename = "salary-asc")]
    SalaryAsc,
    #[serde(rename = "salary-desc")]
    SalaryDesc,
    #[serde(rename = "joiningDate-asc")]
    JoiningDateAsc,
    #[serde(rename = "joiningDate-desc")]
    JoiningDateDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::SalaryAsc,
        SortKey::SalaryDesc,
        SortKey::JoiningDateAsc,
        SortKey::JoiningDateDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::SalaryAsc => "salary-asc",
            Self::SalaryDesc => "salary-desc",
            Self::JoiningDateAsc => "joiningDate-asc",
            Self::JoiningDateDesc => "joiningDate-desc",
        }
    }

    /// Menu label shown next to the key.
    pub fn label(self) -> &'static str {
        match self {
            Self::NameAsc => "A-Z",
            Self::NameDesc => "Z-A",
            Self::SalaryAsc => "Low - High",
            Self::SalaryDesc => "High - Low",
            Self::JoiningDateAsc => "Oldest First",
            Self::JoiningDateDesc => "Newest First",
        }
    }

    pub fn compare(self, a: &Employee, b: &Employee) -> Ordering {
        match self {
            Self::NameAsc => locale_compare(&a.name, &b.name),
            Self::NameDesc => locale_compare(&b.name, &a.name),
            Self::SalaryAsc => a.salary.total_cmp(&b.salary),
            Self::SalaryDesc => b.salary.total_cmp(&a.salary),
            Self::JoiningDateAsc => compare_dates(a, b, false),
            Self::JoiningDateDesc => compare_dates(a, b, true),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        SortKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(raw) || k.label().eq_ignore_ascii_case(raw))
            .or_else(|| match raw.to_ascii_lowercase().as_str() {
                "joining-date-asc" | "date-asc" => Some(SortKey::JoiningDateAsc),
                "joining-date-desc" | "date-desc" => Some(SortKey::JoiningDateDesc),
                _ => None,
            })
            .ok_or_else(|| {
                let known = SortKey::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("unknown sort key '{raw}', expected one of: {known}")
            })
    }
}

thread_local! {
    // Root locale, tertiary strength.
    static COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Locale-aware ordering: accents and case are secondary to the base
/// letters, and on a case-only tie lowercase sorts first.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| b.cmp(a)),
    })
}

// Undated rows stay at the bottom in both directions.
fn compare_dates(a: &Employee, b: &Employee, descending: bool) -> Ordering {
    let da = a.joining_date.as_deref().and_then(format::parse_instant);
    let db = b.joining_date.as_deref().and_then(format::parse_instant);
    match (da, db) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive substring match on the name only.
pub fn search_employees<'a>(employees: &'a [Employee], query: &str) -> Vec<&'a Employee> {
    let needle = query.to_lowercase();
    employees
        .iter()
        .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn sort_employees(rows: &mut [&Employee], key: SortKey) {
    rows.sort_by(|a, b| key.compare(a, b));
}

/// Presentation state for the employee table. Holds the server's current
/// page and layers the local search and sort on top of it; neither affects
/// the server total.
#[derive(Clone, Debug, Default)]
pub struct TableView {
    employees: Option<Vec<Employee>>,
    total: u64,
    search: String,
    sort: Option<SortKey>,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_employees(&mut self, page: EmployeePage) {
        self.employees = Some(page.employees);
        self.total = page.total_employees;
    }

    pub fn is_loaded(&self) -> bool {
        self.employees.is_some()
    }

    pub fn employees(&self) -> &[Employee] {
        self.employees.as_deref().unwrap_or_default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Returns whether the query actually changed.
    pub fn set_search(&mut self, query: &str) -> bool {
        if self.search == query {
            return false;
        }
        self.search = query.to_string();
        true
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn set_sort(&mut self, key: Option<SortKey>) {
        self.sort = key;
    }

    pub fn visible_rows(&self) -> Vec<&Employee> {
        let mut rows = search_employees(self.employees(), &self.search);
        if let Some(key) = self.sort {
            sort_employees(&mut rows, key);
        }
        rows
    }

    pub fn rows(&self) -> Vec<TableRow> {
        self.visible_rows().into_iter().map(TableRow::from).collect()
    }

    pub fn page_count(&self, page_size: u32) -> u64 {
        let size = u64::from(page_size.max(1));
        self.total.div_ceil(size).max(1)
    }

    pub fn summary(&self) -> String {
        format!("{} selected", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(name: &str, salary: f64, joined: Option<&str>) -> Employee {
        Employee {
            name: name.to_string(),
            salary,
            joining_date: joined.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    fn names(rows: &[&Employee]) -> Vec<String> {
        rows.iter().map(|e| e.name.clone()).collect()
    }

    fn view(employees: Vec<Employee>, total: u64) -> TableView {
        let mut view = TableView::new();
        view.set_employees(EmployeePage {
            employees,
            total_employees: total,
        });
        view
    }

    #[test]
    fn name_desc_sorts_bob_before_alice() {
        let mut v = view(
            vec![employee("Alice", 1.0, None), employee("Bob", 2.0, None)],
            2,
        );
        v.set_sort(Some(SortKey::NameDesc));
        assert_eq!(names(&v.visible_rows()), vec!["Bob", "Alice"]);
    }

    #[test]
    fn search_is_case_insensitive_on_name() {
        let list = vec![employee("Alice", 1.0, None), employee("Bob", 2.0, None)];
        assert_eq!(names(&search_employees(&list, "ali")), vec!["Alice"]);
        assert_eq!(names(&search_employees(&list, "ALI")), vec!["Alice"]);
        assert_eq!(search_employees(&list, "").len(), 2);
    }

    #[test]
    fn search_does_not_change_total() {
        let mut v = view(
            vec![employee("Alice", 1.0, None), employee("Bob", 2.0, None)],
            57,
        );
        assert!(v.set_search("bob"));
        assert!(!v.set_search("bob"));
        assert_eq!(v.visible_rows().len(), 1);
        assert_eq!(v.total(), 57);
        assert_eq!(v.summary(), "57 selected");
    }

    #[test]
    fn salary_sorts_numerically() {
        let mut v = view(
            vec![
                employee("A", 9000.0, None),
                employee("B", 100000.0, None),
                employee("C", 25000.0, None),
            ],
            3,
        );
        v.set_sort(Some(SortKey::SalaryAsc));
        assert_eq!(names(&v.visible_rows()), vec!["A", "C", "B"]);
        v.set_sort(Some(SortKey::SalaryDesc));
        assert_eq!(names(&v.visible_rows()), vec!["B", "C", "A"]);
    }

    #[test]
    fn joining_date_sorts_chronologically_with_undated_last() {
        let mut v = view(
            vec![
                employee("Mid", 0.0, Some("2021-06-01")),
                employee("None", 0.0, None),
                employee("Old", 0.0, Some("2019-01-15")),
                employee("New", 0.0, Some("2024-03-05T10:00:00Z")),
            ],
            4,
        );
        v.set_sort(Some(SortKey::JoiningDateAsc));
        assert_eq!(names(&v.visible_rows()), vec!["Old", "Mid", "New", "None"]);
        v.set_sort(Some(SortKey::JoiningDateDesc));
        assert_eq!(names(&v.visible_rows()), vec!["New", "Mid", "Old", "None"]);
    }

    #[test]
    fn sort_persists_across_refresh_and_combines_with_search() {
        let mut v = view(vec![employee("Zed", 1.0, None)], 1);
        v.set_sort(Some(SortKey::NameAsc));
        v.set_search("a");
        v.set_employees(EmployeePage {
            employees: vec![
                employee("Maria", 1.0, None),
                employee("alan", 1.0, None),
                employee("Bob", 1.0, None),
                employee("Adam", 1.0, None),
            ],
            total_employees: 4,
        });
        assert_eq!(names(&v.visible_rows()), vec!["Adam", "alan", "Maria"]);
    }

    #[test]
    fn locale_compare_ignores_case() {
        assert_eq!(locale_compare("alice", "Bob"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("Émile", "Émile"), Ordering::Equal);
    }

    #[test]
    fn name_sort_places_accented_names_by_base_letter() {
        let mut v = view(
            vec![
                employee("Zoe", 1.0, None),
                employee("Émile", 1.0, None),
                employee("Adam", 1.0, None),
            ],
            3,
        );
        v.set_sort(Some(SortKey::NameAsc));
        assert_eq!(names(&v.visible_rows()), vec!["Adam", "Émile", "Zoe"]);
        v.set_sort(Some(SortKey::NameDesc));
        assert_eq!(names(&v.visible_rows()), vec!["Zoe", "Émile", "Adam"]);
        assert_eq!(locale_compare("emile", "Émile"), Ordering::Less);
    }

    #[test]
    fn sort_key_parses_keys_and_labels() {
        assert_eq!("name-desc".parse::<SortKey>().unwrap(), SortKey::NameDesc);
        assert_eq!("Newest First".parse::<SortKey>().unwrap(), SortKey::JoiningDateDesc);
        assert_eq!("joiningdate-asc".parse::<SortKey>().unwrap(), SortKey::JoiningDateAsc);
        assert!("age-asc".parse::<SortKey>().is_err());
    }

    #[test]
    fn page_count_rounds_up() {
        let v = view(Vec::new(), 41);
        assert_eq!(v.page_count(10), 5);
        assert_eq!(view(Vec::new(), 0).page_count(10), 1);
        assert!(!TableView::new().is_loaded());
    }
}
