pub mod query;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::FilterData;
use crate::utils;

pub use query::{History, Location, QueryParams};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SalaryBucket {
    pub value: &'static str,
    pub label: &'static str,
}

pub const SALARY_BUCKETS: [SalaryBucket; 6] = [
    SalaryBucket {
        value: "any",
        label: "Any salary range",
    },
    SalaryBucket {
        value: "0-10000",
        label: "₹0 - ₹10,000",
    },
    SalaryBucket {
        value: "10000-50000",
        label: "₹10,000 - ₹50,000",
    },
    SalaryBucket {
        value: "50000-100000",
        label: "₹50,000 - ₹1,00,000",
    },
    SalaryBucket {
        value: "100000-150000",
        label: "₹1,00,000 - ₹1,50,000",
    },
    SalaryBucket {
        value: "above-150000",
        label: "Above ₹1,50,000",
    },
];

pub fn salary_bucket_label(value: &str) -> Option<&'static str> {
    SALARY_BUCKETS
        .iter()
        .find(|b| b.value == value)
        .map(|b| b.label)
}

// Number() coercion: blank is zero, anything non-numeric is NaN.
fn coerce_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Numeric bounds of a bucket id of the form `"<min>-<max>"`. Ids that do not
/// follow the form produce NaN on the offending side.
pub fn bucket_bounds(id: &str) -> (f64, f64) {
    let mut parts = id.split('-').map(coerce_number);
    let min = parts.next().unwrap_or(f64::NAN);
    let max = parts.next().unwrap_or(f64::NAN);
    (min, max)
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Overall `(min, max)` across the selected buckets, or `None` when nothing
/// is selected. A NaN side anywhere makes that bound NaN.
pub fn salary_bounds(selected: &[String]) -> Option<(f64, f64)> {
    if selected.is_empty() {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for id in selected {
        let (lo, hi) = bucket_bounds(id);
        min = nan_min(min, lo);
        max = nan_max(max, hi);
    }
    Some((min, max))
}

/// The active filter selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub legal_entity: String,
    pub sub_entity: String,
    pub department: Vec<String>,
    pub designation: Vec<String>,
    pub status: Vec<String>,
    pub skills: Vec<String>,
    pub salary_min: String,
    pub salary_max: String,
    pub salary_range: Vec<String>,
}

const KEY_SALARY_MIN: &str = "salaryMin";
const KEY_SALARY_MAX: &str = "salaryMax";

// Deep-link values are split verbatim so a reset fetch sends exactly what
// the address bar holds. An empty value is an empty list.
fn split_list(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(value) if !value.is_empty() => value.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

impl Filters {
    /// Hydrates a selection from deep-link query parameters.
    pub fn from_query(query: &QueryParams) -> Self {
        let scalar = |key: &str| query.get(key).unwrap_or_default().to_string();
        Self {
            legal_entity: scalar(FilterField::LegalEntity.key()),
            sub_entity: scalar(FilterField::SubEntity.key()),
            department: split_list(query.get(FilterField::Department.key())),
            designation: split_list(query.get(FilterField::Designation.key())),
            status: split_list(query.get(FilterField::Status.key())),
            skills: split_list(query.get(FilterField::Skills.key())),
            salary_min: scalar(KEY_SALARY_MIN),
            salary_max: scalar(KEY_SALARY_MAX),
            salary_range: split_list(query.get(FilterField::SalaryRange.key())),
        }
    }

    /// Every field as a wire string, lists comma-joined, in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (FilterField::LegalEntity.key(), self.legal_entity.clone()),
            (FilterField::SubEntity.key(), self.sub_entity.clone()),
            (FilterField::Department.key(), self.department.join(",")),
            (FilterField::Designation.key(), self.designation.join(",")),
            (FilterField::Status.key(), self.status.join(",")),
            (FilterField::Skills.key(), self.skills.join(",")),
            (KEY_SALARY_MIN, self.salary_min.clone()),
            (KEY_SALARY_MAX, self.salary_max.clone()),
            (FilterField::SalaryRange.key(), self.salary_range.join(",")),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn values(&self, field: FilterField) -> Vec<String> {
        match field {
            FilterField::LegalEntity => single(&self.legal_entity),
            FilterField::SubEntity => single(&self.sub_entity),
            FilterField::Department => self.department.clone(),
            FilterField::Designation => self.designation.clone(),
            FilterField::Status => self.status.clone(),
            FilterField::Skills => self.skills.clone(),
            FilterField::SalaryRange => self.salary_range.clone(),
        }
    }
}

fn single(value: &str) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value.to_string()]
    }
}

/// User-editable filter fields. `salaryMin`/`salaryMax` are derived from
/// `salaryRange` and cannot be edited directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterField {
    LegalEntity,
    SubEntity,
    Department,
    Designation,
    Status,
    Skills,
    SalaryRange,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::LegalEntity,
        FilterField::SubEntity,
        FilterField::Department,
        FilterField::Designation,
        FilterField::Status,
        FilterField::Skills,
        FilterField::SalaryRange,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::LegalEntity => "legalEntity",
            Self::SubEntity => "subEntity",
            Self::Department => "department",
            Self::Designation => "designation",
            Self::Status => "status",
            Self::Skills => "skills",
            Self::SalaryRange => "salaryRange",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LegalEntity => "Legal Entities",
            Self::SubEntity => "Sub Entity",
            Self::Department => "Department",
            Self::Designation => "Designation",
            Self::Status => "Status",
            Self::Skills => "Skills",
            Self::SalaryRange => "Salary Range",
        }
    }

    pub fn is_multi(self) -> bool {
        !matches!(self, Self::LegalEntity | Self::SubEntity)
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "legalentity" | "entity" => Ok(Self::LegalEntity),
            "subentity" => Ok(Self::SubEntity),
            "department" | "dept" => Ok(Self::Department),
            "designation" => Ok(Self::Designation),
            "status" => Ok(Self::Status),
            "skills" | "skill" => Ok(Self::Skills),
            "salaryrange" | "salary" => Ok(Self::SalaryRange),
            _ => Err(format!("unknown filter field '{}'", s.trim())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterValue {
    Single(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// Scalar values become a one-element list; an empty scalar is an empty list.
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::Single(v) if v.is_empty() => Vec::new(),
            Self::Single(v) => vec![v],
            Self::Many(v) => v,
        }
    }

    pub fn into_scalar(self) -> String {
        match self {
            Self::Single(v) => v,
            Self::Many(v) => v.join(","),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterEdit {
    pub field: FilterField,
    pub value: FilterValue,
}

impl FilterEdit {
    pub fn new(field: FilterField, value: impl Into<FilterValue>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Result of applying one edit: the next selection and the query string the
/// address bar should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub filters: Filters,
    pub url_query: QueryParams,
}

/// Applies `edit` to `prev` and derives the next address-bar query from
/// `current_url`. Pure: no navigation or fetching happens here.
pub fn transition(prev: &Filters, current_url: &QueryParams, edit: FilterEdit) -> Transition {
    let mut next = prev.clone();
    let mut mirror_salary_range = true;

    match edit.field {
        FilterField::SalaryRange => {
            let selected = edit.value.into_list();
            match salary_bounds(&selected) {
                Some((min, max)) => {
                    next.salary_min = utils::js_number(min);
                    next.salary_max = utils::js_number(max);
                }
                None => {
                    next.salary_min.clear();
                    next.salary_max.clear();
                }
            }
            next.salary_range = selected;
            mirror_salary_range = false;
        }
        FilterField::LegalEntity => {
            let value = edit.value.into_scalar();
            if value != prev.legal_entity {
                next.sub_entity.clear();
            }
            next.legal_entity = value;
        }
        FilterField::SubEntity => next.sub_entity = edit.value.into_scalar(),
        FilterField::Department => next.department = edit.value.into_list(),
        FilterField::Designation => next.designation = edit.value.into_list(),
        FilterField::Status => next.status = edit.value.into_list(),
        FilterField::Skills => next.skills = edit.value.into_list(),
    }

    let url_query = mirror_into_query(current_url, &next, mirror_salary_range);
    Transition {
        filters: next,
        url_query,
    }
}

fn mirror_into_query(current: &QueryParams, filters: &Filters, with_salary_range: bool) -> QueryParams {
    let mut query = current.clone();
    for (key, value) in filters.entries() {
        if key == FilterField::SalaryRange.key() && !with_salary_range {
            query.delete(key);
            continue;
        }
        if value.is_empty() {
            query.delete(key);
        } else {
            query.set(key, value);
        }
    }
    query.delete("page");
    query
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchReason {
    Mount,
    Apply,
    Reset,
    Pagination,
}

impl fmt::Display for FetchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Mount => "mount",
            Self::Apply => "apply",
            Self::Reset => "reset",
            Self::Pagination => "pagination",
        };
        f.write_str(label)
    }
}

/// A fetch the view wants issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub reason: FetchReason,
    pub filters: Filters,
    pub page: u32,
    pub page_size: u32,
}

impl FetchRequest {
    /// Every filter key is sent, empty or not, followed by the pagination.
    pub fn query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        for (key, value) in self.filters.entries() {
            query.append(key, value);
        }
        query.append("page", self.page.to_string());
        query.append("pageSize", self.page_size.to_string());
        query
    }
}

/// Draft filters, pagination and navigation for one dashboard view.
///
/// Field edits only touch the draft and the address bar. The filters that
/// data is actually fetched with (`active`) change on apply, on reset, and
/// at hydration time.
#[derive(Clone, Debug)]
pub struct FilterState {
    draft: Filters,
    active: Filters,
    page: u32,
    page_size: u32,
    synced: Option<(u32, u32)>,
    history: History,
    catalog: FilterData,
    available_sub_entities: Vec<String>,
}

impl FilterState {
    pub fn new(page_size: u32) -> Self {
        Self::from_location(Location::root(), page_size)
    }

    pub fn from_location(location: Location, page_size: u32) -> Self {
        let draft = Filters::from_query(&location.query);
        let page = location
            .query
            .get("page")
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        Self {
            active: draft.clone(),
            draft,
            page,
            page_size: page_size.max(1),
            synced: None,
            history: History::new(location),
            catalog: FilterData::default(),
            available_sub_entities: Vec::new(),
        }
    }

    pub fn draft(&self) -> &Filters {
        &self.draft
    }

    pub fn active(&self) -> &Filters {
        &self.active
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn location(&self) -> &Location {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn available_sub_entities(&self) -> &[String] {
        &self.available_sub_entities
    }

    /// True when the draft differs from what was last fetched.
    pub fn has_unapplied_changes(&self) -> bool {
        self.draft != self.active
    }

    /// Initial fetch for the hydrated page.
    pub fn mount(&mut self) -> FetchRequest {
        self.synced = Some((self.page, self.page_size));
        self.request(FetchReason::Mount)
    }

    pub fn catalog(&self) -> &FilterData {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: FilterData) {
        self.catalog = catalog;
        self.refresh_sub_entities();
    }

    pub fn on_filter_change(&mut self, edit: FilterEdit) -> Option<FetchRequest> {
        let t = transition(&self.draft, &self.location().query, edit);
        self.draft = t.filters;
        let path = self.location().path.clone();
        self.history.replace(Location {
            path,
            query: t.url_query,
        });
        self.refresh_sub_entities();
        self.page = 1;
        self.sync_pagination()
    }

    /// Sets the legal entity, then clears the sub-entity as a second edit.
    pub fn handle_legal_entity_change(&mut self, value: &str) -> Option<FetchRequest> {
        let first = self.on_filter_change(FilterEdit::new(FilterField::LegalEntity, value));
        let second = self.on_filter_change(FilterEdit::new(FilterField::SubEntity, ""));
        second.or(first)
    }

    pub fn apply_filters(&mut self) -> FetchRequest {
        self.active = self.draft.clone();
        self.page = 1;
        self.synced = Some((self.page, self.page_size));
        self.request(FetchReason::Apply)
    }

    /// Clears the draft but fetches with the filters encoded in the address
    /// bar at the time of the reset, then navigates to the bare path.
    pub fn reset_filters(&mut self) -> FetchRequest {
        let from_url = Filters::from_query(&self.location().query);
        self.draft = Filters::default();
        self.active = from_url;
        self.page = 1;
        self.synced = Some((self.page, self.page_size));
        let request = self.request(FetchReason::Reset);
        let path = self.location().path.clone();
        self.history.push(Location {
            path,
            query: QueryParams::new(),
        });
        self.refresh_sub_entities();
        request
    }

    pub fn set_page(&mut self, page: u32) -> Option<FetchRequest> {
        self.page = page.max(1);
        self.sync_pagination()
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Option<FetchRequest> {
        self.page_size = page_size.max(1);
        self.sync_pagination()
    }

    fn sync_pagination(&mut self) -> Option<FetchRequest> {
        let current = (self.page, self.page_size);
        if self.synced == Some(current) {
            return None;
        }
        self.synced = Some(current);
        Some(self.request(FetchReason::Pagination))
    }

    fn request(&self, reason: FetchReason) -> FetchRequest {
        FetchRequest {
            reason,
            filters: self.active.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }

    fn refresh_sub_entities(&mut self) {
        self.available_sub_entities = self.catalog.sub_entities_for(&self.draft.legal_entity);
    }
}
