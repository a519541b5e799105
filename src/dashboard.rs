use serde::Serialize;
use tracing::{debug, warn};

use crate::fetcher::{FetchOutcome, RequestTicket, TicketSequence};
use crate::filters::{FetchRequest, FilterEdit, FilterState, Filters};
use crate::model::FilterData;
use crate::table::{SortKey, TableRow, TableView};

pub const TITLE: &str = "Employee Management Dashboard";

/// Every mutation the view accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Edit(FilterEdit),
    LegalEntity(String),
    Apply,
    Reset,
    Search(String),
    Sort(Option<SortKey>),
    Page(u32),
    PageSize(u32),
    TogglePanel,
}

/// A fetch the dashboard has registered and expects an outcome for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedFetch {
    pub ticket: RequestTicket,
    pub request: FetchRequest,
}

/// Owned state of one dashboard view. All I/O happens outside: mutations
/// return the fetch to perform, and outcomes are handed back via `accept`.
#[derive(Clone, Debug)]
pub struct Dashboard {
    filters: FilterState,
    table: TableView,
    tickets: TicketSequence,
    pending: Option<RequestTicket>,
    last_request: Option<FetchRequest>,
    last_error: Option<String>,
    panel_open: bool,
}

impl Dashboard {
    pub fn new(filters: FilterState) -> Self {
        Self {
            filters,
            table: TableView::new(),
            tickets: TicketSequence::default(),
            pending: None,
            last_request: None,
            last_error: None,
            panel_open: true,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    pub fn catalog(&self) -> &FilterData {
        self.filters.catalog()
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_catalog(&mut self, catalog: FilterData) {
        self.filters.set_catalog(catalog);
    }

    pub fn mount(&mut self) -> IssuedFetch {
        let request = self.filters.mount();
        self.issue(request)
    }

    pub fn dispatch(&mut self, action: Action) -> Option<IssuedFetch> {
        let request = match action {
            Action::Edit(edit) => self.filters.on_filter_change(edit),
            Action::LegalEntity(value) => self.filters.handle_legal_entity_change(&value),
            Action::Apply => Some(self.filters.apply_filters()),
            Action::Reset => Some(self.filters.reset_filters()),
            Action::Search(query) => {
                if self.table.set_search(&query) {
                    self.filters.set_page(1)
                } else {
                    None
                }
            }
            Action::Sort(key) => {
                self.table.set_sort(key);
                None
            }
            Action::Page(page) => self.filters.set_page(page),
            Action::PageSize(size) => self.filters.set_page_size(size),
            Action::TogglePanel => {
                self.panel_open = !self.panel_open;
                None
            }
        };
        request.map(|r| self.issue(r))
    }

    /// Reissues the last request under a fresh ticket.
    pub fn retry(&mut self) -> Option<IssuedFetch> {
        let request = self.last_request.clone()?;
        Some(self.issue(request))
    }

    /// Applies an outcome if it belongs to the newest request. Returns
    /// `false` for superseded outcomes, which are dropped.
    pub fn accept(&mut self, outcome: FetchOutcome) -> bool {
        if self.tickets.latest() != Some(outcome.ticket) {
            debug!(
                ticket = outcome.ticket.value(),
                reason = %outcome.request.reason,
                "discarding stale employee response"
            );
            return false;
        }
        self.pending = None;
        match outcome.result {
            Ok(page) => {
                debug!(
                    ticket = outcome.ticket.value(),
                    rows = page.employees.len(),
                    total = page.total_employees,
                    "employee page received"
                );
                self.last_error = None;
                self.table.set_employees(page);
            }
            Err(e) => {
                warn!(ticket = outcome.ticket.value(), error = %e, "employee fetch failed");
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    fn issue(&mut self, request: FetchRequest) -> IssuedFetch {
        let ticket = self.tickets.issue();
        self.pending = Some(ticket);
        self.last_request = Some(request.clone());
        IssuedFetch { ticket, request }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let table = &self.table;
        let rows = table.rows();
        DashboardSnapshot {
            title: TITLE.to_string(),
            location: self.filters.location().to_string(),
            page: self.filters.page(),
            page_size: self.filters.page_size(),
            page_count: table.page_count(self.filters.page_size()),
            total_employees: table.total(),
            visible_count: rows.len(),
            search: table.search().to_string(),
            sort: table.sort(),
            filters: self.filters.draft().clone(),
            applied: self.filters.active().clone(),
            unapplied_changes: self.filters.has_unapplied_changes(),
            available_sub_entities: self.filters.available_sub_entities().to_vec(),
            catalog: self.filters.catalog().clone(),
            panel_open: self.panel_open,
            loaded: table.is_loaded(),
            loading: self.is_loading(),
            error: self.last_error.clone(),
            rows,
        }
    }
}

/// Everything a renderer needs to draw the view at one instant.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub title: String,
    pub location: String,
    pub page: u32,
    pub page_size: u32,
    pub page_count: u64,
    pub total_employees: u64,
    pub visible_count: usize,
    pub search: String,
    pub sort: Option<SortKey>,
    pub filters: Filters,
    pub applied: Filters,
    pub unapplied_changes: bool,
    pub available_sub_entities: Vec<String>,
    #[serde(skip)]
    pub catalog: FilterData,
    #[serde(skip)]
    pub panel_open: bool,
    #[serde(skip)]
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub rows: Vec<TableRow>,
}
