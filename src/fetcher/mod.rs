use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use crate::filters::{FetchRequest, QueryParams};
use crate::model::{EmployeePage, FilterData};

pub const EMPLOYEES_API: &str = "https://held-aeolian-orbit.glitch.me/api/employees";
pub const FILTERS_API: &str = "https://held-aeolian-orbit.glitch.me/api/filters";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint URL: {url}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub employees: Url,
    pub filters: Url,
}

impl Endpoints {
    pub fn parse(employees: &str, filters: &str) -> Result<Self, FetchError> {
        let parse = |raw: &str| {
            Url::parse(raw.trim()).map_err(|e| FetchError::InvalidEndpoint {
                url: raw.to_string(),
                source: e,
            })
        };
        Ok(Self {
            employees: parse(employees)?,
            filters: parse(filters)?,
        })
    }

    pub fn hosted() -> Result<Self, FetchError> {
        Self::parse(EMPLOYEES_API, FILTERS_API)
    }
}

/// Identifies one issued employee fetch. Tickets grow monotonically, so the
/// newest request always holds the largest ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct TicketSequence {
    last: u64,
}

impl TicketSequence {
    pub fn issue(&mut self) -> RequestTicket {
        self.last += 1;
        RequestTicket(self.last)
    }

    pub fn latest(&self) -> Option<RequestTicket> {
        if self.last == 0 {
            None
        } else {
            Some(RequestTicket(self.last))
        }
    }
}

/// A resolved fetch, tagged with the ticket it was issued under.
#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: RequestTicket,
    pub request: FetchRequest,
    pub result: Result<EmployeePage, FetchError>,
}

#[derive(Clone, Debug)]
pub struct EmployeeFetcher {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl EmployeeFetcher {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(endpoints: Endpoints, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::ClientBuild { source: e })?;
        Ok(Self { client, endpoints })
    }

    pub fn employees_url(&self, query: &QueryParams) -> Url {
        let mut url = self.endpoints.employees.clone();
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&query.to_string()));
        }
        url
    }

    pub async fn fetch_employees(&self, query: &QueryParams) -> Result<EmployeePage, FetchError> {
        let url = self.employees_url(query);
        debug!(url = %url, "fetching employees");
        self.get_json(url).await
    }

    pub async fn execute(&self, ticket: RequestTicket, request: FetchRequest) -> FetchOutcome {
        let result = self.fetch_employees(&request.query()).await;
        FetchOutcome {
            ticket,
            request,
            result,
        }
    }

    pub async fn try_fetch_filter_data(&self) -> Result<FilterData, FetchError> {
        self.get_json(self.endpoints.filters.clone()).await
    }

    /// Catalog failures are logged and leave the catalog empty.
    pub async fn fetch_filter_data(&self) -> FilterData {
        match self.try_fetch_filter_data().await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "error fetching filter data");
                FilterData::default()
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let url_str = url.to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url_str.clone(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_str,
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode {
                url: url_str,
                source: e,
            })
    }
}
