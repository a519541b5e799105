use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info};

use crate::dashboard::{Action, Dashboard, IssuedFetch};
use crate::fetcher::{EmployeeFetcher, FetchOutcome};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("employee fetch failed: {message}")]
    Fetch { message: String },

    #[error("fetch outcome channel closed")]
    ChannelClosed,
}

/// Drives a [`Dashboard`] against the network: issued fetches run on their
/// own tasks and report back over a channel, so several can be in flight.
pub struct Session {
    dashboard: Dashboard,
    fetcher: EmployeeFetcher,
    outcome_tx: mpsc::Sender<FetchOutcome>,
    outcome_rx: mpsc::Receiver<FetchOutcome>,
}

impl Session {
    pub fn new(dashboard: Dashboard, fetcher: EmployeeFetcher) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel::<FetchOutcome>(64);
        Self {
            dashboard,
            fetcher,
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Starts the first page fetch, then loads the filter catalog.
    pub async fn mount(&mut self) {
        let issued = self.dashboard.mount();
        self.spawn(issued);
        let catalog = self.fetcher.fetch_filter_data().await;
        self.dashboard.set_catalog(catalog);
    }

    pub fn perform(&mut self, action: Action) {
        if let Some(issued) = self.dashboard.dispatch(action) {
            self.spawn(issued);
        }
    }

    /// Returns `false` when there was nothing to retry.
    pub fn retry(&mut self) -> bool {
        match self.dashboard.retry() {
            Some(issued) => {
                self.spawn(issued);
                true
            }
            None => false,
        }
    }

    pub async fn next_outcome(&mut self) -> Option<FetchOutcome> {
        self.outcome_rx.recv().await
    }

    pub fn accept(&mut self, outcome: FetchOutcome) -> bool {
        self.dashboard.accept(outcome)
    }

    /// Waits until the newest fetch resolved. Fails if that fetch failed.
    pub async fn settle(&mut self) -> Result<(), SessionError> {
        while self.dashboard.is_loading() {
            match self.outcome_rx.recv().await {
                Some(outcome) => {
                    self.dashboard.accept(outcome);
                }
                None => return Err(SessionError::ChannelClosed),
            }
        }
        match self.dashboard.last_error() {
            Some(message) => Err(SessionError::Fetch {
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn spawn(&self, issued: IssuedFetch) {
        let IssuedFetch { ticket, request } = issued;
        info!(
            ticket = ticket.value(),
            reason = %request.reason,
            page = request.page,
            page_size = request.page_size,
            "issuing employee fetch"
        );
        let fetcher = self.fetcher.clone();
        let tx = self.outcome_tx.clone();
        task::spawn(async move {
            let outcome = fetcher.execute(ticket, request).await;
            if let Err(e) = tx.send(outcome).await {
                debug!(
                    ticket = e.0.ticket.value(),
                    "session closed before the fetch outcome arrived"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::Endpoints;
    use crate::filters::{FilterEdit, FilterField, FilterState, Location, DEFAULT_PAGE_SIZE};
    use mockito::Matcher;
    use std::time::Duration;

    fn session_for(server: &mockito::ServerGuard, link: &str) -> Session {
        let base = server.url();
        let endpoints = Endpoints::parse(
            &format!("{base}/api/employees"),
            &format!("{base}/api/filters"),
        )
        .unwrap();
        let fetcher = EmployeeFetcher::new(endpoints, Some(Duration::from_secs(5))).unwrap();
        let state = FilterState::from_location(Location::parse(link), DEFAULT_PAGE_SIZE);
        Session::new(Dashboard::new(state), fetcher)
    }

    #[tokio::test]
    async fn mount_then_apply_fetches_with_draft_filters() {
        let mut server = mockito::Server::new_async().await;
        let _catalog = server
            .mock("GET", "/api/filters")
            .with_status(200)
            .with_body(r#"{"legalEntities":["Acme"],"subEntities":{"Acme":["Labs","Retail"]}}"#)
            .create_async()
            .await;
        let _initial = server
            .mock("GET", "/api/employees")
            .match_query(Matcher::UrlEncoded("status".into(), "".into()))
            .with_status(200)
            .with_body(r#"{"employees":[{"id":1,"name":"Alice"},{"id":2,"name":"Bob"}],"totalEmployees":2}"#)
            .create_async()
            .await;
        let applied = server
            .mock("GET", "/api/employees")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("status".into(), "Inactive".into()),
                Matcher::UrlEncoded("legalEntity".into(), "Acme".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"employees":[{"id":2,"name":"Bob","status":"Inactive"}],"totalEmployees":1}"#)
            .expect(1)
            .create_async()
            .await;

        let mut session = session_for(&server, "/");
        session.mount().await;
        session.settle().await.unwrap();
        assert_eq!(session.dashboard().table().total(), 2);

        session.perform(Action::LegalEntity("Acme".to_string()));
        session.perform(Action::Edit(FilterEdit::new(FilterField::Status, "Inactive")));
        assert!(!session.dashboard().is_loading());
        assert_eq!(session.dashboard().filters().available_sub_entities().len(), 2);

        session.perform(Action::Apply);
        session.settle().await.unwrap();
        assert_eq!(session.dashboard().table().total(), 1);
        assert_eq!(session.dashboard().table().employees()[0].name, "Bob");
        applied.assert_async().await;
    }

    #[tokio::test]
    async fn settle_reports_failed_fetch_and_retry_recovers() {
        let mut server = mockito::Server::new_async().await;
        let _catalog = server
            .mock("GET", "/api/filters")
            .with_status(500)
            .create_async()
            .await;
        let failing = server
            .mock("GET", "/api/employees")
            .match_query(Matcher::Any)
            .with_status(502)
            .expect(1)
            .create_async()
            .await;

        let mut session = session_for(&server, "/?department=Sales");
        session.mount().await;
        assert!(session.dashboard().catalog().is_empty());
        let err = session.settle().await.unwrap_err();
        assert!(matches!(err, SessionError::Fetch { .. }));
        failing.assert_async().await;
        failing.remove_async().await;

        let _healthy = server
            .mock("GET", "/api/employees")
            .match_query(Matcher::UrlEncoded("department".into(), "Sales".into()))
            .with_status(200)
            .with_body(r#"{"employees":[],"totalEmployees":0}"#)
            .create_async()
            .await;
        assert!(session.retry());
        session.settle().await.unwrap();
        assert!(session.dashboard().last_error().is_none());
        assert!(session.dashboard().table().is_loaded());
    }

    #[tokio::test]
    async fn fetch_finishing_after_session_drop_is_discarded() {
        let mut server = mockito::Server::new_async().await;
        let employees = server
            .mock("GET", "/api/employees")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"employees":[],"totalEmployees":0}"#)
            .expect(1)
            .create_async()
            .await;

        let mut session = session_for(&server, "/");
        session.perform(Action::Reset);
        assert!(session.dashboard().is_loading());
        drop(session);

        for _ in 0..50 {
            if employees.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        employees.assert_async().await;
    }
}
