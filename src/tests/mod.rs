use mockito::Matcher;

use crate::dashboard::{Action, Dashboard};
use crate::fetcher::{EmployeeFetcher, Endpoints, FetchOutcome};
use crate::filters::{FetchReason, FilterEdit, FilterField, FilterState, Location, DEFAULT_PAGE_SIZE};
use crate::model::EmployeePage;
use crate::output::{self, OutputFormat};
use crate::session::Session;
use crate::table::SortKey;

const PAGE_JSON: &str = r#"{
  "employees": [
    {"_id": "e-1", "name": "Alice", "email": "alice@acme.io", "department": "Engineering",
     "designation": "SDE", "joiningDate": "2024-03-05", "salary": 90000,
     "status": "Active", "skills": ["Rust", "SQL"]},
    {"_id": "e-2", "name": "Bob", "email": "bob@acme.io", "department": "Sales",
     "designation": "AE", "joiningDate": null, "salary": 45000,
     "status": "Inactive", "skills": []}
  ],
  "totalEmployees": 42
}"#;

fn list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn mounted(link: &str) -> Dashboard {
    let mut d = Dashboard::new(FilterState::from_location(Location::parse(link), DEFAULT_PAGE_SIZE));
    let issued = d.mount();
    let page: EmployeePage = serde_json::from_str(PAGE_JSON).unwrap();
    d.accept(FetchOutcome {
        ticket: issued.ticket,
        request: issued.request,
        result: Ok(page),
    });
    d
}

#[test]
fn deep_link_hydrates_draft_and_first_fetch() {
    let mut d = Dashboard::new(FilterState::from_location(
        Location::parse("https://dash.example/?department=Engineering,Sales&status=Active&page=3"),
        DEFAULT_PAGE_SIZE,
    ));
    let issued = d.mount();
    assert_eq!(issued.request.reason, FetchReason::Mount);
    assert_eq!(issued.request.page, 3);
    let query = issued.request.query();
    assert_eq!(query.get("department"), Some("Engineering,Sales"));
    assert_eq!(query.get("status"), Some("Active"));
    assert_eq!(query.get("page"), Some("3"));
    assert_eq!(query.get("pageSize"), Some("10"));
    assert_eq!(query.get("salaryMin"), Some(""));
    assert_eq!(d.filters().draft().department, list(&["Engineering", "Sales"]));
}

#[test]
fn list_edits_always_store_collections() {
    let mut d = mounted("/");
    for field in [
        FilterField::Department,
        FilterField::Designation,
        FilterField::Status,
        FilterField::Skills,
    ] {
        d.dispatch(Action::Edit(FilterEdit::new(field, "Only")));
        assert_eq!(d.filters().draft().values(field), list(&["Only"]));
    }
}

#[test]
fn salary_buckets_drive_min_and_max_in_the_url() {
    let mut d = mounted("/");
    d.dispatch(Action::Edit(FilterEdit::new(
        FilterField::SalaryRange,
        list(&["10000-50000", "50000-100000"]),
    )));
    let draft = d.filters().draft();
    assert_eq!(draft.salary_min, "10000");
    assert_eq!(draft.salary_max, "100000");
    let url = d.filters().location().to_string();
    assert!(url.contains("salaryMin=10000"));
    assert!(url.contains("salaryMax=100000"));
    assert!(!url.contains("salaryRange"));

    d.dispatch(Action::Edit(FilterEdit::new(FilterField::SalaryRange, Vec::<String>::new())));
    assert_eq!(d.filters().draft().salary_min, "");
    assert_eq!(d.filters().draft().salary_max, "");
}

#[test]
fn switching_legal_entity_clears_sub_entity() {
    let mut d = mounted("/?legalEntity=Acme&subEntity=Labs");
    assert_eq!(d.filters().draft().sub_entity, "Labs");
    d.dispatch(Action::LegalEntity("Globex".to_string()));
    assert_eq!(d.filters().draft().legal_entity, "Globex");
    assert_eq!(d.filters().draft().sub_entity, "");
    assert!(!d.filters().location().to_string().contains("subEntity"));
}

#[test]
fn edits_and_apply_reset_page_but_page_size_does_not() {
    let mut d = mounted("/?page=4");
    assert_eq!(d.filters().page(), 4);

    let fetch = d.dispatch(Action::PageSize(25)).unwrap();
    assert_eq!(fetch.request.reason, FetchReason::Pagination);
    assert_eq!(d.filters().page(), 4);
    assert_eq!(fetch.request.page_size, 25);

    let fetch = d
        .dispatch(Action::Edit(FilterEdit::new(FilterField::Skills, "Rust")))
        .unwrap();
    assert_eq!(d.filters().page(), 1);
    assert_eq!(fetch.request.page, 1);
    assert!(fetch.request.filters.skills.is_empty());

    d.dispatch(Action::Page(2));
    let applied = d.dispatch(Action::Apply).unwrap();
    assert_eq!(applied.request.page, 1);
    assert_eq!(applied.request.filters.skills, list(&["Rust"]));
}

#[test]
fn reset_clears_query_and_returns_to_first_page() {
    let mut d = mounted("/?department=Sales&page=2");
    d.dispatch(Action::Edit(FilterEdit::new(FilterField::Status, "Active")));
    let before = d.filters().history().len();

    let fetch = d.dispatch(Action::Reset).unwrap();
    assert_eq!(fetch.request.reason, FetchReason::Reset);
    assert_eq!(fetch.request.filters.status, list(&["Active"]));
    assert_eq!(d.filters().page(), 1);
    assert!(!d.filters().location().has_query());
    assert_eq!(d.filters().location().to_string(), "/");
    assert_eq!(d.filters().history().len(), before + 1);
    assert!(d.filters().draft().is_empty());
}

#[test]
fn search_and_sort_shape_rendered_rows() {
    let mut d = mounted("/");
    d.dispatch(Action::Sort(Some(SortKey::NameDesc)));
    let snap = d.snapshot();
    assert_eq!(snap.rows[0].name, "Bob");
    assert_eq!(snap.rows[1].name, "Alice");
    assert_eq!(snap.rows[0].joining_date, "-");
    assert_eq!(snap.rows[1].joining_date, "05 Mar 2024");
    assert_eq!(snap.rows[1].key, "e-1");

    d.dispatch(Action::Search("ALI".to_string()));
    let snap = d.snapshot();
    assert_eq!(snap.visible_count, 1);
    assert_eq!(snap.total_employees, 42);

    let csv = String::from_utf8(output::render(OutputFormat::Csv, &snap)).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("\"$90,000\""));
}

#[tokio::test]
async fn session_walks_through_filter_apply_and_pagination() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();
    let _catalog = server
        .mock("GET", "/api/filters")
        .with_status(200)
        .with_body(r#"{"departments":["Engineering","Sales"],"legalEntities":["Acme"],"subEntities":{"Acme":["Labs"]}}"#)
        .create_async()
        .await;
    let _first = server
        .mock("GET", "/api/employees")
        .match_query(Matcher::UrlEncoded("department".into(), "".into()))
        .with_status(200)
        .with_body(PAGE_JSON)
        .create_async()
        .await;
    let paged = server
        .mock("GET", "/api/employees")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("department".into(), "Engineering".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("pageSize".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"employees":[{"id":11,"name":"Carol"}],"totalEmployees":11}"#)
        .expect(1)
        .create_async()
        .await;
    let _applied = server
        .mock("GET", "/api/employees")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("department".into(), "Engineering".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(PAGE_JSON)
        .create_async()
        .await;

    let endpoints =
        Endpoints::parse(&format!("{base}/api/employees"), &format!("{base}/api/filters")).unwrap();
    let fetcher = EmployeeFetcher::new(endpoints, None).unwrap();
    let mut session = Session::new(
        Dashboard::new(FilterState::new(DEFAULT_PAGE_SIZE)),
        fetcher,
    );

    session.mount().await;
    session.settle().await.unwrap();
    assert_eq!(session.dashboard().catalog().departments.len(), 2);

    session.perform(Action::Edit(FilterEdit::new(
        FilterField::Department,
        list(&["Engineering"]),
    )));
    session.perform(Action::Apply);
    session.settle().await.unwrap();
    session.perform(Action::Page(2));
    session.settle().await.unwrap();

    let snap = session.dashboard().snapshot();
    assert_eq!(snap.total_employees, 11);
    assert_eq!(snap.page_count, 2);
    assert_eq!(snap.rows[0].name, "Carol");
    assert!(!snap.unapplied_changes);
    paged.assert_async().await;
}
