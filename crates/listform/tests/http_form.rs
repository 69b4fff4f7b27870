//! End-to-end form sessions against a mocked list-item REST API

use listform::{
    ChoiceOption, DisplayMode, FormConfig, FormController, HostEvent, HttpListStore,
    RecordingHost, SessionState, SubmitOutcome, Tag,
};
use listform_client::ListStoreConfig;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ITEMS: &str = "/_api/web/lists/getbytitle('VDMDemo')/items";

/// Server with the two vocabularies and the site directory mounted
async fn site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_api/web/siteusers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"Id": 1, "Title": "Ada", "PrincipalType": 1},
                {"Id": 5, "Title": "Site Owners", "PrincipalType": 4}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_api/web/lists/getbytitle('DocumentType')/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"Id": 1, "Title": "Policy"}, {"Id": 2, "Title": "Report"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_api/web/lists/getbytitle('DocumentSubType')/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"Id": 10, "Title": "A", "DocTypeId": 1},
                {"Id": 11, "Title": "B", "DocTypeId": 2}
            ]
        })))
        .mount(&server)
        .await;

    server
}

fn form_with(
    server: &MockServer,
    host: &Arc<RecordingHost>,
    config: FormConfig,
    mode: DisplayMode,
    id: Option<u64>,
) -> FormController {
    let store = HttpListStore::connect(
        ListStoreConfig {
            site_url: server.uri(),
            ..Default::default()
        },
        config.clone(),
    )
    .unwrap();

    FormController::new(Arc::new(store), host.clone(), &config, mode, id)
}

fn form_for(server: &MockServer, host: &Arc<RecordingHost>, mode: DisplayMode, id: Option<u64>) -> FormController {
    form_with(server, host, FormConfig::default(), mode, id)
}

#[tokio::test]
async fn test_create_flow() {
    let server = site().await;
    Mock::given(method("POST"))
        .and(path(ITEMS))
        .and(body_partial_json(json!({
            "__metadata": {"type": "SP.Data.VDMDemoListItem"},
            "Title": "Retention policy",
            "AssignedToId": 1,
            "CompletionPercentage": 0,
            "Tags": {"results": ["Backend"]},
            "DocumentTypeId": 1,
            "DocumentSubTypesId": {"results": [10]}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"d": {"Id": 3}})))
        .expect(1)
        .mount(&server)
        .await;

    let host = Arc::new(RecordingHost::new());
    let form = form_for(&server, &host, DisplayMode::New, None);
    assert_eq!(form.open().await.unwrap(), SessionState::Ready);

    {
        let mut session = form.session().await;
        assert_eq!(session.assignee_options(), vec![ChoiceOption::new("1", "Ada")]);
        session.set_title("Retention policy").unwrap();
        session.set_assignee_key(Some("1")).unwrap();
        session.set_completion_text("n/a").unwrap();
        session.toggle_tag(Tag::Backend).unwrap();
    }

    form.change_classification("1").await.unwrap();
    assert_eq!(
        form.session().await.sub_type_options(),
        &[ChoiceOption::new("10", "A")]
    );
    form.session().await.toggle_sub_classification("10").unwrap();

    assert_eq!(form.submit().await.unwrap(), SubmitOutcome::Created);
    assert_eq!(host.events().last(), Some(&HostEvent::Closed { was_saved: true }));
}

#[tokio::test]
async fn test_edit_flow_patches_original_item() {
    let server = site().await;
    Mock::given(method("GET"))
        .and(path(format!("{}(42)", ITEMS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": 42,
            "Title": "Old title",
            "Status": "In Progress",
            "DueDate": "2024-03-09T23:00:00Z",
            "DocumentTypeId": 2,
            "DocumentSubTypesId": {"results": [11]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}(42)", ITEMS)))
        .and(body_partial_json(json!({
            "Title": "New title",
            "Status": "In Progress",
            "DueDate": "2024-03-09T23:00:00Z",
            "DocumentSubTypesId": {"results": [11]}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let host = Arc::new(RecordingHost::new());
    // Site on UTC+1: the stored instant is local midnight of March 10
    let config = FormConfig {
        site_utc_offset_minutes: 60,
        ..Default::default()
    };
    let form = form_with(&server, &host, config, DisplayMode::Edit, Some(42));
    form.open().await.unwrap();
    assert_eq!(
        form.session().await.record().due_date,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 10)
    );

    form.session().await.set_title("New title").unwrap();
    assert_eq!(form.submit().await.unwrap(), SubmitOutcome::Updated);
    assert_eq!(
        host.events(),
        vec![
            HostEvent::Notify("Item updated successfully!".into()),
            HostEvent::Saved,
            HostEvent::Closed { was_saved: true },
        ]
    );
}

#[tokio::test]
async fn test_store_error_surfaces_and_form_stays_open() {
    let server = site().await;
    Mock::given(method("POST"))
        .and(path(ITEMS))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let host = Arc::new(RecordingHost::new());
    let form = form_for(&server, &host, DisplayMode::New, None);
    form.open().await.unwrap();
    form.session().await.set_title("Draft").unwrap();

    let outcome = form.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Rejected { message: "upstream exploded".into() });
    assert_eq!(host.alerts(), vec!["Error saving item: upstream exploded".to_string()]);
    assert_eq!(form.state().await, SessionState::Ready);
}
