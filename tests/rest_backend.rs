use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskdeck::backend::{BackendError, RestBackend, Task, TaskBackend, TaskDraft, TaskStatus, UserContext};
use taskdeck::constants::{ERROR_ADD_TASK_FAILED, ERROR_DELETE_TASK_FAILED};

fn user() -> UserContext {
    UserContext {
        user_id: "ada@example.com".to_string(),
        id_token: Some("id-token".to_string()),
    }
}

fn backend(server: &MockServer) -> RestBackend {
    RestBackend::new(&server.uri(), true, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_filters_by_user_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("userId", "ada@example.com"))
        .and(query_param("status", "IN_PROGRESS"))
        .and(header("Authorization", "Bearer id-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1717000000000u64,
                "title": "Build",
                "description": "The thing",
                "startDate": "2024-06-01",
                "endDate": "",
                "status": "in-progress",
                "userId": "ada@example.com"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = backend(&server).fetch_tasks(&user(), TaskStatus::InProgress).await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "1717000000000");
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
    assert_eq!(tasks[0].end_date, None);
}

#[tokio::test]
async fn test_create_sends_owner_and_returns_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "title": "Write report",
            "description": "Quarterly",
            "status": "PENDING",
            "userId": "ada@example.com"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "42",
            "title": "Write report",
            "description": "Quarterly",
            "startDate": "",
            "endDate": "",
            "status": "PENDING"
        })))
        .mount(&server)
        .await;

    let task = backend(&server)
        .create_task(&user(), &TaskDraft::new("Write report", "Quarterly"))
        .await
        .unwrap();

    assert_eq!(task.id, "42");
    assert_eq!(task.status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_update_tolerates_message_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(body_partial_json(json!({ "id": "7", "status": "COMPLETED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Task updated" })))
        .mount(&server)
        .await;

    let sent = Task {
        id: "7".to_string(),
        title: "Ship".to_string(),
        description: "Release".to_string(),
        start_date: None,
        end_date: None,
        status: TaskStatus::Completed,
    };
    let updated = backend(&server).update_task(&user(), &sent).await.unwrap();
    assert_eq!(updated, sent);
}

#[tokio::test]
async fn test_create_with_message_response_reloads_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "Task created" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("status", "PENDING"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "title": "Older", "description": "Already there", "status": "PENDING" },
            { "id": 4, "title": "Plan", "description": "Next sprint", "status": "PENDING" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let created = backend(&server)
        .create_task(&user(), &TaskDraft::new("Plan", "Next sprint"))
        .await
        .unwrap();

    assert_eq!(created.id, "4");
    assert_eq!(created.title, "Plan");
    assert_eq!(created.status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_delete_sends_id_and_owner() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(body_json(json!({ "id": "7", "userId": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server).delete_task(&user(), "7").await.unwrap();
}

#[tokio::test]
async fn test_server_errors_carry_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = backend(&server)
        .create_task(&user(), &TaskDraft::new("t", "d"))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Http { status: 500, .. }));
    assert_eq!(err.to_string(), ERROR_ADD_TASK_FAILED);

    let err = backend(&server).delete_task(&user(), "7").await.unwrap_err();
    assert!(matches!(err, BackendError::Auth(ref message) if message == ERROR_DELETE_TASK_FAILED));
    assert_eq!(err.to_string(), ERROR_DELETE_TASK_FAILED);
}

#[tokio::test]
async fn test_token_is_omitted_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let backend = RestBackend::new(&server.uri(), false, Duration::from_secs(5)).unwrap();
    backend.fetch_tasks(&user(), TaskStatus::Pending).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[test]
fn test_invalid_endpoint_is_rejected() {
    assert!(matches!(
        RestBackend::new("not a url", true, Duration::from_secs(5)),
        Err(BackendError::InvalidData(_))
    ));
}
