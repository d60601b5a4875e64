// ABOUTME: HTTP transport tests against a mock GraphQL endpoint
// ABOUTME: Covers auth header, decoding, HTTP failures and GraphQL error bodies

use canvas_things::api::ApiClient;
use canvas_things::canvas::ContentKind;
use canvas_things::sync::course_line;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn model_body() -> serde_json::Value {
    json!({
        "data": {
            "Model": {
                "enrollments": [{
                    "id": "1001",
                    "state": "active",
                    "htmlUrl": null,
                    "course": {
                        "id": "9",
                        "name": "CSCN112: Intro (001)",
                        "modulesConnection": {
                            "modules": [{
                                "id": "40",
                                "name": "Week 1",
                                "items": [{
                                    "id": "500",
                                    "content": { "type": "Quiz", "id": "31" }
                                }]
                            }]
                        }
                    }
                }]
            }
        }
    })
}

#[tokio::test]
async fn test_enrollments_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .and(header("Authorization", "Bearer test_token"))
        .and(body_partial_json(json!({ "variables": { "id": 42 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_body()))
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/api/graphql", mock_server.uri());

    // Run blocking client in a blocking context
    let result = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new("test_token".into(), endpoint).unwrap();
        client.enrollments(42)
    })
    .await
    .unwrap();

    let enrollments = result.unwrap();
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0].id, 1001);

    let course = enrollments[0].course.as_ref().unwrap();
    assert_eq!(course.name.to_string(), "CSCN 112-001: Intro");
    let modules = course
        .modules_connection
        .as_ref()
        .and_then(|c| c.modules.as_ref())
        .unwrap();
    let item = &modules[0].as_ref().unwrap().items.as_ref().unwrap()[0];
    assert_eq!(item.content.as_ref().unwrap().kind(), ContentKind::Quiz);
}

#[tokio::test]
async fn test_query_document_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/api/graphql", mock_server.uri());
    tokio::task::spawn_blocking(move || {
        let client = ApiClient::new("test_token".into(), endpoint).unwrap();
        client.enrollments(42)
    })
    .await
    .unwrap()
    .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let query = body["query"].as_str().unwrap();
    assert!(query.contains("query ModelQuery($id: ID!)"));
    assert!(query.contains("fragment AssignmentFragment on Assignment"));
}

#[tokio::test]
async fn test_course_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Model": { "enrollments": [
                { "id": "1", "state": "active", "course": { "id": "9", "name": "Orientation" } },
                { "id": "2", "state": "completed", "course": { "id": "10", "name": "BIBL104: Survey (002)", "courseCode": "BIBL104_002_202340" } }
            ] } }
        })))
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/api/graphql", mock_server.uri());
    let enrollments = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new("test_token".into(), endpoint).unwrap();
        client.course_list(7)
    })
    .await
    .unwrap()
    .unwrap();

    let names: Vec<String> = enrollments
        .iter()
        .map(|e| e.course.as_ref().unwrap().name.to_string())
        .collect();
    assert_eq!(names, vec!["Orientation", "BIBL 104-002: Survey"]);
    assert_eq!(course_line(&enrollments[1]), "2\t10\t2023/40\tBIBL 104-002: Survey");
}

#[tokio::test]
async fn test_api_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/api/graphql", mock_server.uri());

    // Run blocking client in a blocking context
    let result = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new("bad_token".into(), endpoint).unwrap();
        client.enrollments(42)
    })
    .await
    .unwrap();

    assert!(result.is_err());

    if let Err(canvas_things::Error::Api {
        status, message, ..
    }) = result
    {
        assert_eq!(status, 403);
        assert_eq!(message, "Forbidden");
    } else {
        panic!("Expected API error");
    }
}

#[tokio::test]
async fn test_graphql_errors_are_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "not allowed to view user" }]
        })))
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/api/graphql", mock_server.uri());
    let result = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new("test_token".into(), endpoint).unwrap();
        client.enrollments(42)
    })
    .await
    .unwrap();

    match result {
        Err(canvas_things::Error::GraphQl(message)) => {
            assert_eq!(message, "not allowed to view user")
        }
        other => panic!("Expected GraphQL error, got {:?}", other.map(|e| e.len())),
    }
}

#[tokio::test]
async fn test_invalid_payload_is_a_validation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Model": { "enrollments": [{ "id": "abc" }] } }
        })))
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/api/graphql", mock_server.uri());
    let result = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new("test_token".into(), endpoint).unwrap();
        client.enrollments(42)
    })
    .await
    .unwrap();

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("Model.enrollments[0].id"));
}
