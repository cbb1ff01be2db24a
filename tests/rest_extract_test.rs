use httpmock::prelude::*;
use std::time::Duration;
use supabase_migrate::config::{Endpoint, HttpConfig};
use supabase_migrate::core::extractor;
use supabase_migrate::domain::ports::Source;
use supabase_migrate::RestClient;

fn client_for(server: &MockServer, key: &str) -> RestClient {
    RestClient::new(
        Endpoint {
            base_url: server.base_url(),
            api_key: key.to_string(),
        },
        &HttpConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_extract_returns_all_rows_unmodified() {
    let server = MockServer::start();
    let mock_data = serde_json::json!([
        {"id": 1, "name": "Whiskers", "avg_rating": 1612, "categories": ["classic"]},
        {"id": 2, "name": "Mittens", "avg_rating": null},
        {"id": 3, "name": "Shadow", "description": "dark and mysterious"}
    ]);

    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/cat_name_options")
            .query_param("select", "*")
            .header("apikey", "old-key")
            .header("Authorization", "Bearer old-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(mock_data.clone());
    });

    let client = client_for(&server, "old-key");
    let extraction = extractor::extract(&client, "cat_name_options").await;

    api_mock.assert();
    assert!(extraction.error.is_none());
    assert_eq!(extraction.rows.len(), 3);
    // Nothing is reshaped during extraction
    let returned = serde_json::to_value(&extraction.rows).unwrap();
    assert_eq!(returned, mock_data);
}

#[tokio::test]
async fn test_extract_server_error_returns_empty() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/cat_app_users");
        then.status(500).body("internal error");
    });

    let client = client_for(&server, "old-key");
    let extraction = extractor::extract(&client, "cat_app_users").await;

    api_mock.assert();
    assert!(extraction.rows.is_empty());
    let error = extraction.error.unwrap();
    assert!(error.contains("500"));
    assert!(error.contains("internal error"));
}

#[tokio::test]
async fn test_extract_unauthorized_surfaces_status() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/cat_app_users");
        then.status(401)
            .json_body(serde_json::json!({"message": "Invalid API key"}));
    });

    let client = client_for(&server, "wrong-key");
    let err = client.fetch_rows("cat_app_users").await.unwrap_err();

    match err {
        supabase_migrate::MigrationError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_extract_malformed_body_returns_empty() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/cat_name_ratings");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"rows": []}));
    });

    let client = client_for(&server, "old-key");
    let extraction = extractor::extract(&client, "cat_name_ratings").await;

    api_mock.assert();
    assert!(extraction.rows.is_empty());
    assert!(extraction.error.unwrap().contains("Malformed"));
}

#[tokio::test]
async fn test_extract_empty_table() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/tournament_selections");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([]));
    });

    let client = client_for(&server, "old-key");
    let extraction = extractor::extract(&client, "tournament_selections").await;

    assert!(extraction.rows.is_empty());
    assert!(extraction.error.is_none());
}

#[tokio::test]
async fn test_extract_unreachable_host_after_retries() {
    // Grab a free port, then close it so connections are refused
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = RestClient::new(
        Endpoint {
            base_url: format!("http://127.0.0.1:{}", port),
            api_key: "old-key".to_string(),
        },
        &HttpConfig {
            timeout_seconds: Some(2),
            retry_attempts: 2,
            retry_delay_ms: 1,
        },
    )
    .unwrap();

    let extraction = extractor::extract(&client, "cat_app_users").await;

    assert!(extraction.rows.is_empty());
    assert!(extraction.error.is_some());
}

#[tokio::test]
async fn test_extract_retries_timed_out_read() {
    let server = MockServer::start();
    let slow_get = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/cat_app_users");
        then.status(200)
            .json_body(serde_json::json!([]))
            .delay(Duration::from_millis(1500));
    });

    let client = RestClient::new(
        Endpoint {
            base_url: server.base_url(),
            api_key: "old-key".to_string(),
        },
        &HttpConfig {
            timeout_seconds: Some(1),
            retry_attempts: 1,
            retry_delay_ms: 1,
        },
    )
    .unwrap();

    let extraction = extractor::extract(&client, "cat_app_users").await;

    slow_get.assert_hits(2);
    assert!(extraction.error.is_some());
}
