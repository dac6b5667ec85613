//! HTTP-level tests for the vector store API client

use context_db_mcp::config::Config;
use context_db_mcp::error::Error;
use context_db_mcp::models::AttributeValue;
use context_db_mcp::remote::{DocumentUpload, HttpVectorStoreClient, RemoteVectorStore, SearchQuery};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> Config {
    Config {
        api_key: "sk-test".to_string(),
        organization: Some("org-test".to_string()),
        project: None,
        api_base_url: base_url.to_string(),
        default_vector_store_id: None,
        default_vector_store_name: None,
        request_timeout_seconds: 5.0,
        default_max_results: 10,
        log_level: "debug".to_string(),
        create_if_missing: true,
    }
}

fn client(server: &MockServer) -> HttpVectorStoreClient {
    HttpVectorStoreClient::new(&test_config(&server.uri())).unwrap()
}

fn upload(filename: &str, content: &str) -> DocumentUpload {
    DocumentUpload {
        filename: filename.to_string(),
        content: content.to_string(),
        mime_type: "text/plain".to_string(),
        attributes: None,
        chunking_strategy: None,
    }
}

#[tokio::test]
async fn retrieve_store_sends_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vector_stores/vs_1"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(header("OpenAI-Beta", "assistants=v2"))
        .and(header("OpenAI-Organization", "org-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vs_1",
            "name": "docs"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = client(&server).retrieve_store("vs_1").await.unwrap();
    assert_eq!(store.id, "vs_1");
    assert_eq!(store.name.as_deref(), Some("docs"));
}

#[tokio::test]
async fn retrieve_store_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vector_stores/vs_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "message": "No vector store found" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).retrieve_store("vs_missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn server_errors_map_to_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vector_stores/vs_1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = client(&server).retrieve_store("vs_1").await.unwrap_err();
    match err {
        Error::Remote(message) => assert!(message.contains("500")),
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_stores_requests_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vector_stores"))
        .and(query_param("limit", "100"))
        .and(query_param("order", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "vs_2", "name": "newer" },
                { "id": "vs_1", "name": "older" }
            ]
        })))
        .mount(&server)
        .await;

    let stores = client(&server).list_stores().await.unwrap();
    assert_eq!(stores.len(), 2);
    assert_eq!(stores[0].id, "vs_2");
}

#[tokio::test]
async fn create_store_posts_name_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/vector_stores"))
        .and(body_partial_json(json!({ "name": "docs", "metadata": {} })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vs_new",
            "name": "docs"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = HashMap::new();
    let store = client(&server)
        .create_store("docs", Some(&metadata))
        .await
        .unwrap();
    assert_eq!(store.id, "vs_new");
}

#[tokio::test]
async fn upload_document_uploads_then_attaches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file_abc",
            "object": "file"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/vector_stores/vs_1/files"))
        .and(body_partial_json(json!({ "file_id": "file_abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vsf_1",
            "status": "completed",
            "attributes": { "document_id": "doc1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = client(&server)
        .upload_document("vs_1", upload("doc1.txt", "Hello world"))
        .await
        .unwrap();
    assert_eq!(file.id, "vsf_1");
    assert_eq!(file.status, "completed");
    assert_eq!(
        file.attributes.unwrap().get("document_id"),
        Some(&AttributeValue::Text("doc1".to_string()))
    );
}

#[tokio::test]
async fn upload_document_polls_until_terminal_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "file_abc" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/vector_stores/vs_1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vsf_1",
            "status": "in_progress"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/vector_stores/vs_1/files/vsf_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vsf_1",
            "status": "failed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = client(&server)
        .upload_document("vs_1", upload("doc1.txt", "Hello world"))
        .await
        .unwrap();
    // Terminal status is surfaced verbatim, never retried.
    assert_eq!(file.status, "failed");
}

#[tokio::test]
async fn search_forwards_filters_and_rewrite_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/vector_stores/vs_1/search"))
        .and(body_partial_json(json!({
            "query": "auth",
            "max_num_results": 5,
            "filters": { "attributes": { "document_id": "doc1" } },
            "rewrite_query": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "file_id": "file_abc",
                    "filename": "doc1.txt",
                    "score": 0.91,
                    "attributes": { "document_id": "doc1" },
                    "content": [
                        { "type": "text", "text": "How auth works" },
                        { "type": "image" }
                    ]
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut attributes_filter = HashMap::new();
    attributes_filter.insert(
        "document_id".to_string(),
        AttributeValue::Text("doc1".to_string()),
    );

    let hits = client(&server)
        .search(
            "vs_1",
            &SearchQuery {
                query: "auth".to_string(),
                max_results: 5,
                attributes_filter: Some(attributes_filter),
                rewrite_query: Some(true),
            },
        )
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].score, 0.91);
    assert_eq!(hits[0].content.len(), 2);
    assert_eq!(hits[0].content[0].kind, "text");
}

#[tokio::test]
async fn slow_responses_map_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vector_stores/vs_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "vs_1" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.request_timeout_seconds = 0.2;
    let client = HttpVectorStoreClient::new(&config).unwrap();

    let err = client.retrieve_store("vs_1").await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
}
