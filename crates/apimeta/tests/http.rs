#![cfg(feature = "http")]

use std::sync::Arc;

use apimeta::{Error, HttpTransport, Registry, RegistryConfig, Transport};
use httpmock::MockServer;
use serde_json::json;
use url::Url;

fn registry(server: &MockServer, cache_time: Option<i64>) -> Registry {
    let config = RegistryConfig {
        meta_url: server.url("/swagger.json"),
        cache_time,
        ..Default::default()
    };
    Registry::builder(config)
        .transport(Arc::new(HttpTransport::new().unwrap()))
        .build()
        .unwrap()
}

fn meta(server: &MockServer) -> serde_json::Value {
    json!({
        "swagger": "2.0",
        "paths": {
            "/ping": { "get": { "operationId": "get_ping" } },
            (server.url("/latest/swagger.json")): { "get": { "operationId": "get_latest_swagger" } }
        }
    })
}

#[test]
fn test_transport_collects_response() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/swagger.json")
            .header("accept", "application/json");
        then.status(200)
            .header("content-type", "application/json")
            .header("ETag", "\"abc\"")
            .body("{}");
    });

    let transport = HttpTransport::new().unwrap();
    let url = Url::parse(&server.url("/swagger.json")).unwrap();
    let response = transport.get(&url, &[("Accept", "application/json")]).unwrap();

    mock.assert();
    assert_eq!(response.status, 200);
    assert_eq!(response.headers.etag(), Some("\"abc\""));
    assert_eq!(response.body, b"{}");
}

#[test]
fn test_transport_reports_statuses_as_responses() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("HEAD").path("/swagger.json");
        then.status(304);
    });

    let transport = HttpTransport::new().unwrap();
    let url = Url::parse(&server.url("/swagger.json")).unwrap();
    let response = transport.head(&url, &[]).unwrap();
    assert!(response.is_not_modified());
    assert!(response.body.is_empty());
}

#[test]
fn test_disabled_cache_revalidates_over_http() {
    let server = MockServer::start();
    let get = server.mock(|when, then| {
        when.method("GET")
            .path("/swagger.json")
            .query_param("datasource", "tranquility");
        then.status(200)
            .header("content-type", "application/json")
            .header("etag", "\"v1\"")
            .json_body(meta(&server));
    });
    let head = server.mock(|when, then| {
        when.method("HEAD")
            .path("/swagger.json")
            .header("if-none-match", "\"v1\"");
        then.status(304).header("etag", "\"v1\"");
    });

    let registry = registry(&server, Some(0));
    let first = registry.root().unwrap();
    let second = registry.root().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    get.assert();
    head.assert();
}

#[test]
fn test_nested_document_over_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/swagger.json");
        then.status(200).json_body(meta(&server));
    });
    let nested = server.mock(|when, then| {
        when.method("GET")
            .path("/latest/swagger.json")
            .query_param("datasource", "tranquility");
        then.status(200).json_body(json!({
            "openapi": "3.0.0",
            "servers": [{ "url": "https://esi.evetech.net/latest/" }],
            "paths": { "/status/": { "get": { "operationId": "get_status" } } }
        }));
    });

    let registry = registry(&server, Some(3600));
    let doc = registry.document("get_latest_swagger").unwrap();
    registry.document("get_latest_swagger").unwrap();

    nested.assert();
    let request = doc.operation("get_status").unwrap().request::<_, String, String>([]).unwrap();
    assert_eq!(request.url.as_str(), "https://esi.evetech.net/latest/status/");
}

#[test]
fn test_server_errors_exhaust_retries() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/swagger.json");
        then.status(503).body("maintenance");
    });

    let registry = registry(&server, Some(3600));
    match registry.root() {
        Err(Error::Fetch(err)) => {
            assert_eq!(err.status, 500);
            assert!(err.reason.contains("503"));
        }
        other => panic!("Expected Fetch error, got {:?}", other.map(|d| d.len())),
    }
    mock.assert_calls(3);
}
