//! Integration tests for the brand API client
//!
//! These tests use wiremock to stand in for the portal API and exercise the
//! full request/response cycle, error mapping and retry behavior.

use brand_client::{BrandApiClient, BrandApiConfig, TenantId};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn brand_body() -> serde_json::Value {
    json!({
        "tenantId": "t_42",
        "primaryColor": "#2563eb",
        "secondaryColor": "#6b7280",
        "faviconUrl": "https://cdn.example.com/acme.ico",
        "tenantName": "Acme Dental",
        "tier": "pro"
    })
}

#[tokio::test]
async fn test_fetch_by_tenant_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/brand/tenants/t_42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brand_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = BrandApiClient::new(BrandApiConfig::new(mock_server.uri())).unwrap();
    let theme = client.fetch_by_tenant(&TenantId::new("t_42")).await.unwrap();

    assert_eq!(theme.tenant_name, "Acme Dental");
    assert_eq!(theme.primary_color.unwrap().to_string(), "#2563eb");
    assert_eq!(theme.tier.as_deref(), Some("pro"));
}

#[tokio::test]
async fn test_fetch_by_host_lowercases_host() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/brand/hosts/portal.acme.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brand_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = BrandApiClient::new(BrandApiConfig::new(mock_server.uri())).unwrap();
    let theme = client.fetch_by_host("Portal.Acme.com").await.unwrap();

    assert_eq!(theme.tenant_id, Some(TenantId::new("t_42")));
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/brand/tenants/t_42"))
        .and(header("X-Portal-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brand_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = BrandApiConfig::new(mock_server.uri()).with_header("X-Portal-Key", "secret");
    let client = BrandApiClient::new(config).unwrap();

    assert!(client.fetch_by_tenant(&TenantId::new("t_42")).await.is_ok());
}

#[tokio::test]
async fn test_not_found_maps_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/brand/hosts/unknown.example.com"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "BrandNotFound",
            "message": "No brand for host"
        })))
        .mount(&mock_server)
        .await;

    let client = BrandApiClient::new(BrandApiConfig::new(mock_server.uri())).unwrap();
    let err = client.fetch_by_host("unknown.example.com").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.code(), "BrandNotFound");
    assert_eq!(err.message(), "No brand for host");
}

#[tokio::test]
async fn test_server_error_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = BrandApiClient::new(BrandApiConfig::new(mock_server.uri())).unwrap();
    let err = client.fetch_by_tenant(&TenantId::new("t_1")).await.unwrap_err();

    assert_eq!(err.status(), 500);
    assert_eq!(err.code(), "Unknown");
    assert!(err.message().contains("upstream exploded"));
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&mock_server)
        .await;

    let client = BrandApiClient::new(BrandApiConfig::new(mock_server.uri())).unwrap();
    let err = client.fetch_by_tenant(&TenantId::new("t_1")).await.unwrap_err();

    assert_eq!(err.code(), "ParseError");
}

#[tokio::test]
async fn test_retries_transient_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brand_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = BrandApiConfig::new(mock_server.uri()).with_max_retries(2);
    let client = BrandApiClient::new(config).unwrap();
    let theme = client.fetch_by_tenant(&TenantId::new("t_42")).await.unwrap();

    assert_eq!(theme.tenant_name, "Acme Dental");
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = BrandApiConfig::new(mock_server.uri())
        .with_max_retries(3)
        .with_retry_delay(Duration::from_millis(5), Duration::from_millis(20));
    let client = BrandApiClient::new(config).unwrap();
    let err = client.fetch_by_host("unknown.example.com").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_retry_budget_is_respected() {
    let mock_server = MockServer::start().await;

    // One attempt plus two retries, then the last error is returned
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = BrandApiConfig::new(mock_server.uri())
        .with_max_retries(2)
        .with_retry_delay(Duration::from_millis(5), Duration::from_millis(20));
    let client = BrandApiClient::new(config).unwrap();
    let err = client.fetch_by_tenant(&TenantId::new("t_1")).await.unwrap_err();

    assert_eq!(err.status(), 503);
}

#[tokio::test]
async fn test_no_retry_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = BrandApiClient::new(BrandApiConfig::new(mock_server.uri())).unwrap();
    assert!(client.fetch_by_tenant(&TenantId::new("t_1")).await.is_err());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on this port once the listener is dropped
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let uri = format!("http://{}", addr);

    let client = BrandApiClient::new(BrandApiConfig::new(uri)).unwrap();
    let err = client.fetch_by_host("acme.example.com").await.unwrap_err();

    assert_eq!(err.status(), 0);
    assert!(err.is_network_error());
}
