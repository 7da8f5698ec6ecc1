//! HTTP-level tests for the metadata collaborator and the cached regions
//! service, against a local mock server.

use std::time::Duration;

use qcloud_client::{
    ClientError, DiskCache, Fingerprint, HttpMetadataApi, MetadataApi, RegionsService,
};
use qcloud_config::ResolvedConfig;
use qcloud_config::constants::{
    DEFAULT_LEAP_API_ENDPOINT, DEFAULT_REGION, DEFAULT_SOLVER_API_ENDPOINT,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(uri: &str) -> ResolvedConfig {
    ResolvedConfig {
        endpoint: DEFAULT_SOLVER_API_ENDPOINT.to_string(),
        region: DEFAULT_REGION.to_string(),
        metadata_api_endpoint: format!("{uri}/"),
        leap_api_endpoint: DEFAULT_LEAP_API_ENDPOINT.to_string(),
        token: None,
        client_type: None,
        solver_selector: None,
        headers: None,
        cert: None,
        proxy: None,
        permissive_ssl: false,
        request_retry: None,
        request_timeout: Duration::from_secs(5),
        polling_timeout: None,
    }
}

fn regions_body() -> serde_json::Value {
    json!([
        {
            "code": "na-west-1",
            "name": "North America",
            "endpoint": "https://na-west-1.cloud.qpucloud.io/sapi/"
        },
        {
            "code": "eu-central-1",
            "name": "Europe",
            "endpoint": "https://eu-central-1.cloud.qpucloud.io/sapi/"
        }
    ])
}

#[tokio::test]
async fn lists_regions_from_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(regions_body()))
        .mount(&server)
        .await;

    let api = HttpMetadataApi::from_config(&config_for(&server.uri())).unwrap();
    let regions = api.list_regions().await.unwrap();
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].code, "na-west-1");
    assert_eq!(
        regions[1].endpoint,
        "https://eu-central-1.cloud.qpucloud.io/sapi/"
    );
}

#[tokio::test]
async fn server_error_carries_status_and_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let api = HttpMetadataApi::from_config(&config_for(&server.uri())).unwrap();
    match api.list_regions().await {
        Err(ClientError::Api { status, url, message }) => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/regions"));
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_an_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let api = HttpMetadataApi::from_config(&config_for(&server.uri())).unwrap();
    assert!(matches!(
        api.list_regions().await,
        Err(ClientError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn regions_service_hits_the_wire_once_until_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(regions_body()))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server.uri());
    let cache_dir = TempDir::new().unwrap();
    let fingerprint = Fingerprint::new("regions-it").part("endpoint", &server.uri());
    let service = RegionsService::new(
        HttpMetadataApi::from_config(&config).unwrap(),
        DiskCache::new(cache_dir.path()),
        Duration::from_secs(3600),
        fingerprint,
    );

    let first = service.list_regions(false).await.unwrap();
    let second = service.list_regions(false).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn unreachable_endpoint_reports_regions_unavailable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = config_for(&uri);

    let cache_dir = TempDir::new().unwrap();
    let fingerprint = Fingerprint::new("regions-it-down").part("endpoint", &uri);
    let service = RegionsService::new(
        HttpMetadataApi::from_config(&config).unwrap(),
        DiskCache::new(cache_dir.path()),
        Duration::from_secs(3600),
        fingerprint,
    );

    match service.list_regions(false).await {
        Err(ClientError::RegionsUnavailable { endpoint }) => {
            assert!(endpoint.starts_with("http://"));
        }
        other => panic!("expected RegionsUnavailable, got {other:?}"),
    }
}
