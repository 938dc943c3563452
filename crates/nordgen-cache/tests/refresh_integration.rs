//! End-to-end refresh tests against a mocked upstream directory

use nordgen_cache::{CacheConfig, CacheError, RefreshOutcome, ServerCache};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = r#"[
    {
        "name": "United States #1",
        "station": "10.0.0.1",
        "hostname": "us1.nordvpn.com",
        "load": 12,
        "locations": [{"country": {"name": "United States", "code": "US", "city": {"name": "New York"}}}],
        "technologies": [{"identifier": "wireguard_udp", "metadata": [{"name": "public_key", "value": "K1"}]}],
        "specifications": [{"identifier": "version", "values": [{"value": "2.1.0"}]}]
    },
    {
        "name": "United States #2",
        "station": "10.0.0.2",
        "hostname": "us2.nordvpn.com",
        "load": 30,
        "locations": [{"country": {"name": "United States", "code": "US", "city": {"name": "Chicago"}}}],
        "technologies": [{"identifier": "wireguard_udp", "metadata": [{"name": "public_key", "value": "K1"}]}],
        "specifications": [{"identifier": "version", "values": [{"value": "2.0.0"}]}]
    },
    {
        "name": "Germany #3",
        "station": "10.0.0.3",
        "hostname": "de3.nordvpn.com",
        "load": 8,
        "locations": [{"country": {"name": "Germany", "code": "DE", "city": {"name": "Berlin"}}}],
        "technologies": [{"identifier": "wireguard_udp", "metadata": [{"name": "public_key", "value": "K2"}]}],
        "specifications": []
    }
]"#;

async fn upstream() -> MockServer {
    MockServer::start().await
}

fn config_for(server: &MockServer, public_dir: &std::path::Path) -> CacheConfig {
    CacheConfig {
        upstream_url: server.uri(),
        request_timeout_secs: 5,
        public_dir: public_dir.to_path_buf(),
        ..CacheConfig::default()
    }
}

#[tokio::test]
async fn test_init_fetches_builds_and_serves() {
    let server = upstream().await;
    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LISTING, "application/json"))
        .mount(&server)
        .await;

    let public = tempfile::tempdir().unwrap();
    std::fs::write(public.path().join("index.html"), "<html><body></body></html>").unwrap();
    std::fs::write(public.path().join("robots.txt"), "User-agent: *").unwrap();

    let cache = ServerCache::from_config(config_for(&server, public.path())).unwrap();
    let refresh = cache.init().await;

    let snapshot = cache.snapshot().unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.stats().ineligible, 1);

    let us1 = cache.get_server("united_states_1").unwrap().unwrap();
    assert_eq!(us1.hostname, "us1.nordvpn.com");
    assert_eq!(cache.get_key(us1.key_id).unwrap().as_deref(), Some("K1"));
    assert!(cache.get_server("united_states_2").unwrap().is_none());

    let germany = cache.get_region(Some("germany"), None).unwrap();
    assert_eq!(germany.len(), 1);
    assert_eq!(germany[0].city, "berlin");

    let listing = cache.listing().unwrap();
    let payload: serde_json::Value = serde_json::from_slice(listing.bytes()).unwrap();
    assert_eq!(payload["h"], serde_json::json!(["name", "load", "station"]));
    assert_eq!(
        payload["l"]["united_states"]["new_york"],
        serde_json::json!([["united_states_1", 12, "10.0.0.1"]])
    );

    let index = cache.asset("/").unwrap();
    assert_eq!(index.etag, listing.etag());
    assert!(String::from_utf8_lossy(&index.content).contains("server-data"));
    assert_eq!(cache.asset("/robots.txt").unwrap().mime, "text/plain; charset=utf-8");

    refresh.abort();
}

#[tokio::test]
async fn test_upstream_failure_retains_snapshot() {
    let server = upstream().await;
    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LISTING, "application/json"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>maintenance</html>", "text/html"))
        .mount(&server)
        .await;

    let public = tempfile::tempdir().unwrap();
    let cache = ServerCache::from_config(config_for(&server, public.path())).unwrap();

    let RefreshOutcome::Published { etag, servers } = cache.refresh().await.unwrap() else {
        panic!("first refresh should publish");
    };
    assert_eq!(servers, 2);

    let err = cache.refresh().await.unwrap_err();
    assert!(matches!(err, CacheError::Upstream(_)), "{err:?}");
    assert_eq!(cache.listing().unwrap().etag(), etag);
    assert!(cache.get_server("germany_3").unwrap().is_some());
}

#[tokio::test]
async fn test_null_fields_do_not_abort_refresh() {
    let server = upstream().await;
    let body = r#"[
        {
            "name": "Germany #3",
            "station": "10.0.0.3",
            "hostname": "de3.nordvpn.com",
            "load": 8,
            "locations": [{"country": {"name": "Germany", "code": "DE", "city": {"name": "Berlin"}}}],
            "technologies": [{"identifier": "wireguard_udp", "metadata": [{"name": "public_key", "value": "K2"}]}]
        },
        {
            "name": "Germany #4",
            "station": null,
            "hostname": "de4.nordvpn.com",
            "load": null,
            "locations": [{"country": {"name": "Germany", "code": "DE", "city": {"name": null}}}],
            "technologies": [{"identifier": null, "metadata": [{"name": "public_key", "value": "K3"}]}],
            "specifications": null
        },
        {
            "name": "Germany #5",
            "station": "10.0.0.5",
            "hostname": "de5.nordvpn.com",
            "load": 1,
            "locations": [{"country": {"name": "Germany", "code": null, "city": {"name": "Berlin"}}}],
            "technologies": [{"identifier": "wireguard_udp", "metadata": [{"name": "public_key", "value": "K4"}]}]
        }
    ]"#;
    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let public = tempfile::tempdir().unwrap();
    let cache = ServerCache::from_config(config_for(&server, public.path())).unwrap();

    let RefreshOutcome::Published { servers, .. } = cache.refresh().await.unwrap() else {
        panic!("refresh should publish");
    };
    assert_eq!(servers, 2);
    assert_eq!(cache.snapshot().unwrap().stats().ineligible, 1);
    assert_eq!(cache.get_server("germany_3").unwrap().unwrap().station, "10.0.0.3");

    let sparse = cache.get_server("germany_4").unwrap().unwrap();
    assert!(sparse.station.is_empty());
    assert!(sparse.city.is_empty());
    assert_eq!(cache.get_key(sparse.key_id).unwrap().as_deref(), Some("K3"));
    assert!(cache.get_server("germany_5").unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_upstream_leaves_cache_uninitialized() {
    let server = upstream().await;
    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let public = tempfile::tempdir().unwrap();
    let cache = ServerCache::from_config(config_for(&server, public.path())).unwrap();
    let refresh = cache.init().await;

    assert!(!cache.is_initialized());
    assert!(cache.listing().unwrap_err().is_not_initialized());
    assert!(cache.asset("/").is_none());

    refresh.abort();
}
