use crate::{
    ConsoleError, GoosedClient, InventoryFilter, MachineStatus, RunStatus,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn create_test_client(mock_server: &MockServer) -> GoosedClient {
    GoosedClient::builder()
        .origin(mock_server.uri())
        .session_cookie("goosed_session=test")
        .build()
        .unwrap()
}

fn machines_body() -> serde_json::Value {
    serde_json::json!({
        "machines": [
            {
                "machine": {
                    "id": "4c0d6c1e-0001",
                    "mac": "52:54:00:aa:bb:01",
                    "serial": "SN-001",
                    "profile": {
                        "hostname": "db-1",
                        "site": "ams1",
                        "rack": "R07",
                        "tags": ["postgres", "prod"],
                        "interfaces": [
                            {"name": "eno1", "mac": "52:54:00:aa:bb:01", "ip": "10.0.0.11", "vlan": 120}
                        ]
                    },
                    "created_at": "2024-05-01T10:00:00Z",
                    "updated_at": "2024-05-02T10:00:00Z"
                },
                "status": "ready",
                "latest_fact": {
                    "id": "f1",
                    "snapshot": {"cpu_model": "EPYC 7402", "uptime_hours": 12.5},
                    "created_at": "2024-05-03T08:00:00Z"
                },
                "recent_runs": [
                    {"id": "r2", "machine_id": "4c0d6c1e-0001", "blueprint_id": "b1", "status": "succeeded"},
                    {"id": "r1", "machine_id": "4c0d6c1e-0001", "blueprint_id": "b1", "status": "errored"}
                ]
            },
            {
                "machine": {
                    "id": "4c0d6c1e-0002",
                    "mac": "52:54:00:aa:bb:02",
                    "profile": null,
                    "created_at": "2024-05-01T10:00:00Z",
                    "updated_at": "2024-05-01T11:00:00Z"
                },
                "status": "provisioning"
            },
            42
        ]
    })
}

#[tokio::test]
async fn test_machines_list_success() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .and(header("cookie", "goosed_session=test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machines_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let machines = client.machines().await.unwrap();
    assert_eq!(machines.len(), 2);
    assert_eq!(machines[0].machine.serial.as_deref(), Some("SN-001"));
    assert_eq!(machines[0].recent_runs.as_ref().map(Vec::len), Some(2));
    assert_eq!(machines[1].machine.profile, None);
    assert_eq!(machines[1].latest_fact, None);
}

#[tokio::test]
async fn test_machine_records_are_normalized() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machines_body()))
        .mount(&mock_server)
        .await;

    let records = client.machine_records().await.unwrap();
    let db = &records[0];
    assert_eq!(db.hostname, "db-1");
    assert_eq!(db.status, MachineStatus::Ready);
    assert_eq!(db.ip.as_deref(), Some("10.0.0.11"));
    assert_eq!(db.tags, vec!["postgres", "prod"]);
    assert_eq!(db.networks[0].vlan.as_deref(), Some("120"));
    assert_eq!(db.last_check_in.as_deref(), Some("2024-05-03T08:00:00Z"));
    assert_eq!(db.uptime_hours, Some(12.5));
    assert_eq!(
        db.runs.iter().map(|r| r.status).collect::<Vec<_>>(),
        vec![RunStatus::Succeeded, RunStatus::Failed]
    );
    assert_eq!(db.facts.len(), 2);

    let bare = &records[1];
    assert_eq!(bare.hostname, "52:54:00:aa:bb:02");
    assert_eq!(bare.status, MachineStatus::Provisioning);
    assert_eq!(bare.site, None);
    assert_eq!(bare.last_check_in.as_deref(), Some("2024-05-01T11:00:00Z"));
}

#[tokio::test]
async fn test_inventory_counts_and_filter() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machines_body()))
        .mount(&mock_server)
        .await;

    let inventory = client.inventory().await.unwrap();
    let counts = inventory.counts();
    assert_eq!(counts.get(MachineStatus::Ready), 1);
    assert_eq!(counts.get(MachineStatus::Provisioning), 1);
    assert_eq!(counts.total(), 2);
    assert_eq!(inventory.sites(), vec!["ams1"]);

    let hits = inventory.filter(&InventoryFilter::new().search("POSTGRES").site("ams1"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "4c0d6c1e-0001");
}

#[tokio::test]
async fn test_machines_list_empty() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "machines": []
        })))
        .mount(&mock_server)
        .await;

    let inventory = client.inventory().await.unwrap();
    assert!(inventory.is_empty());
    assert_eq!(inventory.counts().total(), 0);
}

#[tokio::test]
async fn test_machines_malformed_listing_is_empty() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "machines": {"unexpected": true}
        })))
        .mount(&mock_server)
        .await;

    assert!(client.machines().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_machines_error_message() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "database unavailable"})),
        )
        .mount(&mock_server)
        .await;

    let result = client.machines().await;
    assert!(matches!(
        result,
        Err(ConsoleError::Api { status: 500, ref message }) if message == "database unavailable"
    ));
}

#[tokio::test]
async fn test_machines_forbidden() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let result = client.machines().await;
    assert!(matches!(
        result,
        Err(ConsoleError::Authentication(ref message)) if message == "Request failed with status 403"
    ));
}

#[tokio::test]
async fn test_machines_cached_while_fresh() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machines_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert_eq!(client.cached_inventory(), None);
    let first = client.machines().await.unwrap();
    assert_eq!(client.cached_inventory().map(|i| i.len()), Some(2));
    let second = client.machines().await.unwrap();
    let records = client.machine_records().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_concurrent_reads_are_coalesced() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(machines_body())
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (a, b, c) = tokio::join!(client.machines(), client.inventory(), client.machine_records());
    assert_eq!(a.unwrap().len(), 2);
    assert_eq!(b.unwrap().len(), 2);
    assert_eq!(c.unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_reads_share_failure() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(serde_json::json!({"error": "backend unavailable"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let start = std::time::Instant::now();
    let (a, b, c) = tokio::join!(client.machines(), client.machines(), client.machines());
    for result in [a, b, c] {
        assert!(matches!(
            result,
            Err(ConsoleError::Api { status: 503, ref message }) if message == "backend unavailable"
        ));
    }
    assert!(start.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn test_cached_inventory_does_not_wait_for_refresh() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machines_body()))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    client.machines().await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(machines_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let (refreshed, waited) = tokio::join!(client.refresh_machines(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let start = std::time::Instant::now();
        let cached = client.cached_inventory();
        assert_eq!(cached.map(|i| i.len()), Some(2));
        start.elapsed()
    });
    refreshed.unwrap();
    assert!(waited < Duration::from_millis(100), "waited {:?}", waited);
}

#[tokio::test]
async fn test_refresh_bypasses_cache() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machines_body()))
        .expect(2)
        .mount(&mock_server)
        .await;

    client.machines().await.unwrap();
    client.refresh_machines().await.unwrap();
    client.machines().await.unwrap();
}

#[tokio::test]
async fn test_stale_listing_is_refetched() {
    let mock_server = MockServer::start().await;
    let client = GoosedClient::builder()
        .origin(mock_server.uri())
        .stale_time(Duration::ZERO)
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machines_body()))
        .expect(2)
        .mount(&mock_server)
        .await;

    client.machines().await.unwrap();
    client.machines().await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_poller_publishes_inventory() {
    let mock_server = MockServer::start().await;
    let client = Arc::new(create_test_client(&mock_server));

    Mock::given(method("GET"))
        .and(path("/api/v1/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machines_body()))
        .mount(&mock_server)
        .await;

    let handle = client.spawn_poller();
    let mut updates = handle.subscribe();
    updates.changed().await.unwrap();

    let update = updates.borrow_and_update().clone();
    assert!(update.loaded);
    assert_eq!(update.error, None);
    assert_eq!(update.inventory.len(), 2);
    assert_eq!(client.machines().await.unwrap().len(), 2);
    handle.stop();
}
