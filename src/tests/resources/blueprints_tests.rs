use crate::{BlueprintDraft, ConsoleError, GoosedClient, ResourceKey, ValidationError};
use pretty_assertions::assert_eq;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

fn create_test_client(mock_server: &MockServer) -> GoosedClient {
    GoosedClient::builder()
        .origin(mock_server.uri())
        .build()
        .unwrap()
}

fn blueprint_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "os": "rhel",
        "version": "9.4",
        "data": {"disk": "sda"},
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

async fn mount_listing(mock_server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/blueprints"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "blueprints": [
                blueprint_json("b2", "web"),
                blueprint_json("b1", "base"),
                {"id": "broken"}
            ]
        })))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_blueprints_sorted_by_name() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);
    mount_listing(&mock_server, 1).await;

    let blueprints = client.blueprints().await.unwrap();
    let names: Vec<&str> = blueprints.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["base", "web"]);
    assert_eq!(blueprints[0].data, serde_json::json!({"disk": "sda"}));

    // Served from cache.
    assert_eq!(client.blueprints().await.unwrap(), blueprints);
}

#[tokio::test]
async fn test_blueprint_by_id() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/blueprints/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "blueprint": blueprint_json("b1", "base")
        })))
        .mount(&mock_server)
        .await;

    let blueprint = client.blueprint("b1").await.unwrap();
    assert_eq!(blueprint.id, "b1");
    assert_eq!(blueprint.version, "9.4");
}

#[tokio::test]
async fn test_blueprint_not_found() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/blueprints/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "blueprint not found"})),
        )
        .mount(&mock_server)
        .await;

    let err = client.blueprint("missing").await.unwrap_err();
    assert_eq!(err.to_string(), "API error (404): blueprint not found");
}

#[tokio::test]
async fn test_blueprint_malformed_body() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("GET"))
        .and(path("/api/v1/blueprints/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"unexpected": 1})))
        .mount(&mock_server)
        .await;

    let result = client.blueprint("b1").await;
    assert!(matches!(result, Err(ConsoleError::Payload(_))));
}

#[tokio::test]
async fn test_create_blueprint_sends_trimmed_draft() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .and(path("/api/v1/blueprints"))
        .and(body_json(serde_json::json!({
            "name": "base",
            "os": "rhel",
            "version": "9.4",
            "data": {}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "blueprint": blueprint_json("b9", "base")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let draft = BlueprintDraft::from_editor(" base ", "rhel", "9.4 ", "   ").unwrap();
    let created = client.create_blueprint(&draft).await.unwrap();
    assert_eq!(created.id, "b9");
}

#[tokio::test]
async fn test_create_blueprint_invalidates_listing() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);
    mount_listing(&mock_server, 2).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/blueprints"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "blueprint": blueprint_json("b3", "edge")
        })))
        .mount(&mock_server)
        .await;

    client.blueprints().await.unwrap();
    client
        .create_blueprint(&BlueprintDraft::new("edge", "ubuntu", "24.04", serde_json::json!({})))
        .await
        .unwrap();
    client.blueprints().await.unwrap();
}

#[tokio::test]
async fn test_failed_mutation_keeps_listing_cached() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);
    mount_listing(&mock_server, 1).await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/blueprints/b1"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "version already exists"})),
        )
        .mount(&mock_server)
        .await;

    client.blueprints().await.unwrap();
    let draft = BlueprintDraft::new("base", "rhel", "9.4", serde_json::json!({"disk": "sdb"}));
    let result = client.update_blueprint("b1", &draft).await;
    assert!(matches!(
        result,
        Err(ConsoleError::Api { status: 400, ref message }) if message == "version already exists"
    ));
    client.blueprints().await.unwrap();
}

#[tokio::test]
async fn test_update_blueprint() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("PUT"))
        .and(path("/api/v1/blueprints/b1"))
        .and(body_json(serde_json::json!({
            "name": "base",
            "os": "rhel",
            "version": "9.5",
            "data": {"disk": "sdb"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "blueprint": blueprint_json("b1", "base")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let draft = BlueprintDraft::from_editor("base", "rhel", "9.5", r#"{"disk": "sdb"}"#).unwrap();
    let updated = client.update_blueprint("b1", &draft).await.unwrap();
    assert_eq!(updated.id, "b1");
}

#[tokio::test]
async fn test_delete_blueprint_invalidates_listing() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);
    mount_listing(&mock_server, 2).await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/blueprints/b2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    client.blueprints().await.unwrap();
    client.delete_blueprint("b2").await.unwrap();
    client.blueprints().await.unwrap();
}

#[tokio::test]
async fn test_invalid_drafts_never_reach_backend() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let blank_name = BlueprintDraft::new("  ", "rhel", "9.4", serde_json::json!({}));
    let result = client.create_blueprint(&blank_name).await;
    assert!(matches!(
        result,
        Err(ConsoleError::Validation {
            source: ValidationError::Field { ref field, .. }
        }) if field == "name"
    ));

    let array_payload = BlueprintDraft::new("base", "rhel", "9.4", serde_json::json!([1, 2]));
    let result = client.update_blueprint("b1", &array_payload).await;
    assert!(matches!(
        result,
        Err(ConsoleError::Validation {
            source: ValidationError::ConstraintViolation(_)
        })
    ));

    let result = client
        .update_blueprint("", &BlueprintDraft::new("base", "rhel", "9.4", serde_json::json!({})))
        .await;
    assert!(matches!(result, Err(ConsoleError::Validation { .. })));
}

#[tokio::test]
async fn test_explicit_invalidate() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);
    mount_listing(&mock_server, 2).await;

    client.blueprints().await.unwrap();
    client.invalidate(ResourceKey::Blueprints);
    client.blueprints().await.unwrap();
}

#[tokio::test]
async fn test_mutations_are_serialized() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_millis(200)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let start = std::time::Instant::now();
    let (a, b) = tokio::join!(client.delete_blueprint("b1"), client.delete_blueprint("b2"));
    a.unwrap();
    b.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(400));
}
