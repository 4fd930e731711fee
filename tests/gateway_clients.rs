use bytes::Bytes;
use serde_json::json;
use wiremock::matchers::{
    body_partial_json, header, header_exists, header_regex, method, path,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use timing_admin::config::{
    CircuitBreakerConfig, Config, GatewayConfig, GatewayMode, IdentityConfig, StorageConfig,
};
use timing_admin::gateway::circuit_breaker::CircuitState;
use timing_admin::gateway::storage::PutOptions;
use timing_admin::gateway::{
    BlobStore, GatewayError, GraphQlClient, GraphQlRepository, IdentityClient, IdentityError,
    Repository, S3BlobStore, Session, StorageError,
};
use timing_admin::models::{Client, ClientPatch, Facility};

fn gateway_config(server: &MockServer) -> GatewayConfig {
    GatewayConfig {
        mode: GatewayMode::Graphql,
        graphql_url: format!("{}/graphql", server.uri()),
        api_key: "secret".to_string(),
        timeout_seconds: 5,
    }
}

fn breaker(threshold: u32) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: threshold,
        timeout_seconds: 60,
    }
}

#[tokio::test]
async fn list_all_follows_next_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-api-key", "secret"))
        .and(body_partial_json(json!({ "variables": { "nextToken": null } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "listFacilities": {
                "items": [
                    { "id": "f1", "name": "Armory", "state": "NY", "logos": null, "_version": 3 },
                    null
                ],
                "nextToken": "page-2"
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "variables": { "nextToken": "page-2" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "listFacilities": {
                "items": [{ "id": "f2", "name": "Dome", "facilityType": "INDOOR_TRACK" }],
                "nextToken": null
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GraphQlClient::from_config(&gateway_config(&server), &breaker(5)).unwrap();
    let repo = GraphQlRepository::<Facility>::new(client);

    let facilities = repo.list_all().await.unwrap();
    let ids: Vec<&str> = facilities.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["f1", "f2"]);
    assert!(facilities[0].logos.is_empty());
    assert_eq!(facilities[0].version, Some(3));
}

#[tokio::test]
async fn version_mismatch_maps_to_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "variables": { "input": { "id": "c1", "_version": 1 } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "updateClient": null },
            "errors": [{
                "message": "Conflict resolver rejects mutation.",
                "errorType": "ConflictUnhandled"
            }]
        })))
        .mount(&server)
        .await;

    let client = GraphQlClient::from_config(&gateway_config(&server), &breaker(5)).unwrap();
    let repo = GraphQlRepository::<Client>::new(client);

    let patch = ClientPatch {
        company_name: Some("Acme".to_string()),
        expected_version: Some(1),
        ..ClientPatch::new("c1")
    };
    assert!(matches!(repo.update(patch).await, Err(GatewayError::Conflict(_))));
}

#[tokio::test]
async fn mutation_returns_record_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "variables": { "input": { "id": "c9" } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "deleteClient": { "id": "c9" } }
        })))
        .mount(&server)
        .await;

    let client = GraphQlClient::from_config(&gateway_config(&server), &breaker(5)).unwrap();
    let repo = GraphQlRepository::<Client>::new(client);
    assert_eq!(repo.delete("c9").await.unwrap(), "c9");
}

#[tokio::test]
async fn circuit_opens_after_repeated_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let client = GraphQlClient::from_config(&gateway_config(&server), &breaker(2)).unwrap();
    let repo = GraphQlRepository::<Client>::new(client.clone());

    assert!(matches!(
        repo.list_all().await,
        Err(GatewayError::Status { status: 500, .. })
    ));
    assert!(repo.list_all().await.is_err());
    assert_eq!(client.circuit_state(), CircuitState::Open);
    assert!(matches!(repo.list_all().await, Err(GatewayError::CircuitOpen)));
}

#[tokio::test]
async fn rejected_requests_do_not_trip_the_circuit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad input"))
        .expect(3)
        .mount(&server)
        .await;

    let client = GraphQlClient::from_config(&gateway_config(&server), &breaker(2)).unwrap();
    let repo = GraphQlRepository::<Client>::new(client.clone());

    for _ in 0..3 {
        assert!(matches!(
            repo.list_all().await,
            Err(GatewayError::Status { status: 400, .. })
        ));
    }
    assert_eq!(client.circuit_state(), CircuitState::Closed);
}

fn s3_config(server: &MockServer) -> StorageConfig {
    StorageConfig {
        bucket: "bucket".to_string(),
        region: "us-east-1".to_string(),
        endpoint: Some(server.uri()),
        force_path_style: true,
        access_key_id: Some("AKIDEXAMPLE".to_string()),
        secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
        public_base_url: "https://bucket.s3.amazonaws.com".to_string(),
    }
}

#[tokio::test]
async fn s3_store_signs_public_uploads() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/bucket/public/facilities/Field_House/logo.png"))
        .and(header("x-amz-acl", "public-read"))
        .and(header("content-type", "image/png"))
        .and(header_regex("authorization", "^AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"))
        .and(header_exists("x-amz-date"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = S3BlobStore::new(&s3_config(&server)).await;
    store
        .put(
            "facilities/Field_House/logo.png",
            Bytes::from_static(b"png"),
            PutOptions::public("image/png"),
        )
        .await
        .unwrap();
    assert_eq!(
        store.public_url("facilities/Field_House/logo.png"),
        "https://bucket.s3.amazonaws.com/public/facilities/Field_House/logo.png"
    );
}

#[tokio::test]
async fn s3_store_reports_missing_objects_before_delete() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/bucket/public/facilities/Field_House/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/bucket/public/facilities/Field_House/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/bucket/public/facilities/Field_House/logo.png"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    // Отсутствующий ключ не должен доходить до DeleteObject
    Mock::given(method("DELETE"))
        .and(path("/bucket/public/facilities/Field_House/gone.png"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let store = S3BlobStore::new(&s3_config(&server)).await;
    store.remove("facilities/Field_House/logo.png").await.unwrap();
    assert!(matches!(
        store.remove("facilities/Field_House/gone.png").await,
        Err(StorageError::NotFound(_))
    ));
}

fn identity(server: &MockServer) -> IdentityClient {
    IdentityClient::from_config(&IdentityConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn identity_verifies_and_signs_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth2/userInfo"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "timer", "email": "timer@example.com"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oauth2/userInfo"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth2/signout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = identity(&server);
    let session = client.verify("good").await.unwrap();
    assert_eq!(
        session,
        Session {
            username: "timer".to_string(),
            email: Some("timer@example.com".to_string()),
        }
    );
    assert!(matches!(
        client.verify("expired").await,
        Err(IdentityError::InvalidSession)
    ));
    client.sign_out("good", &session).await.unwrap();
}

#[tokio::test]
async fn admin_routes_require_a_session_when_auth_is_enabled() {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/userInfo"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "timer" })))
        .mount(&server)
        .await;

    let mut config = Config::in_memory();
    config.features.enable_auth = true;
    config.identity.base_url = server.uri();
    let app = timing_admin::controllers::app(timing_admin::AppState::new(config).await.unwrap());

    let anonymous = Request::builder()
        .uri("/api/admin/stats")
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        app.clone().oneshot(anonymous).await.unwrap().status(),
        StatusCode::UNAUTHORIZED
    );

    let signed_in = Request::builder()
        .uri("/api/admin/stats")
        .header("authorization", "Bearer good")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(signed_in).await.unwrap().status(), StatusCode::OK);
}
