use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Datelike, Utc};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use timing_admin::{
    config::Config,
    controllers,
    gateway::{GatewayError, GatewayResult, MemoryBlobStore, MemoryRepository, Repository},
    models::{
        Client, Event, EventCategory, EventLinks, EventPatch, Facility, FacilityType, LinkKind,
    },
    AppState, Stores,
};

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn event(id: &str, order: Option<i32>) -> Event {
    Event {
        id: id.to_string(),
        name: format!("Meet {}", id.to_uppercase()),
        start_date_time: at("2025-06-10T14:00:00Z"),
        end_date_time: at("2025-06-12T22:00:00Z"),
        time_zone: Some("America/Chicago".to_string()),
        category: Some(EventCategory::OutdoorTrack),
        featured: true,
        front_page_order: order,
        is_public: true,
        notes: None,
        event_logo: None,
        links: EventLinks {
            live_results_url: Some("https://live.example/meet".to_string()),
            ..Default::default()
        },
        facility_id: "fac-1".to_string(),
        client_id: None,
        facility: None,
        client: None,
        version: Some(1),
    }
}

fn facility(id: &str, name: &str, state: Option<&str>) -> Facility {
    Facility {
        id: id.to_string(),
        name: name.to_string(),
        time_zone: Some("America/Chicago".to_string()),
        address: None,
        city: None,
        state: state.map(str::to_string),
        zipcode: None,
        latitude: None,
        longitude: None,
        facility_type: Some(FacilityType::OutdoorTrack),
        logos: Vec::new(),
        description: None,
        version: Some(1),
    }
}

fn five_featured() -> Vec<Event> {
    ["a", "b", "c", "d", "e"]
        .iter()
        .enumerate()
        .map(|(i, id)| event(id, Some(i as i32)))
        .collect()
}

fn app_with(config: Config, events: Arc<dyn Repository<Event>>, facilities: Vec<Facility>) -> Router {
    let stores = Stores {
        events,
        facilities: Arc::new(MemoryRepository::with_records(facilities)),
        clients: Arc::new(MemoryRepository::<Client>::new()),
        storage: Arc::new(MemoryBlobStore::new(config.storage.public_base_url.clone())),
    };
    controllers::app(AppState::with_stores(config, stores).unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Записывает каждый патч и роняет заданные id.
struct RecordingEvents {
    inner: MemoryRepository<Event>,
    updates: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, u32>>,
    permanent: HashSet<String>,
}

impl RecordingEvents {
    fn new(events: Vec<Event>) -> Self {
        Self {
            inner: MemoryRepository::with_records(events),
            updates: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            permanent: HashSet::new(),
        }
    }

    fn updated_ids(&self) -> HashSet<String> {
        self.updates.lock().unwrap().iter().cloned().collect()
    }

    fn attempts(&self, id: &str) -> usize {
        self.updates.lock().unwrap().iter().filter(|u| *u == id).count()
    }
}

#[async_trait]
impl Repository<Event> for RecordingEvents {
    async fn list_all(&self) -> GatewayResult<Vec<Event>> {
        self.inner.list_all().await
    }

    async fn create(&self, input: timing_admin::models::CreateEventInput) -> GatewayResult<String> {
        self.inner.create(input).await
    }

    async fn update(&self, patch: EventPatch) -> GatewayResult<String> {
        self.updates.lock().unwrap().push(patch.id.clone());
        if self.permanent.contains(&patch.id) {
            return Err(GatewayError::GraphQl(vec!["rejected".to_string()]));
        }
        let transient = {
            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(&patch.id) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    true
                }
                _ => false,
            }
        };
        if transient {
            return Err(GatewayError::Status {
                status: 503,
                body: "busy".to_string(),
            });
        }
        self.inner.update(patch).await
    }

    async fn delete(&self, id: &str) -> GatewayResult<String> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn landing_page_and_health() {
    let app = controllers::app(AppState::in_memory().unwrap());

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(html.to_vec()).unwrap();
    assert!(html.contains("Coming Soon"));
    assert!(html.contains(&Utc::now().year().to_string()));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reorder_updates_only_shifted_items() {
    let repo = Arc::new(RecordingEvents::new(five_featured()));
    let app = app_with(Config::in_memory(), repo.clone(), Vec::new());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/admin/frontpage/reorder", json!({ "active": "c", "over": "a" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let order: Vec<&str> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["c", "a", "b", "d", "e"]);

    let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    assert_eq!(repo.updated_ids(), expected);

    let (_, page) = send(&app, get("/api/admin/frontpage")).await;
    let stored: Vec<(String, i64)> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["id"].as_str().unwrap().to_string(), e["frontPageOrder"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        stored,
        vec![
            ("c".to_string(), 0),
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("d".to_string(), 3),
            ("e".to_string(), 4),
        ]
    );
}

#[tokio::test]
async fn reorder_retries_transient_failures() {
    let repo = RecordingEvents::new(five_featured());
    repo.failures.lock().unwrap().insert("b".to_string(), 1);
    let repo = Arc::new(repo);

    let mut config = Config::in_memory();
    config.front_page.max_attempts = 3;
    let app = app_with(config, repo.clone(), Vec::new());

    let (status, _) = send(
        &app,
        json_request("POST", "/api/admin/frontpage/reorder", json!({ "active": "c", "over": "a" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repo.attempts("b"), 2);
    assert_eq!(repo.attempts("a"), 1);
}

#[tokio::test]
async fn reorder_surfaces_partial_failure() {
    let mut repo = RecordingEvents::new(five_featured());
    repo.permanent.insert("a".to_string());
    let repo = Arc::new(repo);
    let app = app_with(Config::in_memory(), repo.clone(), Vec::new());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/admin/frontpage/reorder", json!({ "active": "c", "over": "a" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["failed"][0]["id"], json!("a"));

    // Остальные патчи применились
    let stored = repo.inner.snapshot().await;
    let c = stored.iter().find(|e| e.id == "c").unwrap();
    assert_eq!(c.front_page_order, Some(0));
}

#[tokio::test]
async fn toggle_link_round_trip() {
    let repo = Arc::new(MemoryRepository::<Event>::new());
    let app = app_with(
        Config::in_memory(),
        repo.clone(),
        vec![facility("fac-1", "Drake Stadium", Some("IA"))],
    );

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/events",
            json!({
                "name": "Drake Relays",
                "startDateTime": "2025-04-24T08:00",
                "endDateTime": "2025-04-26T18:00",
                "facilityId": "fac-1",
                "eventType": "OUTDOOR_TRACK",
                "timeZone": "America/Chicago",
                "liveResultsUrl": "https://live.example/drake"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let created = repo.get(&id).await.unwrap();
    assert!(LinkKind::ALL.iter().all(|kind| !created.links.is_shown(*kind)));

    for kind in LinkKind::ALL {
        let before = repo.get(&id).await.unwrap();
        let segment = serde_json::to_value(kind).unwrap();
        let uri = format!("/api/admin/events/{}/links/{}", id, segment.as_str().unwrap());

        let (status, body) = send(&app, json_request("PATCH", &uri, Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[kind.show_field()], json!(true));

        // После обновления отличается только этот флаг (и версия)
        let mut after = repo.get(&id).await.unwrap();
        assert!(after.links.is_shown(kind));
        after.links.set_shown(kind, false);
        after.version = before.version;
        assert_eq!(after, before);

        send(&app, json_request("PATCH", &uri, Value::Null)).await;
        let mut restored = repo.get(&id).await.unwrap();
        restored.version = created.version;
        assert_eq!(restored, created);
    }
}

#[tokio::test]
async fn create_event_then_list_grouped_by_year() {
    let repo = Arc::new(MemoryRepository::<Event>::new());
    let app = app_with(
        Config::in_memory(),
        repo.clone(),
        vec![facility("fac-1", "Drake Stadium", Some("IA"))],
    );

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/events",
            json!({
                "name": "Drake Relays",
                "startDateTime": "2025-04-24T08:00",
                "endDateTime": "2025-04-26T18:00",
                "facilityId": "fac-1",
                "eventType": "OUTDOOR_TRACK",
                "timeZone": "America/Chicago"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let stored = repo.get(&id).await.unwrap();
    assert_eq!(stored.start_date_time, at("2025-04-24T13:00:00Z"));

    let (status, list) = send(&app, get("/api/admin/events?category=OUTDOOR_TRACK")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], json!(1));
    assert_eq!(list["years"][0]["year"], json!(2025));
    let view = &list["years"][0]["events"][0];
    assert_eq!(view["status"], json!("COMPLETED"));
    assert_eq!(view["dateLabel"], json!("April 24-26"));
    assert_eq!(view["facility"]["state"], json!("IA"));

    let (_, form) = send(&app, get(&format!("/api/admin/events/{}/form", id))).await;
    assert_eq!(form["startDateTime"], json!("2025-04-24T08:00"));
}

#[tokio::test]
async fn invalid_event_form_is_rejected_before_gateway() {
    let repo = Arc::new(RecordingEvents::new(Vec::new()));
    let app = app_with(Config::in_memory(), repo.clone(), Vec::new());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/admin/events", json!({ "name": "No dates" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(repo.inner.snapshot().await.is_empty());
}

#[tokio::test]
async fn stale_update_is_a_conflict() {
    let repo = Arc::new(MemoryRepository::with_records(vec![event("a", None)]));
    let app = app_with(Config::in_memory(), repo.clone(), Vec::new());

    let form = json!({
        "name": "Renamed",
        "startDateTime": "2025-06-10T09:00",
        "endDateTime": "2025-06-12T17:00",
        "facilityId": "fac-1",
        "eventType": "OUTDOOR_TRACK",
        "timeZone": "America/Chicago",
        "expectedVersion": 1
    });
    let (status, _) = send(&app, json_request("PUT", "/api/admin/events/a", form.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, json_request("PUT", "/api/admin/events/a", form)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn facilities_are_grouped_with_event_counts() {
    let repo = Arc::new(MemoryRepository::with_records(vec![event("a", None), event("b", None)]));
    let app = app_with(
        Config::in_memory(),
        repo,
        vec![
            facility("fac-1", "Zed Field", Some("CA")),
            facility("fac-2", "Maple Dome", Some("Ontario")),
            facility("fac-3", "Blank State", Some("")),
            facility("fac-4", "Alpha Track", Some("CA")),
        ],
    );

    let (status, body) = send(&app, get("/api/admin/facilities")).await;
    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&str> = body["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["CA", "Unknown", "International"]);
    assert_eq!(body["groups"][0]["facilities"][0]["name"], json!("Alpha Track"));
    assert_eq!(body["groups"][0]["facilities"][1]["eventCount"], json!(2));
    assert_eq!(body["states"], json!(["CA", "Ontario"]));
}

#[tokio::test]
async fn facility_logo_upload_and_removal() {
    let app = app_with(
        Config::in_memory(),
        Arc::new(MemoryRepository::<Event>::new()),
        vec![facility("fac-1", "Field House", Some("IL"))],
    );

    let boundary = "XBOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"logo one.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/facilities/fac-1/logos")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let url = body["report"]["uploaded"][0].as_str().unwrap().to_string();
    assert_eq!(
        url,
        "https://test-bucket.s3.amazonaws.com/public/facilities/Field_House/logo_one.png"
    );
    assert_eq!(body["facility"]["logos"], json!([url.clone()]));

    let uri = format!(
        "/api/admin/facilities/fac-1/logos?url={}",
        urlencoding::encode(&url)
    );
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logos"], json!([]));
}

#[tokio::test]
async fn facility_update_without_logos_keeps_them() {
    let logo = "https://test-bucket.s3.amazonaws.com/public/facilities/Field_House/logo.png";
    let mut field_house = facility("fac-1", "Field House", Some("IL"));
    field_house.logos = vec![logo.to_string()];
    let app = app_with(
        Config::in_memory(),
        Arc::new(MemoryRepository::<Event>::new()),
        vec![field_house],
    );

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/facilities/fac-1",
            json!({ "name": "Field House Annex", "timeZone": "America/Chicago", "state": "IL" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/admin/facilities")).await;
    let stored = &body["groups"][0]["facilities"][0];
    assert_eq!(stored["name"], json!("Field House Annex"));
    assert_eq!(stored["logos"], json!([logo]));
}

#[tokio::test]
async fn company_requires_a_name() {
    let app = controllers::app(AppState::in_memory().unwrap());

    let (status, _) = send(
        &app,
        json_request("POST", "/api/admin/companies", json!({ "companyName": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/admin/companies", json!({ "companyName": "Acme Timing" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, companies) = send(&app, get("/api/admin/companies")).await;
    assert_eq!(companies[0]["companyName"], json!("Acme Timing"));
}

#[tokio::test]
async fn stats_counts_sum_to_total() {
    let repo = Arc::new(MemoryRepository::with_records(five_featured()));
    let app = app_with(Config::in_memory(), repo, vec![facility("fac-1", "Field", Some("TX"))]);

    let (status, stats) = send(&app, get("/api/admin/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], json!(5));
    let sum = stats["upcoming"].as_u64().unwrap()
        + stats["live"].as_u64().unwrap()
        + stats["completed"].as_u64().unwrap();
    assert_eq!(sum, 5);
    assert_eq!(stats["byState"][0], json!({ "label": "TX", "count": 5 }));
}

#[tokio::test]
async fn signout_redirects_home() {
    let app = controllers::app(AppState::in_memory().unwrap());
    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/signout")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}
