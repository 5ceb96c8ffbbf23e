//! Drives the real reqwest transport against an in-process axum backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use nutriscan::auth::SessionEvent;
use nutriscan::config::ClientConfig;
use nutriscan::scan::{ImageRef, ScanMode, ScanPhase};
use nutriscan::storage::{KeyValueStore, MemoryStore, TOKEN_KEY};
use nutriscan::transport::HttpTransport;
use nutriscan::{AppState, ClientError};

const TOKEN: &str = "integration-token";

#[derive(Clone, Default)]
struct Backend {
    image_parts: Arc<AtomicUsize>,
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "secret1" {
        (
            StatusCode::OK,
            Json(json!({
                "message": "Login successful",
                "token": TOKEN,
                "user": { "id": 3, "email": body["email"], "height_cm": "180.00" }
            })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid credentials" })))
    }
}

async fn register(Json(_): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "Email already exists" })))
}

async fn enhanced(
    State(backend): State<Backend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    if !bearer_ok(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "no token" })));
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("images") {
            backend.image_parts.fetch_add(1, Ordering::SeqCst);
        }
    }
    (
        StatusCode::OK,
        Json(json!({
            "nutritionData": { "calories": 320 },
            "healthScore": {
                "overallScore": 72,
                "breakdown": { "sugarScore": 60, "fatScore": 80, "sodiumScore": 70, "calorieScore": 75 },
                "warnings": [],
                "recommendations": [],
                "category": "Good"
            },
            "scanType": "enhanced",
            "foodName": "Oat bowl"
        })),
    )
}

async fn history() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "jwt expired" })))
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/scan/enhanced", post(enhanced))
        .route("/api/history", get(history))
        .with_state(backend)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn client(base_url: &str, store: Arc<MemoryStore>) -> AppState {
    let config = ClientConfig::for_base_url(base_url);
    let transport = HttpTransport::new(&config.api_base_url, Duration::from_secs(5)).unwrap();
    AppState::from_parts(config, Arc::new(transport), store)
}

#[tokio::test]
async fn login_scan_and_forced_logout_over_http() {
    let backend = Backend::default();
    let base_url = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let state = client(&base_url, store.clone());
    let mut events = state.session.subscribe();

    let err = state.session.login("dana@example.com", "wrong-pass").await.unwrap_err();
    assert_eq!(err, ClientError::AuthRejected);

    let session = state.session.login("dana@example.com", "secret1").await.unwrap();
    assert_eq!(session.token.as_deref(), Some(TOKEN));
    assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some(TOKEN));
    let cached = state.session.cached_user().await.unwrap();
    assert_eq!(cached.biometrics.height_cm, Some(180.0));

    let scanner = state.scanner();
    scanner.select_mode(ScanMode::Enhanced).unwrap();
    for name in ["front.jpg", "side.png", "label.jpg"] {
        scanner.add_image(ImageRef::new(name, vec![0xFFu8, 0xD8, 0xFF])).unwrap();
    }
    let result = scanner.submit().await.unwrap();
    assert_eq!(result.health_score.overall_score, 72.0);
    assert_eq!(result.food_name.as_deref(), Some("Oat bowl"));
    assert_eq!(backend.image_parts.load(Ordering::SeqCst), 3);
    assert!(matches!(scanner.phase(), ScanPhase::Succeeded(_)));

    let err = state.history().list().await.unwrap_err();
    assert_eq!(err, ClientError::AuthRejected);
    assert!(state.session.current_token().is_none());
    assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(
        seen,
        vec![
            SessionEvent::SignedIn { email: "dana@example.com".into() },
            SessionEvent::ForcedLogout,
        ]
    );
}

#[tokio::test]
async fn register_conflict_is_reported_as_email_in_use() {
    let base_url = spawn_backend(Backend::default()).await;
    let state = client(&base_url, Arc::new(MemoryStore::new()));
    let err = state.session.register("dana@example.com", "secret1").await.unwrap_err();
    assert_eq!(err, ClientError::EmailInUse);
    assert!(state.session.current_token().is_none());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let state = client(&format!("http://{}/api", addr), Arc::new(MemoryStore::new()));
    let err = state.session.login("dana@example.com", "secret1").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.is_recoverable());
}
