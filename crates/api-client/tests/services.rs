//! Service wrapper behavior against stub backends: login installs the
//! session, signup retries on conflict, profile round-trips, and health
//! probes report per service.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use api_client::auth::{AuthApi, LoginRequest, SignupRequest, UserType};
use api_client::profile::{ProfileApi, ProfileUpdate};
use api_client::{ApiClient, ApiError, ServiceClients};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use common::{Config, ServiceConfig};
use serde_json::{json, Value};
use session::{CredentialStore, MemoryStore, RefreshClient, SessionManager};

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn session_json() -> Value {
    json!({
        "accessToken": "access-1",
        "refreshToken": "refresh-1",
        "tokenType": "Bearer",
        "expiresIn": 3600,
        "user": {
            "id": "u-1",
            "email": "dev@example.com",
            "firstName": "Dev",
            "lastName": "Example",
            "userType": "job_seeker"
        }
    })
}

fn client_for(addr: SocketAddr, store: Arc<dyn CredentialStore>) -> ApiClient {
    let base_url = format!("http://{}", addr);
    let service = ServiceConfig {
        base_url: base_url.clone(),
        timeout_secs: 5,
        retries: 3,
    };
    let refresher = RefreshClient::new(reqwest::Client::new(), &base_url);
    let session = Arc::new(SessionManager::new(store, refresher));
    ApiClient::new(&service, session).unwrap()
}

#[tokio::test]
async fn login_installs_the_returned_pair() {
    let app = Router::new().route(
        "/auth/login",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["email"], json!("dev@example.com"));
            assert_eq!(body["password"], json!("hunter2"));
            Json(session_json())
        }),
    );
    let addr = spawn(app).await;

    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
    let auth = AuthApi::new(client_for(addr, store.clone()), 3);

    let response = auth
        .login(&LoginRequest {
            email: "dev@example.com".to_string(),
            password: "hunter2".to_string(),
            device_id: None,
        })
        .await
        .unwrap();

    assert_eq!(response.user.first_name, "Dev");
    assert_eq!(response.user.user_type, UserType::JobSeeker);
    assert_eq!(response.expires_in, 3600);

    let pair = store.get().unwrap().unwrap();
    assert_eq!(pair.access_token, "access-1");
    assert_eq!(pair.refresh_token, "refresh-1");
}

#[tokio::test]
async fn login_rejection_is_a_plain_status_error() {
    let app = Router::new().route(
        "/auth/login",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "bad credentials"})),
            )
        }),
    );
    let addr = spawn(app).await;

    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
    let auth = AuthApi::new(client_for(addr, store.clone()), 3);

    let err = auth
        .login(&LoginRequest {
            email: "dev@example.com".to_string(),
            password: "wrong".to_string(),
            device_id: None,
        })
        .await
        .unwrap_err();

    // A 401 from login is an answer, not an expired session.
    match err {
        ApiError::Status {
            status, message, ..
        } => {
            assert_eq!(status, 401);
            assert_eq!(message, "bad credentials");
        }
        other => panic!("expected Status, got {:?}", other),
    }
    assert_eq!(store.get().unwrap(), None);
}

#[tokio::test]
async fn signup_retries_conflicts_then_succeeds() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/auth/register",
            post(
                |State(calls): State<Arc<AtomicUsize>>, Json(body): Json<Value>| async move {
                    // The password travels in the `passwordHash` field.
                    assert_eq!(body["passwordHash"], json!("hunter2"));
                    assert!(body.get("password").is_none());
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({"message": "concurrent modification"})),
                        )
                            .into_response();
                    }
                    Json(session_json()).into_response()
                },
            ),
        )
        .with_state(calls.clone());
    let addr = spawn(app).await;

    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
    let auth = AuthApi::new(client_for(addr, store.clone()), 3);

    let response = auth
        .signup(&SignupRequest {
            first_name: "Dev".to_string(),
            last_name: "Example".to_string(),
            email: "dev@example.com".to_string(),
            password: "hunter2".to_string(),
            user_type: UserType::JobSeeker,
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(response.user.email, "dev@example.com");
    assert!(store.get().unwrap().is_some());
}

#[tokio::test]
async fn signup_gives_up_after_the_retry_budget() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/auth/register",
            post(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"message": "slow down"})),
                )
            }),
        )
        .with_state(calls.clone());
    let addr = spawn(app).await;

    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
    let auth = AuthApi::new(client_for(addr, store), 2);

    let err = auth
        .signup(&SignupRequest {
            first_name: "Dev".to_string(),
            last_name: "Example".to_string(),
            email: "dev@example.com".to_string(),
            password: "hunter2".to_string(),
            user_type: UserType::Employer,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 429, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn profile_update_round_trips() {
    let app = Router::new().route(
        "/profile",
        put(|Json(body): Json<Value>| async move {
            // Unset fields are omitted from the payload entirely.
            assert_eq!(body["bio"], json!("Rust engineer"));
            assert!(body.get("phone").is_none());
            Json(json!({
                "id": "p-1",
                "userId": "u-1",
                "firstName": "Dev",
                "bio": "Rust engineer"
            }))
        }),
    );
    let addr = spawn(app).await;

    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
    store
        .set(&session::CredentialPair::new("access", "refresh"))
        .unwrap();
    let profile = ProfileApi::new(client_for(addr, store));

    let updated = profile
        .update(&ProfileUpdate {
            bio: Some("Rust engineer".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.bio.as_deref(), Some("Rust engineer"));
    assert_eq!(updated.first_name.as_deref(), Some("Dev"));
    assert_eq!(updated.phone, None);
}

#[tokio::test]
async fn health_reports_each_service_separately() {
    let healthy = Router::new().route("/health", get(|| async { Json(json!({"status": "ok"})) }));
    let healthy_addr = spawn(healthy).await;

    let unhealthy = Router::new().route(
        "/health",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    );
    let unhealthy_addr = spawn(unhealthy).await;

    // A bound-then-dropped port: connection refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let service = |addr: SocketAddr| ServiceConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 5,
        retries: 1,
    };
    let config = Config {
        auth: service(healthy_addr),
        jobs: service(healthy_addr),
        applications: service(unhealthy_addr),
        profile: service(dead_addr),
    };

    let services = ServiceClients::new(&config, Arc::new(MemoryStore::new())).unwrap();
    let report = services.health().await;

    assert_eq!(report.len(), 4);
    let by_name = |name: &str| report.iter().find(|h| h.service == name).unwrap();
    assert!(by_name("auth").healthy);
    assert!(by_name("jobs").healthy);

    let applications = by_name("applications");
    assert!(!applications.healthy);
    assert_eq!(applications.error.as_deref(), Some("HTTP 503"));

    let profile = by_name("profile");
    assert!(!profile.healthy);
    assert!(profile.error.is_some());
}
