//! CalmCast API Server
//!
//! REST API for stress prediction and mood tracking.

use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use data_validator::{BiometricLimits, Validator};
use inference_engine::{ModelStore, SharedClassifier};
use metrics_exporter_prometheus::PrometheusHandle;
use predictor::StressPredictor;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use storage::Repository;
use tower_governor::GovernorLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod error;
pub mod extract;
pub mod identity;
pub mod rate_limit;
pub mod routes;
pub mod settings;
pub mod telemetry;

pub use error::ApiError;
pub use identity::{UserId, USER_ID_HEADER};
pub use settings::Settings;
pub use telemetry::{init_logging, init_metrics};

/// Application state shared across handlers
pub struct AppState {
    /// Stress predictor
    pub predictor: StressPredictor,
    /// Input validation for predictions and mood ratings
    pub validator: Validator,
    /// Input validation for the manual biometric log
    pub manual_validator: Validator,
    /// Storage repository
    pub repository: Repository,
    /// Prometheus scrape handle
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(predictor: StressPredictor, repository: Repository) -> Self {
        Self {
            predictor,
            validator: Validator::default(),
            manual_validator: Validator::new(BiometricLimits::manual_entry()),
            repository,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Root response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub model: ComponentHealth,
    pub database: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
}

impl ComponentHealth {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .route("/api/stress/predict", post(routes::stress::predict))
        .route("/api/stress/model-status", get(routes::stress::model_status))
        .route("/api/stress/history", get(routes::stress::history))
        .route(
            "/api/mood",
            get(routes::mood::list_mood).post(routes::mood::add_mood),
        )
        .route("/api/mood/weekly", get(routes::mood::weekly_mood))
        .route("/api/biometrics/manual", post(routes::biometrics::save_manual))
        .route(
            "/api/biometrics/manual/history",
            get(routes::biometrics::manual_history),
        )
        .route(
            "/api/biometrics/manual/today",
            delete(routes::biometrics::delete_today),
        )
        .route("/api/biometrics/current", get(routes::biometrics::current))
        .route("/api/mood/average", get(routes::mood::mood_average))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "CalmCast API is running!".to_string(),
    })
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let database = match state.repository.ping().await {
        Ok(()) => ComponentHealth::new("ok"),
        Err(e) => {
            warn!("Database health check failed: {}", e);
            ComponentHealth::new("error")
        }
    };
    let model = if state.predictor.model_available() {
        ComponentHealth::new("ok")
    } else {
        ComponentHealth::new("degraded")
    };

    let status = if database.status == "ok" {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus { model, database },
    })
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// CORS layer for the configured browser origins
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

/// Build the shared classifier from settings
pub fn build_classifier(settings: &settings::ModelSettings) -> SharedClassifier {
    let store = ModelStore::new(&settings.path);
    if settings.lazy {
        info!("Stress model will load in the background from {}", settings.path);
        SharedClassifier::lazy(store)
    } else {
        SharedClassifier::eager(store)
    }
}

/// Load a lazy classifier on the blocking pool.
///
/// Reading and optimizing the model must not run on a runtime worker; a
/// request arriving before the load finishes waits for it.
pub fn warm_classifier(classifier: Arc<SharedClassifier>) -> tokio::task::JoinHandle<bool> {
    tokio::task::spawn_blocking(move || {
        let available = classifier.is_available();
        telemetry::record_model_availability(available);
        available
    })
}

/// Run the server
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let classifier = Arc::new(build_classifier(&settings.model));
    let predictor = StressPredictor::new(classifier.clone());
    if classifier.is_initialised() {
        telemetry::record_model_availability(classifier.is_available());
    } else {
        warm_classifier(classifier.clone());
    }

    let repository = Repository::connect(&settings.database.url).await?;

    let mut state = AppState::new(predictor, repository);
    if let Some(handle) = init_metrics() {
        state = state.with_metrics(handle);
    }

    let mut app = create_router(Arc::new(state))
        .layer(cors_layer(&settings.cors.allowed_origins))
        .layer(TraceLayer::new_for_http());

    match rate_limit::create_governor_config(&settings.rate_limit) {
        Some(config) => app = app.layer(GovernorLayer { config }),
        None => warn!("Rate limiting disabled: {:?}", settings.rate_limit),
    }

    info!("Starting API server on {}", settings.server.addr);

    let listener = tokio::net::TcpListener::bind(settings.server.addr.as_str()).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
