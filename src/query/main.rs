//! Query server for admin lookups.
//!
//! Resolves coordinates to province / amphoe / tambon over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use thaigeo::config::Config;
use thaigeo::{AccuracyConfig, AdminLevel, AdminLookup, AdminResolver, Coordinate, FsRepository};
use thaigeo::LookupError;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Thai admin boundary lookup server")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Dataset root directory (overrides config)
    #[arg(long)]
    dataset_root: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: Level,
}

/// Application state shared across handlers
struct AppState {
    resolver: AdminResolver<FsRepository>,
    default_accuracy: AccuracyConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(root) = args.dataset_root {
        config.dataset.root = root;
    }
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    info!("Thaigeo Query Server");
    info!("Dataset root: {}", config.dataset.root.display());
    if !config.dataset.root.is_dir() {
        anyhow::bail!(
            "Dataset root {} is not a directory",
            config.dataset.root.display()
        );
    }
    if let Some(timeout) = config.timeout() {
        info!("Lookup deadline: {:?}", timeout);
    }

    let state = Arc::new(AppState {
        resolver: config.resolver(),
        default_accuracy: config.default_accuracy(),
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/reverse", get(reverse_handler))
        .route("/v1/lookup", post(lookup_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let root = state.resolver.repository().root();
    Json(HealthResponse {
        status: if root.is_dir() { "ok" } else { "degraded" },
        dataset_root: root.display().to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    dataset_root: String,
}

#[derive(Debug, Deserialize)]
struct ReverseQueryParams {
    lat: f64,
    lng: f64,
    /// Deepest level to resolve (defaults to tambon)
    level: Option<String>,
    /// Per-level accuracy overrides
    province: Option<i64>,
    amphoe: Option<i64>,
    tambon: Option<i64>,
}

/// Reverse lookup with typed query parameters
async fn reverse_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ReverseQueryParams>, QueryRejection>,
) -> Result<Json<AdminLookup>, ApiError> {
    let Query(params) = params?;
    let depth = parse_level(params.level.as_deref())?;
    let accuracy = AccuracyConfig {
        province: params.province,
        amphoe: params.amphoe,
        tambon: params.tambon,
    }
    .or(&state.default_accuracy);

    let result = state
        .resolver
        .find(params.lat, params.lng, depth, Some(&accuracy))
        .await?;
    Ok(Json(result))
}

/// Lookup with an untyped JSON body: `{lat, lng, level?, accuracy?}`
async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AdminLookup>, ApiError> {
    let Json(body) = body?;
    let point = Coordinate::from_json(body.get("lat"), body.get("lng"))?;
    let depth = match body.get("level") {
        None | Some(Value::Null) => parse_level(None)?,
        Some(Value::String(name)) => parse_level(Some(name.as_str()))?,
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "level must be a string, got {}",
                other
            )))
        }
    };

    // A supplied config is used as-is; only an absent one gets defaults
    let accuracy = match body.get("accuracy") {
        Some(value) => AccuracyConfig::from_json(value, depth)?,
        None => state.default_accuracy,
    };

    let result = state
        .resolver
        .find(point.lat(), point.lng(), depth, Some(&accuracy))
        .await?;
    Ok(Json(result))
}

fn parse_level(level: Option<&str>) -> Result<AdminLevel, ApiError> {
    match level {
        None => Ok(AdminLevel::Tambon),
        Some(name) => AdminLevel::from_field_name(name)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown level '{}'", name))),
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        let status = match &err {
            e if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            LookupError::DatasetNotFound { .. } => StatusCode::NOT_FOUND,
            LookupError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => {
                tracing::error!("Lookup failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
