mod error;
mod payload;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::{PRESETS, Session, simulate};

pub use error::ApiError;
pub use payload::{AssetPatch, ScenarioPayload, SimulatePayload, build_config, resolve_run};

#[derive(Clone, Default)]
pub struct AppState {
    session: Arc<RwLock<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/presets", get(presets_handler))
        .route("/api/defaults", get(defaults_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/session", get(session_handler))
        .route("/api/session/config", put(update_config_handler))
        .route("/api/session/preset/:label", post(apply_preset_handler))
        .route("/api/session/reset", post(reset_handler))
        .route("/api/session/simulate", get(session_simulate_handler))
        .route("/api/assets", post(add_asset_handler))
        .route(
            "/api/assets/:name",
            patch(patch_asset_handler).delete(delete_asset_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(host: &str, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    info!("scenario API listening on http://{addr}");

    axum::serve(listener, router(AppState::default())).await
}

async fn presets_handler() -> Response {
    json_response(StatusCode::OK, PRESETS)
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, Session::default())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<ScenarioPayload>) -> Result<Response, ApiError> {
    run_once(SimulatePayload {
        scenario: payload,
        assets: None,
    })
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Result<Response, ApiError> {
    run_once(payload)
}

fn run_once(payload: SimulatePayload) -> Result<Response, ApiError> {
    let (assets, config) = resolve_run(payload).map_err(ApiError::BadRequest)?;
    let output = simulate(&assets, &config);
    Ok(json_response(StatusCode::OK, output))
}

async fn session_handler(State(state): State<AppState>) -> Response {
    let session = state.session.read().await;
    json_response(StatusCode::OK, &*session)
}

async fn update_config_handler(
    State(state): State<AppState>,
    Json(payload): Json<ScenarioPayload>,
) -> Result<Response, ApiError> {
    let mut session = state.session.write().await;
    let config = build_config(session.config.clone(), &payload).map_err(ApiError::BadRequest)?;
    session.config = config;
    Ok(json_response(StatusCode::OK, &session.config))
}

async fn apply_preset_handler(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Response, ApiError> {
    let mut session = state.session.write().await;
    let preset = session.apply_preset(&label)?;
    info!(preset = preset.label, "applied preset");
    // Presets may carry a longer recovery than the stored horizon.
    session.config =
        build_config(session.config.clone(), &ScenarioPayload::default()).map_err(ApiError::BadRequest)?;
    Ok(json_response(StatusCode::OK, &session.config))
}

async fn reset_handler(State(state): State<AppState>) -> Response {
    let mut session = state.session.write().await;
    session.reset();
    info!("session reset to defaults");
    json_response(StatusCode::OK, &*session)
}

async fn session_simulate_handler(State(state): State<AppState>) -> Response {
    let (assets, config) = state.session.read().await.snapshot();
    json_response(StatusCode::OK, simulate(&assets, &config))
}

async fn add_asset_handler(State(state): State<AppState>) -> Response {
    let mut session = state.session.write().await;
    let asset = session.assets.add().clone();
    info!(asset = %asset.name, "added asset");
    json_response(StatusCode::CREATED, asset)
}

async fn patch_asset_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(patch): Json<AssetPatch>,
) -> Result<Response, ApiError> {
    let mut session = state.session.write().await;
    let mut assets = session.assets.clone();
    let final_name = patch.apply(&mut assets, &name).inspect_err(|err| {
        warn!(asset = %name, error = %err, "rejected asset edit");
    })?;
    session.assets = assets;
    let asset = session.assets.get(&final_name).cloned();
    Ok(json_response(StatusCode::OK, asset))
}

async fn delete_asset_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let mut session = state.session.write().await;
    let removed = session.assets.remove(&name).inspect_err(|err| {
        warn!(asset = %name, error = %err, "rejected asset removal");
    })?;
    Ok(json_response(StatusCode::OK, removed))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
