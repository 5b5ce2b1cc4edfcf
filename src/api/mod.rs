//! REST API surface - a thin JSON layer over the history sink and the
//! coordinator.
//!
//! Unlike the chat commands, the play endpoint never joins a voice channel:
//! it requires a player that already exists.

use crate::core::coordinator::{ApiPlayOutcome, Coordinator};
use crate::core::history;
use crate::entities::play_history;
use crate::errors::Error;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state for the API handlers.
#[derive(Clone)]
pub struct AppState {
    /// History store
    pub db: DatabaseConnection,
    /// The same coordinator the chat commands use
    pub coordinator: Arc<Coordinator>,
    /// Gateway cache, used for the connected-server count
    pub cache: Arc<serenity::Cache>,
}

/// Aggregate playback statistics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatsResponse {
    /// Count of all history rows
    pub total_plays: u64,
    /// Count of distinct track identifiers
    pub unique_tracks: u64,
    /// Guilds the gateway session is currently a member of
    pub connected_servers: usize,
}

/// Query parameters for the history listing.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Rows per page, capped server-side
    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    history::DEFAULT_PAGE_SIZE
}

/// One history row as served over HTTP.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    pub id: i32,
    pub track_id: String,
    pub track_title: String,
    pub played_at: chrono::DateTime<chrono::Utc>,
    pub guild_id: u64,
}

impl From<play_history::Model> for HistoryEntry {
    fn from(model: play_history::Model) -> Self {
        Self {
            id: model.id,
            track_id: model.track_id,
            track_title: model.track_title,
            played_at: model.played_at,
            guild_id: model.guild_id as u64,
        }
    }
}

/// Body of the play endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayRequest {
    pub guild_id: u64,
    pub query: String,
}

/// Success body of the play endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayResponse {
    pub message: String,
    pub track_title: String,
}

/// Collaborator failures surface as a bare 500; details go to the log only.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "API request failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/BotApi/stats", get(stats))
        .route("/api/BotApi/history", get(history_page))
        .route("/api/BotApi/play", post(play))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds and serves the API until the process exits.
pub async fn serve(state: AppState, bind: String) -> crate::errors::Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(address = %bind, "REST API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let total_plays = history::total_plays(&state.db).await?;
    let unique_tracks = history::unique_tracks(&state.db).await?;
    let connected_servers = state.cache.guilds().len();

    Ok(Json(StatsResponse {
        total_plays,
        unique_tracks,
        connected_servers,
    }))
}

async fn history_page(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let rows = history::recent_page(&state.db, params.page, params.page_size).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn play(
    State(state): State<AppState>,
    Json(request): Json<PlayRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .coordinator
        .play_existing(request.guild_id, &request.query)
        .await?;

    Ok(match outcome {
        ApiPlayOutcome::NoPlayer => {
            (StatusCode::NOT_FOUND, "No player found for this guild").into_response()
        }
        ApiPlayOutcome::NoTrack => (StatusCode::NOT_FOUND, "No track found").into_response(),
        ApiPlayOutcome::Accepted { track_title } => Json(PlayResponse {
            message: "Track added to queue".to_string(),
            track_title,
        })
        .into_response(),
    })
}
