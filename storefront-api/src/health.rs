use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::{error::AppError, state::AppState, types::MessageResponse};

pub const INIT_TOKEN_HEADER: &str = "X-Init-Token";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/init-db", post(init_db))
}

/// GET /
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /init-db
/// Creates the tables if they do not exist yet.
async fn init_db(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    let supplied = headers.get(INIT_TOKEN_HEADER).and_then(|h| h.to_str().ok());
    if !state.init_db.allows(supplied) {
        tracing::warn!("Rejected init-db call with missing or wrong token");
        return Err(AppError::AuthenticationError(
            "unauthorized to initialize database".to_string(),
        ));
    }

    state.schema.create_schema().await?;
    tracing::info!("Database schema initialized");
    Ok(Json(MessageResponse::new(
        "Database tables created (if not existing).",
    )))
}
