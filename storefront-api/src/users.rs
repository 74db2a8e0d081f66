use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use storefront_core::{NewUser, Page, User, UserPatch};

use crate::{
    error::AppError,
    extract::{ApiPath, ApiQuery, JsonBody},
    state::AppState,
    types::{IdPath, MessageResponse, PageQuery},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// GET /users?page=&per_page=
async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): PageQuery,
) -> Result<Json<Page<User>>, AppError> {
    let page = state.users.list(query.to_request()).await?;
    Ok(Json(page))
}

/// GET /users/{id}
async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): IdPath,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get(id).await?))
}

/// POST /users
async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.users.create(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /users/{id}
/// Only the fields present in the body are replaced.
async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): IdPath,
    JsonBody(patch): JsonBody<UserPatch>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.update(id, patch).await?))
}

/// DELETE /users/{id}
/// Takes the user's orders with it.
async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): IdPath,
) -> Result<Json<MessageResponse>, AppError> {
    state.users.delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}
