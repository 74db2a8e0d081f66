use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use storefront_core::{NewOrder, OrderDetails, OrderSummary, OrderTotal, Product};

use crate::{
    error::AppError,
    extract::{ApiPath, JsonBody},
    state::AppState,
    types::{IdPath, MessageResponse, PairPath},
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveProductResponse {
    pub message: String,
    pub order: OrderDetails,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order).delete(delete_order))
        .route("/orders/user/{user_id}", get(list_user_orders))
        .route("/orders/user/{user_id}/summary", get(user_order_summary))
        .route("/orders/{id}/products", get(list_order_products))
        .route("/orders/{id}/total", get(order_total))
        .route(
            "/orders/{id}/add_product/{product_id}",
            put(add_product),
        )
        .route(
            "/orders/{id}/remove_product/{product_id}",
            delete(remove_product),
        )
}

/// POST /orders
/// Body: `{"user_id": 1, "order_date": "2025-09-06"}`; both fields required.
async fn create_order(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewOrder>,
) -> Result<(StatusCode, Json<OrderDetails>), AppError> {
    let order = state.orders.create(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{id}
/// The order with its products embedded.
async fn get_order(
    State(state): State<AppState>,
    ApiPath(id): IdPath,
) -> Result<Json<OrderDetails>, AppError> {
    Ok(Json(state.orders.get(id).await?))
}

/// DELETE /orders/{id}
async fn delete_order(
    State(state): State<AppState>,
    ApiPath(id): IdPath,
) -> Result<Json<MessageResponse>, AppError> {
    state.orders.delete(id).await?;
    Ok(Json(MessageResponse::new("Order deleted")))
}

/// GET /orders/user/{user_id}
async fn list_user_orders(
    State(state): State<AppState>,
    ApiPath(user_id): IdPath,
) -> Result<Json<Vec<OrderDetails>>, AppError> {
    Ok(Json(state.orders.list_for_user(user_id).await?))
}

/// GET /orders/user/{user_id}/summary
/// Per order: id, date, product count and price total.
async fn user_order_summary(
    State(state): State<AppState>,
    ApiPath(user_id): IdPath,
) -> Result<Json<Vec<OrderSummary>>, AppError> {
    Ok(Json(state.orders.summary_for_user(user_id).await?))
}

/// GET /orders/{order_id}/total
async fn order_total(
    State(state): State<AppState>,
    ApiPath(order_id): IdPath,
) -> Result<Json<OrderTotal>, AppError> {
    Ok(Json(state.orders.total(order_id).await?))
}

/// GET /orders/{order_id}/products
async fn list_order_products(
    State(state): State<AppState>,
    ApiPath(order_id): IdPath,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.orders.list_products(order_id).await?))
}

/// PUT /orders/{order_id}/add_product/{product_id}
/// Re-adding a linked product is a no-op.
async fn add_product(
    State(state): State<AppState>,
    ApiPath(ids): PairPath,
) -> Result<Json<OrderDetails>, AppError> {
    let (order_id, product_id) = ids;
    Ok(Json(state.orders.add_product(order_id, product_id).await?))
}

/// DELETE /orders/{order_id}/remove_product/{product_id}
async fn remove_product(
    State(state): State<AppState>,
    ApiPath(ids): PairPath,
) -> Result<Json<RemoveProductResponse>, AppError> {
    let (order_id, product_id) = ids;
    let order = state.orders.remove_product(order_id, product_id).await?;
    Ok(Json(RemoveProductResponse {
        message: "Product removed from order".to_string(),
        order,
    }))
}
