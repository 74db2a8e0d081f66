use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use storefront_core::{NewProduct, Page, Product, ProductPatch};

use crate::{
    error::AppError,
    extract::{ApiPath, ApiQuery, JsonBody},
    state::AppState,
    types::{IdPath, MessageResponse, PageQuery},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// GET /products?page=&per_page=
async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): PageQuery,
) -> Result<Json<Page<Product>>, AppError> {
    Ok(Json(state.products.list(query.to_request()).await?))
}

/// GET /products/{id}
async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): IdPath,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.products.get(id).await?))
}

/// POST /products
async fn create_product(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.products.create(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/{id}
async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): IdPath,
    JsonBody(patch): JsonBody<ProductPatch>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.products.update(id, patch).await?))
}

/// DELETE /products/{id}
async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): IdPath,
) -> Result<Json<MessageResponse>, AppError> {
    state.products.delete(id).await?;
    Ok(Json(MessageResponse::new("Product deleted")))
}
