use axum::{
    http::Method,
    response::IntoResponse,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod extract;
pub mod health;
pub mod orders;
pub mod products;
pub mod state;
pub mod types;
pub mod users;

pub use state::{AppState, InitDbGuard};

use error::{AppError, ROUTE_NOT_FOUND};

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
            axum::http::HeaderName::from_static("x-init-token"),
        ]);

    Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(products::routes())
        .merge(orders::routes())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    AppError::NotFoundError(ROUTE_NOT_FOUND.to_string())
}

async fn method_not_allowed() -> impl IntoResponse {
    AppError::MethodNotAllowed
}
