use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler,
        bookings::bookings_handler,
        categories::categories_handler,
        payments::{payments_handler, webhook_handler},
        providers::providers_handler,
        reviews::reviews_handler,
        users::users_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest("/categories", categories_handler())
        .nest("/providers", providers_handler())
        .nest(
            "/bookings",
            bookings_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/payments",
            payments_handler().layer(middleware::from_fn(auth)),
        )
        // Webhook deliveries are authenticated by signature, not by session.
        .nest("/webhooks", webhook_handler())
        .nest("/reviews", reviews_handler().layer(middleware::from_fn(auth)))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
