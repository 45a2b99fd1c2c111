use std::sync::Arc;

use axum::{extract::Path, response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    db::{categorydb::CategoryExt, providerdb::ProviderExt},
    dtos::providerdtos::ProviderResponseDto,
    dtos::ApiResponse,
    error::HttpError,
    AppState,
};

pub fn categories_handler() -> Router {
    Router::new()
        .route("/", get(list_categories))
        .route("/:slug", get(get_category_by_slug))
}

pub async fn list_categories(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let categories = app_state
        .db_client
        .list_categories()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Categories retrieved", categories)))
}

pub async fn get_category_by_slug(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let category = app_state
        .db_client
        .get_category_by_slug(&slug)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Category not found"))?;

    let providers = app_state
        .db_client
        .list_providers_by_category(category.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .into_iter()
        .map(ProviderResponseDto::from)
        .collect::<Vec<_>>();

    Ok(Json(ApiResponse::success(
        "Category retrieved",
        serde_json::json!({
            "category": category,
            "providers": providers,
        }),
    )))
}
