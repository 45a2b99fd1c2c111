use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    handler::Handler,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        categorydb::CategoryExt,
        providerdb::{NewProviderRecord, ProviderExt},
        reviewdb::ReviewExt,
    },
    dtos::providerdtos::*,
    dtos::reviewdtos::ReviewResponseDto,
    dtos::ApiResponse,
    error::HttpError,
    middleware::{auth, role_check, JWTAuthMiddeware},
    models::providermodel::{ApplicationStatus, ProviderApplication, MAX_PORTFOLIO_IMAGES},
    models::usermodel::UserRole,
    utils::currency::euros_to_cents,
    AppState,
};

pub fn providers_handler() -> Router {
    Router::new()
        .route("/", get(list_providers))
        .route(
            "/:provider_id",
            get(get_provider)
                .put(update_provider.layer(axum_middleware::from_fn(auth))),
        )
        .route("/:provider_id/reviews", get(list_provider_reviews))
        .route(
            "/apply",
            post(apply).layer(axum_middleware::from_fn(auth)),
        )
        .route(
            "/admin/applications",
            get(list_applications)
                .layer(axum_middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Admin])
                }))
                .layer(axum_middleware::from_fn(auth)),
        )
        .route(
            "/admin/applications/:application_id/review",
            post(review_application)
                .layer(axum_middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Admin])
                }))
                .layer(axum_middleware::from_fn(auth)),
        )
}

pub async fn list_providers(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ProviderListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let providers = app_state
        .db_client
        .list_providers_by_category(query.category)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .into_iter()
        .map(ProviderResponseDto::from)
        .collect::<Vec<_>>();

    Ok(Json(ApiResponse::success("Providers retrieved", providers)))
}

pub async fn get_provider(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(provider_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let provider = app_state
        .db_client
        .get_provider(provider_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        // Unapproved providers are invisible to the public.
        .filter(|p| p.status == crate::models::providermodel::ProviderStatus::Approved)
        .ok_or_else(|| HttpError::not_found("Provider not found"))?;

    Ok(Json(ApiResponse::success(
        "Provider retrieved",
        ProviderResponseDto::from(provider),
    )))
}

pub async fn list_provider_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(provider_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = app_state
        .db_client
        .list_reviews_for_provider(provider_id, 50, 0)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .into_iter()
        .map(ReviewResponseDto::from)
        .collect::<Vec<_>>();

    Ok(Json(ApiResponse::success("Reviews retrieved", reviews)))
}

pub async fn apply(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<ProviderApplicationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    validate_cover_index(body.cover_image_index, body.portfolio_images.as_deref())?;

    app_state
        .db_client
        .get_category(body.service_category_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Category not found"))?;

    let existing_provider = app_state
        .db_client
        .get_provider_for_profile(auth.user.id, body.service_category_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing_provider.is_some() {
        return Err(HttpError::conflict(
            "You already offer a service in this category",
        ));
    }

    let pending = app_state
        .db_client
        .find_pending_application(auth.user.id, body.service_category_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if pending.is_some() {
        return Err(HttpError::conflict(
            "An application for this category is already under review",
        ));
    }

    let application_data =
        serde_json::to_value(&body).map_err(|e| HttpError::server_error(e.to_string()))?;

    let application = app_state
        .db_client
        .create_application(auth.user.id, body.service_category_id, application_data)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Application submitted", application)),
    ))
}

pub async fn update_provider(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(provider_id): Path<Uuid>,
    Json(body): Json<UpdateProviderDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let provider = app_state
        .db_client
        .get_provider(provider_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Provider not found"))?;

    if provider.profile_id != auth.user.id {
        return Err(HttpError::forbidden(
            "You can only update your own provider profile",
        ));
    }

    // The cover index must point into whichever gallery ends up stored.
    let effective_gallery = body
        .portfolio_images
        .as_deref()
        .unwrap_or(&provider.portfolio_images);
    let effective_cover = body.cover_image_index.or(provider.cover_image_index);
    validate_cover_index(effective_cover, Some(effective_gallery))?;

    let updated = app_state
        .db_client
        .update_provider(
            provider_id,
            body.business_name,
            body.bio,
            body.price.map(euros_to_cents),
            body.total_hours,
            body.available,
            body.service_area,
            body.portfolio_images,
            body.cover_image_index,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Provider updated",
        ProviderResponseDto::from(updated),
    )))
}

pub async fn list_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ApplicationListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let applications = app_state
        .db_client
        .list_applications(query.status, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Applications retrieved",
        applications,
    )))
}

pub async fn review_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
    Json(body): Json<ReviewApplicationDto>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .db_client
        .get_application(application_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Application not found"))?;

    if application.status != ApplicationStatus::PendingApproval {
        return Err(HttpError::conflict("Application has already been reviewed"));
    }

    let new_provider = match body.decision {
        ReviewDecision::Approved => Some(provider_record_from(&application)?),
        ReviewDecision::Rejected => None,
    };

    let reviewed = app_state
        .db_client
        .review_application(
            application_id,
            auth.user.id,
            body.decision.into(),
            body.admin_notes,
            new_provider,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Application reviewed", reviewed)))
}

/// Rebuilds the provider row fields from the payload the applicant submitted.
fn provider_record_from(application: &ProviderApplication) -> Result<NewProviderRecord, HttpError> {
    let dto: ProviderApplicationDto =
        serde_json::from_value(application.application_data.clone())
            .map_err(|e| HttpError::server_error(format!("Corrupt application payload: {e}")))?;

    Ok(NewProviderRecord {
        business_name: dto.business_name,
        bio: dto.bio,
        price_cents: euros_to_cents(dto.price),
        total_hours: dto.total_hours,
        service_area: dto.service_area,
        portfolio_images: dto.portfolio_images.unwrap_or_default(),
        cover_image_index: dto.cover_image_index,
    })
}

fn validate_cover_index(
    cover_image_index: Option<i32>,
    portfolio_images: Option<&[String]>,
) -> Result<(), HttpError> {
    let gallery_len = portfolio_images.map(<[String]>::len).unwrap_or(0);
    if gallery_len > MAX_PORTFOLIO_IMAGES {
        return Err(HttpError::bad_request(format!(
            "At most {MAX_PORTFOLIO_IMAGES} portfolio images are allowed"
        )));
    }
    if let Some(index) = cover_image_index {
        // An empty gallery has nothing a cover index could point at.
        if index < 0 || index as usize >= gallery_len {
            return Err(HttpError::bad_request(
                "Cover image index does not point at a portfolio image",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_index_must_point_into_gallery() {
        let gallery = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        assert!(validate_cover_index(Some(0), Some(&gallery)).is_ok());
        assert!(validate_cover_index(Some(1), Some(&gallery)).is_ok());
        assert!(validate_cover_index(Some(2), Some(&gallery)).is_err());
        assert!(validate_cover_index(Some(-1), Some(&gallery)).is_err());
        assert!(validate_cover_index(None, Some(&gallery)).is_ok());
    }

    #[test]
    fn cover_index_is_rejected_without_a_gallery() {
        assert!(validate_cover_index(Some(0), None).is_err());
        assert!(validate_cover_index(Some(0), Some(&[])).is_err());
        assert!(validate_cover_index(None, None).is_ok());
    }

    #[test]
    fn gallery_is_capped() {
        let gallery: Vec<String> = (0..7).map(|i| format!("{i}.jpg")).collect();
        assert!(validate_cover_index(None, Some(&gallery)).is_err());
    }
}
