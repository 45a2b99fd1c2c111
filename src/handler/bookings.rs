use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{bookingdb::BookingExt, providerdb::ProviderExt},
    dtos::bookingdtos::*,
    dtos::ApiResponse,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    service::{
        access::{booking_role, can_transition},
        booking_rules::validate_booking_request,
    },
    AppState,
};

pub fn bookings_handler() -> Router {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/:booking_id", get(get_booking).patch(update_booking_status))
}

pub async fn create_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let provider = app_state
        .db_client
        .get_provider(body.provider_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Provider not found"))?;

    if provider.service_category_id != body.service_category_id {
        return Err(HttpError::bad_request(
            "Provider does not offer this category",
        ));
    }

    validate_booking_request(
        &provider,
        body.duration_hours,
        body.scheduled_at,
        &body.address,
        Utc::now(),
    )?;

    // Flat fee per experience; the duration never multiplies the price.
    let total_price_cents = provider.price_cents;

    let booking = app_state
        .db_client
        .create_booking(
            auth.user.id,
            body.provider_id,
            body.service_category_id,
            body.scheduled_at,
            body.duration_hours,
            total_price_cents,
            body.address,
            body.address_details,
            body.notes,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Booking created",
            BookingResponseDto::from(booking),
        )),
    ))
}

pub async fn list_bookings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<BookingListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let limit = query.limit.unwrap_or(20);
    let offset = query.offset.unwrap_or(0);

    let bookings = app_state
        .db_client
        .list_bookings_for_profile(auth.user.id, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .into_iter()
        .map(BookingDetailsDto::from)
        .collect::<Vec<_>>();

    Ok(Json(ApiResponse::success("Bookings retrieved", bookings)))
}

pub async fn get_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let (booking, _) = load_booking_for(&app_state, booking_id, auth.user.id).await?;

    Ok(Json(ApiResponse::success(
        "Booking retrieved",
        BookingResponseDto::from(booking),
    )))
}

pub async fn update_booking_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<UpdateBookingStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (booking, role) = load_booking_for(&app_state, booking_id, auth.user.id).await?;

    if !can_transition(role, booking.status, body.status) {
        return Err(HttpError::conflict(format!(
            "Cannot move booking from {} to {}",
            booking.status.to_str(),
            body.status.to_str()
        )));
    }

    let updated = app_state
        .db_client
        .update_booking_status(booking_id, body.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Booking updated",
        BookingResponseDto::from(updated),
    )))
}

/// Fetches the booking and resolves the caller's role on it. Callers who are
/// neither the customer nor the provider's owner are turned away.
async fn load_booking_for(
    app_state: &Arc<AppState>,
    booking_id: Uuid,
    caller_id: Uuid,
) -> Result<
    (
        crate::models::bookingmodel::Booking,
        crate::service::access::BookingRole,
    ),
    HttpError,
> {
    let booking = app_state
        .db_client
        .get_booking(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    let provider = app_state
        .db_client
        .get_provider(booking.provider_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::server_error("Booking references a missing provider"))?;

    let role = booking_role(&booking, provider.profile_id, caller_id)
        .ok_or_else(|| HttpError::forbidden("You do not have access to this booking"))?;

    Ok((booking, role))
}
