use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::post, Extension, Json, Router};
use validator::Validate;

use crate::{
    db::{bookingdb::BookingExt, reviewdb::ReviewExt},
    dtos::reviewdtos::*,
    dtos::ApiResponse,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::bookingmodel::BookingStatus,
    AppState,
};

pub fn reviews_handler() -> Router {
    Router::new().route("/", post(create_review))
}

pub async fn create_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .db_client
        .get_booking(body.booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    if booking.customer_id != auth.user.id {
        return Err(HttpError::forbidden(
            "Only the booking's customer can leave a review",
        ));
    }

    if booking.status != BookingStatus::Completed {
        return Err(HttpError::bad_request(
            "Only completed bookings can be reviewed",
        ));
    }

    let existing = app_state
        .db_client
        .get_review_by_booking(body.booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing.is_some() {
        return Err(HttpError::conflict("This booking has already been reviewed"));
    }

    let review = app_state
        .db_client
        .create_review(
            body.booking_id,
            booking.customer_id,
            booking.provider_id,
            body.rating,
            body.comment,
        )
        .await
        .map_err(map_insert_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Review submitted",
            ReviewResponseDto::from(review),
        )),
    ))
}

/// A concurrent submission can slip past the pre-insert read; the unique
/// constraint on `booking_id` then fires and must surface as the same
/// conflict the read path reports.
fn map_insert_error(e: sqlx::Error) -> HttpError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            HttpError::conflict("This booking has already been reviewed")
        }
        e => HttpError::server_error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::borrow::Cow;

    #[derive(Debug)]
    struct DuplicateKey;

    impl std::fmt::Display for DuplicateKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for DuplicateKey {}

    impl sqlx::error::DatabaseError for DuplicateKey {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23505"))
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn racing_duplicate_insert_is_a_conflict() {
        let err = map_insert_error(sqlx::Error::Database(Box::new(DuplicateKey)));
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn other_insert_errors_stay_server_errors() {
        let err = map_insert_error(sqlx::Error::RowNotFound);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
