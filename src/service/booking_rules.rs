use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    error::{ErrorMessage, HttpError},
    models::{
        bookingmodel::Booking,
        providermodel::{ProviderStatus, ServiceProvider},
    },
    service::payment_gateway::PaymentIntent,
};

#[derive(Error, Debug, PartialEq)]
pub enum BookingRuleError {
    #[error("Provider is not approved")]
    ProviderNotApproved,

    #[error("Provider is not currently available")]
    ProviderUnavailable,

    #[error("Booking duration must be exactly {expected} hours")]
    InvalidDuration { expected: i32, got: i32 },

    #[error("Scheduled time must be in the future")]
    ScheduleInPast,

    #[error("Address is required")]
    MissingAddress,
}

impl From<BookingRuleError> for HttpError {
    fn from(error: BookingRuleError) -> Self {
        HttpError::bad_request(error.to_string())
    }
}

/// Booking intake preconditions, checked in order; the first failure wins.
/// The future-date rule is enforced here, server-side, regardless of what the
/// booking form already validated.
pub fn validate_booking_request(
    provider: &ServiceProvider,
    duration_hours: i32,
    scheduled_at: DateTime<Utc>,
    address: &str,
    now: DateTime<Utc>,
) -> Result<(), BookingRuleError> {
    if provider.status != ProviderStatus::Approved {
        return Err(BookingRuleError::ProviderNotApproved);
    }
    if !provider.available {
        return Err(BookingRuleError::ProviderUnavailable);
    }
    if duration_hours != provider.total_hours {
        return Err(BookingRuleError::InvalidDuration {
            expected: provider.total_hours,
            got: duration_hours,
        });
    }
    if scheduled_at <= now {
        return Err(BookingRuleError::ScheduleInPast);
    }
    if address.trim().is_empty() {
        return Err(BookingRuleError::MissingAddress);
    }
    Ok(())
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfirmError {
    #[error("{}", ErrorMessage::IntentMismatch)]
    IntentMismatch,

    #[error("{}", ErrorMessage::PaymentNotSucceeded)]
    PaymentNotSucceeded,
}

impl From<ConfirmError> for HttpError {
    fn from(error: ConfirmError) -> Self {
        HttpError::bad_request(error.to_string())
    }
}

/// Client-driven confirmation check: the intent must carry this booking's id
/// in its metadata (a succeeded but foreign intent must not confirm it) and
/// must have actually succeeded.
pub fn verify_intent_for_booking(
    intent: &PaymentIntent,
    booking: &Booking,
) -> Result<(), ConfirmError> {
    match intent.booking_id() {
        Some(id) if id == booking.id.to_string() => {}
        _ => return Err(ConfirmError::IntentMismatch),
    }

    if !intent.succeeded() {
        return Err(ConfirmError::PaymentNotSucceeded);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::{BookingStatus, PaymentStatus};
    use chrono::Duration;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn approved_provider() -> ServiceProvider {
        ServiceProvider {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            service_category_id: Uuid::new_v4(),
            business_name: Some("Chez Camille".to_string()),
            bio: None,
            price_cents: 15000,
            total_hours: 2,
            status: ProviderStatus::Approved,
            available: true,
            service_area: None,
            portfolio_images: vec![],
            cover_image_index: None,
            rating: 0.0,
            total_reviews: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn pending_booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            service_category_id: Uuid::new_v4(),
            scheduled_at: Utc::now() + Duration::days(3),
            duration_hours: 2,
            total_price_cents: 15000,
            address: "12 rue de la Paix, Paris".to_string(),
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

    fn intent_for(booking: &Booking, status: &str) -> PaymentIntent {
        let mut metadata = HashMap::new();
        metadata.insert("booking_id".to_string(), booking.id.to_string());
        PaymentIntent {
            id: "pi_test".to_string(),
            status: status.to_string(),
            amount: booking.total_price_cents,
            currency: "eur".to_string(),
            client_secret: None,
            payment_method_types: vec!["card".to_string()],
            metadata,
        }
    }

    #[test]
    fn happy_path_passes_all_checks() {
        let provider = approved_provider();
        let now = Utc::now();
        let result = validate_booking_request(
            &provider,
            2,
            now + Duration::days(1),
            "12 rue de la Paix",
            now,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn unapproved_provider_is_not_bookable() {
        for status in [
            ProviderStatus::PendingApproval,
            ProviderStatus::Rejected,
            ProviderStatus::Suspended,
        ] {
            let mut provider = approved_provider();
            provider.status = status;
            let now = Utc::now();
            assert_eq!(
                validate_booking_request(&provider, 2, now + Duration::days(1), "addr", now),
                Err(BookingRuleError::ProviderNotApproved)
            );
        }
    }

    #[test]
    fn unavailable_provider_is_not_bookable_even_with_valid_input() {
        let mut provider = approved_provider();
        provider.available = false;
        let now = Utc::now();
        assert_eq!(
            validate_booking_request(&provider, 2, now + Duration::days(1), "addr", now),
            Err(BookingRuleError::ProviderUnavailable)
        );
    }

    #[test]
    fn duration_must_match_exactly() {
        let provider = approved_provider();
        let now = Utc::now();
        assert_eq!(
            validate_booking_request(&provider, 3, now + Duration::days(1), "addr", now),
            Err(BookingRuleError::InvalidDuration {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn past_and_present_schedules_are_rejected() {
        let provider = approved_provider();
        let now = Utc::now();
        assert_eq!(
            validate_booking_request(&provider, 2, now - Duration::hours(1), "addr", now),
            Err(BookingRuleError::ScheduleInPast)
        );
        assert_eq!(
            validate_booking_request(&provider, 2, now, "addr", now),
            Err(BookingRuleError::ScheduleInPast)
        );
    }

    #[test]
    fn blank_address_is_rejected() {
        let provider = approved_provider();
        let now = Utc::now();
        assert_eq!(
            validate_booking_request(&provider, 2, now + Duration::days(1), "   ", now),
            Err(BookingRuleError::MissingAddress)
        );
    }

    #[test]
    fn succeeded_intent_with_matching_metadata_confirms() {
        let booking = pending_booking();
        let intent = intent_for(&booking, "succeeded");
        assert_eq!(verify_intent_for_booking(&intent, &booking), Ok(()));
    }

    #[test]
    fn foreign_intent_is_rejected_even_when_succeeded() {
        let booking = pending_booking();
        let other = pending_booking();
        let intent = intent_for(&other, "succeeded");
        assert_eq!(
            verify_intent_for_booking(&intent, &booking),
            Err(ConfirmError::IntentMismatch)
        );
    }

    #[test]
    fn intent_without_metadata_is_a_mismatch() {
        let booking = pending_booking();
        let mut intent = intent_for(&booking, "succeeded");
        intent.metadata.clear();
        assert_eq!(
            verify_intent_for_booking(&intent, &booking),
            Err(ConfirmError::IntentMismatch)
        );
    }

    #[test]
    fn non_succeeded_intent_does_not_confirm() {
        let booking = pending_booking();
        for status in ["requires_payment_method", "processing", "canceled"] {
            let intent = intent_for(&booking, status);
            assert_eq!(
                verify_intent_for_booking(&intent, &booking),
                Err(ConfirmError::PaymentNotSucceeded)
            );
        }
    }
}
