use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::bookingmodel::{Booking, BookingStatus, PaymentStatus};

const BOOKING_COLUMNS: &str = r#"
    id,
    customer_id,
    provider_id,
    service_category_id,
    scheduled_at,
    duration_hours,
    total_price_cents,
    address,
    address_details,
    notes,
    status,
    payment_status,
    payment_id,
    payment_method,
    paid_at,
    created_at,
    updated_at
"#;

/// Booking row joined with the display fields the dashboard needs.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct BookingWithDetails {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_category_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_hours: i32,
    pub total_price_cents: i64,
    pub address: String,
    pub address_details: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub category_name: String,
    pub provider_profile_id: Uuid,
    pub provider_business_name: Option<String>,
    pub provider_name: String,
    pub customer_name: String,
}

/// Result of the conditional paid transition.
#[derive(Debug)]
pub enum PaidTransition {
    /// This call flipped `payment_status` to paid.
    Transitioned(Booking),
    /// The booking was already paid; nothing was written.
    AlreadyPaid(Booking),
}

impl PaidTransition {
    pub fn booking(&self) -> &Booking {
        match self {
            PaidTransition::Transitioned(b) | PaidTransition::AlreadyPaid(b) => b,
        }
    }
}

#[async_trait]
pub trait BookingExt {
    #[allow(clippy::too_many_arguments)]
    async fn create_booking(
        &self,
        customer_id: Uuid,
        provider_id: Uuid,
        service_category_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_hours: i32,
        total_price_cents: i64,
        address: String,
        address_details: Option<String>,
        notes: Option<String>,
    ) -> Result<Booking, Error>;

    async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, Error>;

    /// Bookings where the profile is the customer or the provider's owner,
    /// newest scheduled first.
    async fn list_bookings_for_profile(
        &self,
        profile_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BookingWithDetails>, Error>;

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Error>;

    /// Records the processor intent id on the booking, but never on one that
    /// has already been paid. `None` means the booking was paid out from
    /// under the caller (or vanished) and the intent was not attached.
    async fn set_payment_intent(
        &self,
        booking_id: Uuid,
        payment_id: &str,
    ) -> Result<Option<Booking>, Error>;

    /// The single idempotent paid transition shared by the client
    /// confirmation path and the webhook path. The UPDATE is predicated on
    /// `payment_status <> 'paid'`, so whichever finalizer runs second (or a
    /// processor retry) reads back `AlreadyPaid` instead of overwriting
    /// `paid_at` or double-counting.
    async fn mark_booking_paid(
        &self,
        booking_id: Uuid,
        payment_id: &str,
        payment_method: Option<&str>,
    ) -> Result<PaidTransition, Error>;
}

#[async_trait]
impl BookingExt for DBClient {
    async fn create_booking(
        &self,
        customer_id: Uuid,
        provider_id: Uuid,
        service_category_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_hours: i32,
        total_price_cents: i64,
        address: String,
        address_details: Option<String>,
        notes: Option<String>,
    ) -> Result<Booking, Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings
                (customer_id, provider_id, service_category_id, scheduled_at,
                 duration_hours, total_price_cents, address, address_details, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(provider_id)
        .bind(service_category_id)
        .bind(scheduled_at)
        .bind(duration_hours)
        .bind(total_price_cents)
        .bind(address)
        .bind(address_details)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_bookings_for_profile(
        &self,
        profile_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BookingWithDetails>, Error> {
        sqlx::query_as::<_, BookingWithDetails>(
            r#"
            SELECT
                b.id,
                b.customer_id,
                b.provider_id,
                b.service_category_id,
                b.scheduled_at,
                b.duration_hours,
                b.total_price_cents,
                b.address,
                b.address_details,
                b.notes,
                b.status,
                b.payment_status,
                b.payment_id,
                b.payment_method,
                b.paid_at,
                b.created_at,
                c.name AS category_name,
                p.profile_id AS provider_profile_id,
                p.business_name AS provider_business_name,
                owner.full_name AS provider_name,
                customer.full_name AS customer_name
            FROM bookings b
            JOIN service_categories c ON c.id = b.service_category_id
            JOIN service_providers p ON p.id = b.provider_id
            JOIN profiles owner ON owner.id = p.profile_id
            JOIN profiles customer ON customer.id = b.customer_id
            WHERE b.customer_id = $1 OR p.profile_id = $1
            ORDER BY b.scheduled_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(profile_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_payment_intent(
        &self,
        booking_id: Uuid,
        payment_id: &str,
    ) -> Result<Option<Booking>, Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET payment_id = $2, updated_at = NOW()
            WHERE id = $1 AND payment_status <> 'paid'::payment_status
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_booking_paid(
        &self,
        booking_id: Uuid,
        payment_id: &str,
        payment_method: Option<&str>,
    ) -> Result<PaidTransition, Error> {
        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET payment_status = 'paid'::payment_status,
                paid_at = NOW(),
                payment_id = $2,
                payment_method = COALESCE($3, payment_method),
                updated_at = NOW()
            WHERE id = $1 AND payment_status <> 'paid'::payment_status
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(payment_id)
        .bind(payment_method)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(booking) = updated {
            return Ok(PaidTransition::Transitioned(booking));
        }

        // Zero rows: either the booking does not exist or it is already paid.
        let existing = self
            .get_booking(booking_id)
            .await?
            .ok_or(Error::RowNotFound)?;

        Ok(PaidTransition::AlreadyPaid(existing))
    }
}
