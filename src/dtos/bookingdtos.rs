use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::bookingdb::BookingWithDetails,
    models::bookingmodel::{Booking, BookingStatus, PaymentStatus},
    utils::currency::cents_to_euros,
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingDto {
    pub provider_id: Uuid,
    pub service_category_id: Uuid,
    pub scheduled_at: DateTime<Utc>,

    #[validate(range(min = 1, max = 24, message = "Duration must be between 1 and 24 hours"))]
    pub duration_hours: i32,

    #[validate(length(min = 1, max = 500, message = "Address is required"))]
    pub address: String,

    #[validate(length(max = 500, message = "Address details are too long"))]
    pub address_details: Option<String>,

    #[validate(length(max = 1000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookingStatusDto {
    pub status: BookingStatus,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct BookingListQueryDto {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponseDto {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_category_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_hours: i32,
    pub total_price: f64,
    pub address: String,
    pub address_details: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponseDto {
    fn from(b: Booking) -> Self {
        BookingResponseDto {
            id: b.id,
            customer_id: b.customer_id,
            provider_id: b.provider_id,
            service_category_id: b.service_category_id,
            scheduled_at: b.scheduled_at,
            duration_hours: b.duration_hours,
            total_price: cents_to_euros(b.total_price_cents),
            address: b.address,
            address_details: b.address_details,
            notes: b.notes,
            status: b.status,
            payment_status: b.payment_status,
            payment_id: b.payment_id,
            payment_method: b.payment_method,
            paid_at: b.paid_at,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingDetailsDto {
    pub id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_hours: i32,
    pub total_price: f64,
    pub address: String,
    pub address_details: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub category_name: String,
    pub provider_id: Uuid,
    pub provider_name: String,
    pub provider_business_name: Option<String>,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<BookingWithDetails> for BookingDetailsDto {
    fn from(b: BookingWithDetails) -> Self {
        BookingDetailsDto {
            id: b.id,
            scheduled_at: b.scheduled_at,
            duration_hours: b.duration_hours,
            total_price: cents_to_euros(b.total_price_cents),
            address: b.address,
            address_details: b.address_details,
            notes: b.notes,
            status: b.status,
            payment_status: b.payment_status,
            paid_at: b.paid_at,
            category_name: b.category_name,
            provider_id: b.provider_id,
            provider_name: b.provider_name,
            provider_business_name: b.provider_business_name,
            customer_id: b.customer_id,
            customer_name: b.customer_name,
            created_at: b.created_at,
        }
    }
}
