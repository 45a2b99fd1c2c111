use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Upper bound on portfolio images per provider.
pub const MAX_PORTFOLIO_IMAGES: usize = 6;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "provider_status", rename_all = "snake_case")]
pub enum ProviderStatus {
    PendingApproval,
    Approved,
    Rejected,
    Suspended,
}

impl ProviderStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ProviderStatus::PendingApproval => "pending_approval",
            ProviderStatus::Approved => "approved",
            ProviderStatus::Rejected => "rejected",
            ProviderStatus::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
pub enum ApplicationStatus {
    PendingApproval,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ApplicationStatus::PendingApproval => "pending_approval",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// One service offering by a profile. Only `status = approved` providers are
/// publicly listable and bookable; price and duration are fixed per
/// experience, not hourly.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceProvider {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub service_category_id: Uuid,
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub price_cents: i64,
    pub total_hours: i32,
    pub status: ProviderStatus,
    pub available: bool,
    pub service_area: Option<Vec<String>>,
    pub portfolio_images: Vec<String>,
    pub cover_image_index: Option<i32>,
    pub rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pending request to become a provider for a category. The submitted
/// offer is kept as a JSON payload and materialized into a `ServiceProvider`
/// row when an admin approves it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProviderApplication {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub service_category_id: Uuid,
    pub application_data: JsonValue,
    pub status: ApplicationStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
