use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::providermodel::{ApplicationStatus, ServiceProvider},
    utils::currency::cents_to_euros,
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ProviderApplicationDto {
    pub service_category_id: Uuid,

    #[validate(length(max = 100, message = "Business name is too long"))]
    pub business_name: Option<String>,

    #[validate(length(max = 2000, message = "Bio is too long"))]
    pub bio: Option<String>,

    #[validate(range(min = 1.0, max = 100000.0, message = "Price must be between €1 and €100,000"))]
    pub price: f64,

    #[validate(range(min = 1, max = 24, message = "Total hours must be between 1 and 24"))]
    pub total_hours: i32,

    pub service_area: Option<Vec<String>>,

    #[validate(length(max = 6, message = "At most 6 portfolio images are allowed"))]
    pub portfolio_images: Option<Vec<String>>,

    pub cover_image_index: Option<i32>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProviderDto {
    #[validate(length(max = 100, message = "Business name is too long"))]
    pub business_name: Option<String>,

    #[validate(length(max = 2000, message = "Bio is too long"))]
    pub bio: Option<String>,

    #[validate(range(min = 1.0, max = 100000.0, message = "Price must be between €1 and €100,000"))]
    pub price: Option<f64>,

    #[validate(range(min = 1, max = 24, message = "Total hours must be between 1 and 24"))]
    pub total_hours: Option<i32>,

    pub available: Option<bool>,

    pub service_area: Option<Vec<String>>,

    #[validate(length(max = 6, message = "At most 6 portfolio images are allowed"))]
    pub portfolio_images: Option<Vec<String>>,

    pub cover_image_index: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewApplicationDto {
    pub decision: ReviewDecision,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for ApplicationStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => ApplicationStatus::Approved,
            ReviewDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderListQueryDto {
    pub category: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationListQueryDto {
    pub status: Option<ApplicationStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderResponseDto {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub service_category_id: Uuid,
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub price: f64,
    pub total_hours: i32,
    pub status: String,
    pub available: bool,
    pub service_area: Option<Vec<String>>,
    pub portfolio_images: Vec<String>,
    pub cover_image_index: Option<i32>,
    pub rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceProvider> for ProviderResponseDto {
    fn from(p: ServiceProvider) -> Self {
        ProviderResponseDto {
            id: p.id,
            profile_id: p.profile_id,
            service_category_id: p.service_category_id,
            business_name: p.business_name,
            bio: p.bio,
            price: cents_to_euros(p.price_cents),
            total_hours: p.total_hours,
            status: p.status.to_str().to_string(),
            available: p.available,
            service_area: p.service_area,
            portfolio_images: p.portfolio_images,
            cover_image_index: p.cover_image_index,
            rating: p.rating,
            total_reviews: p.total_reviews,
            created_at: p.created_at,
        }
    }
}
