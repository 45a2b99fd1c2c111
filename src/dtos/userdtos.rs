use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::usermodel::Profile;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub full_name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1-100 characters"))]
    pub full_name: Option<String>,

    #[validate(length(min = 6, max = 20, message = "Phone must be between 6-20 characters"))]
    pub phone: Option<String>,

    #[validate(url(message = "Avatar URL is invalid"))]
    pub avatar_url: Option<String>,
}

/// Profile as exposed over the API, with the password hash stripped.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterProfileDto {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterProfileDto {
    pub fn filter_profile(profile: &Profile) -> Self {
        FilterProfileDto {
            id: profile.id.to_string(),
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            role: profile.role.to_str().to_string(),
            phone: profile.phone.clone(),
            avatar_url: profile.avatar_url.clone(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
    pub user: FilterProfileDto,
}
