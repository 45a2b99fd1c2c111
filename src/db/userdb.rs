use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::Profile;

#[async_trait]
pub trait ProfileExt {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, Error>;
    async fn get_profile_by_email(&self, email: &str) -> Result<Option<Profile>, Error>;

    async fn save_profile(
        &self,
        full_name: String,
        email: String,
        password: String,
    ) -> Result<Profile, Error>;

    async fn update_profile(
        &self,
        profile_id: Uuid,
        full_name: Option<String>,
        phone: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<Profile, Error>;
}

#[async_trait]
impl ProfileExt for DBClient {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, password, role, phone, avatar_url, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_profile_by_email(&self, email: &str) -> Result<Option<Profile>, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, password, role, phone, avatar_url, created_at, updated_at
            FROM profiles
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn save_profile(
        &self,
        full_name: String,
        email: String,
        password: String,
    ) -> Result<Profile, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (full_name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, email, full_name, password, role, phone, avatar_url, created_at, updated_at
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(password)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_profile(
        &self,
        profile_id: Uuid,
        full_name: Option<String>,
        phone: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<Profile, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                avatar_url = COALESCE($4, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, full_name, password, role, phone, avatar_url, created_at, updated_at
            "#,
        )
        .bind(profile_id)
        .bind(full_name)
        .bind(phone)
        .bind(avatar_url)
        .fetch_one(&self.pool)
        .await
    }
}
