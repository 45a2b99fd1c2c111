use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::providermodel::{
    ApplicationStatus, ProviderApplication, ProviderStatus, ServiceProvider,
};

const PROVIDER_COLUMNS: &str = r#"
    id,
    profile_id,
    service_category_id,
    business_name,
    bio,
    price_cents,
    total_hours,
    status,
    available,
    service_area,
    portfolio_images,
    cover_image_index,
    rating,
    total_reviews,
    created_at,
    updated_at
"#;

const APPLICATION_COLUMNS: &str = r#"
    id,
    profile_id,
    service_category_id,
    application_data,
    status,
    admin_notes,
    reviewed_by,
    reviewed_at,
    created_at,
    updated_at
"#;

/// Fields materialized into a `service_providers` row when an application is
/// approved. Extracted from the stored application payload by the handler.
#[derive(Debug, Clone)]
pub struct NewProviderRecord {
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub price_cents: i64,
    pub total_hours: i32,
    pub service_area: Option<Vec<String>>,
    pub portfolio_images: Vec<String>,
    pub cover_image_index: Option<i32>,
}

#[async_trait]
pub trait ProviderExt {
    async fn get_provider(&self, provider_id: Uuid) -> Result<Option<ServiceProvider>, Error>;

    /// Approved providers only, the publicly listable set.
    async fn list_providers_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<ServiceProvider>, Error>;

    async fn get_provider_for_profile(
        &self,
        profile_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<ServiceProvider>, Error>;

    async fn update_provider(
        &self,
        provider_id: Uuid,
        business_name: Option<String>,
        bio: Option<String>,
        price_cents: Option<i64>,
        total_hours: Option<i32>,
        available: Option<bool>,
        service_area: Option<Vec<String>>,
        portfolio_images: Option<Vec<String>>,
        cover_image_index: Option<i32>,
    ) -> Result<ServiceProvider, Error>;

    async fn create_application(
        &self,
        profile_id: Uuid,
        category_id: Uuid,
        application_data: JsonValue,
    ) -> Result<ProviderApplication, Error>;

    async fn get_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ProviderApplication>, Error>;

    async fn find_pending_application(
        &self,
        profile_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<ProviderApplication>, Error>;

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProviderApplication>, Error>;

    /// Records the admin decision; on approval the new provider row is
    /// inserted in the same transaction so a crash cannot leave an approved
    /// application without its provider.
    async fn review_application(
        &self,
        application_id: Uuid,
        reviewer_id: Uuid,
        decision: ApplicationStatus,
        admin_notes: Option<String>,
        new_provider: Option<NewProviderRecord>,
    ) -> Result<ProviderApplication, Error>;
}

#[async_trait]
impl ProviderExt for DBClient {
    async fn get_provider(&self, provider_id: Uuid) -> Result<Option<ServiceProvider>, Error> {
        sqlx::query_as::<_, ServiceProvider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM service_providers WHERE id = $1"
        ))
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_providers_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<ServiceProvider>, Error> {
        sqlx::query_as::<_, ServiceProvider>(&format!(
            r#"
            SELECT {PROVIDER_COLUMNS}
            FROM service_providers
            WHERE service_category_id = $1 AND status = 'approved'::provider_status
            ORDER BY rating DESC, total_reviews DESC
            "#
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_provider_for_profile(
        &self,
        profile_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<ServiceProvider>, Error> {
        sqlx::query_as::<_, ServiceProvider>(&format!(
            r#"
            SELECT {PROVIDER_COLUMNS}
            FROM service_providers
            WHERE profile_id = $1 AND service_category_id = $2
            "#
        ))
        .bind(profile_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_provider(
        &self,
        provider_id: Uuid,
        business_name: Option<String>,
        bio: Option<String>,
        price_cents: Option<i64>,
        total_hours: Option<i32>,
        available: Option<bool>,
        service_area: Option<Vec<String>>,
        portfolio_images: Option<Vec<String>>,
        cover_image_index: Option<i32>,
    ) -> Result<ServiceProvider, Error> {
        sqlx::query_as::<_, ServiceProvider>(&format!(
            r#"
            UPDATE service_providers
            SET business_name = COALESCE($2, business_name),
                bio = COALESCE($3, bio),
                price_cents = COALESCE($4, price_cents),
                total_hours = COALESCE($5, total_hours),
                available = COALESCE($6, available),
                service_area = COALESCE($7, service_area),
                portfolio_images = COALESCE($8, portfolio_images),
                cover_image_index = COALESCE($9, cover_image_index),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROVIDER_COLUMNS}
            "#
        ))
        .bind(provider_id)
        .bind(business_name)
        .bind(bio)
        .bind(price_cents)
        .bind(total_hours)
        .bind(available)
        .bind(service_area)
        .bind(portfolio_images)
        .bind(cover_image_index)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_application(
        &self,
        profile_id: Uuid,
        category_id: Uuid,
        application_data: JsonValue,
    ) -> Result<ProviderApplication, Error> {
        sqlx::query_as::<_, ProviderApplication>(&format!(
            r#"
            INSERT INTO provider_applications (profile_id, service_category_id, application_data)
            VALUES ($1, $2, $3)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(profile_id)
        .bind(category_id)
        .bind(application_data)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<ProviderApplication>, Error> {
        sqlx::query_as::<_, ProviderApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM provider_applications WHERE id = $1"
        ))
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_pending_application(
        &self,
        profile_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<ProviderApplication>, Error> {
        sqlx::query_as::<_, ProviderApplication>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM provider_applications
            WHERE profile_id = $1
              AND service_category_id = $2
              AND status = 'pending_approval'::application_status
            "#
        ))
        .bind(profile_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProviderApplication>, Error> {
        sqlx::query_as::<_, ProviderApplication>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM provider_applications
            WHERE ($1::application_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn review_application(
        &self,
        application_id: Uuid,
        reviewer_id: Uuid,
        decision: ApplicationStatus,
        admin_notes: Option<String>,
        new_provider: Option<NewProviderRecord>,
    ) -> Result<ProviderApplication, Error> {
        let mut tx = self.pool.begin().await?;

        let application = sqlx::query_as::<_, ProviderApplication>(&format!(
            r#"
            UPDATE provider_applications
            SET status = $2,
                reviewed_by = $3,
                reviewed_at = NOW(),
                admin_notes = $4,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending_approval'::application_status
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application_id)
        .bind(decision)
        .bind(reviewer_id)
        .bind(admin_notes)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(record) = new_provider {
            sqlx::query(
                r#"
                INSERT INTO service_providers
                    (profile_id, service_category_id, business_name, bio, price_cents,
                     total_hours, status, available, service_area, portfolio_images,
                     cover_image_index)
                VALUES ($1, $2, $3, $4, $5, $6, 'approved'::provider_status, true, $7, $8, $9)
                "#,
            )
            .bind(application.profile_id)
            .bind(application.service_category_id)
            .bind(record.business_name)
            .bind(record.bio)
            .bind(record.price_cents)
            .bind(record.total_hours)
            .bind(record.service_area)
            .bind(record.portfolio_images)
            .bind(record.cover_image_index)
            .execute(&mut *tx)
            .await?;

            // The applicant can now act as a provider while remaining a customer.
            sqlx::query(
                "UPDATE profiles SET role = 'provider'::user_role, updated_at = NOW() \
                 WHERE id = $1 AND role = 'customer'::user_role",
            )
            .bind(application.profile_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(application)
    }
}
