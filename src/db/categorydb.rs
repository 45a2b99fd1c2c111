use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::categorymodel::ServiceCategory;

#[async_trait]
pub trait CategoryExt {
    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, Error>;
    async fn get_category(&self, category_id: Uuid) -> Result<Option<ServiceCategory>, Error>;
    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<ServiceCategory>, Error>;
}

#[async_trait]
impl CategoryExt for DBClient {
    async fn list_categories(&self) -> Result<Vec<ServiceCategory>, Error> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            SELECT id, name, description, icon, slug, active, created_at, updated_at
            FROM service_categories
            WHERE active = true
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_category(&self, category_id: Uuid) -> Result<Option<ServiceCategory>, Error> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            SELECT id, name, description, icon, slug, active, created_at, updated_at
            FROM service_categories
            WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<ServiceCategory>, Error> {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            SELECT id, name, description, icon, slug, active, created_at, updated_at
            FROM service_categories
            WHERE slug = $1 AND active = true
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
    }
}
