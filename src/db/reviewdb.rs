use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::reviewmodel::Review;

const REVIEW_COLUMNS: &str =
    "id, booking_id, customer_id, provider_id, rating, comment, created_at, updated_at";

#[async_trait]
pub trait ReviewExt {
    /// Inserts the review and refreshes the provider's aggregate rating and
    /// review count in the same transaction.
    async fn create_review(
        &self,
        booking_id: Uuid,
        customer_id: Uuid,
        provider_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, Error>;

    async fn get_review_by_booking(&self, booking_id: Uuid) -> Result<Option<Review>, Error>;

    async fn list_reviews_for_provider(
        &self,
        provider_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn create_review(
        &self,
        booking_id: Uuid,
        customer_id: Uuid,
        provider_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, Error> {
        let mut tx = self.pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (booking_id, customer_id, provider_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(customer_id)
        .bind(provider_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE service_providers
            SET rating = agg.avg_rating,
                total_reviews = agg.review_count,
                updated_at = NOW()
            FROM (
                SELECT AVG(rating)::float8 AS avg_rating, COUNT(*)::int AS review_count
                FROM reviews
                WHERE provider_id = $1
            ) AS agg
            WHERE id = $1
            "#,
        )
        .bind(provider_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(review)
    }

    async fn get_review_by_booking(&self, booking_id: Uuid) -> Result<Option<Review>, Error> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_reviews_for_provider(
        &self,
        provider_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE provider_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(provider_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
