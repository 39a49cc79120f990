// src/db/notification_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::notifications::{Notification, NotificationType},
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        r#type: NotificationType,
        title: &str,
        body: Option<&str>,
        link: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (company_id, type, title, body, link, icon)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(r#type)
        .bind(title)
        .bind(body)
        .bind(link)
        .bind(icon)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE company_id = $1 AND ($2 = FALSE OR read_at IS NULL)
            ORDER BY created_at DESC
            LIMIT 100
            "#,
        )
        .bind(company_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn mark_read(
        &self,
        company_id: Uuid,
        notification_id: Uuid,
    ) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications SET read_at = NOW()
            WHERE id = $1 AND company_id = $2 AND read_at IS NULL
            RETURNING *
            "#,
        )
        .bind(notification_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Marca todas como lidas; retorna quantas foram afetadas.
    pub async fn mark_all_read(&self, company_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW() WHERE company_id = $1 AND read_at IS NULL",
        )
        .bind(company_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
