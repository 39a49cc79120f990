// src/db/quote_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::quotes::{Quote, QuoteItem, QuoteItemInput, QuoteStatus},
};

#[derive(Clone)]
pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Option<Uuid>,
        seller_id: Option<Uuid>,
        customer_name: &str,
        customer_document: Option<&str>,
        customer_phone: Option<&str>,
        customer_address: Option<&str>,
        status: QuoteStatus,
        valid_until: Option<chrono::DateTime<chrono::Utc>>,
        subtotal: i64,
        discount: i64,
        total: i64,
        notes: Option<&str>,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (
                company_id, user_id, seller_id,
                customer_name, customer_document, customer_phone, customer_address,
                status, valid_until, subtotal, discount, total, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(seller_id)
        .bind(customer_name)
        .bind(customer_document)
        .bind(customer_phone)
        .bind(customer_address)
        .bind(status)
        .bind(valid_until)
        .bind(subtotal)
        .bind(discount)
        .bind(total)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(quote)
    }

    /// Busca por id sem filtro de tenant: o handler compara o `company_id`
    /// retornado com as empresas do usuário (404 vs 403 distintos).
    pub async fn get_by_id<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quote = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1")
            .bind(quote_id)
            .fetch_optional(executor)
            .await?;

        Ok(quote)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        status: Option<QuoteStatus>,
    ) -> Result<Vec<Quote>, AppError> {
        let quotes = sqlx::query_as::<_, Quote>(
            r#"
            SELECT * FROM quotes
            WHERE company_id = $1 AND ($2::quote_status IS NULL OR status = $2)
            ORDER BY date DESC
            "#,
        )
        .bind(company_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotes)
    }

    pub async fn update<'e, E>(&self, executor: E, quote: &Quote) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes SET
                seller_id = $2,
                customer_name = $3,
                customer_document = $4,
                customer_phone = $5,
                customer_address = $6,
                status = $7,
                valid_until = $8,
                subtotal = $9,
                discount = $10,
                total = $11,
                notes = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(quote.id)
        .bind(quote.seller_id)
        .bind(&quote.customer_name)
        .bind(&quote.customer_document)
        .bind(&quote.customer_phone)
        .bind(&quote.customer_address)
        .bind(quote.status)
        .bind(quote.valid_until)
        .bind(quote.subtotal)
        .bind(quote.discount)
        .bind(quote.total)
        .bind(&quote.notes)
        .fetch_one(executor)
        .await?;

        Ok(updated)
    }

    pub async fn delete<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(quote_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    // --- Itens (sempre substituídos em bloco, nunca alterados um a um) ---

    pub async fn delete_items<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM quote_items WHERE quote_id = $1")
            .bind(quote_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        position: i32,
        item: &QuoteItemInput,
        total_price: i64,
    ) -> Result<QuoteItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inserted = sqlx::query_as::<_, QuoteItem>(
            r#"
            INSERT INTO quote_items (
                quote_id, position, product_id, product_name, description, unit,
                quantity, unit_price, total_price, fck, slump, stone_size
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(quote_id)
        .bind(position)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(&item.description)
        .bind(&item.unit)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(total_price)
        .bind(item.fck)
        .bind(item.slump)
        .bind(&item.stone_size)
        .fetch_one(executor)
        .await?;

        Ok(inserted)
    }

    pub async fn list_items<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Vec<QuoteItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, QuoteItem>(
            "SELECT * FROM quote_items WHERE quote_id = $1 ORDER BY position ASC",
        )
        .bind(quote_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }
}
