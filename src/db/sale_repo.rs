// src/db/sale_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{Sale, SaleItem, SaleItemInput, SaleStatus},
};

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Option<Uuid>,
        seller_id: Option<Uuid>,
        quote_id: Option<Uuid>,
        customer_name: &str,
        customer_document: Option<&str>,
        customer_phone: Option<&str>,
        customer_address: Option<&str>,
        status: SaleStatus,
        date: Option<DateTime<Utc>>,
        delivery_date: Option<DateTime<Utc>>,
        subtotal: i64,
        discount: i64,
        total: i64,
        payment_method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                company_id, user_id, seller_id, quote_id,
                customer_name, customer_document, customer_phone, customer_address,
                status, date, delivery_date,
                subtotal, discount, total, payment_method, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, NOW()), $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(seller_id)
        .bind(quote_id)
        .bind(customer_name)
        .bind(customer_document)
        .bind(customer_phone)
        .bind(customer_address)
        .bind(status)
        .bind(date)
        .bind(delivery_date)
        .bind(subtotal)
        .bind(discount)
        .bind(total)
        .bind(payment_method)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(sale)
    }

    /// Busca por id sem filtro de tenant: o handler compara o `company_id`
    /// retornado com as empresas do usuário (404 vs 403 distintos).
    pub async fn get_by_id<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(sale_id)
            .fetch_optional(executor)
            .await?;

        Ok(sale)
    }

    /// Existe um orçamento com este id nesta empresa? Usado na checagem do
    /// vínculo opcional quote_id na criação da venda.
    pub async fn quote_exists<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        quote_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM quotes WHERE id = $1 AND company_id = $2")
                .bind(quote_id)
                .bind(company_id)
                .fetch_optional(executor)
                .await?;

        Ok(found.is_some())
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        status: Option<SaleStatus>,
    ) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE company_id = $1 AND ($2::sale_status IS NULL OR status = $2)
            ORDER BY date DESC
            "#,
        )
        .bind(company_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    pub async fn update<'e, E>(&self, executor: E, sale: &Sale) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales SET
                seller_id = $2,
                customer_name = $3,
                customer_document = $4,
                customer_phone = $5,
                customer_address = $6,
                status = $7,
                date = $8,
                delivery_date = $9,
                subtotal = $10,
                discount = $11,
                total = $12,
                payment_method = $13,
                notes = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(sale.id)
        .bind(sale.seller_id)
        .bind(&sale.customer_name)
        .bind(&sale.customer_document)
        .bind(&sale.customer_phone)
        .bind(&sale.customer_address)
        .bind(sale.status)
        .bind(sale.date)
        .bind(sale.delivery_date)
        .bind(sale.subtotal)
        .bind(sale.discount)
        .bind(sale.total)
        .bind(&sale.payment_method)
        .bind(&sale.notes)
        .fetch_one(executor)
        .await?;

        Ok(updated)
    }

    /// Escalada de status no faturamento: pending -> confirmed, gravando
    /// também o meio de pagamento efetivamente usado.
    pub async fn update_status_and_payment<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        status: SaleStatus,
        payment_method: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE sales SET status = $2, payment_method = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(sale_id)
        .bind(status)
        .bind(payment_method)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    // --- Itens (sempre substituídos em bloco, nunca alterados um a um) ---

    pub async fn delete_items<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
            .bind(sale_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        position: i32,
        item: &SaleItemInput,
        total_price: i64,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inserted = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (
                sale_id, position, product_id, product_name, description, unit,
                quantity, unit_price, total_price, fck, slump, stone_size
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(sale_id)
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

    pub async fn list_items<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = $1 ORDER BY position ASC",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }
}
