// src/db/finance_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{Transaction, TransactionStatus, TransactionType},
};

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pré-check amigável do faturamento. Quem fecha a corrida de verdade é o
    /// índice único em `transactions.sale_id` (ver `create`).
    pub async fn exists_for_sale<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM transactions WHERE sale_id = $1")
                .bind(sale_id)
                .fetch_optional(executor)
                .await?;

        Ok(found.is_some())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Option<Uuid>,
        sale_id: Option<Uuid>,
        description: &str,
        amount: i64,
        r#type: TransactionType,
        category: Option<&str>,
        status: TransactionStatus,
        date: Option<DateTime<Utc>>,
        due_date: Option<DateTime<Utc>>,
        payment_method: Option<&str>,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                company_id, user_id, sale_id, description, amount, type,
                category, status, date, due_date, payment_method
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, NOW()), $10, $11)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(sale_id)
        .bind(description)
        .bind(amount)
        .bind(r#type)
        .bind(category)
        .bind(status)
        .bind(date)
        .bind(due_date)
        .bind(payment_method)
        .fetch_one(executor)
        .await;

        match result {
            Ok(transaction) => Ok(transaction),
            // Duas requisições de faturamento concorrentes podem passar pelo
            // pré-check; o índice único barra a segunda aqui e o erro vira o
            // mesmo 409 do caminho rápido.
            Err(err) if is_sale_unique_violation(&err) => Err(AppError::SaleAlreadyBilled),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list(&self, company_id: Uuid) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE company_id = $1 ORDER BY date DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    pub async fn get_by_id(&self, transaction_id: Uuid) -> Result<Option<Transaction>, AppError> {
        let transaction =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
                .bind(transaction_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(transaction)
    }

    pub async fn delete(&self, transaction_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(transaction_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Violação do índice `transactions_sale_id_unique` (código 23505 do Postgres).
fn is_sale_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err
                    .constraint()
                    .is_some_and(|c| c == "transactions_sale_id_unique")
        }
        _ => false,
    }
}
