// src/services/sale_service.rs

use sqlx::{Acquire, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, SaleRepository},
    models::sales::{
        Sale, SaleCreate, SaleItem, SaleItemInput, SaleStatus, SaleUpdate, SaleWithItems,
    },
    services::pricing,
};

/// Venda concluída é imutável, com uma única exceção: payload contendo
/// exatamente `{status: ...}`. Qualquer outro campo presente rejeita a
/// requisição inteira, nunca é ignorado em silêncio.
pub fn ensure_editable(status: SaleStatus, payload: &SaleUpdate) -> Result<(), AppError> {
    if status == SaleStatus::Completed && !payload.is_status_only() {
        return Err(AppError::CompletedSaleLocked);
    }
    Ok(())
}

/// Exclusão barrada em duas situações, nesta ordem: venda concluída e venda
/// com faturamento registrado.
pub fn ensure_deletable(status: SaleStatus, has_billing: bool) -> Result<(), AppError> {
    if status == SaleStatus::Completed {
        return Err(AppError::CannotDeleteCompletedSale);
    }
    if has_billing {
        return Err(AppError::SaleHasBilling);
    }
    Ok(())
}

#[derive(Clone)]
pub struct SaleService {
    repo: SaleRepository,
    finance: FinanceRepository,
}

impl SaleService {
    pub fn new(repo: SaleRepository, finance: FinanceRepository) -> Self {
        Self { repo, finance }
    }

    /// Cria a venda com seus itens numa transação única. O vínculo opcional
    /// com orçamento é validado contra a mesma empresa; totais são sempre
    /// recalculados no servidor e o total nunca fica negativo.
    pub async fn create<'a, A>(
        &self,
        acquirer: A,
        company_id: Uuid,
        user_id: Option<Uuid>,
        payload: &SaleCreate,
    ) -> Result<SaleWithItems, AppError>
    where
        A: Acquire<'a, Database = Postgres>,
    {
        let lines: Vec<_> = payload
            .items
            .iter()
            .map(|item| (item.quantity, item.unit_price))
            .collect();
        let totals = pricing::compute_totals(&lines, payload.discount, true);

        let mut tx = acquirer.begin().await?;

        if let Some(quote_id) = payload.quote_id {
            if !self.repo.quote_exists(&mut *tx, company_id, quote_id).await? {
                return Err(AppError::NotFound("Orçamento"));
            }
        }

        let sale = self
            .repo
            .create(
                &mut *tx,
                company_id,
                user_id,
                payload.seller_id,
                payload.quote_id,
                &payload.customer_name,
                payload.customer_document.as_deref(),
                payload.customer_phone.as_deref(),
                payload.customer_address.as_deref(),
                payload.status.unwrap_or(SaleStatus::Pending),
                payload.date,
                payload.delivery_date,
                totals.subtotal,
                payload.discount,
                totals.total,
                payload.payment_method.as_deref(),
                payload.notes.as_deref(),
            )
            .await?;

        let items = self.insert_items(&mut tx, sale.id, &payload.items).await?;

        tx.commit().await?;

        Ok(SaleWithItems { sale, items })
    }

    pub async fn get<'a, A>(
        &self,
        acquirer: A,
        sale_id: Uuid,
    ) -> Result<Option<SaleWithItems>, AppError>
    where
        A: Acquire<'a, Database = Postgres>,
    {
        let mut conn = acquirer.acquire().await?;

        let Some(sale) = self.repo.get_by_id(&mut *conn, sale_id).await? else {
            return Ok(None);
        };
        let items = self.repo.list_items(&mut *conn, sale_id).await?;

        Ok(Some(SaleWithItems { sale, items }))
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        status: Option<SaleStatus>,
    ) -> Result<Vec<Sale>, AppError> {
        self.repo.list(company_id, status).await
    }

    /// Atualização parcial com as mesmas regras de itens do orçamento
    /// (substituição em bloco + recálculo), mais a trava de venda concluída.
    pub async fn update<'a, A>(
        &self,
        acquirer: A,
        sale: Sale,
        payload: &SaleUpdate,
    ) -> Result<SaleWithItems, AppError>
    where
        A: Acquire<'a, Database = Postgres>,
    {
        ensure_editable(sale.status, payload)?;

        let mut tx = acquirer.begin().await?;

        let (new_items, subtotal) = match &payload.items {
            Some(inputs) => {
                self.repo.delete_items(&mut *tx, sale.id).await?;
                let items = self.insert_items(&mut tx, sale.id, inputs).await?;
                let subtotal = items.iter().map(|i| i.total_price).sum();
                (Some(items), subtotal)
            }
            None => (None, sale.subtotal),
        };

        let mut merged = sale;
        if let Some(seller_id) = payload.seller_id {
            merged.seller_id = seller_id;
        }
        if let Some(name) = &payload.customer_name {
            merged.customer_name = name.clone();
        }
        if let Some(document) = &payload.customer_document {
            merged.customer_document = document.clone();
        }
        if let Some(phone) = &payload.customer_phone {
            merged.customer_phone = phone.clone();
        }
        if let Some(address) = &payload.customer_address {
            merged.customer_address = address.clone();
        }
        if let Some(status) = payload.status {
            merged.status = status;
        }
        if let Some(date) = payload.date {
            merged.date = date;
        }
        if let Some(delivery_date) = payload.delivery_date {
            merged.delivery_date = delivery_date;
        }
        if let Some(payment_method) = &payload.payment_method {
            merged.payment_method = payment_method.clone();
        }
        if let Some(notes) = &payload.notes {
            merged.notes = notes.clone();
        }

        merged.subtotal = subtotal;
        merged.discount = payload.discount.unwrap_or(merged.discount);
        merged.total = pricing::apply_discount(subtotal, merged.discount, true);

        let updated = self.repo.update(&mut *tx, &merged).await?;

        let items = match new_items {
            Some(items) => items,
            None => self.repo.list_items(&mut *tx, updated.id).await?,
        };

        tx.commit().await?;

        Ok(SaleWithItems { sale: updated, items })
    }

    /// Exclusão com as guardas de ciclo de vida. Os itens caem junto via
    /// ON DELETE CASCADE; transações vinculadas bloqueiam a exclusão.
    pub async fn delete<'a, A>(&self, acquirer: A, sale: &Sale) -> Result<(), AppError>
    where
        A: Acquire<'a, Database = Postgres>,
    {
        let mut conn = acquirer.acquire().await?;

        let has_billing = self.finance.exists_for_sale(&mut *conn, sale.id).await?;
        ensure_deletable(sale.status, has_billing)?;

        self.repo.delete(&mut *conn, sale.id).await
    }

    async fn insert_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sale_id: Uuid,
        inputs: &[SaleItemInput],
    ) -> Result<Vec<SaleItem>, AppError> {
        let mut items = Vec::with_capacity(inputs.len());
        for (position, input) in inputs.iter().enumerate() {
            let total_price = pricing::line_total(input.quantity, input.unit_price);
            let item = self
                .repo
                .insert_item(&mut **tx, sale_id, position as i32, input, total_price)
                .await?;
            items.push(item);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_only(status: SaleStatus) -> SaleUpdate {
        SaleUpdate {
            status: Some(status),
            ..SaleUpdate::default()
        }
    }

    #[test]
    fn completed_sale_accepts_status_only() {
        assert!(ensure_editable(SaleStatus::Completed, &status_only(SaleStatus::InProgress)).is_ok());
    }

    #[test]
    fn completed_sale_rejects_any_other_field() {
        let mut payload = status_only(SaleStatus::InProgress);
        payload.discount = Some(1000);

        let err = ensure_editable(SaleStatus::Completed, &payload).unwrap_err();
        assert!(matches!(err, AppError::CompletedSaleLocked));

        // Mesmo sem status, um campo qualquer basta para rejeitar
        let payload = SaleUpdate {
            notes: Some(Some("obs".to_string())),
            ..SaleUpdate::default()
        };
        assert!(ensure_editable(SaleStatus::Completed, &payload).is_err());
    }

    #[test]
    fn open_sale_accepts_full_update() {
        let mut payload = status_only(SaleStatus::Confirmed);
        payload.customer_name = Some("Outra Construtora".to_string());
        payload.discount = Some(500);

        assert!(ensure_editable(SaleStatus::Pending, &payload).is_ok());
        assert!(ensure_editable(SaleStatus::InProgress, &payload).is_ok());
    }

    #[test]
    fn completed_sale_cannot_be_deleted() {
        let err = ensure_deletable(SaleStatus::Completed, false).unwrap_err();
        assert!(matches!(err, AppError::CannotDeleteCompletedSale));

        // A trava de concluída vem antes da trava de faturamento
        let err = ensure_deletable(SaleStatus::Completed, true).unwrap_err();
        assert!(matches!(err, AppError::CannotDeleteCompletedSale));
    }

    #[test]
    fn billed_sale_cannot_be_deleted() {
        let err = ensure_deletable(SaleStatus::Confirmed, true).unwrap_err();
        assert!(matches!(err, AppError::SaleHasBilling));
    }

    #[test]
    fn open_unbilled_sale_can_be_deleted() {
        assert!(ensure_deletable(SaleStatus::Pending, false).is_ok());
        assert!(ensure_deletable(SaleStatus::Cancelled, false).is_ok());
    }
}
