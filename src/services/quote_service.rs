// src/services/quote_service.rs

use sqlx::{Acquire, Executor, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::QuoteRepository,
    models::quotes::{
        Quote, QuoteCreate, QuoteItem, QuoteItemInput, QuoteStatus, QuoteUpdate, QuoteWithItems,
    },
    services::pricing,
};

/// Detecta a transição que dispara notificação: o orçamento acabou de
/// ENTRAR em aprovado/rejeitado. Reenviar o mesmo status não conta, e
/// transições para os demais status são silenciosas.
pub fn approval_transition(old: QuoteStatus, new: Option<QuoteStatus>) -> Option<QuoteStatus> {
    match new {
        Some(status @ (QuoteStatus::Approved | QuoteStatus::Rejected)) if status != old => {
            Some(status)
        }
        _ => None,
    }
}

#[derive(Clone)]
pub struct QuoteService {
    repo: QuoteRepository,
}

impl QuoteService {
    pub fn new(repo: QuoteRepository) -> Self {
        Self { repo }
    }

    /// Cria o orçamento com seus itens numa transação única. Totais são
    /// sempre recalculados no servidor; valores vindos do cliente são
    /// ignorados.
    pub async fn create<'a, A>(
        &self,
        acquirer: A,
        company_id: Uuid,
        user_id: Option<Uuid>,
        payload: &QuoteCreate,
    ) -> Result<QuoteWithItems, AppError>
    where
        A: Acquire<'a, Database = Postgres>,
    {
        let lines = price_lines(&payload.items);
        // Orçamento não tem piso: desconto maior que o subtotal fica negativo
        let totals = pricing::compute_totals(&lines, payload.discount, false);

        let mut tx = acquirer.begin().await?;

        let quote = self
            .repo
            .create(
                &mut *tx,
                company_id,
                user_id,
                payload.seller_id,
                &payload.customer_name,
                payload.customer_document.as_deref(),
                payload.customer_phone.as_deref(),
                payload.customer_address.as_deref(),
                payload.status.unwrap_or(QuoteStatus::Draft),
                payload.valid_until,
                totals.subtotal,
                payload.discount,
                totals.total,
                payload.notes.as_deref(),
            )
            .await?;

        let items = self.insert_items(&mut tx, quote.id, &payload.items).await?;

        tx.commit().await?;

        Ok(QuoteWithItems { quote, items })
    }

    pub async fn get<'a, A>(
        &self,
        acquirer: A,
        quote_id: Uuid,
    ) -> Result<Option<QuoteWithItems>, AppError>
    where
        A: Acquire<'a, Database = Postgres>,
    {
        let mut conn = acquirer.acquire().await?;

        let Some(quote) = self.repo.get_by_id(&mut *conn, quote_id).await? else {
            return Ok(None);
        };
        let items = self.repo.list_items(&mut *conn, quote_id).await?;

        Ok(Some(QuoteWithItems { quote, items }))
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        status: Option<QuoteStatus>,
    ) -> Result<Vec<Quote>, AppError> {
        self.repo.list(company_id, status).await
    }

    /// Atualização parcial. Itens, quando enviados, substituem o conjunto
    /// inteiro e o subtotal é recalculado; caso contrário o subtotal gravado
    /// é mantido. Retorna também a transição de aprovação, se houve.
    pub async fn update<'a, A>(
        &self,
        acquirer: A,
        quote: Quote,
        payload: &QuoteUpdate,
    ) -> Result<(QuoteWithItems, Option<QuoteStatus>), AppError>
    where
        A: Acquire<'a, Database = Postgres>,
    {
        let old_status = quote.status;
        let mut tx = acquirer.begin().await?;

        let (new_items, subtotal) = match &payload.items {
            Some(inputs) => {
                self.repo.delete_items(&mut *tx, quote.id).await?;
                let items = self.insert_items(&mut tx, quote.id, inputs).await?;
                let subtotal = items.iter().map(|i| i.total_price).sum();
                (Some(items), subtotal)
            }
            None => (None, quote.subtotal),
        };

        let mut merged = quote;
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
        if let Some(valid_until) = payload.valid_until {
            merged.valid_until = valid_until;
        }
        if let Some(notes) = &payload.notes {
            merged.notes = notes.clone();
        }

        merged.subtotal = subtotal;
        merged.discount = payload.discount.unwrap_or(merged.discount);
        merged.total = pricing::apply_discount(subtotal, merged.discount, false);

        let updated = self.repo.update(&mut *tx, &merged).await?;

        let items = match new_items {
            Some(items) => items,
            None => self.repo.list_items(&mut *tx, updated.id).await?,
        };

        tx.commit().await?;

        let approval = approval_transition(old_status, payload.status);
        Ok((QuoteWithItems { quote: updated, items }, approval))
    }

    /// Exclusão direta; os itens caem junto via ON DELETE CASCADE.
    pub async fn delete<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete(executor, quote_id).await
    }

    async fn insert_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        quote_id: Uuid,
        inputs: &[QuoteItemInput],
    ) -> Result<Vec<QuoteItem>, AppError> {
        let mut items = Vec::with_capacity(inputs.len());
        for (position, input) in inputs.iter().enumerate() {
            let total_price = pricing::line_total(input.quantity, input.unit_price);
            let item = self
                .repo
                .insert_item(&mut **tx, quote_id, position as i32, input, total_price)
                .await?;
            items.push(item);
        }
        Ok(items)
    }
}

fn price_lines(items: &[QuoteItemInput]) -> Vec<(rust_decimal::Decimal, i64)> {
    items
        .iter()
        .map(|item| (item.quantity, item.unit_price))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_into_approved_fires() {
        assert_eq!(
            approval_transition(QuoteStatus::Sent, Some(QuoteStatus::Approved)),
            Some(QuoteStatus::Approved)
        );
        assert_eq!(
            approval_transition(QuoteStatus::Draft, Some(QuoteStatus::Rejected)),
            Some(QuoteStatus::Rejected)
        );
    }

    #[test]
    fn resending_same_status_is_silent() {
        assert_eq!(
            approval_transition(QuoteStatus::Approved, Some(QuoteStatus::Approved)),
            None
        );
        assert_eq!(
            approval_transition(QuoteStatus::Rejected, Some(QuoteStatus::Rejected)),
            None
        );
    }

    #[test]
    fn other_transitions_are_silent() {
        assert_eq!(approval_transition(QuoteStatus::Draft, Some(QuoteStatus::Sent)), None);
        assert_eq!(
            approval_transition(QuoteStatus::Approved, Some(QuoteStatus::Expired)),
            None
        );
        assert_eq!(approval_transition(QuoteStatus::Sent, None), None);
    }
}
