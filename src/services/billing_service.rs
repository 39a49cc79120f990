// src/services/billing_service.rs

// Faturamento de vendas: converte uma venda num lançamento de receita,
// no máximo uma vez por venda. O pré-check devolve o 409 amigável; quem
// garante a unicidade sob concorrência é o índice parcial em
// `transactions.sale_id` (ver FinanceRepository::create).

use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, SaleRepository},
    models::{
        finance::{Transaction, TransactionStatus, TransactionType},
        sales::{Sale, SaleStatus},
    },
};

/// Venda cancelada não gera receita: o faturamento é rejeitado antes de
/// qualquer escrita.
pub fn ensure_billable(status: SaleStatus) -> Result<(), AppError> {
    if status == SaleStatus::Cancelled {
        return Err(AppError::CannotBillCancelledSale);
    }
    Ok(())
}

/// Faturar confirma a venda que ainda estava pendente; os demais status
/// são preservados.
pub fn next_status(status: SaleStatus) -> SaleStatus {
    match status {
        SaleStatus::Pending => SaleStatus::Confirmed,
        other => other,
    }
}

/// Meio de pagamento efetivo: o da requisição, senão o gravado na venda,
/// senão o marcador "Não definido".
pub fn payment_method_label(requested: Option<&str>, stored: Option<&str>) -> String {
    requested
        .filter(|m| !m.is_empty())
        .or_else(|| stored.filter(|m| !m.is_empty()))
        .unwrap_or("Não definido")
        .to_string()
}

/// Descrição do lançamento: "Faturamento Venda #0017 — Construtora X".
pub fn billing_description(display_id: i32, customer_name: &str) -> String {
    format!("Faturamento Venda #{:04} — {}", display_id, customer_name)
}

#[derive(Clone)]
pub struct BillingService {
    sales: SaleRepository,
    finance: FinanceRepository,
}

impl BillingService {
    pub fn new(sales: SaleRepository, finance: FinanceRepository) -> Self {
        Self { sales, finance }
    }

    /// Fatura a venda: cria o lançamento de receita e escala o status numa
    /// transação única. Retorna o lançamento e o status final da venda.
    pub async fn bill_sale<'a, A>(
        &self,
        acquirer: A,
        sale: &Sale,
        user_id: Option<Uuid>,
        payment_method: Option<&str>,
        status: Option<TransactionStatus>,
    ) -> Result<(Transaction, SaleStatus), AppError>
    where
        A: Acquire<'a, Database = Postgres>,
    {
        ensure_billable(sale.status)?;

        let mut tx = acquirer.begin().await?;

        if self.finance.exists_for_sale(&mut *tx, sale.id).await? {
            return Err(AppError::SaleAlreadyBilled);
        }

        let method = payment_method_label(payment_method, sale.payment_method.as_deref());
        let description = billing_description(sale.display_id, &sale.customer_name);

        let transaction = self
            .finance
            .create(
                &mut *tx,
                sale.company_id,
                user_id,
                Some(sale.id),
                &description,
                sale.total,
                TransactionType::Income,
                Some("Vendas"),
                status.unwrap_or(TransactionStatus::Paid),
                None,
                None,
                Some(&method),
            )
            .await?;

        let new_status = next_status(sale.status);
        self.sales
            .update_status_and_payment(&mut *tx, sale.id, new_status, &method)
            .await?;

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            transaction_id = %transaction.id,
            "venda faturada"
        );

        Ok((transaction, new_status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_sale_cannot_be_billed() {
        let err = ensure_billable(SaleStatus::Cancelled).unwrap_err();
        assert!(matches!(err, AppError::CannotBillCancelledSale));
    }

    #[test]
    fn every_other_status_can_be_billed() {
        for status in [
            SaleStatus::Pending,
            SaleStatus::Confirmed,
            SaleStatus::InProgress,
            SaleStatus::Completed,
        ] {
            assert!(ensure_billable(status).is_ok());
        }
    }

    #[test]
    fn billing_confirms_pending_sale() {
        assert_eq!(next_status(SaleStatus::Pending), SaleStatus::Confirmed);
    }

    #[test]
    fn billing_preserves_other_statuses() {
        assert_eq!(next_status(SaleStatus::Confirmed), SaleStatus::Confirmed);
        assert_eq!(next_status(SaleStatus::InProgress), SaleStatus::InProgress);
        assert_eq!(next_status(SaleStatus::Completed), SaleStatus::Completed);
    }

    #[test]
    fn payment_method_prefers_request_then_sale() {
        assert_eq!(payment_method_label(Some("Pix"), Some("Boleto")), "Pix");
        assert_eq!(payment_method_label(None, Some("Boleto")), "Boleto");
        assert_eq!(payment_method_label(None, None), "Não definido");
        // String vazia conta como ausente
        assert_eq!(payment_method_label(Some(""), Some("Boleto")), "Boleto");
    }

    #[test]
    fn description_pads_display_id() {
        assert_eq!(
            billing_description(17, "Construtora Horizonte LTDA"),
            "Faturamento Venda #0017 — Construtora Horizonte LTDA"
        );
        assert_eq!(billing_description(12345, "X"), "Faturamento Venda #12345 — X");
    }
}
