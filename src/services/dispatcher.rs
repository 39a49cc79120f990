// src/services/dispatcher.rs

// Despacho de efeitos colaterais (notificações in-app + WhatsApp). O
// contrato central: `dispatch` e `push_pdf` nunca falham — qualquer erro
// aqui vai para o log e a operação de negócio que os disparou permanece
// concluída.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NotificationRepository, SettingsRepository},
    models::{
        notifications::NotificationType,
        quotes::{QuoteStatus, QuoteWithItems},
        sales::{Sale, SaleWithItems},
        settings::{Company, Seller},
    },
    services::{
        document_service::{DocumentService, PrintableDocument},
        pricing,
        whatsapp::{resolve_config, ResolvedWhatsapp, SendReport, WhatsappClient},
    },
};

/// Mensagem de texto opcional que acompanha um evento: lista de
/// destinatários + corpo já formatado.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub to_numbers: Vec<String>,
    pub message: String,
}

/// Evento de notificação emitido pelas operações de negócio.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub company_id: Uuid,
    pub kind: NotificationType,
    pub title: String,
    pub body: Option<String>,
    pub link: Option<String>,
    pub icon: Option<String>,
    pub whatsapp: Option<OutboundMessage>,
}

impl NotificationEvent {
    pub fn quote_created(quote: &QuoteWithItems) -> Self {
        Self {
            company_id: quote.quote.company_id,
            kind: NotificationType::Quote,
            title: "Novo orçamento criado".to_string(),
            body: Some(format!(
                "{} — {}",
                quote.quote.customer_name,
                pricing::format_brl(quote.quote.total)
            )),
            link: Some("/orcamentos".to_string()),
            icon: Some("i-heroicons-document-text".to_string()),
            whatsapp: None,
        }
    }

    /// Disparado apenas quando o orçamento ENTRA em aprovado/rejeitado
    /// (ver `quote_service::approval_transition`).
    pub fn quote_status_changed(quote: &QuoteWithItems, status: QuoteStatus) -> Self {
        let label = status.label();
        let icon = if status == QuoteStatus::Approved {
            "i-heroicons-check-circle"
        } else {
            "i-heroicons-x-circle"
        };

        Self {
            company_id: quote.quote.company_id,
            kind: NotificationType::QuoteUpdated,
            title: format!("Orçamento {}", label),
            body: Some(format!(
                "{} — status atualizado para {}",
                quote.quote.customer_name, label
            )),
            link: Some("/orcamentos".to_string()),
            icon: Some(icon.to_string()),
            whatsapp: None,
        }
    }

    pub fn sale_created(sale: &SaleWithItems) -> Self {
        Self {
            company_id: sale.sale.company_id,
            kind: NotificationType::Sale,
            title: "Nova venda registrada".to_string(),
            body: Some(format!(
                "{} — {}",
                sale.sale.customer_name,
                pricing::format_brl(sale.sale.total)
            )),
            link: Some("/vendas".to_string()),
            icon: Some("i-heroicons-shopping-cart".to_string()),
            whatsapp: None,
        }
    }

    pub fn sale_billed(sale: &Sale) -> Self {
        Self {
            company_id: sale.company_id,
            kind: NotificationType::Transaction,
            title: "Venda Faturada — Receita".to_string(),
            body: Some(format!(
                "Venda #{:04} — {}",
                sale.display_id,
                pricing::format_brl(sale.total)
            )),
            link: Some("/transacoes".to_string()),
            icon: Some("i-heroicons-banknotes".to_string()),
            whatsapp: None,
        }
    }
}

/// Toggle que governa o envio de texto por tipo de evento: lembretes de
/// agenda têm chave própria, todo o resto usa a chave geral de alertas.
pub fn should_send(kind: NotificationType, config: &ResolvedWhatsapp) -> bool {
    match kind {
        NotificationType::Schedule => config.schedules_reminder_enabled,
        _ => config.alerts_enabled,
    }
}

/// Destinatários do PDF conforme os toggles da empresa, na ordem
/// vendedor -> cliente. Toggle ligado sem telefone correspondente gera
/// aviso no log e segue adiante.
pub fn collect_pdf_recipients(
    config: &ResolvedWhatsapp,
    seller_phone: Option<&str>,
    customer_phone: Option<&str>,
) -> Vec<String> {
    let mut recipients = Vec::new();

    if config.quote_pdf_to_seller {
        match seller_phone {
            Some(phone) => recipients.push(phone.to_string()),
            None => tracing::warn!("[wa push] envio ao vendedor ativo, mas sem telefone"),
        }
    }
    if config.quote_pdf_to_customer {
        match customer_phone {
            Some(phone) => recipients.push(phone.to_string()),
            None => tracing::warn!("[wa push] envio ao cliente ativo, mas sem telefone"),
        }
    }

    recipients
}

/// Orçamento ou venda como fonte de um PDF a enviar.
pub enum DocumentSource {
    Quote(QuoteWithItems),
    Sale(SaleWithItems),
}

impl DocumentSource {
    fn company_id(&self) -> Uuid {
        match self {
            DocumentSource::Quote(q) => q.quote.company_id,
            DocumentSource::Sale(s) => s.sale.company_id,
        }
    }

    fn seller_id(&self) -> Option<Uuid> {
        match self {
            DocumentSource::Quote(q) => q.quote.seller_id,
            DocumentSource::Sale(s) => s.sale.seller_id,
        }
    }

    fn customer_phone(&self) -> Option<&str> {
        match self {
            DocumentSource::Quote(q) => q.quote.customer_phone.as_deref(),
            DocumentSource::Sale(s) => s.sale.customer_phone.as_deref(),
        }
    }

    fn printable(&self, company: Company, seller: Option<Seller>) -> PrintableDocument {
        match self {
            DocumentSource::Quote(q) => PrintableDocument::from_quote(q, company, seller),
            DocumentSource::Sale(s) => PrintableDocument::from_sale(s, company, seller),
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    notifications: NotificationRepository,
    settings: SettingsRepository,
    documents: DocumentService,
    whatsapp: WhatsappClient,
}

impl Dispatcher {
    pub fn new(
        notifications: NotificationRepository,
        settings: SettingsRepository,
        documents: DocumentService,
        whatsapp: WhatsappClient,
    ) -> Self {
        Self {
            notifications,
            settings,
            documents,
            whatsapp,
        }
    }

    /// Processa um evento: grava a notificação in-app e, se houver payload
    /// de mensagem, tenta o envio por WhatsApp. Nunca retorna erro.
    pub async fn dispatch(&self, event: NotificationEvent) {
        if let Err(err) = self.try_dispatch(&event).await {
            tracing::error!("[dispatcher] falha ao processar '{}': {}", event.title, err);
        }
    }

    async fn try_dispatch(&self, event: &NotificationEvent) -> Result<(), AppError> {
        // A notificação in-app vem primeiro: ela não depende da configuração
        // de WhatsApp e deve existir mesmo que o envio falhe.
        self.notifications
            .create(
                event.company_id,
                event.kind,
                &event.title,
                event.body.as_deref(),
                event.link.as_deref(),
                event.icon.as_deref(),
            )
            .await?;

        let Some(outbound) = &event.whatsapp else {
            return Ok(());
        };
        if outbound.to_numbers.is_empty() {
            return Ok(());
        }

        let Some(config) = self.resolve(event.company_id).await? else {
            return Ok(());
        };
        if !should_send(event.kind, &config) {
            return Ok(());
        }
        let Some(connection) = config.connection() else {
            tracing::debug!("[dispatcher] sem conexão ativa, mensagem ignorada");
            return Ok(());
        };

        let report = self
            .whatsapp
            .send_message(&connection, &outbound.to_numbers, &outbound.message)
            .await;
        tracing::info!(
            "[dispatcher] '{}': {} enviado(s), {} falha(s)",
            event.title,
            report.sent.len(),
            report.failed.len()
        );

        Ok(())
    }

    /// Envio automático de PDF após criação de orçamento/venda. Silencioso
    /// quando a integração não está configurada ou os toggles estão
    /// desligados; erros vão para o log.
    pub async fn push_pdf(&self, source: DocumentSource) {
        if let Err(err) = self.try_push_pdf(&source).await {
            tracing::error!("[wa push] falha no envio automático de PDF: {}", err);
        }
    }

    async fn try_push_pdf(&self, source: &DocumentSource) -> Result<(), AppError> {
        let Some(config) = self.resolve(source.company_id()).await? else {
            return Ok(());
        };
        let Some(connection) = config.connection() else {
            return Ok(());
        };
        if !config.quote_pdf_to_seller && !config.quote_pdf_to_customer {
            return Ok(());
        }

        let Some((document, recipients)) = self.prepare(source, &config).await? else {
            return Ok(());
        };
        if recipients.is_empty() {
            return Ok(());
        }

        let pdf = self.documents.render(&document)?;
        let report = self
            .whatsapp
            .send_pdf(
                &connection,
                &recipients,
                &pdf,
                &document.file_name(),
                &document.caption(),
            )
            .await;
        tracing::info!(
            "[wa push] {}: {} enviado(s), {} falha(s)",
            document.file_name(),
            report.sent.len(),
            report.failed.len()
        );

        Ok(())
    }

    /// Envio explícito (endpoint send-pdf): aqui pré-condições ausentes
    /// viram erro para o cliente, em vez de silêncio.
    pub async fn send_pdf_now(&self, source: &DocumentSource) -> Result<SendReport, AppError> {
        let config = self
            .resolve(source.company_id())
            .await?
            .ok_or(AppError::WhatsappNotConfigured)?;
        let connection = config.connection().ok_or(AppError::WhatsappNotConfigured)?;

        let Some((document, recipients)) = self.prepare(source, &config).await? else {
            return Err(AppError::NotFound("Empresa"));
        };
        if recipients.is_empty() {
            return Err(AppError::PdfPushDisabled);
        }

        let pdf = self.documents.render(&document)?;
        Ok(self
            .whatsapp
            .send_pdf(
                &connection,
                &recipients,
                &pdf,
                &document.file_name(),
                &document.caption(),
            )
            .await)
    }

    /// Carrega empresa e vendedor e monta o documento + destinatários.
    /// `None` quando a empresa não existe mais.
    async fn prepare(
        &self,
        source: &DocumentSource,
        config: &ResolvedWhatsapp,
    ) -> Result<Option<(PrintableDocument, Vec<String>)>, AppError> {
        let Some(company) = self.settings.get_company(source.company_id()).await? else {
            tracing::warn!("[wa push] empresa {} não encontrada", source.company_id());
            return Ok(None);
        };

        let seller = match source.seller_id() {
            Some(id) => self.settings.get_seller(source.company_id(), id).await?,
            None => None,
        };

        let seller_phone = seller.as_ref().and_then(|s| s.phone.clone());
        let recipients =
            collect_pdf_recipients(config, seller_phone.as_deref(), source.customer_phone());

        Ok(Some((source.printable(company, seller), recipients)))
    }

    async fn resolve(&self, company_id: Uuid) -> Result<Option<ResolvedWhatsapp>, AppError> {
        let company = self.settings.get_whatsapp(company_id).await?;
        let global = self.settings.get_whatsapp_global().await?;
        Ok(resolve_config(company.as_ref(), global.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(alerts: bool, reminders: bool) -> ResolvedWhatsapp {
        ResolvedWhatsapp {
            api_url: "http://localhost:3025".to_string(),
            api_key: None,
            phone_number: Some("+5511900000000".to_string()),
            is_connected: true,
            alerts_enabled: alerts,
            alert_recipients: vec![],
            schedules_reminder_enabled: reminders,
            schedules_reminder_recipients: vec![],
            quote_pdf_to_seller: false,
            quote_pdf_to_customer: false,
        }
    }

    #[test]
    fn schedule_events_use_reminder_toggle() {
        assert!(should_send(NotificationType::Schedule, &config(false, true)));
        assert!(!should_send(NotificationType::Schedule, &config(true, false)));
    }

    #[test]
    fn other_events_use_alerts_toggle() {
        for kind in [
            NotificationType::Sale,
            NotificationType::Quote,
            NotificationType::QuoteUpdated,
            NotificationType::Transaction,
        ] {
            assert!(should_send(kind, &config(true, false)));
            assert!(!should_send(kind, &config(false, true)));
        }
    }

    #[test]
    fn recipients_follow_toggles_in_order() {
        let mut cfg = config(true, false);
        cfg.quote_pdf_to_seller = true;
        cfg.quote_pdf_to_customer = true;

        let recipients =
            collect_pdf_recipients(&cfg, Some("11911112222"), Some("11933334444"));
        assert_eq!(recipients, vec!["11911112222", "11933334444"]);
    }

    #[test]
    fn missing_phone_is_skipped_not_fatal() {
        let mut cfg = config(true, false);
        cfg.quote_pdf_to_seller = true;
        cfg.quote_pdf_to_customer = true;

        let recipients = collect_pdf_recipients(&cfg, None, Some("11933334444"));
        assert_eq!(recipients, vec!["11933334444"]);
    }

    #[test]
    fn disabled_toggles_yield_no_recipients() {
        let cfg = config(true, false);
        let recipients =
            collect_pdf_recipients(&cfg, Some("11911112222"), Some("11933334444"));
        assert!(recipients.is_empty());
    }
}
