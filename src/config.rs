// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        FinanceRepository, NotificationRepository, QuoteRepository, SaleRepository,
        SettingsRepository,
    },
    services::{
        billing_service::BillingService, dispatcher::Dispatcher,
        document_service::DocumentService, quote_service::QuoteService,
        sale_service::SaleService, whatsapp::WhatsappClient,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,

    pub quote_service: QuoteService,
    pub sale_service: SaleService,
    pub billing_service: BillingService,
    pub dispatcher: Dispatcher,

    pub finance_repo: FinanceRepository,
    pub notification_repo: NotificationRepository,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let font_dir = env::var("PDF_FONT_DIR").unwrap_or_else(|_| "./fonts".to_string());

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let quote_repo = QuoteRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let quote_service = QuoteService::new(quote_repo);
        let sale_service = SaleService::new(sale_repo.clone(), finance_repo.clone());
        let billing_service = BillingService::new(sale_repo, finance_repo.clone());

        let dispatcher = Dispatcher::new(
            notification_repo.clone(),
            settings_repo.clone(),
            DocumentService::new(font_dir),
            WhatsappClient::new(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            quote_service,
            sale_service,
            billing_service,
            dispatcher,
            finance_repo,
            notification_repo,
            settings_repo,
        })
    }
}
