// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Quotes ---
        handlers::quotes::list_quotes,
        handlers::quotes::create_quote,
        handlers::quotes::get_quote,
        handlers::quotes::update_quote,
        handlers::quotes::delete_quote,
        handlers::quotes::send_quote_pdf,

        // --- Sales ---
        handlers::sales::list_sales,
        handlers::sales::create_sale,
        handlers::sales::get_sale,
        handlers::sales::update_sale,
        handlers::sales::delete_sale,
        handlers::sales::bill_sale,
        handlers::sales::send_sale_pdf,

        // --- Transactions ---
        handlers::transactions::list_transactions,
        handlers::transactions::create_transaction,
        handlers::transactions::delete_transaction,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification_read,
        handlers::notifications::mark_all_notifications_read,

        // --- Settings ---
        handlers::settings::get_whatsapp_settings,
        handlers::settings::update_whatsapp_settings,
    ),
    components(
        schemas(
            // --- Quotes ---
            models::quotes::QuoteStatus,
            models::quotes::Quote,
            models::quotes::QuoteItem,
            models::quotes::QuoteWithItems,
            models::quotes::QuoteItemInput,
            models::quotes::QuoteCreate,
            models::quotes::QuoteUpdate,

            // --- Sales ---
            models::sales::SaleStatus,
            models::sales::Sale,
            models::sales::SaleItem,
            models::sales::SaleWithItems,
            models::sales::SaleItemInput,
            models::sales::SaleCreate,
            models::sales::SaleUpdate,
            handlers::sales::BillSalePayload,

            // --- Finance ---
            models::finance::TransactionType,
            models::finance::TransactionStatus,
            models::finance::Transaction,
            models::finance::TransactionCreate,

            // --- Notifications ---
            models::notifications::NotificationType,
            models::notifications::Notification,

            // --- Settings ---
            models::settings::WhatsappSettings,
            models::settings::WhatsappSettingsUpdate,
            models::settings::Company,
            models::settings::Seller,
        )
    ),
    tags(
        (name = "Quotes", description = "Orçamentos e seus itens"),
        (name = "Sales", description = "Vendas, faturamento e envio de pedido"),
        (name = "Transactions", description = "Livro financeiro (receitas e despesas)"),
        (name = "Notifications", description = "Notificações in-app"),
        (name = "Settings", description = "Integração de WhatsApp por empresa")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
