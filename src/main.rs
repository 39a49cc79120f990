//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let quote_routes = Router::new()
        .route(
            "/",
            post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes),
        )
        .route(
            "/{id}",
            get(handlers::quotes::get_quote)
                .put(handlers::quotes::update_quote)
                .delete(handlers::quotes::delete_quote),
        )
        .route("/{id}/send-pdf", post(handlers::quotes::send_quote_pdf));

    let sale_routes = Router::new()
        .route(
            "/",
            post(handlers::sales::create_sale).get(handlers::sales::list_sales),
        )
        .route(
            "/{id}",
            get(handlers::sales::get_sale)
                .put(handlers::sales::update_sale)
                .delete(handlers::sales::delete_sale),
        )
        .route("/{id}/bill", post(handlers::sales::bill_sale))
        .route("/{id}/send-pdf", post(handlers::sales::send_sale_pdf));

    let transaction_routes = Router::new()
        .route(
            "/",
            post(handlers::transactions::create_transaction)
                .get(handlers::transactions::list_transactions),
        )
        .route(
            "/{id}",
            axum::routing::delete(handlers::transactions::delete_transaction),
        );

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route(
            "/read-all",
            put(handlers::notifications::mark_all_notifications_read),
        )
        .route(
            "/{id}/read",
            put(handlers::notifications::mark_notification_read),
        );

    let settings_routes = Router::new().route(
        "/whatsapp",
        get(handlers::settings::get_whatsapp_settings)
            .put(handlers::settings::update_whatsapp_settings),
    );

    // Todas as rotas de negócio exigem token; o guard de empresa fica nos
    // handlers (comparação com as claims).
    let api_routes = Router::new()
        .nest("/quotes", quote_routes)
        .nest("/sales", sale_routes)
        .nest("/transactions", transaction_routes)
        .nest("/notifications", notification_routes)
        .nest("/settings", settings_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
