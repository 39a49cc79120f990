pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod quote_repo;
pub use quote_repo::QuoteRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
