pub mod notifications;
pub mod quotes;
pub mod sales;
pub mod settings;
pub mod transactions;
