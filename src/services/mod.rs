pub mod billing_service;
pub mod dispatcher;
pub mod document_service;
pub mod pricing;
pub mod quote_service;
pub mod sale_service;
pub mod whatsapp;
