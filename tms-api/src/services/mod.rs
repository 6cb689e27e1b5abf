//! Service Layer
//!
//! Ingestion logic shared by the HTTP routes. Routes only extract the tenant
//! and body; sequencing lives here.

mod transaction_service;

pub use transaction_service::*;
