pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;

use {
    crate::domain::{gateway::PaymentGateway, ledger::Ledger, notifier::Notifier},
    std::{sync::Arc, time::Duration},
};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn Notifier>,
    /// Keys the webhook HMAC; same secret that authenticates API calls.
    pub webhook_secret: Arc<str>,
    pub min_amount: i64,
    pub sweep_max_age: Duration,
    pub default_callback_url: Option<String>,
}
