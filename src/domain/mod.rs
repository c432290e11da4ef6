pub mod donation;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod money;
pub mod notifier;
