pub mod donation_ledger;
