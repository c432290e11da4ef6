use {
    super::donation::GatewayReference,
    super::error::DonationError,
    super::money::{Currency, MoneyAmount},
    std::{future::Future, pin::Pin},
};

/// What the caller needs to send the donor to the gateway's hosted checkout.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GatewayRedirect {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: GatewayReference,
}

/// A charge initialization request, built by the intent service.
#[derive(Debug, Clone)]
pub struct InitializeRequest {
    pub email: String,
    pub amount: MoneyAmount,
    pub currency: Currency,
    pub callback_url: Option<String>,
    pub metadata: serde_json::Value,
}

/// The gateway's answer to a status query: its own status vocabulary plus
/// the raw payload, kept verbatim for the audit column.
#[derive(Debug, Clone)]
pub struct GatewayObservation {
    pub status: String,
    pub raw_payload: serde_json::Value,
}

pub trait PaymentGateway: Send + Sync {
    /// Initialize a charge and obtain the hosted-checkout redirect.
    /// A timeout here must surface as `DonationError::Gateway` — the
    /// intent stays PENDING and reference-less.
    fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayRedirect, DonationError>> + Send + '_>>;

    /// Query the authoritative status of a charge by reference.
    fn query_status(
        &self,
        reference: &GatewayReference,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayObservation, DonationError>> + Send + '_>>;
}
