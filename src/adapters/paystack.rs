use {
    crate::config::GatewayConfig,
    crate::domain::{
        donation::GatewayReference,
        error::DonationError,
        gateway::{GatewayObservation, GatewayRedirect, InitializeRequest, PaymentGateway},
    },
    serde::Deserialize,
    std::{future::Future, pin::Pin},
};

/// Thin client for the Paystack transaction API. All calls carry the
/// configured bounded timeout; a timeout surfaces as
/// `DonationError::Gateway` with no ledger mutation.
pub struct PaystackClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct InitializeAnswer {
    status: bool,
    message: Option<String>,
    data: Option<InitializeData>,
}

#[derive(Deserialize)]
struct InitializeData {
    authorization_url: String,
    access_code: String,
    reference: String,
}

impl PaystackClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, DonationError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DonationError::Gateway(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    async fn initialize_inner(
        &self,
        request: InitializeRequest,
    ) -> Result<GatewayRedirect, DonationError> {
        let body = serde_json::json!({
            "email": request.email,
            "amount": request.amount.minor_units(),
            "currency": request.currency.as_str(),
            "callback_url": request.callback_url,
            "metadata": request.metadata,
        });

        let response = self
            .http
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DonationError::Gateway(format!("initialize: {e}")))?;

        let http_status = response.status();
        let answer: InitializeAnswer = response
            .json()
            .await
            .map_err(|e| DonationError::Gateway(format!("initialize response: {e}")))?;

        if !http_status.is_success() || !answer.status {
            let message = answer.message.unwrap_or_else(|| http_status.to_string());
            return Err(DonationError::Gateway(format!(
                "initialize declined: {message}"
            )));
        }

        let data = answer
            .data
            .ok_or_else(|| DonationError::Gateway("initialize answer missing data".into()))?;

        Ok(GatewayRedirect {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: GatewayReference::new(data.reference)?,
        })
    }

    async fn query_status_inner(
        &self,
        reference: &GatewayReference,
    ) -> Result<GatewayObservation, DonationError> {
        let response = self
            .http
            .get(format!(
                "{}/transaction/verify/{}",
                self.base_url,
                reference.as_str()
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| DonationError::Gateway(format!("verify: {e}")))?;

        let http_status = response.status();
        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DonationError::Gateway(format!("verify response: {e}")))?;

        let accepted = raw.get("status").and_then(|v| v.as_bool()).unwrap_or(false);
        if !http_status.is_success() || !accepted {
            let message = raw
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("verification rejected");
            return Err(DonationError::GatewayRejected(format!(
                "{message} (reference {reference})"
            )));
        }

        let status = raw
            .pointer("/data/status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DonationError::Gateway("verify answer missing data.status".into()))?
            .to_string();

        Ok(GatewayObservation {
            status,
            raw_payload: raw,
        })
    }
}

impl PaymentGateway for PaystackClient {
    fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayRedirect, DonationError>> + Send + '_>> {
        Box::pin(self.initialize_inner(request))
    }

    fn query_status(
        &self,
        reference: &GatewayReference,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayObservation, DonationError>> + Send + '_>> {
        let reference = reference.clone();
        Box::pin(async move { self.query_status_inner(&reference).await })
    }
}
