use {
    crate::domain::{
        donation::{DonationIntent, DonationType, NewDonationIntent, NewDonationIntentParams},
        error::DonationError,
        gateway::{GatewayRedirect, InitializeRequest, PaymentGateway},
        ledger::Ledger,
        money::{Currency, MoneyAmount},
    },
};

pub struct CreateIntentParams {
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: i64,
    pub currency: Currency,
    pub donation_type: DonationType,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub callback_url: Option<String>,
}

/// Create a donation intent and obtain the hosted-checkout redirect.
///
/// The PENDING row is persisted before the gateway is called, so a gateway
/// failure or timeout leaves a reference-less PENDING row behind. That row
/// needs no special cleanup: the expiry sweeper cancels it like any other
/// stale PENDING intent.
pub async fn create_intent(
    ledger: &dyn Ledger,
    gateway: &dyn PaymentGateway,
    min_amount: i64,
    params: CreateIntentParams,
) -> Result<(DonationIntent, GatewayRedirect), DonationError> {
    let amount = MoneyAmount::new(params.amount)?;
    if amount.minor_units() < min_amount {
        return Err(DonationError::Validation(format!(
            "amount {} is below the minimum of {min_amount} minor units",
            amount.minor_units()
        )));
    }

    let new_intent = NewDonationIntent::new(NewDonationIntentParams {
        donor_name: params.donor_name,
        donor_email: params.donor_email,
        donor_phone: params.donor_phone,
        amount,
        currency: params.currency,
        donation_type: params.donation_type,
        is_anonymous: params.is_anonymous,
        message: params.message,
    })?;

    ledger.insert(&new_intent).await?;
    tracing::info!(
        donation_id = %new_intent.id(),
        amount = %amount,
        currency = %params.currency,
        "donation intent persisted"
    );

    let redirect = gateway
        .initialize(InitializeRequest {
            email: new_intent.donor_email().to_string(),
            amount,
            currency: params.currency,
            callback_url: params.callback_url,
            metadata: serde_json::json!({
                "donation_id": new_intent.id(),
                "donation_type": new_intent.donation_type().as_str(),
            }),
        })
        .await
        .inspect_err(|e| {
            tracing::warn!(
                donation_id = %new_intent.id(),
                error = %e,
                "gateway initialize failed, intent left PENDING for the sweeper"
            );
        })?;

    let attached = ledger
        .attach_reference(new_intent.id(), &redirect.reference)
        .await?;
    if !attached {
        // A reference is attached exactly once; hitting this means two
        // initializations raced for one intent id.
        return Err(DonationError::Internal(format!(
            "donation {} already has a gateway reference",
            new_intent.id()
        )));
    }

    let intent = ledger.find(new_intent.id()).await?.ok_or_else(|| {
        DonationError::Internal(format!("donation {} missing after insert", new_intent.id()))
    })?;

    tracing::info!(
        donation_id = %intent.id(),
        reference = %redirect.reference,
        "gateway reference attached"
    );

    Ok((intent, redirect))
}
