use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{
            donation::{DonationType, GatewayReference},
            money::Currency,
        },
        services::{intent, sweeper, verify},
    },
    axum::{Json, extract::State, http::StatusCode},
    serde::Deserialize,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationBody {
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: i64,
    pub currency: Option<String>,
    #[serde(rename = "type")]
    pub donation_type: Option<String>,
    pub message: Option<String>,
    pub is_anonymous: Option<bool>,
    pub callback_url: Option<String>,
}

pub async fn create_donation_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateDonationBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let currency = match body.currency.as_deref() {
        Some(code) => Currency::try_from(code)?,
        None => Currency::default(),
    };
    let donation_type = match body.donation_type.as_deref() {
        Some(label) => DonationType::try_from(label)?,
        None => DonationType::default(),
    };
    let callback_url = body.callback_url.or_else(|| state.default_callback_url.clone());

    let (donation, redirect) = intent::create_intent(
        state.ledger.as_ref(),
        state.gateway.as_ref(),
        state.min_amount,
        intent::CreateIntentParams {
            donor_name: body.donor_name,
            donor_email: body.donor_email,
            donor_phone: body.donor_phone,
            amount: body.amount,
            currency,
            donation_type,
            is_anonymous: body.is_anonymous.unwrap_or(false),
            message: body.message,
            callback_url,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "donation": {
                "id": donation.id(),
                "amount": donation.amount().minor_units(),
                "currency": donation.currency().as_str(),
                "type": donation.donation_type().as_str(),
                "donorName": donation.donor_name(),
                "donorEmail": donation.donor_email(),
            },
            "payment": {
                "authorizationUrl": redirect.authorization_url,
                "accessCode": redirect.access_code,
                "reference": redirect.reference.as_str(),
            },
        })),
    ))
}

#[derive(Deserialize)]
pub struct VerifyBody {
    pub reference: String,
}

pub async fn verify_donation_handler(
    State(state): State<AppState>,
    Json(body): Json<VerifyBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reference = GatewayReference::new(body.reference)?;
    let result = verify::verify(
        state.ledger.as_ref(),
        state.gateway.as_ref(),
        state.notifier.clone(),
        &reference,
    )
    .await?;

    Ok(Json(serde_json::json!({
        "donation": {
            "id": result.intent.id(),
            "status": result.outcome.final_status.as_str(),
            "amount": result.intent.amount().minor_units(),
            "reference": reference.as_str(),
        },
        "payment": result.gateway_payload,
    })))
}

pub async fn cleanup_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cleaned = sweeper::sweep(
        state.ledger.as_ref(),
        state.notifier.clone(),
        state.sweep_max_age,
    )
    .await?;

    Ok(Json(serde_json::json!({ "cleanedCount": cleaned })))
}
