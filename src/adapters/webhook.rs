use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{
            donation::{GatewayReference, TerminalStatus},
            error::DonationError,
            ledger::Ledger,
            notifier::Notifier,
        },
        services::reconcile::{ReconcileOutcome, TerminalObservation, reconcile},
    },
    axum::{Json, extract::State, http::HeaderMap},
    hmac::{Hmac, Mac},
    serde::Deserialize,
    sha2::Sha512,
    std::sync::Arc,
    subtle::ConstantTimeEq,
};

type HmacSha512 = Hmac<Sha512>;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Recompute the HMAC-SHA512 of the raw body and compare against the
/// hex-encoded header value in constant time. Callers must not touch the
/// ledger before this returns Ok — a signature failure performs no lookup,
/// so it cannot be used as an existence oracle.
pub fn verify_signature(
    secret: &str,
    raw_body: &[u8],
    signature_hex: &str,
) -> Result<(), DonationError> {
    let provided = hex::decode(signature_hex)
        .map_err(|_| DonationError::Signature("signature is not valid hex".into()))?;

    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|e| DonationError::Signature(format!("bad hmac key: {e}")))?;
    mac.update(raw_body);
    let expected = mac.finalize().into_bytes();

    if bool::from(expected.as_slice().ct_eq(&provided)) {
        Ok(())
    } else {
        Err(DonationError::Signature("signature mismatch".into()))
    }
}

/// The gateway's event payload, narrowed to what reconciliation needs
/// before it crosses into the engine. Only charge success is actionable;
/// every other event type is acknowledged and ignored.
#[derive(Debug)]
pub enum WebhookEvent {
    ChargeSucceeded { reference: GatewayReference },
    Other { event: String },
}

#[derive(Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default)]
    data: RawEventData,
}

#[derive(Deserialize, Default)]
struct RawEventData {
    reference: Option<String>,
}

pub fn parse_event(raw_body: &[u8]) -> Result<WebhookEvent, DonationError> {
    let raw: RawEvent = serde_json::from_slice(raw_body)?;
    if raw.event != "charge.success" {
        return Ok(WebhookEvent::Other { event: raw.event });
    }
    let reference = raw.data.reference.ok_or_else(|| {
        DonationError::Validation("charge.success event missing data.reference".into())
    })?;
    Ok(WebhookEvent::ChargeSucceeded {
        reference: GatewayReference::new(reference)?,
    })
}

#[derive(Debug)]
pub enum WebhookOutcome {
    /// Non-actionable event type, or a payload we could not make sense of.
    Ignored,
    /// No intent carries this reference; the gateway cannot fix that by
    /// retrying, so this still acks with 200.
    UnknownReference,
    Reconciled(ReconcileOutcome),
}

/// Everything past the signature check, transport-free. Duplicate and
/// out-of-order deliveries are safe here with no extra bookkeeping: the
/// conditional write inside `reconcile` is the whole mechanism.
pub async fn process_event(
    ledger: &dyn Ledger,
    notifier: Arc<dyn Notifier>,
    raw_body: &[u8],
) -> Result<WebhookOutcome, DonationError> {
    let event = match parse_event(raw_body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable webhook payload, acking anyway");
            return Ok(WebhookOutcome::Ignored);
        }
    };

    let reference = match event {
        WebhookEvent::ChargeSucceeded { reference } => reference,
        WebhookEvent::Other { event } => {
            tracing::info!(%event, "non-actionable event type");
            return Ok(WebhookOutcome::Ignored);
        }
    };

    let Some(intent) = ledger.find_by_reference(&reference).await? else {
        tracing::warn!(%reference, "webhook for unknown reference");
        return Ok(WebhookOutcome::UnknownReference);
    };

    let raw_payload: serde_json::Value = serde_json::from_slice(raw_body)?;
    let outcome = reconcile(
        ledger,
        notifier,
        &intent,
        TerminalObservation {
            status: TerminalStatus::Success,
            raw_payload,
        },
    )
    .await?;

    Ok(WebhookOutcome::Reconciled(outcome))
}

#[tracing::instrument(name = "webhook", skip_all)]
pub async fn paystack_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| DonationError::Signature(format!("missing {SIGNATURE_HEADER} header")))?;

    verify_signature(&state.webhook_secret, body.as_bytes(), signature)?;

    match process_event(state.ledger.as_ref(), state.notifier.clone(), body.as_bytes()).await? {
        WebhookOutcome::Ignored => Ok(Json(serde_json::json!({ "status": "ignored" }))),
        WebhookOutcome::UnknownReference => {
            Ok(Json(serde_json::json!({ "status": "unknown_reference" })))
        }
        WebhookOutcome::Reconciled(outcome) => {
            let status = if outcome.applied {
                "applied"
            } else {
                "already_terminal"
            };
            tracing::info!(final_status = %outcome.final_status, status, "webhook reconciled");
            Ok(Json(serde_json::json!({ "status": status })))
        }
    }
}
