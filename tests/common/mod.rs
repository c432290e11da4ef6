#![allow(dead_code)]

use donation_ledger::domain::donation::{DonationIntent, DonationStatus, GatewayReference};
use donation_ledger::domain::error::DonationError;
use donation_ledger::domain::gateway::{
    GatewayObservation, GatewayRedirect, InitializeRequest, PaymentGateway,
};
use donation_ledger::domain::ledger::Ledger;
use donation_ledger::domain::money::Currency;
use donation_ledger::domain::notifier::Notifier;
use donation_ledger::infra::memory::MemoryLedger;
use donation_ledger::services::intent::{self, CreateIntentParams};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub const MIN_AMOUNT: i64 = 100;

/// Counts settlement notifications. The engine spawns the notifier, so
/// assertions on the count go through `drain_notifications` first.
#[derive(Default)]
pub struct CountingNotifier {
    count: AtomicUsize,
    last_status: Mutex<Option<DonationStatus>>,
}

impl CountingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn last_status(&self) -> Option<DonationStatus> {
        *self.last_status.lock().unwrap()
    }
}

impl Notifier for CountingNotifier {
    fn donation_settled(
        &self,
        _intent: DonationIntent,
        status: DonationStatus,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.count.fetch_add(1, Ordering::SeqCst);
        *self.last_status.lock().unwrap() = Some(status);
        Box::pin(async {})
    }
}

/// Let spawned notifier tasks run before counting them.
pub async fn drain_notifications() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Scripted gateway: fixed reference on initialize, scripted status on
/// verify, and toggles for the failure modes worth exercising.
pub struct FakeGateway {
    reference: String,
    fail_init: AtomicBool,
    reject_verify: AtomicBool,
    verify_status: Mutex<String>,
}

impl FakeGateway {
    pub fn new(reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            fail_init: AtomicBool::new(false),
            reject_verify: AtomicBool::new(false),
            verify_status: Mutex::new("success".to_string()),
        }
    }

    pub fn fail_initialize(&self) {
        self.fail_init.store(true, Ordering::SeqCst);
    }

    pub fn reject_verify(&self) {
        self.reject_verify.store(true, Ordering::SeqCst);
    }

    pub fn set_verify_status(&self, status: &str) {
        *self.verify_status.lock().unwrap() = status.to_string();
    }
}

impl PaymentGateway for FakeGateway {
    fn initialize(
        &self,
        _request: InitializeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayRedirect, DonationError>> + Send + '_>> {
        Box::pin(async move {
            if self.fail_init.load(Ordering::SeqCst) {
                return Err(DonationError::Gateway("initialize timed out".into()));
            }
            Ok(GatewayRedirect {
                authorization_url: format!("https://checkout.test/{}", self.reference),
                access_code: "AC_test".to_string(),
                reference: GatewayReference::new(self.reference.clone()).unwrap(),
            })
        })
    }

    fn query_status(
        &self,
        reference: &GatewayReference,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayObservation, DonationError>> + Send + '_>> {
        let reference = reference.clone();
        Box::pin(async move {
            if self.reject_verify.load(Ordering::SeqCst) {
                return Err(DonationError::GatewayRejected(format!(
                    "unknown transaction {reference}"
                )));
            }
            let status = self.verify_status.lock().unwrap().clone();
            Ok(GatewayObservation {
                raw_payload: serde_json::json!({
                    "status": true,
                    "data": { "status": status, "reference": reference.as_str() },
                }),
                status,
            })
        })
    }
}

pub fn donation_params(amount: i64) -> CreateIntentParams {
    CreateIntentParams {
        donor_name: "Ada Obi".to_string(),
        donor_email: "ada@example.org".to_string(),
        donor_phone: Some("+2348012345678".to_string()),
        amount,
        currency: Currency::Ngn,
        donation_type: Default::default(),
        is_anonymous: false,
        message: Some("keep it up".to_string()),
        callback_url: None,
    }
}

/// Create a PENDING intent with a reference attached, the state every
/// confirmation-channel test starts from.
pub async fn pending_intent(
    ledger: &MemoryLedger,
    gateway: &FakeGateway,
    amount: i64,
) -> (DonationIntent, GatewayReference) {
    let (intent, redirect) = intent::create_intent(ledger, gateway, MIN_AMOUNT, donation_params(amount))
        .await
        .expect("intent creation failed");
    (intent, redirect.reference)
}

pub fn charge_success_body(reference: &str) -> Vec<u8> {
    serde_json::json!({
        "event": "charge.success",
        "data": { "reference": reference, "status": "success" },
    })
    .to_string()
    .into_bytes()
}

pub async fn status_of(ledger: &dyn Ledger, id: uuid::Uuid) -> DonationStatus {
    ledger
        .find(id)
        .await
        .expect("find failed")
        .expect("row missing")
        .status()
}
