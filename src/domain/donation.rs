use {
    super::error::DonationError,
    super::money::{Currency, MoneyAmount},
    chrono::{DateTime, Utc},
    derive_more::Display,
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

/// Opaque transaction reference assigned by the payment gateway.
/// Assigned at most once per intent, never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayReference(String);

impl GatewayReference {
    pub fn new(reference: impl Into<String>) -> Result<Self, DonationError> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(DonationError::Validation(
                "gateway reference must not be empty".into(),
            ));
        }
        Ok(Self(reference))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The only legal transitions are Pending → terminal. Terminal states
    /// never transition, including to themselves.
    pub fn can_transition_to(&self, next: &DonationStatus) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for DonationStatus {
    type Error = DonationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DonationError::Validation(format!(
                "unknown donation status: {other}"
            ))),
        }
    }
}

/// One of the three terminal values an intent can settle into. A separate
/// type so the reconciliation engine cannot be asked to "settle to PENDING".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Success,
    Failed,
    Cancelled,
}

impl TerminalStatus {
    pub fn as_status(&self) -> DonationStatus {
        match self {
            Self::Success => DonationStatus::Success,
            Self::Failed => DonationStatus::Failed,
            Self::Cancelled => DonationStatus::Cancelled,
        }
    }

    /// Maps the gateway's status vocabulary to a terminal value.
    ///
    /// `None` means the charge is still in flight on the gateway side —
    /// there is nothing definitive to record yet, so the intent stays
    /// PENDING. Everything else that isn't "success" is a definitive
    /// failure.
    pub fn from_gateway(observed: &str) -> Option<Self> {
        match observed {
            "success" => Some(Self::Success),
            "pending" | "ongoing" | "queued" | "processing" => None,
            _ => Some(Self::Failed),
        }
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_status())
    }
}

/// MONTHLY and ANNUAL are display labels on the record; nothing in this
/// service schedules recurring charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationType {
    OneTime,
    Monthly,
    Annual,
}

impl DonationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "ONE_TIME",
            Self::Monthly => "MONTHLY",
            Self::Annual => "ANNUAL",
        }
    }
}

impl Default for DonationType {
    fn default() -> Self {
        Self::OneTime
    }
}

impl TryFrom<&str> for DonationType {
    type Error = DonationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "ONE_TIME" => Ok(Self::OneTime),
            "MONTHLY" => Ok(Self::Monthly),
            "ANNUAL" => Ok(Self::Annual),
            other => Err(DonationError::Validation(format!(
                "unknown donation type: {other}"
            ))),
        }
    }
}

/// Full ledger row (for reads). Donor fields, amount and currency are
/// write-once; only `status`, `gateway_reference` and `gateway_response`
/// change after creation, and only through the `Ledger` trait.
#[derive(Debug, Clone, Serialize)]
pub struct DonationIntent {
    id: Uuid,
    donor_name: String,
    donor_email: String,
    donor_phone: Option<String>,
    amount: MoneyAmount,
    currency: Currency,
    donation_type: DonationType,
    is_anonymous: bool,
    message: Option<String>,
    gateway_reference: Option<GatewayReference>,
    status: DonationStatus,
    gateway_response: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub struct DonationIntentRow {
    pub id: Uuid,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: MoneyAmount,
    pub currency: Currency,
    pub donation_type: DonationType,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub gateway_reference: Option<GatewayReference>,
    pub status: DonationStatus,
    pub gateway_response: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationIntent {
    pub fn from_row(row: DonationIntentRow) -> Self {
        Self {
            id: row.id,
            donor_name: row.donor_name,
            donor_email: row.donor_email,
            donor_phone: row.donor_phone,
            amount: row.amount,
            currency: row.currency,
            donation_type: row.donation_type,
            is_anonymous: row.is_anonymous,
            message: row.message,
            gateway_reference: row.gateway_reference,
            status: row.status,
            gateway_response: row.gateway_response,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn donor_name(&self) -> &str {
        &self.donor_name
    }

    pub fn donor_email(&self) -> &str {
        &self.donor_email
    }

    pub fn donor_phone(&self) -> Option<&str> {
        self.donor_phone.as_deref()
    }

    pub fn amount(&self) -> MoneyAmount {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn donation_type(&self) -> DonationType {
        self.donation_type
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn gateway_reference(&self) -> Option<&GatewayReference> {
        self.gateway_reference.as_ref()
    }

    pub fn status(&self) -> DonationStatus {
        self.status
    }

    pub fn gateway_response(&self) -> Option<&serde_json::Value> {
        self.gateway_response.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// For INSERT — id generated in Rust via Uuid::now_v7(). Always PENDING
/// and reference-less at creation; the gateway reference is attached in a
/// separate conditional write once the gateway has answered.
#[derive(Debug, Clone)]
pub struct NewDonationIntent {
    id: Uuid,
    donor_name: String,
    donor_email: String,
    donor_phone: Option<String>,
    amount: MoneyAmount,
    currency: Currency,
    donation_type: DonationType,
    is_anonymous: bool,
    message: Option<String>,
}

pub struct NewDonationIntentParams {
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: MoneyAmount,
    pub currency: Currency,
    pub donation_type: DonationType,
    pub is_anonymous: bool,
    pub message: Option<String>,
}

impl NewDonationIntent {
    pub fn new(params: NewDonationIntentParams) -> Result<Self, DonationError> {
        if params.donor_name.trim().is_empty() {
            return Err(DonationError::Validation("donor name is required".into()));
        }
        validate_email(&params.donor_email)?;
        Ok(Self {
            id: Uuid::now_v7(),
            donor_name: params.donor_name,
            donor_email: params.donor_email,
            donor_phone: params.donor_phone,
            amount: params.amount,
            currency: params.currency,
            donation_type: params.donation_type,
            is_anonymous: params.is_anonymous,
            message: params.message,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn donor_name(&self) -> &str {
        &self.donor_name
    }

    pub fn donor_email(&self) -> &str {
        &self.donor_email
    }

    pub fn donor_phone(&self) -> Option<&str> {
        self.donor_phone.as_deref()
    }

    pub fn amount(&self) -> MoneyAmount {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn donation_type(&self) -> DonationType {
        self.donation_type
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Shape check only. Deliverability is the mail provider's problem.
fn validate_email(email: &str) -> Result<(), DonationError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(DonationError::Validation(format!(
            "malformed donor email: {email}"
        )));
    }
    Ok(())
}
