use {
    crate::domain::{
        donation::{
            DonationIntent, DonationIntentRow, DonationStatus, DonationType, GatewayReference,
            NewDonationIntent, TerminalStatus,
        },
        error::DonationError,
        ledger::Ledger,
        money::{Currency, MoneyAmount},
    },
    chrono::{DateTime, Utc},
    sqlx::PgPool,
    std::{future::Future, pin::Pin},
    uuid::Uuid,
};

/// Postgres-backed donation ledger. The `settle` conditional update relies
/// on row-level atomicity of a single UPDATE statement — no transaction or
/// advisory lock is needed for correctness.
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StoredRow {
    id: Uuid,
    donor_name: String,
    donor_email: String,
    donor_phone: Option<String>,
    amount: i64,
    currency: String,
    donation_type: String,
    is_anonymous: bool,
    message: Option<String>,
    gateway_reference: Option<String>,
    status: String,
    gateway_response: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoredRow> for DonationIntent {
    type Error = DonationError;

    fn try_from(row: StoredRow) -> Result<Self, Self::Error> {
        Ok(DonationIntent::from_row(DonationIntentRow {
            id: row.id,
            donor_name: row.donor_name,
            donor_email: row.donor_email,
            donor_phone: row.donor_phone,
            amount: MoneyAmount::new(row.amount)?,
            currency: Currency::try_from(row.currency.as_str())?,
            donation_type: DonationType::try_from(row.donation_type.as_str())?,
            is_anonymous: row.is_anonymous,
            message: row.message,
            gateway_reference: row.gateway_reference.map(GatewayReference::new).transpose()?,
            status: DonationStatus::try_from(row.status.as_str())?,
            gateway_response: row.gateway_response,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

const SELECT_COLUMNS: &str = "SELECT id, donor_name, donor_email, donor_phone, amount, currency, \
     donation_type, is_anonymous, message, gateway_reference, status, \
     gateway_response, created_at, updated_at FROM donations";

impl PgLedger {
    async fn insert_inner(&self, intent: &NewDonationIntent) -> Result<(), DonationError> {
        sqlx::query(
            r#"
            INSERT INTO donations
                (id, donor_name, donor_email, donor_phone, amount, currency,
                 donation_type, is_anonymous, message, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(intent.id())
        .bind(intent.donor_name())
        .bind(intent.donor_email())
        .bind(intent.donor_phone())
        .bind(intent.amount().minor_units())
        .bind(intent.currency().as_str())
        .bind(intent.donation_type().as_str())
        .bind(intent.is_anonymous())
        .bind(intent.message())
        .bind(DonationStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn attach_reference_inner(
        &self,
        id: Uuid,
        reference: &GatewayReference,
    ) -> Result<bool, DonationError> {
        let result = sqlx::query(
            "UPDATE donations SET gateway_reference = $2, updated_at = now() \
             WHERE id = $1 AND gateway_reference IS NULL",
        )
        .bind(id)
        .bind(reference.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_inner(&self, id: Uuid) -> Result<Option<DonationIntent>, DonationError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        let row: Option<StoredRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(DonationIntent::try_from).transpose()
    }

    async fn find_by_reference_inner(
        &self,
        reference: &GatewayReference,
    ) -> Result<Option<DonationIntent>, DonationError> {
        let sql = format!("{SELECT_COLUMNS} WHERE gateway_reference = $1");
        let row: Option<StoredRow> = sqlx::query_as(&sql)
            .bind(reference.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(DonationIntent::try_from).transpose()
    }

    async fn settle_inner(
        &self,
        id: Uuid,
        status: TerminalStatus,
        raw_payload: &serde_json::Value,
    ) -> Result<bool, DonationError> {
        // The whole concurrency story: status and payload move together in
        // one statement, guarded on the row still being PENDING. Whichever
        // confirmation channel lands first wins; everyone else affects
        // zero rows.
        let result = sqlx::query(
            "UPDATE donations SET status = $2, gateway_response = $3, updated_at = now() \
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(status.as_status().as_str())
        .bind(raw_payload)
        .bind(DonationStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn expired_pending_inner(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, DonationError> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM donations WHERE status = $1 AND created_at < $2",
        )
        .bind(DonationStatus::Pending.as_str())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}

impl Ledger for PgLedger {
    fn insert(
        &self,
        intent: &NewDonationIntent,
    ) -> Pin<Box<dyn Future<Output = Result<(), DonationError>> + Send + '_>> {
        let intent = intent.clone();
        Box::pin(async move { self.insert_inner(&intent).await })
    }

    fn attach_reference(
        &self,
        id: Uuid,
        reference: &GatewayReference,
    ) -> Pin<Box<dyn Future<Output = Result<bool, DonationError>> + Send + '_>> {
        let reference = reference.clone();
        Box::pin(async move { self.attach_reference_inner(id, &reference).await })
    }

    fn find(
        &self,
        id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Option<DonationIntent>, DonationError>> + Send + '_>>
    {
        Box::pin(self.find_inner(id))
    }

    fn find_by_reference(
        &self,
        reference: &GatewayReference,
    ) -> Pin<Box<dyn Future<Output = Result<Option<DonationIntent>, DonationError>> + Send + '_>>
    {
        let reference = reference.clone();
        Box::pin(async move { self.find_by_reference_inner(&reference).await })
    }

    fn settle(
        &self,
        id: Uuid,
        status: TerminalStatus,
        raw_payload: &serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<bool, DonationError>> + Send + '_>> {
        let raw_payload = raw_payload.clone();
        Box::pin(async move { self.settle_inner(id, status, &raw_payload).await })
    }

    fn expired_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Uuid>, DonationError>> + Send + '_>> {
        Box::pin(self.expired_pending_inner(cutoff))
    }
}
