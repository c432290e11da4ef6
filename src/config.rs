use {crate::domain::error::DonationError, std::env, std::time::Duration};

/// Everything the gateway client and webhook receiver need, resolved once
/// at startup. No component reads the environment after this.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Secret key: authenticates API calls and keys the webhook HMAC.
    pub secret_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub gateway: GatewayConfig,
    /// Smallest accepted donation, in minor currency units.
    pub min_amount: i64,
    /// PENDING intents older than this are swept to CANCELLED.
    pub sweep_max_age: Duration,
    pub sweep_interval: Duration,
    /// Default post-payment redirect when the caller supplies none.
    pub callback_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, DonationError> {
        let database_url = require("DATABASE_URL")?;
        let secret_key = require("PAYSTACK_SECRET_KEY")?;
        let base_url = env::var("PAYSTACK_BASE_URL")
            .unwrap_or_else(|_| "https://api.paystack.co".to_string());

        Ok(Self {
            database_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            gateway: GatewayConfig {
                secret_key,
                base_url,
                timeout: Duration::from_secs(parse_or("GATEWAY_TIMEOUT_SECS", 10)?),
            },
            min_amount: parse_or("DONATION_MIN_AMOUNT", 100)?,
            sweep_max_age: Duration::from_secs(parse_or("SWEEP_MAX_AGE_SECS", 3600)?),
            sweep_interval: Duration::from_secs(parse_or("SWEEP_INTERVAL_SECS", 300)?),
            callback_url: env::var("CALLBACK_URL").ok(),
        })
    }
}

fn require(key: &str) -> Result<String, DonationError> {
    env::var(key).map_err(|_| DonationError::Validation(format!("{key} must be set")))
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, DonationError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| DonationError::Validation(format!("{key} is not a valid number: {raw}"))),
        Err(_) => Ok(default),
    }
}
