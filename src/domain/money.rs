use {
    super::error::DonationError,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Donation amount in minor currency units (kobo, cents). Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoneyAmount(i64);

impl MoneyAmount {
    pub fn new(minor_units: i64) -> Result<Self, DonationError> {
        if minor_units <= 0 {
            return Err(DonationError::Validation(format!(
                "amount must be positive, got: {minor_units}"
            )));
        }
        Ok(Self(minor_units))
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currencies the gateway settles in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ngn,
    Usd,
    Ghs,
    Zar,
    Kes,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ngn => "NGN",
            Self::Usd => "USD",
            Self::Ghs => "GHS",
            Self::Zar => "ZAR",
            Self::Kes => "KES",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Ngn
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Currency {
    type Error = DonationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "NGN" => Ok(Self::Ngn),
            "USD" => Ok(Self::Usd),
            "GHS" => Ok(Self::Ghs),
            "ZAR" => Ok(Self::Zar),
            "KES" => Ok(Self::Kes),
            other => Err(DonationError::Validation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
