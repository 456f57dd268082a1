//! Credential record types.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::Serialize;

/// Buffer subtracted from a token's advertised lifetime so "valid" is decided
/// conservatively, absorbing clock skew and in-flight latency.
pub const SAFETY_MARGIN_SECS: i64 = 60;

/// A cached bearer credential with its expiry metadata.
#[derive(Clone, Debug)]
pub struct TokenRecord {
    /// Opaque bearer string presented to the provider API.
    pub access_token: SecretString,
    /// Present only for delegated credentials; exchanged for a new access
    /// token without human interaction.
    pub refresh_token: Option<SecretString>,
    /// Space-delimited granted capabilities. Advisory, not enforced locally.
    pub scope: Option<String>,
    /// Seconds of validity advertised by the provider at issuance.
    pub expires_in: i64,
    /// When the record was issued or last refreshed.
    pub obtained_at: DateTime<Utc>,
}

impl TokenRecord {
    /// When the access token stops being usable according to the provider.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.obtained_at + Duration::seconds(self.expires_in)
    }

    /// A record is valid iff `now < expires_at - safety_margin`.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at() - Duration::seconds(SAFETY_MARGIN_SECS)
    }
}

/// Token-status query result exposed to the frontend.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    pub has_refresh_token: bool,
    pub scope: Option<String>,
}

impl ConnectionStatus {
    /// Status for a slot with no credential record.
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            has_refresh_token: false,
            scope: None,
        }
    }
}

impl From<&TokenRecord> for ConnectionStatus {
    fn from(record: &TokenRecord) -> Self {
        Self {
            connected: true,
            has_refresh_token: record.refresh_token.is_some(),
            scope: record.scope.clone(),
        }
    }
}
