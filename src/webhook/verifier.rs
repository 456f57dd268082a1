//! Endpoint-ownership validation via HMAC-SHA256 over a provider-issued nonce.
//!
//! Operates on the raw, unparsed request body: a payload-authenticity
//! signature, if added later, would need the exact byte sequence, and parsing
//! elsewhere then re-serializing would invalidate it. Payload signatures are
//! not verified yet, only the validation handshake.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Event name of the provider's endpoint-ownership challenge.
const URL_VALIDATION_EVENT: &str = "endpoint.url_validation";

/// Parsed envelope of an inbound webhook request.
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    payload: Option<EventPayload>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(rename = "plainToken")]
    #[serde(default)]
    plain_token: Option<String>,
}

/// Response body proving endpoint ownership to the provider.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// The provider-issued nonce, echoed back.
    pub plain_token: String,
    /// Hex-encoded HMAC-SHA256 of the nonce keyed by the shared secret.
    pub encrypted_token: String,
}

/// Result of verifying an inbound webhook body.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// A validation handshake succeeded; reply 200 with the proof body.
    Accepted(ValidationResponse),
    /// A business event or an unreadable body; reply 200 with no body so the
    /// provider does not disable the endpoint over sporadic failures.
    /// Interpreting business events is the caller's responsibility.
    Acknowledged,
    /// A malformed validation handshake; reply with the given status.
    Rejected { status: u16, reason: String },
}

impl Outcome {
    /// HTTP status the caller should reply with.
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Accepted(_) | Outcome::Acknowledged => 200,
            Outcome::Rejected { status, .. } => *status,
        }
    }
}

/// Verifier for the provider's webhook validation handshake.
pub struct WebhookVerifier {
    secret: Option<SecretString>,
}

impl WebhookVerifier {
    /// Create a verifier with the out-of-band shared secret, if configured.
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    /// Verify a raw webhook body.
    ///
    /// Never fails: anything that is not a well-formed validation handshake
    /// is acknowledged, and only a handshake missing its token or lacking a
    /// configured secret is rejected.
    pub fn verify(&self, raw_body: &[u8]) -> Outcome {
        let envelope: EventEnvelope = match serde_json::from_slice(raw_body) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error = %err, "unparseable webhook body, acknowledging");
                return Outcome::Acknowledged;
            }
        };

        match envelope.event.as_deref() {
            Some(URL_VALIDATION_EVENT) => self.handshake(envelope),
            event => {
                debug!(event = event.unwrap_or("none"), "acknowledging webhook event");
                Outcome::Acknowledged
            }
        }
    }

    fn handshake(&self, envelope: EventEnvelope) -> Outcome {
        let plain_token = match envelope.payload.and_then(|payload| payload.plain_token) {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Outcome::Rejected {
                    status: 400,
                    reason: "validation event without plainToken".to_string(),
                }
            }
        };

        let secret = match &self.secret {
            Some(secret) if !secret.expose_secret().is_empty() => secret,
            _ => {
                warn!("validation handshake received but no webhook secret configured");
                return Outcome::Rejected {
                    status: 400,
                    reason: "webhook secret not configured".to_string(),
                };
            }
        };

        let mut mac = match HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) {
            Ok(mac) => mac,
            Err(err) => {
                warn!(error = %err, "HMAC key rejected, acknowledging");
                return Outcome::Acknowledged;
            }
        };
        mac.update(plain_token.as_bytes());
        let encrypted_token = hex::encode(mac.finalize().into_bytes());

        debug!("validation handshake answered");
        Outcome::Accepted(ValidationResponse {
            plain_token,
            encrypted_token,
        })
    }
}
