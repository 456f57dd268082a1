//! Inbound webhook handling: the endpoint-ownership validation handshake.

mod verifier;

pub use verifier::{Outcome, ValidationResponse, WebhookVerifier};
