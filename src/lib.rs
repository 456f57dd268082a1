//! # meeting-broker
//!
//! Access-token lifecycle management for a meeting-provider backend:
//! - Server-to-server (machine) credential exchange with in-memory caching
//! - User-delegated authorization-code flow with proactive, single-flighted
//!   refresh and explicit refresh-token rotation policy
//! - Keyed in-memory credential store (process lifetime, no persistence)
//! - Webhook endpoint-ownership validation via HMAC-SHA256
//! - Thin bearer-authenticated meetings API client
//!
//! ## Architecture
//!
//! The HTTP layer is an external collaborator: it asks a manager for "a valid
//! token" before calling the provider API, and forwards raw webhook bodies to
//! the verifier. Managers either return a cached record or perform a network
//! exchange, update the store, and return the new value.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meeting_broker::{
//!     BrokerConfig, DelegatedTokenManager, MachineTokenManager, MemoryTokenStore,
//!     WebhookVerifier,
//! };
//!
//! let config = BrokerConfig::from_env();
//! let machine = MachineTokenManager::new(config.clone())?;
//! let store = std::sync::Arc::new(MemoryTokenStore::new());
//! let delegated = DelegatedTokenManager::new(config.clone(), store)?;
//! let webhook = WebhookVerifier::new(config.webhook_secret().cloned());
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod meetings;
pub mod oauth;
pub mod token;
pub mod webhook;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use config::BrokerConfig;
pub use error::{Error, ErrorKind};
pub use meetings::{MeetingRequest, MeetingSettings, MeetingSettingsOverrides, MeetingsClient};
pub use token::{
    ConnectionStatus, DelegatedTokenManager, MachineTokenManager, MemoryTokenStore,
    RotationPolicy, TokenRecord, TokenStore, DEFAULT_SLOT,
};
pub use webhook::{Outcome, ValidationResponse, WebhookVerifier};
