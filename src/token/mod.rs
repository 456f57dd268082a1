//! Credential lifecycle: records, the keyed store, and the two managers.

mod delegated;
mod machine;
mod record;
mod store;

pub use delegated::{DelegatedTokenManager, RotationPolicy};
pub use machine::MachineTokenManager;
pub use record::{ConnectionStatus, TokenRecord, SAFETY_MARGIN_SECS};
pub use store::{MemoryTokenStore, TokenStore, DEFAULT_SLOT};
