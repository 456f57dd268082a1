//! OAuth wire protocol: grant types and the token-endpoint client.

mod client;

pub use client::{GrantType, OAuthClient, TokenResponse};
