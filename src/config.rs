//! Environment-provided configuration for the broker.
//!
//! Values are read once at construction. Required values are checked at time
//! of use by the managers, which fail with a config error naming every
//! missing variable rather than panicking at startup.

use std::env;

use secrecy::SecretString;

/// Default base URL for the provider's OAuth endpoints
/// (`/oauth/authorize`, `/oauth/token`).
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://zoom.us";

/// Default base URL for the provider's REST API
/// (`/v2/users/me/meetings`).
pub const DEFAULT_API_BASE_URL: &str = "https://api.zoom.us";

/// Account identifier for the server-to-server flow.
pub const ENV_ACCOUNT_ID: &str = "ZOOM_ACCOUNT_ID";
/// Client identifier for the server-to-server flow.
pub const ENV_CLIENT_ID: &str = "ZOOM_CLIENT_ID";
/// Client secret for the server-to-server flow.
pub const ENV_CLIENT_SECRET: &str = "ZOOM_CLIENT_SECRET";
/// Client identifier for the user-delegated flow.
pub const ENV_OAUTH_CLIENT_ID: &str = "ZOOM_OAUTH_CLIENT_ID";
/// Client secret for the user-delegated flow.
pub const ENV_OAUTH_CLIENT_SECRET: &str = "ZOOM_OAUTH_CLIENT_SECRET";
/// Redirect URL registered for the user-delegated flow.
pub const ENV_OAUTH_REDIRECT_URL: &str = "ZOOM_OAUTH_REDIRECT_URL";
/// Shared secret for the webhook validation handshake.
pub const ENV_WEBHOOK_SECRET: &str = "ZOOM_WEBHOOK_SECRET";
/// Override for the OAuth base URL. Point at a mock server in tests.
pub const ENV_OAUTH_BASE_URL: &str = "ZOOM_OAUTH_BASE_URL";
/// Override for the API base URL. Point at a mock server in tests.
pub const ENV_API_BASE_URL: &str = "ZOOM_API_BASE_URL";

/// Broker configuration.
///
/// All credential values are optional here; each manager validates the subset
/// it needs when first used.
#[derive(Clone, Debug, Default)]
pub struct BrokerConfig {
    oauth_base_url: Option<String>,
    api_base_url: Option<String>,
    account_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    oauth_client_id: Option<String>,
    oauth_client_secret: Option<SecretString>,
    oauth_redirect_url: Option<String>,
    webhook_secret: Option<SecretString>,
}

impl BrokerConfig {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            oauth_base_url: env_var(ENV_OAUTH_BASE_URL),
            api_base_url: env_var(ENV_API_BASE_URL),
            account_id: env_var(ENV_ACCOUNT_ID),
            client_id: env_var(ENV_CLIENT_ID),
            client_secret: env_var(ENV_CLIENT_SECRET).map(SecretString::from),
            oauth_client_id: env_var(ENV_OAUTH_CLIENT_ID),
            oauth_client_secret: env_var(ENV_OAUTH_CLIENT_SECRET).map(SecretString::from),
            oauth_redirect_url: env_var(ENV_OAUTH_REDIRECT_URL),
            webhook_secret: env_var(ENV_WEBHOOK_SECRET).map(SecretString::from),
        }
    }

    /// Returns the OAuth base URL.
    pub fn oauth_base_url(&self) -> &str {
        self.oauth_base_url
            .as_deref()
            .unwrap_or(DEFAULT_OAUTH_BASE_URL)
    }

    /// Returns the REST API base URL.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Returns the server-to-server account identifier, if configured.
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Returns the server-to-server client identifier, if configured.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Returns the server-to-server client secret, if configured.
    pub fn client_secret(&self) -> Option<&SecretString> {
        self.client_secret.as_ref()
    }

    /// Returns the delegated-flow client identifier, if configured.
    pub fn oauth_client_id(&self) -> Option<&str> {
        self.oauth_client_id.as_deref()
    }

    /// Returns the delegated-flow client secret, if configured.
    pub fn oauth_client_secret(&self) -> Option<&SecretString> {
        self.oauth_client_secret.as_ref()
    }

    /// Returns the delegated-flow redirect URL, if configured.
    pub fn oauth_redirect_url(&self) -> Option<&str> {
        self.oauth_redirect_url.as_deref()
    }

    /// Returns the webhook shared secret, if configured.
    pub fn webhook_secret(&self) -> Option<&SecretString> {
        self.webhook_secret.as_ref()
    }

    pub fn set_oauth_base_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_base_url = Some(url.into());
        self
    }

    pub fn set_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn set_machine_credentials(
        mut self,
        account_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        self.account_id = Some(account_id.into());
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret);
        self
    }

    pub fn set_oauth_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: SecretString,
        redirect_url: impl Into<String>,
    ) -> Self {
        self.oauth_client_id = Some(client_id.into());
        self.oauth_client_secret = Some(client_secret);
        self.oauth_redirect_url = Some(redirect_url.into());
        self
    }

    pub fn set_webhook_secret(mut self, secret: SecretString) -> Self {
        self.webhook_secret = Some(secret);
        self
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn from_env_reads_configured_values() {
        env::set_var(ENV_ACCOUNT_ID, "acct_123");
        env::set_var(ENV_CLIENT_ID, "client_abc");
        env::remove_var(ENV_OAUTH_CLIENT_ID);

        let config = BrokerConfig::from_env();

        assert_eq!(config.account_id(), Some("acct_123"));
        assert_eq!(config.client_id(), Some("client_abc"));
        assert_eq!(config.oauth_client_id(), None);

        env::remove_var(ENV_ACCOUNT_ID);
        env::remove_var(ENV_CLIENT_ID);
    }

    #[test]
    #[serial]
    fn empty_values_are_treated_as_unset() {
        env::set_var(ENV_WEBHOOK_SECRET, "");

        let config = BrokerConfig::from_env();
        assert!(config.webhook_secret().is_none());

        env::remove_var(ENV_WEBHOOK_SECRET);
    }

    #[test]
    fn base_urls_default_to_provider_endpoints() {
        let config = BrokerConfig::default();
        assert_eq!(config.oauth_base_url(), DEFAULT_OAUTH_BASE_URL);
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn base_urls_can_be_overridden() {
        let config = BrokerConfig::default()
            .set_oauth_base_url("http://127.0.0.1:9999")
            .set_api_base_url("http://127.0.0.1:9998");
        assert_eq!(config.oauth_base_url(), "http://127.0.0.1:9999");
        assert_eq!(config.api_base_url(), "http://127.0.0.1:9998");
    }
}
