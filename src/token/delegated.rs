//! User-delegated credential manager.
//!
//! Completes the authorization-code flow a human initiated, caches the
//! resulting access+refresh pair per store slot, and refreshes proactively
//! before expiry. Refreshes for a slot are single-flighted so concurrent
//! callers await one in-flight exchange instead of spending the same refresh
//! token twice.

use std::sync::Arc;

use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use super::store::{TokenStore, DEFAULT_SLOT};
use super::{ConnectionStatus, TokenRecord};
use crate::clock::{Clock, SystemClock};
use crate::config::{
    BrokerConfig, ENV_OAUTH_CLIENT_ID, ENV_OAUTH_CLIENT_SECRET, ENV_OAUTH_REDIRECT_URL,
};
use crate::error::{missing_config, token_error, Error, TokenErrorKind};
use crate::oauth::{GrantType, OAuthClient};

/// What to do with the previous refresh token when a refresh response omits
/// a new one.
///
/// The provider may omit the field to mean "unchanged" or may have rotated
/// the token away; the policy makes that ambiguity explicit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RotationPolicy {
    /// Keep the previous refresh token when the response omits one.
    #[default]
    KeepPreviousIfOmitted,
    /// The response always replaces the whole record, even when that drops
    /// the refresh token.
    ReplaceAlways,
}

/// Manager for user-delegated credentials.
pub struct DelegatedTokenManager<S: TokenStore> {
    config: BrokerConfig,
    oauth: OAuthClient,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    rotation: RotationPolicy,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: TokenStore> DelegatedTokenManager<S> {
    /// Create a manager using the system clock and the default rotation
    /// policy.
    pub fn new(config: BrokerConfig, store: Arc<S>) -> Result<Self, Error> {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Create a manager with an injected clock.
    pub fn with_clock(
        config: BrokerConfig,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        let oauth = OAuthClient::new(config.oauth_base_url())?;

        Ok(Self {
            config,
            oauth,
            store,
            clock,
            rotation: RotationPolicy::default(),
            refresh_locks: DashMap::new(),
        })
    }

    /// Set the refresh-token rotation policy.
    pub fn with_rotation_policy(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Build the authorization redirect URL. Pure construction, no side
    /// effects.
    pub fn authorization_url(&self, state: Option<&str>) -> Result<Url, Error> {
        let mut missing = Vec::new();
        if self.config.oauth_client_id().is_none() {
            missing.push(ENV_OAUTH_CLIENT_ID);
        }
        if self.config.oauth_redirect_url().is_none() {
            missing.push(ENV_OAUTH_REDIRECT_URL);
        }
        if !missing.is_empty() {
            return Err(missing_config(&missing));
        }

        let mut url = Url::parse(self.config.oauth_base_url())?.join("oauth/authorize")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("response_type", "code");
            query.append_pair("client_id", self.config.oauth_client_id().unwrap_or_default());
            query.append_pair(
                "redirect_uri",
                self.config.oauth_redirect_url().unwrap_or_default(),
            );
            if let Some(state) = state {
                query.append_pair("state", state);
            }
            query.append_pair("prompt", "consent");
        }

        Ok(url)
    }

    /// Exchange a one-time authorization code for an access+refresh pair.
    ///
    /// On success the record is stored under the default slot and, when the
    /// initiator supplied a `state` key, under that key as well so multi-host
    /// deployments can disambiguate callbacks. On failure nothing is mutated.
    pub async fn complete_authorization(
        &self,
        code: &str,
        state: Option<&str>,
    ) -> Result<TokenRecord, Error> {
        let (client_id, client_secret, redirect_url) = self.credentials()?;

        let response = self
            .oauth
            .exchange(
                &client_id,
                &client_secret,
                GrantType::AuthorizationCode,
                &[("code", code), ("redirect_uri", redirect_url.as_str())],
            )
            .await?;

        let record = response.into_record(self.clock.now());
        self.store.put(DEFAULT_SLOT, record.clone()).await?;
        if let Some(key) = state.filter(|key| *key != DEFAULT_SLOT) {
            self.store.put(key, record.clone()).await?;
        }
        debug!(slot = state.unwrap_or(DEFAULT_SLOT), "delegated authorization completed");

        Ok(record)
    }

    /// Return a valid access token for a slot, refreshing proactively when
    /// the cached record has expired.
    ///
    /// `Ok(None)` means no credential exists yet and the caller must prompt
    /// for authorization. Refresh is always triggered before use, never as a
    /// use-then-fail-then-refresh cycle.
    pub async fn get_valid_token(&self, slot: Option<&str>) -> Result<Option<SecretString>, Error> {
        let key = slot.unwrap_or(DEFAULT_SLOT);

        let record = match self.store.get(key).await? {
            Some(record) => record,
            None => return Ok(None),
        };
        if record.is_valid(self.clock.now()) {
            return Ok(Some(record.access_token));
        }

        let lock = self.refresh_lock(key);
        let _guard = lock.lock().await;

        // Another caller may have refreshed this slot while we waited.
        if let Some(record) = self.store.get(key).await? {
            if record.is_valid(self.clock.now()) {
                debug!(slot = key, "token was refreshed by a concurrent caller");
                return Ok(Some(record.access_token));
            }
        }

        debug!(slot = key, "token expired, refreshing");
        let record = self.refresh_slot(key).await?;
        Ok(Some(record.access_token))
    }

    /// Force a refresh exchange for a slot.
    ///
    /// Fails fast with `MissingRefreshToken` (no network call) when the
    /// stored record has no refresh token, and with `NotConnected` when no
    /// record exists at all.
    pub async fn refresh(&self, slot: Option<&str>) -> Result<SecretString, Error> {
        let key = slot.unwrap_or(DEFAULT_SLOT);
        let lock = self.refresh_lock(key);
        let _guard = lock.lock().await;

        let record = self.refresh_slot(key).await?;
        Ok(record.access_token)
    }

    /// Clear the in-memory record and every keyed slot. Idempotent.
    pub async fn disconnect(&self) -> Result<(), Error> {
        debug!("clearing delegated credentials");
        self.store.clear().await
    }

    /// Connection status for a slot, as exposed to the frontend.
    pub async fn status(&self, slot: Option<&str>) -> Result<ConnectionStatus, Error> {
        let key = slot.unwrap_or(DEFAULT_SLOT);
        Ok(self
            .store
            .get(key)
            .await?
            .as_ref()
            .map(ConnectionStatus::from)
            .unwrap_or_else(ConnectionStatus::disconnected))
    }

    /// Perform the refresh exchange for a slot. Caller must hold the slot's
    /// refresh lock.
    async fn refresh_slot(&self, key: &str) -> Result<TokenRecord, Error> {
        let record = self.store.get(key).await?.ok_or_else(|| {
            token_error(
                TokenErrorKind::NotConnected,
                "no delegated credential obtained yet",
            )
        })?;

        let refresh_token = record.refresh_token.clone().ok_or_else(|| {
            token_error(
                TokenErrorKind::MissingRefreshToken,
                "stored record has no refresh token; re-authorization required",
            )
        })?;

        let (client_id, client_secret, _redirect_url) = self.credentials()?;
        let response = self
            .oauth
            .exchange(
                &client_id,
                &client_secret,
                GrantType::RefreshToken,
                &[("refresh_token", refresh_token.expose_secret())],
            )
            .await?;

        let mut refreshed = response.into_record(self.clock.now());
        if refreshed.refresh_token.is_none()
            && self.rotation == RotationPolicy::KeepPreviousIfOmitted
        {
            refreshed.refresh_token = Some(refresh_token);
        }

        self.store.put(key, refreshed.clone()).await?;
        debug!(slot = key, "delegated token refreshed");

        Ok(refreshed)
    }

    fn refresh_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Resolve the delegated-flow credentials, naming every missing variable.
    fn credentials(&self) -> Result<(String, SecretString, String), Error> {
        match (
            self.config.oauth_client_id(),
            self.config.oauth_client_secret(),
            self.config.oauth_redirect_url(),
        ) {
            (Some(client_id), Some(secret), Some(redirect_url)) => Ok((
                client_id.to_string(),
                secret.clone(),
                redirect_url.to_string(),
            )),
            (client_id, secret, redirect_url) => {
                let mut missing = Vec::new();
                if client_id.is_none() {
                    missing.push(ENV_OAUTH_CLIENT_ID);
                }
                if secret.is_none() {
                    missing.push(ENV_OAUTH_CLIENT_SECRET);
                }
                if redirect_url.is_none() {
                    missing.push(ENV_OAUTH_REDIRECT_URL);
                }
                Err(missing_config(&missing))
            }
        }
    }
}
