//! Thin client for the provider's meetings API.
//!
//! The token managers broker the credential; this client only presents it as
//! a bearer and moves JSON. Business interpretation of the response stays
//! with the frontend.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{exchange_denied, Error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Scheduled meeting (provider type 2).
const MEETING_TYPE_SCHEDULED: u8 = 2;

/// Recognized meeting settings with their defaults.
///
/// Callers override individual fields; unspecified fields keep these values
/// rather than being re-derived per request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeetingSettings {
    /// Participants may join before the host. Default `false`.
    pub join_before_host: bool,
    /// Hold participants in a waiting room. Default `true`.
    pub waiting_room: bool,
    /// Mute participants on entry. Default `true`.
    pub mute_upon_entry: bool,
    /// Start with host video on. Default `false`.
    pub host_video: bool,
    /// Start with participant video on. Default `false`.
    pub participant_video: bool,
}

impl Default for MeetingSettings {
    fn default() -> Self {
        Self {
            join_before_host: false,
            waiting_room: true,
            mute_upon_entry: true,
            host_video: false,
            participant_video: false,
        }
    }
}

/// Caller overrides merged field-by-field onto [`MeetingSettings`] defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MeetingSettingsOverrides {
    pub join_before_host: Option<bool>,
    pub waiting_room: Option<bool>,
    pub mute_upon_entry: Option<bool>,
    pub host_video: Option<bool>,
    pub participant_video: Option<bool>,
}

impl MeetingSettings {
    /// Apply caller overrides at the field level.
    pub fn merged(mut self, overrides: &MeetingSettingsOverrides) -> Self {
        if let Some(value) = overrides.join_before_host {
            self.join_before_host = value;
        }
        if let Some(value) = overrides.waiting_room {
            self.waiting_room = value;
        }
        if let Some(value) = overrides.mute_upon_entry {
            self.mute_upon_entry = value;
        }
        if let Some(value) = overrides.host_video {
            self.host_video = value;
        }
        if let Some(value) = overrides.participant_video {
            self.participant_video = value;
        }
        self
    }
}

/// Request body for `POST /v2/users/me/meetings`.
#[derive(Clone, Debug, Serialize)]
pub struct MeetingRequest {
    pub topic: String,
    #[serde(rename = "type")]
    pub meeting_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
    pub settings: MeetingSettings,
}

impl MeetingRequest {
    /// A scheduled meeting with default settings.
    pub fn scheduled(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            meeting_type: MEETING_TYPE_SCHEDULED,
            start_time: None,
            duration: None,
            timezone: None,
            agenda: None,
            settings: MeetingSettings::default(),
        }
    }
}

/// Provider response for a created meeting.
#[derive(Clone, Debug, Deserialize)]
pub struct Meeting {
    pub id: u64,
    pub join_url: String,
    #[serde(default)]
    pub start_url: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// Client for the provider's REST API, authenticated per call with a brokered
/// bearer token.
pub struct MeetingsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MeetingsClient {
    /// Create a client for the API under `api_base_url`.
    pub fn new(api_base_url: &str) -> Result<Self, Error> {
        let base_url = Url::parse(api_base_url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Create a meeting for the token's user.
    pub async fn create_meeting(
        &self,
        access_token: &SecretString,
        request: &MeetingRequest,
    ) -> Result<Meeting, Error> {
        let url = self.base_url.join("v2/users/me/meetings")?;
        debug!(topic = request.topic.as_str(), "creating meeting");

        let response = self
            .http
            .post(url)
            .bearer_auth(access_token.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(exchange_denied(status.as_u16(), &body));
        }

        Ok(response.json::<Meeting>().await?)
    }
}
