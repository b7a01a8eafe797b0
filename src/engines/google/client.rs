use std::fmt;
use std::time::Duration;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::voices::{ListVoicesResponse, VoiceInfo};
use crate::AudioEncoding;

/// Base URL of the Text-to-Speech REST API.
pub const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1";

/// Per-request timeout used by [`GoogleTtsClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
pub enum GoogleTtsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Text-to-Speech API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid audioContent in response: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("Text is empty; nothing to synthesize")]
    EmptyText,
    #[error("Text-to-Speech API returned no audio content")]
    EmptyAudio,
}

/// Pre-provisioned credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// API key, sent as `X-Goog-Api-Key`
    ApiKey(String),
    /// OAuth 2.0 access token, sent as `Authorization: Bearer`
    AccessToken(String),
}

impl Credentials {
    /// Pick credentials from optional sources, preferring the API key.
    /// Blank values are ignored.
    pub fn from_options(api_key: Option<&str>, access_token: Option<&str>) -> Option<Self> {
        let present = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        present(api_key)
            .map(Self::ApiKey)
            .or_else(|| present(access_token).map(Self::AccessToken))
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::ApiKey(key) => request.header("X-Goog-Api-Key", key),
            Self::AccessToken(token) => request.bearer_auth(token),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

/// Body of `POST /text:synthesize`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeRequest<'a> {
    pub input: SynthesisInput<'a>,
    pub voice: VoiceSelection<'a>,
    pub audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
pub struct SynthesisInput<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection<'a> {
    pub language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub audio_encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking_rate: Option<f32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Google's error envelope: `{"error": {"code": 400, "message": "...", "status": "..."}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Authenticated HTTP client for the Text-to-Speech REST API.
pub struct GoogleTtsClient {
    http: Client,
    credentials: Credentials,
    endpoint: String,
}

impl GoogleTtsClient {
    /// Client for the public endpoint with the default timeout.
    pub fn new(credentials: Credentials) -> Result<Self, GoogleTtsError> {
        Self::with_options(credentials, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }

    /// Client for a custom endpoint (regional endpoint, proxy, test server).
    pub fn with_options(
        credentials: Credentials,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GoogleTtsError> {
        let http = Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        log::debug!("Text-to-Speech endpoint: {endpoint} (timeout {timeout:?})");
        Ok(Self {
            http,
            credentials,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Synthesize speech and return the decoded audio bytes.
    pub fn synthesize(&self, request: &SynthesizeRequest<'_>) -> Result<Vec<u8>, GoogleTtsError> {
        let url = format!("{}/text:synthesize", self.endpoint);
        let response = self
            .credentials
            .apply(self.http.post(&url))
            .json(request)
            .send()?;

        let body: SynthesizeResponse = check_status(response)?.json()?;
        if body.audio_content.is_empty() {
            return Err(GoogleTtsError::EmptyAudio);
        }
        Ok(BASE64_STANDARD.decode(body.audio_content.as_bytes())?)
    }

    /// List the voices the service offers, optionally filtered by BCP-47 language code.
    pub fn list_voices(
        &self,
        language_code: Option<&str>,
    ) -> Result<Vec<VoiceInfo>, GoogleTtsError> {
        let url = format!("{}/voices", self.endpoint);
        let mut request = self.http.get(&url);
        if let Some(code) = language_code {
            request = request.query(&[("languageCode", code)]);
        }

        let response = self.credentials.apply(request).send()?;
        let body: ListVoicesResponse = check_status(response)?.json()?;
        log::debug!("Text-to-Speech API listed {} voices", body.voices.len());
        Ok(body.voices)
    }
}

/// Turn a non-2xx response into [`GoogleTtsError::Api`], preferring the
/// message from Google's error envelope over the raw body.
fn check_status(response: Response) -> Result<Response, GoogleTtsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    Err(GoogleTtsError::Api {
        status: status.as_u16(),
        message,
    })
}
