use std::time::Instant;

use super::client::{
    AudioConfig, GoogleTtsClient, GoogleTtsError, SynthesisInput, SynthesizeRequest,
    VoiceSelection,
};
use super::voices::{voice_locale, VoiceInfo};
use crate::{AudioEncoding, BoxError, SynthesisEngine, SynthesisResult};

/// Egyptian Arabic is served under the pan-Arabic `ar-XA` locale.
pub const DEFAULT_LANGUAGE: &str = "ar-XA";

pub const DEFAULT_VOICE: &str = "ar-XA-Chirp3-HD-Algenib";

/// Parameters for configuring a Google synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleInferenceParams {
    /// BCP-47 language code (e.g. `"ar-XA"`).
    pub language_code: String,
    /// Voice name. `None` lets the service pick a voice for the language.
    pub voice_name: Option<String>,
    /// Output encoding, default `LINEAR16`.
    pub encoding: AudioEncoding,
    /// Output sample rate in Hz, default 24000.
    pub sample_rate_hertz: u32,
    /// Speaking rate multiplier (0.25–4.0). `None` keeps the voice's natural rate.
    pub speaking_rate: Option<f32>,
}

impl Default for GoogleInferenceParams {
    fn default() -> Self {
        Self {
            language_code: DEFAULT_LANGUAGE.to_string(),
            voice_name: Some(DEFAULT_VOICE.to_string()),
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: 24000,
            speaking_rate: None,
        }
    }
}

impl GoogleInferenceParams {
    fn request<'a>(&'a self, text: &'a str) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &self.language_code,
                name: self.voice_name.as_deref(),
            },
            audio_config: AudioConfig {
                audio_encoding: self.encoding,
                sample_rate_hertz: self.sample_rate_hertz,
                speaking_rate: self.speaking_rate,
            },
        }
    }
}

/// Google Cloud Text-to-Speech engine.
///
/// Wraps an authenticated [`GoogleTtsClient`] and the parameters used when
/// [`synthesize`](SynthesisEngine::synthesize) is called without overrides.
pub struct GoogleTtsEngine {
    client: GoogleTtsClient,
    defaults: GoogleInferenceParams,
}

impl GoogleTtsEngine {
    /// Engine using the Egyptian Arabic defaults.
    pub fn new(client: GoogleTtsClient) -> Self {
        Self::with_params(client, GoogleInferenceParams::default())
    }

    pub fn with_params(client: GoogleTtsClient, defaults: GoogleInferenceParams) -> Self {
        if let Some(voice) = defaults.voice_name.as_deref() {
            match voice_locale(voice) {
                Some(locale) if !locale.eq_ignore_ascii_case(&defaults.language_code) => {
                    log::warn!(
                        "Voice '{voice}' belongs to {locale} but language is {}; the service may reject requests",
                        defaults.language_code
                    );
                }
                _ => {}
            }
        }
        Self { client, defaults }
    }

    pub fn client(&self) -> &GoogleTtsClient {
        &self.client
    }

    pub fn params(&self) -> &GoogleInferenceParams {
        &self.defaults
    }

    /// List the voices available for the configured language, sorted by name.
    pub fn list_voices(&self) -> Result<Vec<VoiceInfo>, GoogleTtsError> {
        let language = &self.defaults.language_code;
        let mut voices = self.client.list_voices(Some(language))?;
        voices.retain(|v| v.supports(language));
        voices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(voices)
    }
}

impl SynthesisEngine for GoogleTtsEngine {
    type SynthesisParams = GoogleInferenceParams;

    fn output_encoding(&self) -> AudioEncoding {
        self.defaults.encoding
    }

    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, BoxError> {
        if text.trim().is_empty() {
            return Err(GoogleTtsError::EmptyText.into());
        }

        let p = params.unwrap_or_else(|| self.defaults.clone());
        let start = Instant::now();
        let audio = self.client.synthesize(&p.request(text))?;
        log::debug!(
            "text:synthesize took {}ms, {} chars input, {} bytes output (voice={})",
            start.elapsed().as_millis(),
            text.chars().count(),
            audio.len(),
            p.voice_name.as_deref().unwrap_or("<service default>")
        );

        Ok(SynthesisResult {
            audio,
            encoding: p.encoding,
            sample_rate: p.sample_rate_hertz,
        })
    }
}
