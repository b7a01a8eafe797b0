use serde::{Deserialize, Serialize};

/// A voice offered by the Text-to-Speech API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// BCP-47 codes the voice supports (e.g. `["ar-XA"]`)
    #[serde(default)]
    pub language_codes: Vec<String>,
    /// Voice name (e.g. `"ar-XA-Chirp3-HD-Algenib"`)
    pub name: String,
    #[serde(default)]
    pub ssml_gender: Option<String>,
    #[serde(default)]
    pub natural_sample_rate_hertz: Option<u32>,
}

impl VoiceInfo {
    pub fn supports(&self, language_code: &str) -> bool {
        self.language_codes
            .iter()
            .any(|code| code.eq_ignore_ascii_case(language_code))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListVoicesResponse {
    #[serde(default)]
    pub voices: Vec<VoiceInfo>,
}

/// Locale encoded in a voice name.
///
/// Google voice names follow `{language}-{region}-{family}-{variant}`, so the
/// locale is the first two dash-separated fields: `ar-XA-Wavenet-B` → `ar-XA`.
pub fn voice_locale(name: &str) -> Option<&str> {
    let mut dashes = name.match_indices('-').map(|(i, _)| i);
    let _first = dashes.next()?;
    let end = dashes.next().unwrap_or(name.len());
    let locale = &name[..end];
    (locale.len() > 2).then_some(locale)
}
