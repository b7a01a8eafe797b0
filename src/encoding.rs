use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Audio encodings supported by the synthesis service.
///
/// The serialized form is the name the REST API expects in `audioEncoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AudioEncoding {
    /// 16-bit signed little-endian PCM in a WAV container
    #[default]
    #[serde(rename = "LINEAR16")]
    Linear16,
    #[serde(rename = "MP3")]
    Mp3,
    /// Opus in an Ogg container
    #[serde(rename = "OGG_OPUS")]
    OggOpus,
    /// 8-bit G.711 mu-law in a WAV container
    #[serde(rename = "MULAW")]
    Mulaw,
    /// 8-bit G.711 A-law in a WAV container
    #[serde(rename = "ALAW")]
    Alaw,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown audio encoding '{0}'. Expected one of: LINEAR16, MP3, OGG_OPUS, MULAW, ALAW")]
pub struct ParseEncodingError(String);

impl AudioEncoding {
    /// Name used by the REST API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear16 => "LINEAR16",
            Self::Mp3 => "MP3",
            Self::OggOpus => "OGG_OPUS",
            Self::Mulaw => "MULAW",
            Self::Alaw => "ALAW",
        }
    }

    /// File extension (without the dot) for audio in this encoding.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Linear16 | Self::Mulaw | Self::Alaw => "wav",
            Self::Mp3 => "mp3",
            Self::OggOpus => "ogg",
        }
    }

    /// Whether the service wraps this encoding in a RIFF/WAVE header.
    pub fn is_wav(&self) -> bool {
        self.extension() == "wav"
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioEncoding {
    type Err = ParseEncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "LINEAR16" | "WAV" | "PCM" => Ok(Self::Linear16),
            "MP3" => Ok(Self::Mp3),
            "OGG_OPUS" | "OGG" | "OPUS" => Ok(Self::OggOpus),
            "MULAW" => Ok(Self::Mulaw),
            "ALAW" => Ok(Self::Alaw),
            _ => Err(ParseEncodingError(s.to_string())),
        }
    }
}
