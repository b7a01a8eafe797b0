//! # tts-batch
//!
//! A Rust library and command-line tool that turns a JSON map of phrases into
//! one audio file per phrase using a cloud text-to-speech engine.
//!
//! ## Features
//!
//! - **Google Cloud TTS**: REST client for `text:synthesize` and `voices`
//! - **Idempotent batches**: keys whose audio file already exists are skipped
//! - **Isolated failures**: a failing key is reported and the batch moves on
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! tts-batch = { version = "2026.2", features = ["google"] }
//! ```
//!
//! ```ignore
//! use tts_batch::engines::google::{Credentials, GoogleTtsClient, GoogleTtsEngine};
//! use tts_batch::{BatchConfigBuilder, BatchConverter, ConsoleProgress};
//!
//! let client = GoogleTtsClient::new(Credentials::ApiKey("...".into()))?;
//! let engine = GoogleTtsEngine::new(client);
//! let config = BatchConfigBuilder::default()
//!     .input("Audio_Translations.json")
//!     .output_dir("audio_output")
//!     .build()?;
//!
//! let report = BatchConverter::new(engine, config).run_input(&mut ConsoleProgress::stdout())?;
//! println!("{}", report.summary);
//! # Ok::<(), tts_batch::BoxError>(())
//! ```

pub mod batch;
pub mod config;
pub mod encoding;
pub mod engines;

pub use batch::{
    BatchConverter, BatchError, BatchReport, BatchSummary, ConsoleProgress, ConversionError,
    KeyProgress, KeyReport, LoadError, NoProgress, Outcome, ProgressObserver, TranslationMap,
};
pub use config::{BatchConfig, BatchConfigBuilder};
pub use encoding::AudioEncoding;

use std::io::{Cursor, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Error type returned through [`SynthesisEngine`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The result of a synthesis (text-to-speech) operation.
///
/// Holds the encoded audio exactly as the engine returned it, together with the
/// encoding and sample rate that were requested.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Encoded audio bytes (a complete WAV file for `LINEAR16`)
    pub audio: Vec<u8>,
    /// Encoding of `audio`
    pub encoding: AudioEncoding,
    /// Requested sample rate in Hz
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to `path`, replacing any existing file.
    ///
    /// The bytes are staged in a temporary file next to `path` and renamed into
    /// place, so readers never observe a partially written file.
    pub fn write_atomic(&self, path: &Path) -> std::io::Result<()> {
        self.stage(path)?.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Like [`write_atomic`](Self::write_atomic) but fails with
    /// `ErrorKind::AlreadyExists` instead of replacing an existing file.
    pub fn write_new(&self, path: &Path) -> std::io::Result<()> {
        self.stage(path)?
            .persist_noclobber(path)
            .map_err(|e| e.error)?;
        Ok(())
    }

    fn stage(&self, path: &Path) -> std::io::Result<NamedTempFile> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::Builder::new()
            .prefix(".tts-")
            .suffix(".part")
            .tempfile_in(dir)?;
        tmp.write_all(&self.audio)?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }

    /// WAV header of the audio, if it is a RIFF/WAVE payload `hound` can read.
    pub fn wav_spec(&self) -> Option<hound::WavSpec> {
        if !self.encoding.is_wav() {
            return None;
        }
        hound::WavReader::new(Cursor::new(&self.audio))
            .ok()
            .map(|reader| reader.spec())
    }

    /// Duration of the audio in seconds, read from the WAV header.
    ///
    /// Returns `None` for compressed encodings, where the duration is not
    /// known without decoding.
    pub fn duration_secs(&self) -> Option<f64> {
        if !self.encoding.is_wav() {
            return None;
        }
        let reader = hound::WavReader::new(Cursor::new(&self.audio)).ok()?;
        let sample_rate = reader.spec().sample_rate;
        if sample_rate == 0 {
            return None;
        }
        Some(reader.duration() as f64 / sample_rate as f64)
    }
}

/// Common interface for text-to-speech synthesis engines.
///
/// Engines are constructed fully configured (credentials, endpoint, default
/// voice) and handed to a [`BatchConverter`]; the converter never manages
/// their lifecycle.
pub trait SynthesisEngine {
    /// Parameters for configuring a single request (voice, encoding, etc.)
    type SynthesisParams;

    /// Encoding produced when [`synthesize`](Self::synthesize) is called without params.
    fn output_encoding(&self) -> AudioEncoding;

    /// Synthesize speech from the given text.
    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, BoxError>;

    /// Synthesize speech from the given text and write it to `path`.
    ///
    /// Default implementation calls `synthesize()` then `SynthesisResult::write_atomic()`.
    fn synthesize_to_file(
        &mut self,
        text: &str,
        path: &Path,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), BoxError> {
        self.synthesize(text, params)?.write_atomic(path)?;
        Ok(())
    }
}
