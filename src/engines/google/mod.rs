//! Google Cloud Text-to-Speech engine implementation.
//!
//! This module talks to the Text-to-Speech REST API (`v1`) with a blocking
//! HTTP client. One client is created per engine and reused for every request.
//!
//! # Credentials
//!
//! The engine does not mint tokens. Provide either:
//! - an **API key** (`GOOGLE_API_KEY`), sent as the `X-Goog-Api-Key` header, or
//! - an **OAuth access token** (`GOOGLE_ACCESS_TOKEN`, e.g. from
//!   `gcloud auth print-access-token`), sent as a bearer token.
//!
//! # Defaults
//!
//! | Setting | Value |
//! |---|---|
//! | Language | `ar-XA` |
//! | Voice | `ar-XA-Chirp3-HD-Algenib` |
//! | Encoding | `LINEAR16` (WAV) |
//! | Sample rate | 24000 Hz |
//!
//! # Examples
//!
//! ```rust,no_run
//! use tts_batch::{SynthesisEngine, engines::google::{Credentials, GoogleTtsClient, GoogleTtsEngine}};
//! use std::path::PathBuf;
//!
//! let client = GoogleTtsClient::new(Credentials::ApiKey("my-key".to_string()))?;
//! let mut engine = GoogleTtsEngine::new(client);
//!
//! engine.synthesize_to_file("أهلاً بيك", &PathBuf::from("greeting.wav"), None)?;
//! # Ok::<(), tts_batch::BoxError>(())
//! ```
//!
//! ## With a Different Voice
//!
//! ```rust,no_run
//! use tts_batch::{AudioEncoding, SynthesisEngine};
//! use tts_batch::engines::google::{Credentials, GoogleInferenceParams, GoogleTtsClient, GoogleTtsEngine};
//!
//! let client = GoogleTtsClient::new(Credentials::ApiKey("my-key".to_string()))?;
//! let mut engine = GoogleTtsEngine::new(client);
//!
//! let params = GoogleInferenceParams {
//!     voice_name: Some("ar-XA-Wavenet-B".to_string()),
//!     encoding: AudioEncoding::Mp3,
//!     ..Default::default()
//! };
//! let result = engine.synthesize("مع السلامة", Some(params))?;
//! println!("{} bytes of {}", result.audio.len(), result.encoding);
//! # Ok::<(), tts_batch::BoxError>(())
//! ```

pub mod client;
pub mod engine;
pub mod voices;

pub use client::{Credentials, GoogleTtsClient, GoogleTtsError, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use engine::{GoogleInferenceParams, GoogleTtsEngine, DEFAULT_LANGUAGE, DEFAULT_VOICE};
pub use voices::VoiceInfo;
