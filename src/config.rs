//! Batch configuration.

use std::path::PathBuf;

use derive_builder::Builder;

/// Input file read when none is given on the command line.
pub const DEFAULT_INPUT: &str = "Audio_Translations.json";

/// Directory audio files are written to when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "audio_output";

/// Settings for one [`BatchConverter`](crate::BatchConverter) run.
///
/// ```
/// use tts_batch::BatchConfigBuilder;
///
/// let config = BatchConfigBuilder::default()
///     .input("phrases.json")
///     .build()
///     .unwrap();
/// assert_eq!(config.output_dir.to_str(), Some("audio_output"));
/// assert!(!config.overwrite);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
pub struct BatchConfig {
    /// JSON file mapping output names to the text to synthesize.
    pub input: PathBuf,
    /// Directory that receives `<key>.<ext>` files. Created if missing.
    #[builder(default = "PathBuf::from(DEFAULT_OUTPUT_DIR)")]
    pub output_dir: PathBuf,
    /// Regenerate keys whose output file already exists.
    #[builder(default)]
    pub overwrite: bool,
}
