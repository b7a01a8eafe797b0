//! Batch conversion of a phrase map into audio files.
//!
//! A run has three steps:
//!
//! 1. **Load** the JSON input into a [`TranslationMap`]. Any failure here is
//!    fatal and happens before anything touches the disk or the network.
//! 2. **Convert** each key in order: skip it if `<output_dir>/<key>.<ext>`
//!    exists, otherwise synthesize and write it. A failing key becomes
//!    [`Outcome::Failed`] and the loop continues.
//! 3. **Summarize** the outcomes in a [`BatchSummary`].

mod converter;
mod progress;
mod translations;

pub use converter::{
    BatchConverter, BatchError, BatchReport, BatchSummary, ConversionError, KeyReport, Outcome,
};
pub use progress::{ConsoleProgress, KeyProgress, NoProgress, ProgressObserver};
pub use translations::{LoadError, TranslationMap};
