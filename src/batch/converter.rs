use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::progress::{KeyProgress, ProgressObserver};
use super::translations::{LoadError, TranslationMap};
use crate::{BatchConfig, BoxError, SynthesisEngine};

/// Errors that stop a batch before any key is processed.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single key failed. The batch continues after any of these.
#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    #[error("Key {0:?} cannot be used as a file name")]
    InvalidKey(String),
    #[error("Synthesis failed: {0}")]
    Synthesis(#[source] BoxError),
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How a key was resolved.
#[derive(Debug)]
pub enum Outcome {
    /// Output file already existed; nothing was requested or written.
    Skipped,
    Created,
    Failed(ConversionError),
}

impl Outcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub skipped: usize,
    pub created: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.skipped + self.created + self.failed
    }

    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Created => self.created += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "- Skipped (already exist): {}", self.skipped)?;
        writeln!(f, "- Successfully created: {}", self.created)?;
        writeln!(f, "- Failed to create: {}", self.failed)?;
        writeln!(f, "Total files processed: {}", self.total())
    }
}

#[derive(Debug)]
pub struct KeyReport {
    pub key: String,
    pub path: Option<PathBuf>,
    pub outcome: Outcome,
}

/// Everything a run produced, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub keys: Vec<KeyReport>,
}

impl BatchReport {
    pub fn outcome(&self, key: &str) -> Option<&Outcome> {
        self.keys
            .iter()
            .find(|report| report.key == key)
            .map(|report| &report.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &KeyReport> {
        self.keys.iter().filter(|report| report.outcome.is_failed())
    }
}

/// Converts every entry of a [`TranslationMap`] into an audio file.
///
/// Keys are processed one at a time in map order. A key whose file already
/// exists is skipped unless [`BatchConfig::overwrite`] is set; a key that fails
/// is recorded and the loop moves on.
pub struct BatchConverter<E: SynthesisEngine> {
    engine: E,
    config: BatchConfig,
    extension: &'static str,
}

impl<E: SynthesisEngine> BatchConverter<E> {
    pub fn new(engine: E, config: BatchConfig) -> Self {
        let extension = engine.output_encoding().extension();
        Self {
            engine,
            config,
            extension,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// `<output_dir>/<key>.<ext>`, or `InvalidKey` if the key would not name a
    /// file directly inside the output directory.
    pub fn target_path(&self, key: &str) -> Result<PathBuf, ConversionError> {
        let unusable = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\', '\0']);
        if unusable {
            return Err(ConversionError::InvalidKey(key.to_string()));
        }
        Ok(self
            .config
            .output_dir
            .join(format!("{key}.{}", self.extension)))
    }

    /// Load [`BatchConfig::input`] and convert it.
    pub fn run_input(
        &mut self,
        observer: &mut dyn ProgressObserver,
    ) -> Result<BatchReport, BatchError> {
        let map = TranslationMap::load(&self.config.input)?;
        self.run(&map, observer)
    }

    /// Convert every entry of `map`.
    ///
    /// Only failing to create the output directory aborts the run.
    pub fn run(
        &mut self,
        map: &TranslationMap,
        observer: &mut dyn ProgressObserver,
    ) -> Result<BatchReport, BatchError> {
        self.ensure_output_dir()?;

        let total = map.len();
        log::info!(
            "Converting {total} entries into {}",
            self.config.output_dir.display()
        );

        let mut report = BatchReport::default();
        for (index, (key, text)) in map.iter().enumerate() {
            let (path, outcome) = self.convert(key, text);
            observer.on_key(&KeyProgress {
                index: index + 1,
                total,
                key,
                path: path.as_deref(),
                outcome: &outcome,
            });
            report.summary.record(&outcome);
            report.keys.push(KeyReport {
                key: key.to_string(),
                path,
                outcome,
            });
        }

        observer.on_finish(&report.summary);
        log::info!(
            "Batch finished: {} skipped, {} created, {} failed",
            report.summary.skipped,
            report.summary.created,
            report.summary.failed
        );
        Ok(report)
    }

    /// Resolve a single key: skip, create or fail.
    pub fn convert_one(&mut self, key: &str, text: &str) -> Outcome {
        self.convert(key, text).1
    }

    fn convert(&mut self, key: &str, text: &str) -> (Option<PathBuf>, Outcome) {
        let path = match self.target_path(key) {
            Ok(path) => path,
            Err(e) => {
                log::error!("{e}");
                return (None, Outcome::Failed(e));
            }
        };

        if !self.config.overwrite && path.exists() {
            log::debug!("Skipped (already exists): {}", path.display());
            return (Some(path), Outcome::Skipped);
        }

        let outcome = match self.synthesize_to(&path, text) {
            Ok(()) => Outcome::Created,
            // another writer created the file after the existence check
            Err(ConversionError::Write { source, .. })
                if source.kind() == ErrorKind::AlreadyExists && path.exists() =>
            {
                log::debug!("Skipped (created concurrently): {}", path.display());
                Outcome::Skipped
            }
            Err(e) => {
                log::error!("Error converting text to speech for {key}: {e}");
                Outcome::Failed(e)
            }
        };
        (Some(path), outcome)
    }

    fn synthesize_to(&mut self, path: &Path, text: &str) -> Result<(), ConversionError> {
        let result = self
            .engine
            .synthesize(text, None)
            .map_err(ConversionError::Synthesis)?;

        let written = if self.config.overwrite {
            result.write_atomic(path)
        } else {
            result.write_new(path)
        };
        written.map_err(|source| ConversionError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        match result.duration_secs() {
            Some(secs) => log::info!(
                "Wrote {} ({} bytes, {secs:.2}s)",
                path.display(),
                result.audio.len()
            ),
            None => log::info!("Wrote {} ({} bytes)", path.display(), result.audio.len()),
        }
        Ok(())
    }

    fn ensure_output_dir(&self) -> Result<(), BatchError> {
        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir).map_err(|source| BatchError::OutputDir {
            path: dir.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AudioEncoding, BatchConfigBuilder, NoProgress, SynthesisResult};

    /// Engine that returns the text bytes as audio, failing for selected texts.
    #[derive(Default)]
    struct FakeEngine {
        calls: Vec<String>,
        failing: Vec<&'static str>,
        encoding: AudioEncoding,
        /// File created behind the converter's back during synthesis.
        planted: Option<PathBuf>,
    }

    impl SynthesisEngine for FakeEngine {
        type SynthesisParams = ();

        fn output_encoding(&self) -> AudioEncoding {
            self.encoding
        }

        fn synthesize(
            &mut self,
            text: &str,
            _params: Option<()>,
        ) -> Result<SynthesisResult, BoxError> {
            self.calls.push(text.to_string());
            if let Some(path) = &self.planted {
                std::fs::write(path, b"other writer").unwrap();
            }
            if self.failing.iter().any(|f| *f == text) {
                return Err("503 service unavailable".into());
            }
            Ok(SynthesisResult {
                audio: format!("audio:{text}").into_bytes(),
                encoding: self.encoding,
                sample_rate: 24000,
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        lines: Vec<(usize, usize, String, &'static str)>,
        finished: Option<BatchSummary>,
    }

    impl ProgressObserver for Recorder {
        fn on_key(&mut self, p: &KeyProgress<'_>) {
            let label = match p.outcome {
                Outcome::Skipped => "skipped",
                Outcome::Created => "created",
                Outcome::Failed(_) => "failed",
            };
            self.lines.push((p.index, p.total, p.key.to_string(), label));
        }

        fn on_finish(&mut self, summary: &BatchSummary) {
            self.finished = Some(*summary);
        }
    }

    fn converter(dir: &Path, engine: FakeEngine) -> BatchConverter<FakeEngine> {
        let config = BatchConfigBuilder::default()
            .input(dir.join("input.json"))
            .output_dir(dir.join("audio_output"))
            .build()
            .unwrap();
        BatchConverter::new(engine, config)
    }

    fn map(pairs: &[(&str, &str)]) -> TranslationMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn creates_then_skips_on_rerun() {
        let dir = tempfile::tempdir().unwrap();
        let input = map(&[("a", "hello"), ("b", "world")]);
        let mut conv = converter(dir.path(), FakeEngine::default());

        let first = conv.run(&input, &mut NoProgress).unwrap();
        assert_eq!(
            first.summary,
            BatchSummary {
                skipped: 0,
                created: 2,
                failed: 0,
            }
        );
        let out = dir.path().join("audio_output");
        assert_eq!(std::fs::read(out.join("a.wav")).unwrap(), b"audio:hello");
        assert_eq!(std::fs::read(out.join("b.wav")).unwrap(), b"audio:world");

        let second = conv.run(&input, &mut NoProgress).unwrap();
        assert_eq!(
            second.summary,
            BatchSummary {
                skipped: 2,
                created: 0,
                failed: 0,
            }
        );
        assert_eq!(second.summary.total(), 2);
        assert_eq!(conv.engine().calls, vec!["hello", "world"]);
    }

    #[test]
    fn existing_file_is_skipped_and_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("audio_output");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("greeting.wav"), b"hand-recorded").unwrap();

        let mut conv = converter(dir.path(), FakeEngine::default());
        let report = conv
            .run(&map(&[("greeting", "أهلاً بيك")]), &mut NoProgress)
            .unwrap();

        assert!(report.outcome("greeting").unwrap().is_skipped());
        assert_eq!(
            std::fs::read(out.join("greeting.wav")).unwrap(),
            b"hand-recorded"
        );
        assert!(conv.engine().calls.is_empty());
    }

    #[test]
    fn failure_leaves_no_file_and_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine {
            failing: vec!["boom"],
            ..Default::default()
        };
        let mut conv = converter(dir.path(), engine);
        let report = conv
            .run(
                &map(&[("a", "fine"), ("b", "boom"), ("c", "also fine")]),
                &mut NoProgress,
            )
            .unwrap();

        let out = dir.path().join("audio_output");
        assert!(out.join("a.wav").exists());
        assert!(!out.join("b.wav").exists());
        assert!(out.join("c.wav").exists());
        assert_eq!(
            report.summary,
            BatchSummary {
                skipped: 0,
                created: 2,
                failed: 1,
            }
        );

        let failed: Vec<&str> = report.failures().map(|r| r.key.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
        match report.outcome("b") {
            Some(Outcome::Failed(ConversionError::Synthesis(e))) => {
                assert!(e.to_string().contains("503"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        // only the final files remain, no staged temporaries
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn write_failure_fails_the_key_and_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("audio_output");
        std::fs::create_dir_all(&out).unwrap();
        // dangling link: `exists()` is false but the name is taken
        std::os::unix::fs::symlink(out.join("missing.wav"), out.join("a.wav")).unwrap();

        let mut conv = converter(dir.path(), FakeEngine::default());
        let report = conv
            .run(&map(&[("a", "hello"), ("b", "world")]), &mut NoProgress)
            .unwrap();

        match report.outcome("a") {
            Some(Outcome::Failed(ConversionError::Write { path, source })) => {
                assert_eq!(path, &out.join("a.wav"));
                assert_eq!(source.kind(), ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(report.outcome("b").unwrap().is_created());
        assert_eq!(
            report.summary,
            BatchSummary {
                skipped: 0,
                created: 1,
                failed: 1,
            }
        );

        let link = std::fs::symlink_metadata(out.join("a.wav")).unwrap();
        assert!(link.file_type().is_symlink());
        let mut names: Vec<String> = std::fs::read_dir(&out)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.wav", "b.wav"]);
    }

    #[test]
    fn file_created_during_synthesis_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("audio_output");
        let engine = FakeEngine {
            planted: Some(out.join("a.wav")),
            ..Default::default()
        };
        let mut conv = converter(dir.path(), engine);
        let report = conv.run(&map(&[("a", "hello")]), &mut NoProgress).unwrap();

        assert!(report.outcome("a").unwrap().is_skipped());
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(std::fs::read(out.join("a.wav")).unwrap(), b"other writer");
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn every_key_gets_exactly_one_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("audio_output");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("k1.wav"), b"x").unwrap();

        let engine = FakeEngine {
            failing: vec!["t3"],
            ..Default::default()
        };
        let input = map(&[
            ("k0", "t0"),
            ("k1", "t1"),
            ("", "t2"),
            ("k3", "t3"),
            ("k4", "t4"),
        ]);
        let mut conv = converter(dir.path(), engine);
        let mut recorder = Recorder::default();
        let report = conv.run(&input, &mut recorder).unwrap();

        assert_eq!(report.keys.len(), input.len());
        assert_eq!(report.summary.total(), input.len());
        assert_eq!(recorder.finished, Some(report.summary));
        let seen: Vec<(usize, &str, &str)> = recorder
            .lines
            .iter()
            .map(|(i, total, key, label)| {
                assert_eq!(*total, 5);
                (*i, key.as_str(), *label)
            })
            .collect();
        assert_eq!(
            seen,
            vec![
                (1, "k0", "created"),
                (2, "k1", "skipped"),
                (3, "", "failed"),
                (4, "k3", "failed"),
                (5, "k4", "created"),
            ]
        );
    }

    #[test]
    fn keys_that_escape_the_output_dir_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let conv = converter(dir.path(), FakeEngine::default());
        for key in ["", ".", "..", "../evil", "a/b", "a\\b"] {
            assert!(
                matches!(conv.target_path(key), Err(ConversionError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
        assert_eq!(
            conv.target_path("lesson.1").unwrap(),
            dir.path().join("audio_output").join("lesson.1.wav")
        );
    }

    #[test]
    fn invalid_key_makes_no_service_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut conv = converter(dir.path(), FakeEngine::default());
        let outcome = conv.convert_one("../escape", "text");
        assert!(outcome.is_failed());
        assert!(conv.engine().calls.is_empty());
    }

    #[test]
    fn extension_follows_engine_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine {
            encoding: AudioEncoding::Mp3,
            ..Default::default()
        };
        let mut conv = converter(dir.path(), engine);
        conv.run(&map(&[("a", "hello")]), &mut NoProgress).unwrap();
        assert!(dir.path().join("audio_output/a.mp3").exists());
    }

    #[test]
    fn overwrite_regenerates_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("audio_output");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("a.wav"), b"stale").unwrap();

        let config = BatchConfigBuilder::default()
            .input(dir.path().join("input.json"))
            .output_dir(&out)
            .overwrite(true)
            .build()
            .unwrap();
        let mut conv = BatchConverter::new(FakeEngine::default(), config);
        let report = conv.run(&map(&[("a", "fresh")]), &mut NoProgress).unwrap();

        assert!(report.outcome("a").unwrap().is_created());
        assert_eq!(std::fs::read(out.join("a.wav")).unwrap(), b"audio:fresh");
    }

    #[test]
    fn malformed_input_aborts_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("input.json"), r#"{"a": "hello""#).unwrap();

        let mut conv = converter(dir.path(), FakeEngine::default());
        let err = conv.run_input(&mut NoProgress).unwrap_err();

        assert!(matches!(err, BatchError::Load(LoadError::Json(_))));
        assert!(conv.engine().calls.is_empty());
        assert!(!dir.path().join("audio_output").exists());
    }

    #[test]
    fn missing_input_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut conv = converter(dir.path(), FakeEngine::default());
        let err = conv.run_input(&mut NoProgress).unwrap_err();
        assert!(matches!(err, BatchError::Load(LoadError::Io { .. })));
    }

    #[test]
    fn run_input_processes_file_and_creates_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("input.json"),
            r#"{"greeting": "أهلاً بيك", "bye": "مع السلامة"}"#,
        )
        .unwrap();
        let config = BatchConfigBuilder::default()
            .input(dir.path().join("input.json"))
            .output_dir(dir.path().join("nested/deeper"))
            .build()
            .unwrap();

        let mut conv = BatchConverter::new(FakeEngine::default(), config);
        let report = conv.run_input(&mut NoProgress).unwrap();

        assert_eq!(report.summary.created, 2);
        assert!(dir.path().join("nested/deeper/greeting.wav").exists());
        assert_eq!(conv.into_engine().calls, vec!["أهلاً بيك", "مع السلامة"]);
    }

    #[test]
    fn output_dir_that_is_a_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("audio_output"), b"not a dir").unwrap();
        let mut conv = converter(dir.path(), FakeEngine::default());
        let err = conv.run(&map(&[("a", "x")]), &mut NoProgress).unwrap_err();
        assert!(matches!(err, BatchError::OutputDir { .. }));
    }

    #[test]
    fn summary_display_matches_console_format() {
        let summary = BatchSummary {
            skipped: 0,
            created: 2,
            failed: 0,
        };
        assert_eq!(
            summary.to_string(),
            "Summary:\n- Skipped (already exist): 0\n- Successfully created: 2\n- Failed to create: 0\nTotal files processed: 2\n"
        );
    }
}
