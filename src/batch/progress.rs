use std::io::{self, Write};
use std::path::Path;

use super::converter::{BatchSummary, Outcome};

/// Progress of a batch after one key has been resolved.
#[derive(Debug)]
pub struct KeyProgress<'a> {
    /// 1-based position of the key in the batch
    pub index: usize,
    pub total: usize,
    pub key: &'a str,
    /// Target file, `None` when the key cannot name a file
    pub path: Option<&'a Path>,
    pub outcome: &'a Outcome,
}

/// Receives one notification per key and one when the batch finishes.
pub trait ProgressObserver {
    fn on_key(&mut self, progress: &KeyProgress<'_>);

    fn on_finish(&mut self, _summary: &BatchSummary) {}
}

/// Observer that ignores every notification.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_key(&mut self, _progress: &KeyProgress<'_>) {}
}

/// Prints a status line per key and the summary at the end.
///
/// ```text
/// [ 1/12] Created: audio_output/greeting.wav
/// [ 2/12] Skipped (already exists): audio_output/thanks.wav
/// ```
pub struct ConsoleProgress<W: Write> {
    out: W,
}

impl ConsoleProgress<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressObserver for ConsoleProgress<W> {
    fn on_key(&mut self, progress: &KeyProgress<'_>) {
        let width = progress.total.to_string().len();
        let target = progress
            .path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("{:?}", progress.key));
        let line = match progress.outcome {
            Outcome::Skipped => format!("Skipped (already exists): {target}"),
            Outcome::Created => format!("Created: {target}"),
            Outcome::Failed(err) => format!("Failed to create: {target} ({err})"),
        };

        if let Err(e) = writeln!(
            self.out,
            "[{:>width$}/{}] {line}",
            progress.index, progress.total
        ) {
            log::warn!("Failed to write progress line: {e}");
        }
    }

    fn on_finish(&mut self, summary: &BatchSummary) {
        if let Err(e) = write!(self.out, "\n{summary}").and_then(|_| self.out.flush()) {
            log::warn!("Failed to write summary: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ConversionError;

    #[test]
    fn formats_each_outcome() {
        let mut console = ConsoleProgress::new(Vec::new());
        let created = Outcome::Created;
        let skipped = Outcome::Skipped;
        let failed = Outcome::Failed(ConversionError::InvalidKey("../x".to_string()));

        console.on_key(&KeyProgress {
            index: 1,
            total: 10,
            key: "a",
            path: Some(Path::new("out/a.wav")),
            outcome: &created,
        });
        console.on_key(&KeyProgress {
            index: 2,
            total: 10,
            key: "b",
            path: Some(Path::new("out/b.wav")),
            outcome: &skipped,
        });
        console.on_key(&KeyProgress {
            index: 10,
            total: 10,
            key: "../x",
            path: None,
            outcome: &failed,
        });

        let text = String::from_utf8(console.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[ 1/10] Created: out/a.wav");
        assert_eq!(lines[1], "[ 2/10] Skipped (already exists): out/b.wav");
        assert!(lines[2].starts_with("[10/10] Failed to create: \"../x\""));
    }

    #[test]
    fn prints_summary_on_finish() {
        let mut console = ConsoleProgress::new(Vec::new());
        console.on_finish(&BatchSummary {
            skipped: 1,
            created: 2,
            failed: 3,
        });
        let text = String::from_utf8(console.into_inner()).unwrap();
        assert!(text.contains("- Failed to create: 3"));
        assert!(text.contains("Total files processed: 6"));
    }
}
