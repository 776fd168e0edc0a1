//! Text extraction through an external converter such as `pdftotext`.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{ensure_text, source_id, Result, TextExtractor};
use crate::error::{ExtractionCause, ExtractionFailure};

/// Placeholder in the argument template replaced by the document path.
pub const INPUT_PLACEHOLDER: &str = "{input}";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs an external program and reads the document text from its stdout.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    /// Program followed by its arguments.
    argv: Vec<String>,
    /// Kill the converter after this long.
    timeout: Option<Duration>,
}

impl CommandExtractor {
    /// Create an extractor from an argument template.
    ///
    /// Occurrences of `{input}` are replaced by the document path. When no
    /// argument mentions it, the path is appended.
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            timeout: None,
        }
    }

    /// `pdftotext <input> -`.
    pub fn pdftotext() -> Self {
        Self::new(vec![
            "pdftotext".to_string(),
            INPUT_PLACEHOLDER.to_string(),
            "-".to_string(),
        ])
    }

    /// Set the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout = timeout_secs.map(Duration::from_secs);
        self
    }

    fn build_command(&self, path: &Path) -> std::result::Result<Command, ExtractionCause> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| ExtractionCause::Spawn("empty converter command".to_string()))?;

        let input = path.to_string_lossy();
        let mut command = Command::new(program);

        if args.iter().any(|a| a.contains(INPUT_PLACEHOLDER)) {
            command.args(args.iter().map(|a| a.replace(INPUT_PLACEHOLDER, &input)));
        } else {
            command.args(args).arg(path);
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(command)
    }

    fn run(&self, path: &Path) -> std::result::Result<String, ExtractionCause> {
        let mut child = self
            .build_command(path)?
            .spawn()
            .map_err(|e| ExtractionCause::Spawn(format!("{}: {}", self.argv[0], e)))?;

        // Drain the pipes on their own threads so a chatty converter cannot
        // block on a full pipe while we wait for it.
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = self.wait(&mut child)?;

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            return Err(ExtractionCause::ExitStatus {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn wait(&self, child: &mut Child) -> std::result::Result<ExitStatus, ExtractionCause> {
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(|e| ExtractionCause::Spawn(e.to_string()));
        };

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if start.elapsed() > timeout => {
                    warn!("Converter exceeded {:?}, killing it", timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExtractionCause::Timeout(timeout.as_secs()));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(ExtractionCause::Spawn(e.to_string())),
            }
        }
    }
}

impl Default for CommandExtractor {
    fn default() -> Self {
        Self::pdftotext()
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

impl TextExtractor for CommandExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(ExtractionFailure::new(
                source_id(path),
                ExtractionCause::Io(format!("{} is not a readable file", path.display())),
            ));
        }

        let text = self
            .run(path)
            .map_err(|cause| ExtractionFailure::new(source_id(path), cause))?;

        debug!("Converter produced {} chars for {}", text.len(), path.display());
        ensure_text(text, path)
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn write_doc(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_stdout_becomes_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "a.pdf", "Total Rakes =88 ft\n");

        let extractor = CommandExtractor::new(vec!["cat".to_string(), "{input}".to_string()]);
        assert_eq!(extractor.extract(&path).unwrap(), "Total Rakes =88 ft\n");
    }

    #[test]
    fn test_path_appended_without_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "a.pdf", "Predominant Pitch =8/12");

        let extractor = CommandExtractor::new(vec!["cat".to_string()]);
        assert_eq!(extractor.extract(&path).unwrap(), "Predominant Pitch =8/12");
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "bad.pdf", "irrelevant");

        let extractor = CommandExtractor::new(vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo broken >&2; exit 3".to_string(),
            "{input}".to_string(),
        ]);

        let err = extractor.extract(&path).unwrap_err();
        assert_eq!(err.source_id, "bad.pdf");
        match err.cause {
            ExtractionCause::ExitStatus { stderr, .. } => assert_eq!(stderr, "broken"),
            other => panic!("unexpected cause: {other:?}"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "a.pdf", "text");

        let extractor = CommandExtractor::new(vec!["roofx-no-such-converter".to_string()]);
        let err = extractor.extract(&path).unwrap_err();
        assert!(matches!(err.cause, ExtractionCause::Spawn(_)));
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandExtractor::pdftotext()
            .extract(&dir.path().join("gone.pdf"))
            .unwrap_err();
        assert!(matches!(err.cause, ExtractionCause::Io(_)));
    }

    #[test]
    fn test_empty_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "empty.pdf", "");

        let extractor = CommandExtractor::new(vec!["cat".to_string()]);
        let err = extractor.extract(&path).unwrap_err();
        assert_eq!(err.cause, ExtractionCause::EmptyText);
    }

    #[test]
    fn test_timeout_kills_converter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(dir.path(), "slow.pdf", "text");

        let extractor = CommandExtractor::new(vec![
            "sh".to_string(),
            "-c".to_string(),
            "sleep 5".to_string(),
            "{input}".to_string(),
        ])
        .with_timeout(Some(0));

        let err = extractor.extract(&path).unwrap_err();
        assert_eq!(err.cause, ExtractionCause::Timeout(0));
    }
}
