// Output delivery
//
// Receives the rendered message exactly once, at the end of an audit.

use crate::error::{AuditError, Result};
use crate::types::{AuditReport, OutputFormat};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Where the rendered findings go
pub enum Sink {
    /// A file, created or truncated on delivery
    Path(PathBuf),
    /// An already-open writer, flushed after the message is written
    Writer {
        label: String,
        writer: Box<dyn Write + Send>,
    },
    /// Standard output; nothing to flush or await
    Console,
}

impl Sink {
    /// File sink. Fails fast when the file could never be created.
    pub fn path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.is_dir() {
            return Err(AuditError::config(format!(
                "output path {} is a directory",
                path.display()
            )));
        }

        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            if !parent.is_dir() {
                return Err(AuditError::config(format!(
                    "output directory {} does not exist",
                    parent.display()
                )));
            }
        }
        Ok(Sink::Path(path))
    }

    pub fn writer(label: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Sink::Writer {
            label: label.into(),
            writer: Box::new(writer),
        }
    }

    /// Resolve a CLI/config value: `-` or `console` is stdout, anything else a path.
    pub fn from_spec(spec: &str) -> Result<Self> {
        match spec.trim() {
            "" => Err(AuditError::config("output destination is empty")),
            "-" | "console" => Ok(Sink::Console),
            path => Self::path(path),
        }
    }

    /// Write the whole message.
    pub fn deliver(&mut self, message: &str) -> Result<()> {
        match self {
            Sink::Path(path) => fs::write(path, message).map_err(AuditError::SinkWrite),
            Sink::Writer { writer, .. } => {
                writer
                    .write_all(message.as_bytes())
                    .and_then(|_| writer.flush())
                    .map_err(AuditError::SinkWrite)
            }
            Sink::Console => {
                println!("{message}");
                Ok(())
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Sink::Path(path) => path.display().to_string(),
            Sink::Writer { label, .. } => label.clone(),
            Sink::Console => "<console>".to_string(),
        }
    }

    pub fn is_console(&self) -> bool {
        matches!(self, Sink::Console)
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Sink::Writer { label, .. } => f.debug_struct("Writer").field("label", label).finish(),
            Sink::Console => f.write_str("Console"),
        }
    }
}

/// Render findings for delivery. An empty finding list renders as an empty
/// text message.
pub fn render(
    findings: &[String],
    format: OutputFormat,
    separator: &str,
    source: &str,
    rule_count: usize,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(findings.join(separator)),
        OutputFormat::Json => {
            let report = AuditReport::new(source.to_string(), rule_count, findings.to_vec());
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_text_rendering_uses_separator() {
        let findings = vec!["a".to_string(), "b".to_string()];
        let text = render(&findings, OutputFormat::Text, "\r\n", "x", 2).unwrap();
        assert_eq!(text, "a\r\nb");
        assert_eq!(render(&[], OutputFormat::Text, "\r\n", "x", 0).unwrap(), "");
    }

    #[test]
    fn test_json_rendering() {
        let findings = vec!["img tag is present in the html.".to_string()];
        let json = render(&findings, OutputFormat::Json, "\r\n", "index.html", 3).unwrap();
        let report: AuditReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.source, "index.html");
        assert_eq!(report.rule_count, 3);
        assert_eq!(report.findings, findings);
    }

    #[test]
    fn test_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");

        let mut sink = Sink::path(&path).unwrap();
        sink.deliver("line one\r\nline two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "line one\r\nline two");
    }

    #[test]
    fn test_writes_stream() {
        let buffer = SharedBuffer::default();
        let mut sink = Sink::writer("buffer", buffer.clone());
        sink.deliver("done").unwrap();
        assert_eq!(buffer.0.lock().unwrap().as_slice(), b"done");
    }

    #[test]
    fn test_stream_failure_is_write_error() {
        let mut sink = Sink::writer("full", FullDisk);
        assert!(matches!(sink.deliver("x"), Err(AuditError::SinkWrite(_))));
    }

    #[test]
    fn test_bad_destinations_fail_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Sink::path(dir.path()),
            Err(AuditError::Configuration(_))
        ));
        assert!(matches!(
            Sink::path(dir.path().join("missing").join("out.txt")),
            Err(AuditError::Configuration(_))
        ));
        assert!(Sink::path(dir.path().join("out.txt")).is_ok());
    }

    #[test]
    fn test_from_spec() {
        assert!(Sink::from_spec("console").unwrap().is_console());
        assert!(Sink::from_spec("-").unwrap().is_console());
        assert!(matches!(Sink::from_spec(""), Err(AuditError::Configuration(_))));
        assert!(matches!(Sink::from_spec("report.txt"), Ok(Sink::Path(_))));
    }
}
