// Input acquisition
//
// Supplies the raw document text to the auditor. Everything about paths and
// streams stays here; the rule engine only ever sees a materialized string.

use crate::error::{AuditError, Result};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Where the raw document comes from
pub enum Source {
    /// An existing file on disk
    Path(PathBuf),
    /// An already-open stream, read to the end once
    Reader {
        label: String,
        reader: Box<dyn Read + Send>,
    },
    /// An in-memory document
    Text(String),
}

impl Source {
    /// File source. Fails fast when the path is not an existing file.
    pub fn path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(AuditError::config(format!(
                "input path {} does not reference an existing file",
                path.display()
            )));
        }
        Ok(Source::Path(path))
    }

    pub fn reader(label: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Source::Reader {
            label: label.into(),
            reader: Box::new(reader),
        }
    }

    pub fn stdin() -> Self {
        Self::reader("<stdin>", io::stdin())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Source::Text(text.into())
    }

    /// Resolve a CLI/config value: `-` is stdin, anything else a file path.
    pub fn from_spec(spec: &str) -> Result<Self> {
        match spec.trim() {
            "" => Err(AuditError::config("input source is empty")),
            "-" => Ok(Self::stdin()),
            path => Self::path(path),
        }
    }

    /// Read the whole document.
    pub fn read(&mut self) -> Result<String> {
        match self {
            Source::Path(path) => fs::read_to_string(path).map_err(AuditError::SourceRead),
            Source::Reader { reader, .. } => {
                let mut text = String::new();
                reader
                    .read_to_string(&mut text)
                    .map_err(AuditError::SourceRead)?;
                Ok(text)
            }
            Source::Text(text) => Ok(text.clone()),
        }
    }

    /// Human-readable origin, used in reports and status lines
    pub fn describe(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Reader { label, .. } => label.clone(),
            Source::Text(_) => "<memory>".to_string(),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Source::Reader { label, .. } => f.debug_struct("Reader").field("label", label).finish(),
            Source::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"))
        }
    }

    #[test]
    fn test_missing_path_fails_at_construction() {
        let err = Source::path("/no/such/index.html").unwrap_err();
        assert!(matches!(err, AuditError::Configuration(_)));
    }

    #[test]
    fn test_directory_is_not_a_valid_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Source::path(dir.path()),
            Err(AuditError::Configuration(_))
        ));
    }

    #[test]
    fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        fs::write(&path, "<html>\n  <title>x</title>\n</html>").unwrap();

        let mut source = Source::path(&path).unwrap();
        assert_eq!(source.read().unwrap(), "<html>\n  <title>x</title>\n</html>");
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[test]
    fn test_reads_stream_and_text() {
        let mut source = Source::reader("bytes", io::Cursor::new(b"<p>hi</p>".to_vec()));
        assert_eq!(source.read().unwrap(), "<p>hi</p>");
        assert_eq!(source.describe(), "bytes");

        let mut source = Source::text("<p/>");
        assert_eq!(source.read().unwrap(), "<p/>");
    }

    #[test]
    fn test_stream_failure_is_read_error() {
        let mut source = Source::reader("broken", BrokenReader);
        assert!(matches!(source.read(), Err(AuditError::SourceRead(_))));
    }

    #[test]
    fn test_from_spec() {
        assert!(matches!(Source::from_spec("-"), Ok(Source::Reader { .. })));
        assert!(matches!(
            Source::from_spec("  "),
            Err(AuditError::Configuration(_))
        ));
        assert!(matches!(
            Source::from_spec("/no/such/file.html"),
            Err(AuditError::Configuration(_))
        ));
    }
}
