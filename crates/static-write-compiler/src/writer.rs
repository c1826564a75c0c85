//! Destinations for extracted bytes.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::debug;

/// Something extracted bytes can be appended to.
pub trait ByteSink {
    /// Append `bytes` to whatever `path` names.
    fn append(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Appends to files on disk, creating them when absent.
///
/// Every call opens the file anew and issues a single buffer write, so
/// repeated runs keep growing the file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileAppender;

impl ByteSink for FileAppender {
    fn append(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(bytes)?;
        debug!(path = %path.display(), len = bytes.len(), "appended");
        Ok(())
    }
}

/// Collects appended bytes per path in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: FxHashMap<PathBuf, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything appended to `path` so far.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ByteSink for MemorySink {
    fn append(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.files
            .entry(path.to_path_buf())
            .or_default()
            .extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_appender_creates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut sink = FileAppender;
        sink.append(&path, b"abc").unwrap();
        sink.append(&path, &[0, 1]).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![b'a', b'b', b'c', 0, 1]);
    }

    #[test]
    fn file_appender_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.bin");

        let err = FileAppender.append(&path, b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_sink_accumulates_per_path() {
        let mut sink = MemorySink::new();
        sink.append(Path::new("a"), b"12").unwrap();
        sink.append(Path::new("b"), b"x").unwrap();
        sink.append(Path::new("a"), b"3").unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.contents("a"), Some(&b"123"[..]));
        assert_eq!(sink.contents("c"), None);
    }
}
