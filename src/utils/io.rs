//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Read file contents with standardized error handling.
///
/// Wraps `fs::read_to_string` with consistent `Error::internal_io` formatting.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Writer that copies every write to all of its sinks, in order.
///
/// A failure on any sink fails the write; sinks before it have already
/// received the bytes.
pub struct BroadcastWriter<W> {
    sinks: Vec<W>,
}

impl<W: Write> BroadcastWriter<W> {
    pub fn new(sinks: Vec<W>) -> Self {
        Self { sinks }
    }

    pub fn into_inner(self) -> Vec<W> {
        self.sinks
    }
}

impl<W: Write> Write for BroadcastWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            sink.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

/// Write handle onto a writer shared through a mutex.
///
/// Each `write` holds the lock for the whole buffer, so chunks from
/// different handles interleave but never tear.
pub struct SharedWriter<'a, W: ?Sized> {
    inner: &'a Mutex<W>,
}

impl<'a, W: Write + ?Sized> SharedWriter<'a, W> {
    pub fn new(inner: &'a Mutex<W>) -> Self {
        Self { inner }
    }
}

impl<W: Write + ?Sized> Write for SharedWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("shared writer lock poisoned"))?;
        inner.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("shared writer lock poisoned"))?;
        inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn read_file_succeeds_for_existing_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "test content").unwrap();

        let content = read_file(temp.path(), "test read").unwrap();
        assert!(content.contains("test content"));
    }

    #[test]
    fn read_file_returns_error_for_missing_file() {
        let result = read_file(Path::new("/nonexistent/path.txt"), "test read");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }

    #[test]
    fn broadcast_writes_to_every_sink() {
        let mut writer = BroadcastWriter::new(vec![Vec::new(), Vec::new(), Vec::new()]);
        write!(writer, "hello {}", 42).unwrap();
        writer.flush().unwrap();

        for sink in writer.into_inner() {
            assert_eq!(sink, b"hello 42");
        }
    }

    #[test]
    fn broadcast_with_no_sinks_accepts_writes() {
        let mut writer: BroadcastWriter<Vec<u8>> = BroadcastWriter::new(Vec::new());
        assert_eq!(writer.write(b"dropped").unwrap(), 7);
    }

    #[test]
    fn shared_writers_append_to_one_target() {
        let target = Mutex::new(Vec::new());
        {
            let mut first = SharedWriter::new(&target);
            let mut second = SharedWriter::new(&target);
            first.write_all(b"one ").unwrap();
            second.write_all(b"two").unwrap();
        }
        assert_eq!(target.into_inner().unwrap(), b"one two");
    }

    #[test]
    fn broadcast_over_shared_writers() {
        let console = Mutex::new(Vec::new());
        let log = Mutex::new(Vec::new());
        {
            let mut writer =
                BroadcastWriter::new(vec![SharedWriter::new(&console), SharedWriter::new(&log)]);
            writer.write_all(b"line\n").unwrap();
        }
        assert_eq!(console.into_inner().unwrap(), b"line\n");
        assert_eq!(log.into_inner().unwrap(), b"line\n");
    }
}
