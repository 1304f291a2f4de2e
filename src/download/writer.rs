//! Random-offset writer contract and progress instrumentation

use indicatif::ProgressBar;
use std::fs::File;
use std::io;
use std::sync::Arc;

/// Destination that accepts writes at arbitrary offsets. Parts of an object
/// arrive out of order from concurrent workers, so implementations must be
/// usable through a shared reference.
pub trait WriteAt: Send + Sync {
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()>;
}

impl WriteAt for File {
    #[cfg(unix)]
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        std::os::unix::fs::FileExt::write_all_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn write_at(&self, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
        use std::os::windows::fs::FileExt;
        while !buf.is_empty() {
            match self.seek_write(buf, offset) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => {
                    buf = &buf[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Receives the size of every successful write.
pub trait ProgressObserver: Send + Sync {
    fn on_write(&self, bytes: u64);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_write(&self, _bytes: u64) {}
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for Arc<T> {
    fn on_write(&self, bytes: u64) {
        (**self).on_write(bytes);
    }
}

impl<A: ProgressObserver, B: ProgressObserver> ProgressObserver for (A, B) {
    fn on_write(&self, bytes: u64) {
        self.0.on_write(bytes);
        self.1.on_write(bytes);
    }
}

impl ProgressObserver for ProgressBar {
    fn on_write(&self, bytes: u64) {
        self.inc(bytes);
    }
}

/// Wraps a writer and reports each write to an observer
pub struct ProgressWriter<W, O> {
    inner: W,
    observer: O,
}

impl<W: WriteAt, O: ProgressObserver> ProgressWriter<W, O> {
    pub fn new(inner: W, observer: O) -> Self {
        Self { inner, observer }
    }

}

impl<W: WriteAt, O: ProgressObserver> WriteAt for ProgressWriter<W, O> {
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        self.inner.write_at(buf, offset)?;
        self.observer.on_write(buf.len() as u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgressWriter, WriteAt};
    use crate::download::TransferState;
    use std::io::Read;
    use std::sync::Arc;

    #[test]
    fn file_writes_land_at_their_offsets() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_at(b"world", 6).unwrap();
        file.write_at(b"hello ", 0).unwrap();

        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello world");
    }

    #[test]
    fn progress_writer_reports_written_bytes() {
        let file = tempfile::tempfile().unwrap();
        let state = Arc::new(TransferState::new(8));
        let other = Arc::new(TransferState::new(8));
        let writer = ProgressWriter::new(file.try_clone().unwrap(), (state.clone(), other.clone()));

        writer.write_at(b"abcd", 4).unwrap();
        writer.write_at(b"ab", 0).unwrap();

        assert_eq!(state.bytes_written(), 6);
        assert_eq!(other.bytes_written(), 6);
        assert_eq!(state.percent(), 75);
        assert_eq!(file.metadata().unwrap().len(), 8);
    }
}
