use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// A cloneable in-memory sink.
///
/// The muxer owns its writer, so a caller that wants to read the produced
/// transport stream while the muxer is still alive (e.g. a segmenter cutting
/// HLS segments) keeps a clone of this handle and drains it with
/// [`SharedBuffer::take`].
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<BytesMut>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything written so far.
    pub fn take(&self) -> Bytes {
        self.inner.lock().split().freeze()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_storage() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.clone();

        writer.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(buffer.len(), 3);
        assert_eq!(&buffer.take()[..], &[1, 2, 3]);
        assert!(buffer.is_empty());

        writer.write_all(&[4]).unwrap();
        assert_eq!(&buffer.take()[..], &[4]);
    }
}
