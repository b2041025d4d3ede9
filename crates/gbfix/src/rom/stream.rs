//! Byte-level access to one image
//!
//! A file fixed in place is read and written through the same seekable handle,
//! and its size is known before the first read. A pipe is read once from one
//! handle and written in full to another. [`RomStream`] hides the difference
//! so the fixer is written once.

use std::io::{self, Read, Seek, SeekFrom, Write};

/// Capabilities the fixer needs from an image's storage
pub trait RomStream {
    /// Total size of the image, when known before reading it
    ///
    /// Only storage that is rewritten in place knows its size; `Some` also
    /// means the fixer only needs to rewrite the bytes it changed.
    fn known_len(&self) -> Option<u64>;

    /// Fill `buf` from the input, stopping early only at end of input
    fn read_bank(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Move the output back to the start of the image
    fn rewind(&mut self) -> io::Result<()>;

    /// Move the output past the last byte of the image
    fn seek_end(&mut self) -> io::Result<()>;

    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Read until `buf` is full or the input ends, retrying interrupted reads
pub fn read_fully<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

/// An image read and rewritten through one seekable handle
pub struct InPlace<F> {
    file: F,
    len: u64,
}

impl<F: Read + Write + Seek> InPlace<F> {
    /// `len` must be the exact size of the image behind `file`
    pub fn new(file: F, len: u64) -> Self {
        Self { file, len }
    }

    pub fn into_inner(self) -> F {
        self.file
    }
}

impl<F: Read + Write + Seek> RomStream for InPlace<F> {
    fn known_len(&self) -> Option<u64> {
        Some(self.len)
    }

    fn read_bank(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_fully(&mut self.file, buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0)).map(|_| ())
    }

    fn seek_end(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::End(0)).map(|_| ())
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// An image streamed from one handle to another, e.g. stdin to stdout
pub struct Piped<R, W> {
    input: R,
    output: W,
}

impl<R: Read, W: Write> Piped<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: Read, W: Write> RomStream for Piped<R, W> {
    fn known_len(&self) -> Option<u64> {
        None
    }

    fn read_bank(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_fully(&mut self.input, buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn seek_end(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.output.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    /// Hands out at most `chunk` bytes per read, interrupting every other call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
        interrupt: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn test_read_fully_retries_and_accumulates() {
        let mut reader = Trickle {
            data: (0..100).collect(),
            pos: 0,
            chunk: 7,
            interrupt: false,
        };
        let mut buf = [0u8; 64];
        assert_eq!(read_fully(&mut reader, &mut buf).unwrap(), 64);
        assert_eq!(buf[63], 63);

        assert_eq!(read_fully(&mut reader, &mut buf).unwrap(), 36);
        assert_eq!(read_fully(&mut reader, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_fully_propagates_errors() {
        let mut buf = [0u8; 4];
        let err = read_fully(&mut Failing, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_in_place_rewrites_prefix() {
        let mut stream = InPlace::new(Cursor::new(vec![1u8; 8]), 8);
        assert_eq!(stream.known_len(), Some(8));

        let mut buf = [0u8; 16];
        assert_eq!(stream.read_bank(&mut buf).unwrap(), 8);
        stream.rewind().unwrap();
        stream.write_all(&[9, 9]).unwrap();
        stream.seek_end().unwrap();
        stream.write_all(&[7]).unwrap();

        assert_eq!(stream.into_inner().into_inner(), vec![9, 9, 1, 1, 1, 1, 1, 1, 7]);
    }

    #[test]
    fn test_piped_ignores_seeks() {
        let mut stream = Piped::new(Cursor::new(vec![1u8, 2, 3]), Vec::new());
        assert_eq!(stream.known_len(), None);

        let mut buf = [0u8; 2];
        assert_eq!(stream.read_bank(&mut buf).unwrap(), 2);
        stream.rewind().unwrap();
        stream.write_all(&buf).unwrap();
        stream.seek_end().unwrap();
        stream.write_all(&[4]).unwrap();
        stream.flush().unwrap();

        assert_eq!(stream.into_output(), vec![1, 2, 4]);
    }
}
