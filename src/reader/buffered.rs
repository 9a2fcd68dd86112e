//! Buffered input collection
//!
//! The parser works on one contiguous byte slice, so stream input is read
//! to the end in fixed-size chunks before parsing starts.

use std::io::{ErrorKind, Read};

/// Bytes requested from the source per read
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Chunked reader accumulating a whole stream
pub struct BufferedReader<R: Read> {
    reader: R,
    chunk: Vec<u8>,
    data: Vec<u8>,
    eof: bool,
}

impl<R: Read> BufferedReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        BufferedReader {
            reader,
            chunk: vec![0u8; capacity.max(1)],
            data: Vec::new(),
            eof: false,
        }
    }

    /// Read one chunk; Ok(false) once the source is exhausted
    pub fn fill_buffer(&mut self) -> std::io::Result<bool> {
        if self.eof {
            return Ok(false);
        }
        loop {
            match self.reader.read(&mut self.chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.data.extend_from_slice(&self.chunk[..n]);
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Bytes collected so far
    pub fn buffered(&self) -> usize {
        self.data.len()
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Drain the source and return everything read
    pub fn into_bytes(mut self) -> std::io::Result<Vec<u8>> {
        while self.fill_buffer()? {}
        tracing::trace!(bytes = self.data.len(), "input read");
        Ok(self.data)
    }
}

/// Read a whole stream into memory
pub fn read_all<R: Read>(reader: R) -> std::io::Result<Vec<u8>> {
    BufferedReader::new(reader).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_all() {
        let data = read_all(Cursor::new(b"<root/>".to_vec())).unwrap();
        assert_eq!(data, b"<root/>");
    }

    #[test]
    fn test_small_chunks() {
        let input = "<a>".repeat(100);
        let mut reader = BufferedReader::with_capacity(Cursor::new(input.clone()), 7);
        assert!(reader.fill_buffer().unwrap());
        assert_eq!(reader.buffered(), 7);
        let data = reader.into_bytes().unwrap();
        assert_eq!(data, input.as_bytes());
    }

    struct Flaky {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::new(ErrorKind::Interrupted, "retry"));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_interrupted_is_retried() {
        let flaky = Flaky { interrupted: false, inner: Cursor::new(b"<x/>".to_vec()) };
        assert_eq!(read_all(flaky).unwrap(), b"<x/>");
    }

    #[test]
    fn test_empty_stream() {
        let mut reader = BufferedReader::new(Cursor::new(Vec::new()));
        assert!(!reader.fill_buffer().unwrap());
        assert!(reader.is_eof());
    }
}
