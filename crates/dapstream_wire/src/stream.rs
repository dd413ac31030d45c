//! Marshaller implementations over `std::io`.

use std::io::{self, Read, Write};

use dapstream_foundation::{Error, ErrorKind, Result};
use tracing::trace;

use crate::marshal::{Marshaller, UnMarshaller};

/// Default upper bound for a decoded string length prefix (16 MiB).
pub const DEFAULT_MAX_STRING_LEN: u32 = 16 * 1024 * 1024;

/// Encodes primitives into any [`Write`] sink.
///
/// An optional byte budget turns oversized responses into
/// [`ErrorKind::ResponseTooBig`] before the offending bytes are written.
#[derive(Debug)]
pub struct StreamMarshaller<W: Write> {
    sink: W,
    written: u64,
    limit: Option<u64>,
}

impl<W: Write> StreamMarshaller<W> {
    /// Creates a marshaller with no byte budget.
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            written: 0,
            limit: None,
        }
    }

    /// Sets the byte budget.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Flushes the underlying sink.
    ///
    /// # Errors
    /// Returns an I/O error if the sink fails to flush.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush().map_err(Error::from)
    }

    /// Returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Returns a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let len = bytes.len() as u64;
        if let Some(limit) = self.limit {
            if self.written + len > limit {
                return Err(Error::new(ErrorKind::ResponseTooBig { limit }));
            }
        }
        self.sink.write_all(bytes)?;
        self.written += len;
        Ok(())
    }

    fn write_fixed<const LEN: usize>(&mut self, bytes: [u8; LEN]) -> Result<()> {
        self.write_bytes(&bytes)
    }
}

impl<W: Write> Marshaller for StreamMarshaller<W> {
    fn put_byte(&mut self, value: u8) -> Result<()> {
        self.write_fixed([value])
    }

    fn put_int16(&mut self, value: i16) -> Result<()> {
        self.write_fixed(value.to_be_bytes())
    }

    fn put_uint16(&mut self, value: u16) -> Result<()> {
        self.write_fixed(value.to_be_bytes())
    }

    fn put_int32(&mut self, value: i32) -> Result<()> {
        self.write_fixed(value.to_be_bytes())
    }

    fn put_uint32(&mut self, value: u32) -> Result<()> {
        self.write_fixed(value.to_be_bytes())
    }

    fn put_int64(&mut self, value: i64) -> Result<()> {
        self.write_fixed(value.to_be_bytes())
    }

    fn put_uint64(&mut self, value: u64) -> Result<()> {
        self.write_fixed(value.to_be_bytes())
    }

    fn put_float32(&mut self, value: f32) -> Result<()> {
        self.write_fixed(value.to_bits().to_be_bytes())
    }

    fn put_float64(&mut self, value: f64) -> Result<()> {
        self.write_fixed(value.to_bits().to_be_bytes())
    }

    fn put_str(&mut self, value: &str) -> Result<()> {
        self.put_length(value.len())?;
        self.write_bytes(value.as_bytes())
    }

    fn bytes_written(&self) -> u64 {
        self.written
    }
}

/// Decodes primitives from any [`Read`] source.
#[derive(Debug)]
pub struct StreamUnMarshaller<R: Read> {
    source: R,
    consumed: u64,
    max_string_len: u32,
}

impl<R: Read> StreamUnMarshaller<R> {
    /// Creates an unmarshaller with the default string length guard.
    #[must_use]
    pub fn new(source: R) -> Self {
        Self {
            source,
            consumed: 0,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }

    /// Sets the largest string length prefix accepted.
    #[must_use]
    pub fn with_max_string_len(mut self, max: u32) -> Self {
        self.max_string_len = max;
        self
    }

    /// Returns the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn read_fixed<const LEN: usize>(&mut self) -> Result<[u8; LEN]> {
        let mut buf = [0u8; LEN];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.source.read_exact(buf) {
            Ok(()) => {
                self.consumed += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                trace!(offset = self.consumed, wanted = buf.len(), "stream ended early");
                Err(Error::new(ErrorKind::Io(format!(
                    "unexpected end of stream at byte {}",
                    self.consumed
                ))))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<R: Read> UnMarshaller for StreamUnMarshaller<R> {
    fn get_byte(&mut self) -> Result<u8> {
        let [b] = self.read_fixed::<1>()?;
        Ok(b)
    }

    fn get_int16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_fixed()?))
    }

    fn get_uint16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_fixed()?))
    }

    fn get_int32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_fixed()?))
    }

    fn get_uint32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_fixed()?))
    }

    fn get_int64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_fixed()?))
    }

    fn get_uint64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_fixed()?))
    }

    fn get_float32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(u32::from_be_bytes(self.read_fixed()?)))
    }

    fn get_float64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(u64::from_be_bytes(self.read_fixed()?)))
    }

    fn get_str(&mut self) -> Result<String> {
        let len = self.get_uint32()?;
        if len > self.max_string_len {
            return Err(Error::framing(format!(
                "string length {len} exceeds limit {}",
                self.max_string_len
            )));
        }
        let mut buf = vec![0u8; len as usize];
        self.read_into(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::framing(format!("invalid UTF-8 in string: {e}")))
    }

    fn bytes_read(&self) -> u64 {
        self.consumed
    }
}
