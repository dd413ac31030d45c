//! The byte sink and byte source traits.
//!
//! Variables never touch byte order themselves: they call one `put_*`
//! or `get_*` method per primitive and leave the encoding to these traits.

use dapstream_foundation::{Error, Result, TypeKind, Value};

use crate::marker::Marker;

/// A sink for primitive values.
///
/// A failed call leaves the stream in an unspecified state; callers must
/// abandon the whole transfer rather than retry.
pub trait Marshaller {
    /// Writes an unsigned 8-bit integer.
    fn put_byte(&mut self, value: u8) -> Result<()>;
    /// Writes a signed 16-bit integer.
    fn put_int16(&mut self, value: i16) -> Result<()>;
    /// Writes an unsigned 16-bit integer.
    fn put_uint16(&mut self, value: u16) -> Result<()>;
    /// Writes a signed 32-bit integer.
    fn put_int32(&mut self, value: i32) -> Result<()>;
    /// Writes an unsigned 32-bit integer.
    fn put_uint32(&mut self, value: u32) -> Result<()>;
    /// Writes a signed 64-bit integer.
    fn put_int64(&mut self, value: i64) -> Result<()>;
    /// Writes an unsigned 64-bit integer.
    fn put_uint64(&mut self, value: u64) -> Result<()>;
    /// Writes a single precision float.
    fn put_float32(&mut self, value: f32) -> Result<()>;
    /// Writes a double precision float.
    fn put_float64(&mut self, value: f64) -> Result<()>;
    /// Writes length-prefixed text.
    fn put_str(&mut self, value: &str) -> Result<()>;

    /// Writes a length-prefixed URL.
    fn put_url(&mut self, value: &str) -> Result<()> {
        self.put_str(value)
    }

    /// Writes an element count.
    fn put_length(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| Error::framing(format!("element count {count} does not fit in u32")))?;
        self.put_uint32(count)
    }

    /// Writes a table framing marker.
    fn put_marker(&mut self, marker: Marker) -> Result<()> {
        self.put_byte(marker.byte())
    }

    /// Writes any scalar value using the method for its kind.
    fn put_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Byte(v) => self.put_byte(*v),
            Value::Int16(v) => self.put_int16(*v),
            Value::UInt16(v) => self.put_uint16(*v),
            Value::Int32(v) => self.put_int32(*v),
            Value::UInt32(v) => self.put_uint32(*v),
            Value::Int64(v) => self.put_int64(*v),
            Value::UInt64(v) => self.put_uint64(*v),
            Value::Float32(v) => self.put_float32(*v),
            Value::Float64(v) => self.put_float64(*v),
            Value::Str(v) => self.put_str(v),
            Value::Url(v) => self.put_url(v),
        }
    }

    /// Number of bytes written so far.
    fn bytes_written(&self) -> u64;
}

/// A source of primitive values.
pub trait UnMarshaller {
    /// Reads an unsigned 8-bit integer.
    fn get_byte(&mut self) -> Result<u8>;
    /// Reads a signed 16-bit integer.
    fn get_int16(&mut self) -> Result<i16>;
    /// Reads an unsigned 16-bit integer.
    fn get_uint16(&mut self) -> Result<u16>;
    /// Reads a signed 32-bit integer.
    fn get_int32(&mut self) -> Result<i32>;
    /// Reads an unsigned 32-bit integer.
    fn get_uint32(&mut self) -> Result<u32>;
    /// Reads a signed 64-bit integer.
    fn get_int64(&mut self) -> Result<i64>;
    /// Reads an unsigned 64-bit integer.
    fn get_uint64(&mut self) -> Result<u64>;
    /// Reads a single precision float.
    fn get_float32(&mut self) -> Result<f32>;
    /// Reads a double precision float.
    fn get_float64(&mut self) -> Result<f64>;
    /// Reads length-prefixed text.
    fn get_str(&mut self) -> Result<String>;

    /// Reads a length-prefixed URL.
    fn get_url(&mut self) -> Result<String> {
        self.get_str()
    }

    /// Reads an element count.
    fn get_length(&mut self) -> Result<usize> {
        let count = self.get_uint32()?;
        usize::try_from(count)
            .map_err(|_| Error::framing(format!("element count {count} does not fit in usize")))
    }

    /// Reads one marker byte.
    ///
    /// Returns the raw byte so callers can report unexpected values.
    fn get_marker(&mut self) -> Result<u8> {
        self.get_byte()
    }

    /// Reads a scalar value of the given kind.
    ///
    /// # Errors
    /// Returns an internal error for container kinds.
    fn get_value(&mut self, kind: TypeKind) -> Result<Value> {
        let value = match kind {
            TypeKind::Byte => Value::Byte(self.get_byte()?),
            TypeKind::Int16 => Value::Int16(self.get_int16()?),
            TypeKind::UInt16 => Value::UInt16(self.get_uint16()?),
            TypeKind::Int32 => Value::Int32(self.get_int32()?),
            TypeKind::UInt32 => Value::UInt32(self.get_uint32()?),
            TypeKind::Int64 => Value::Int64(self.get_int64()?),
            TypeKind::UInt64 => Value::UInt64(self.get_uint64()?),
            TypeKind::Float32 => Value::Float32(self.get_float32()?),
            TypeKind::Float64 => Value::Float64(self.get_float64()?),
            TypeKind::String => Value::Str(self.get_str()?),
            TypeKind::Url => Value::Url(self.get_url()?),
            TypeKind::Array | TypeKind::Record | TypeKind::Table => {
                return Err(Error::internal(format!(
                    "{kind} is not a scalar kind and has no primitive encoding"
                )));
            }
        };
        Ok(value)
    }

    /// Number of bytes consumed so far.
    fn bytes_read(&self) -> u64;
}
