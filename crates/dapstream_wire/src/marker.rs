//! Reserved bytes framing streamed table rows.

use std::fmt;

/// A table framing marker.
///
/// Every transmitted row is framed by one [`Marker::Instance`] and the
/// row stream is closed by one [`Marker::EndOfSequence`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Marker {
    /// One row follows.
    Instance = 0x5A,
    /// No more rows.
    EndOfSequence = 0xA5,
}

impl Marker {
    /// Returns the byte written for this marker.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Decodes a marker byte, returning `None` for any other value.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x5A => Some(Self::Instance),
            0xA5 => Some(Self::EndOfSequence),
            _ => None,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance => write!(f, "instance marker (0x{:02x})", self.byte()),
            Self::EndOfSequence => write!(f, "end-of-sequence marker (0x{:02x})", self.byte()),
        }
    }
}
