//! Type tags for every variable kind.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of a variable.
///
/// Fixed when the variable is constructed and never changed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeKind {
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// IEEE-754 single precision.
    Float32,
    /// IEEE-754 double precision.
    Float64,
    /// UTF-8 text.
    String,
    /// A URL, stored and transmitted like text.
    Url,
    /// N-dimensional array of one element kind.
    Array,
    /// Fixed-arity constructor (struct-like).
    Record,
    /// Unbounded row collection (sequence).
    Table,
}

impl TypeKind {
    /// All scalar kinds in declaration order.
    pub const SCALARS: [TypeKind; 11] = [
        Self::Byte,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::String,
        Self::Url,
    ];

    /// Returns true for leaf kinds that hold a single [`Value`](crate::Value).
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !self.is_container()
    }

    /// Returns true for kinds that own other variables.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Record | Self::Table)
    }

    /// Returns true for constructor kinds (Record and Table).
    #[must_use]
    pub const fn is_constructor(self) -> bool {
        matches!(self, Self::Record | Self::Table)
    }

    /// Returns true for fixed-width numeric kinds.
    #[must_use]
    pub const fn is_cardinal(self) -> bool {
        self.wire_width().is_some()
    }

    /// Returns true for the integer family.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    /// Returns true for the floating family.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Returns true for text kinds.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::String | Self::Url)
    }

    /// Encoded width on the wire, for fixed-width kinds.
    #[must_use]
    pub const fn wire_width(self) -> Option<usize> {
        match self {
            Self::Byte => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(8),
            _ => None,
        }
    }

    /// The keyword used for this kind in declaration text.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::String => "String",
            Self::Url => "Url",
            Self::Array => "Array",
            Self::Record => "Structure",
            Self::Table => "Sequence",
        }
    }

    /// Parses a declaration keyword.
    ///
    /// Accepts the Rust-side names `Record` and `Table` as aliases.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "Byte" => Self::Byte,
            "Int16" => Self::Int16,
            "UInt16" => Self::UInt16,
            "Int32" => Self::Int32,
            "UInt32" => Self::UInt32,
            "Int64" => Self::Int64,
            "UInt64" => Self::UInt64,
            "Float32" => Self::Float32,
            "Float64" => Self::Float64,
            "String" | "Str" => Self::String,
            "Url" => Self::Url,
            "Structure" | "Record" => Self::Record,
            "Sequence" | "Table" => Self::Table,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
