//! Scalar values and relational comparison.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::escape::escape_attr;
use crate::types::TypeKind;

/// A value held by a scalar variable.
///
/// There is exactly one variant per scalar [`TypeKind`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Unsigned 8-bit integer.
    Byte(u8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Single precision float.
    Float32(f32),
    /// Double precision float.
    Float64(f64),
    /// Text.
    Str(String),
    /// URL text.
    Url(String),
}

impl Value {
    /// Returns the zero value of a scalar kind, or `None` for container kinds.
    #[must_use]
    pub fn zero(kind: TypeKind) -> Option<Self> {
        let value = match kind {
            TypeKind::Byte => Self::Byte(0),
            TypeKind::Int16 => Self::Int16(0),
            TypeKind::UInt16 => Self::UInt16(0),
            TypeKind::Int32 => Self::Int32(0),
            TypeKind::UInt32 => Self::UInt32(0),
            TypeKind::Int64 => Self::Int64(0),
            TypeKind::UInt64 => Self::UInt64(0),
            TypeKind::Float32 => Self::Float32(0.0),
            TypeKind::Float64 => Self::Float64(0.0),
            TypeKind::String => Self::Str(String::new()),
            TypeKind::Url => Self::Url(String::new()),
            TypeKind::Array | TypeKind::Record | TypeKind::Table => return None,
        };
        Some(value)
    }

    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Byte(_) => TypeKind::Byte,
            Self::Int16(_) => TypeKind::Int16,
            Self::UInt16(_) => TypeKind::UInt16,
            Self::Int32(_) => TypeKind::Int32,
            Self::UInt32(_) => TypeKind::UInt32,
            Self::Int64(_) => TypeKind::Int64,
            Self::UInt64(_) => TypeKind::UInt64,
            Self::Float32(_) => TypeKind::Float32,
            Self::Float64(_) => TypeKind::Float64,
            Self::Str(_) => TypeKind::String,
            Self::Url(_) => TypeKind::Url,
        }
    }

    /// Returns the value as an exact integer, for the integer family.
    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::Byte(v) => Some(v.into()),
            Self::Int16(v) => Some(v.into()),
            Self::UInt16(v) => Some(v.into()),
            Self::Int32(v) => Some(v.into()),
            Self::UInt32(v) => Some(v.into()),
            Self::Int64(v) => Some(v.into()),
            Self::UInt64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Returns the value promoted to `f64`, for any numeric kind.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float32(v) => Some(f64::from(v)),
            Self::Float64(v) => Some(v),
            _ => self.as_integer().map(|v| v as f64),
        }
    }

    /// Returns the text of a `Str` or `Url` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Url(s) => Some(s),
            _ => None,
        }
    }

    /// Compares this value against `other` with the given operator.
    ///
    /// Integers compare exactly regardless of signedness, any float
    /// operand promotes both sides to `f64`, and text compares lexically.
    /// Pairings with no defined comparison yield `Ok(false)`.
    ///
    /// # Errors
    /// Returns a parse error if `op` is [`RelOp::Regexp`] and the right-hand
    /// text is not a valid regular expression.
    pub fn compare(&self, other: &Value, op: RelOp) -> Result<bool> {
        if let (Some(a), Some(b)) = (self.as_integer(), other.as_integer()) {
            return Ok(op.holds(Some(a.cmp(&b))));
        }
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return Ok(op.holds(a.partial_cmp(&b)));
        }
        if let (Some(a), Some(b)) = (self.as_str(), other.as_str()) {
            if op == RelOp::Regexp {
                let pattern = Regex::new(b)
                    .map_err(|e| Error::parse(format!("invalid regular expression '{b}': {e}")))?;
                return Ok(pattern.is_match(a));
            }
            return Ok(op.holds(Some(a.cmp(b))));
        }
        Ok(false)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Str(s) | Self::Url(s) => write!(f, "\"{}\"", escape_attr(s)),
        }
    }
}

/// Relational operators of selection clauses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RelOp {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `=~`
    Regexp,
}

impl RelOp {
    /// Returns the operator's source symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Regexp => "=~",
        }
    }

    /// Parses an operator symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "=" => Self::Equal,
            "!=" => Self::NotEqual,
            ">" => Self::Greater,
            ">=" => Self::GreaterEqual,
            "<" => Self::Less,
            "<=" => Self::LessEqual,
            "=~" => Self::Regexp,
            _ => return None,
        };
        Some(op)
    }

    /// Decides the operator from an ordering.
    ///
    /// `None` (unordered, e.g. NaN) satisfies only `!=`.
    #[must_use]
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        let Some(ordering) = ordering else {
            return self == Self::NotEqual;
        };
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::Greater => ordering == Ordering::Greater,
            Self::GreaterEqual => ordering != Ordering::Less,
            Self::Less => ordering == Ordering::Less,
            Self::LessEqual => ordering != Ordering::Greater,
            Self::Regexp => false,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
