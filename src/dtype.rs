//! Storage representations and the ordered candidate lists used during
//! type selection.
//!
//! Every column in a [`Frame`](crate::frame::Frame) is stored as one of the
//! [`DType`] variants. The integral candidates are scanned narrowest first;
//! the first one whose range covers a column's envelope wins and the 64-bit
//! fallback of the same signedness is used when none does.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    Float32,
    Float64,
    Text,
    Category,
    DateTime,
}

/// Coarse kind used to route a column to a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Integral,
    Real,
    Other,
}

pub const UNSIGNED_CANDIDATES: [DType; 3] = [DType::UInt8, DType::UInt16, DType::UInt32];
pub const UNSIGNED_FALLBACK: DType = DType::UInt64;
pub const SIGNED_CANDIDATES: [DType; 3] = [DType::Int8, DType::Int16, DType::Int32];
pub const SIGNED_FALLBACK: DType = DType::Int64;

/// Exclusive bound for half precision selection.
pub const FLOAT16_LIMIT: f64 = 100.0;
/// Exclusive bound for single precision selection.
pub const FLOAT32_LIMIT: f64 = 1e6;

impl DType {
    pub fn kind(self) -> Kind {
        match self {
            DType::UInt8
            | DType::UInt16
            | DType::UInt32
            | DType::UInt64
            | DType::Int8
            | DType::Int16
            | DType::Int32
            | DType::Int64 => Kind::Integral,
            DType::Float16 | DType::Float32 | DType::Float64 => Kind::Real,
            DType::Bool | DType::Text | DType::Category | DType::DateTime => Kind::Other,
        }
    }

    /// Inclusive value range of an integer representation.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            DType::UInt8 => (0, u8::MAX as i128),
            DType::UInt16 => (0, u16::MAX as i128),
            DType::UInt32 => (0, u32::MAX as i128),
            DType::UInt64 => (0, u64::MAX as i128),
            DType::Int8 => (i8::MIN as i128, i8::MAX as i128),
            DType::Int16 => (i16::MIN as i128, i16::MAX as i128),
            DType::Int32 => (i32::MIN as i128, i32::MAX as i128),
            DType::Int64 => (i64::MIN as i128, i64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    /// Bytes occupied by one cell of fixed-width storage.
    pub fn width(self) -> Option<usize> {
        match self {
            DType::Bool | DType::UInt8 | DType::Int8 => Some(1),
            DType::UInt16 | DType::Int16 | DType::Float16 => Some(2),
            DType::UInt32 | DType::Int32 | DType::Float32 => Some(4),
            DType::UInt64 | DType::Int64 | DType::Float64 => Some(8),
            DType::Text | DType::Category | DType::DateTime => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float16 => "float16",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Text => "text",
            DType::Category => "category",
            DType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
