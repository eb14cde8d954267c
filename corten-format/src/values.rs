//! WebAssembly value representations.
//!
//! This module provides the datatype for WebAssembly values at runtime
//! and in constant instruction payloads. Floats are carried as raw bit
//! patterns ([`FloatBits32`]/[`FloatBits64`]) so NaN payloads are never
//! disturbed by passing values around.

use crate::prelude::{fmt, FloatBits32, FloatBits64, ValueType};

/// A WebAssembly runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float, stored as bits
    F32(FloatBits32),
    /// 64-bit float, stored as bits
    F64(FloatBits64),
}

impl Value {
    /// The default (zero) value for a given value type.
    #[must_use]
    pub const fn default_for_type(ty: ValueType) -> Self {
        match ty {
            ValueType::I32 => Self::I32(0),
            ValueType::I64 => Self::I64(0),
            ValueType::F32 => Self::F32(FloatBits32(0)),
            ValueType::F64 => Self::F64(FloatBits64(0)),
        }
    }

    /// The WebAssembly type of this value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::I32(_) => ValueType::I32,
            Self::I64(_) => ValueType::I64,
            Self::F32(_) => ValueType::F32,
            Self::F64(_) => ValueType::F64,
        }
    }

    /// Whether this value has the given type.
    #[must_use]
    pub const fn matches_type(&self, ty: ValueType) -> bool {
        matches!(
            (self, ty),
            (Self::I32(_), ValueType::I32)
                | (Self::I64(_), ValueType::I64)
                | (Self::F32(_), ValueType::F32)
                | (Self::F64(_), ValueType::F64)
        )
    }

    /// Extract an i32 if this is an `I32` value.
    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract an i64 if this is an `I64` value.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract the f32 bits if this is an `F32` value.
    #[must_use]
    pub const fn as_f32(&self) -> Option<FloatBits32> {
        match self {
            Self::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract the f64 bits if this is an `F64` value.
    #[must_use]
    pub const fn as_f64(&self) -> Option<FloatBits64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract an i32 reinterpreted as unsigned.
    #[must_use]
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            Self::I32(v) => Some(*v as u32),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::I32(v as i32)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::I64(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::F32(FloatBits32::from_float(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(FloatBits64::from_float(v))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "i32:{v}"),
            Self::I64(v) => write!(f, "i64:{v}"),
            Self::F32(v) => write!(f, "f32:{}", v.value()),
            Self::F64(v) => write!(f, "f64:{}", v.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_matching() {
        let v = Value::I32(42);
        assert!(v.matches_type(ValueType::I32));
        assert!(!v.matches_type(ValueType::I64));
        assert_eq!(v.as_i32(), Some(42));
        assert_eq!(v.as_i64(), None);
    }

    #[test]
    fn test_defaults_are_zero_bits() {
        assert_eq!(Value::default_for_type(ValueType::F64), Value::from(0.0f64));
        assert_eq!(Value::default_for_type(ValueType::I64), Value::I64(0));
    }

    #[test]
    fn test_nan_values_compare_by_bits() {
        let a = Value::F32(FloatBits32::NAN);
        let b = Value::F32(FloatBits32::NAN);
        assert_eq!(a, b);
        assert_ne!(a, Value::F32(FloatBits32::from_bits(0x7fc0_0001)));
    }
}
