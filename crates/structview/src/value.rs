//! Semantically typed values produced by decoding a field.

use std::fmt;

/// A decoded field value.
///
/// Integers up to 32 bits and floats are plain numbers ([Value::Int],
/// [Value::Float]). 64-bit integers are wide integers ([Value::BigUint],
/// [Value::BigInt]) and never compare equal to plain numbers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value: end of data, insufficient bytes, or a decode failure.
    #[default]
    Null,
    Bool(bool),
    /// Integer from an 8, 16 or 32 bit field.
    Int(i64),
    /// Unsigned 64-bit integer.
    BigUint(u64),
    /// Signed 64-bit integer.
    BigInt(i64),
    Float(f64),
    String(String),
    /// Raw bytes (untyped struct fields).
    Bytes(Vec<u8>),
    /// Values of expanded children, or labels collected from bit descriptions.
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for plain numbers (not wide integers).
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Interprets the value as a non-negative count or length.
    ///
    /// Returns `None` for non-numeric values, negative numbers, and
    /// non-integral floats.
    pub fn as_count(&self) -> Option<u64> {
        match *self {
            Value::Int(v) | Value::BigInt(v) => u64::try_from(v).ok(),
            Value::BigUint(v) => Some(v),
            Value::Float(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Some(v as u64),
            _ => None,
        }
    }

    /// Strict equality: plain numbers compare numerically across
    /// [Value::Int] and [Value::Float], wide integers only match wide
    /// integers, everything else must match by variant.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::BigUint(a), Value::BigInt(b)) | (Value::BigInt(b), Value::BigUint(a)) => {
                u64::try_from(*b).is_ok_and(|b| b == *a)
            }
            (Value::Null, _) | (_, Value::Null) => false,
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) | Value::BigInt(v) => write!(f, "{v}"),
            Value::BigUint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) => f.write_str(&hex_dump(v)),
            Value::Array(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Lowercase hex pairs separated by single spaces.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{b:02x}"));
    }
    out
}
