//! Type registry: fixed sizes and decode rules for field kinds.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::value::{Value, hex_dump};

/// Byte order for multi-byte numeric kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

/// The closed set of field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Bytes,
    Struct,
    Script,
}

impl FieldKind {
    /// Fixed byte size, or `None` for variable-length kinds.
    pub fn size_of(self) -> Option<u64> {
        match self {
            FieldKind::Uint8 | FieldKind::Int8 => Some(1),
            FieldKind::Uint16 | FieldKind::Int16 => Some(2),
            FieldKind::Uint32 | FieldKind::Int32 | FieldKind::Float32 => Some(4),
            FieldKind::Uint64 | FieldKind::Int64 | FieldKind::Float64 => Some(8),
            FieldKind::String | FieldKind::Bytes | FieldKind::Struct | FieldKind::Script => None,
        }
    }

    /// Name used in project files.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Uint8 => "uint8",
            FieldKind::Uint16 => "uint16",
            FieldKind::Uint32 => "uint32",
            FieldKind::Uint64 => "uint64",
            FieldKind::Int8 => "int8",
            FieldKind::Int16 => "int16",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Float32 => "float32",
            FieldKind::Float64 => "float64",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Struct => "struct",
            FieldKind::Script => "script",
        }
    }

    /// Decodes `raw` (starting at its first byte) according to this kind.
    ///
    /// Returns `None` when `raw` is too short for a fixed-size kind. Script
    /// fields have no static decode rule and always yield `None`.
    pub fn decode(self, endianness: Endianness, raw: &[u8]) -> Option<Value> {
        if let Some(size) = self.size_of() {
            if (raw.len() as u64) < size {
                return None;
            }
        }

        let value = match self {
            FieldKind::Uint8 => Value::Int(i64::from(raw[0])),
            FieldKind::Int8 => Value::Int(i64::from(raw[0] as i8)),
            FieldKind::Uint16 => Value::Int(i64::from(read(endianness, raw, BigEndian::read_u16, LittleEndian::read_u16))),
            FieldKind::Int16 => Value::Int(i64::from(read(endianness, raw, BigEndian::read_i16, LittleEndian::read_i16))),
            FieldKind::Uint32 => Value::Int(i64::from(read(endianness, raw, BigEndian::read_u32, LittleEndian::read_u32))),
            FieldKind::Int32 => Value::Int(i64::from(read(endianness, raw, BigEndian::read_i32, LittleEndian::read_i32))),
            FieldKind::Uint64 => Value::BigUint(read(endianness, raw, BigEndian::read_u64, LittleEndian::read_u64)),
            FieldKind::Int64 => Value::BigInt(read(endianness, raw, BigEndian::read_i64, LittleEndian::read_i64)),
            FieldKind::Float32 => Value::Float(f64::from(read(endianness, raw, BigEndian::read_f32, LittleEndian::read_f32))),
            FieldKind::Float64 => Value::Float(read(endianness, raw, BigEndian::read_f64, LittleEndian::read_f64)),
            FieldKind::String => Value::String(String::from_utf8_lossy(raw).into_owned()),
            FieldKind::Bytes => Value::String(hex_dump(raw)),
            FieldKind::Struct => Value::Bytes(raw.to_vec()),
            FieldKind::Script => return None,
        };

        Some(value)
    }
}

fn read<T>(
    endianness: Endianness,
    raw: &[u8],
    big: fn(&[u8]) -> T,
    little: fn(&[u8]) -> T,
) -> T {
    match endianness {
        Endianness::Big => big(raw),
        Endianness::Little => little(raw),
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::KindDef> for FieldKind {
    fn from(value: crate::serde::KindDef) -> Self {
        match value {
            crate::serde::KindDef::Uint8 => FieldKind::Uint8,
            crate::serde::KindDef::Uint16 => FieldKind::Uint16,
            crate::serde::KindDef::Uint32 => FieldKind::Uint32,
            crate::serde::KindDef::Uint64 => FieldKind::Uint64,
            crate::serde::KindDef::Int8 => FieldKind::Int8,
            crate::serde::KindDef::Int16 => FieldKind::Int16,
            crate::serde::KindDef::Int32 => FieldKind::Int32,
            crate::serde::KindDef::Int64 => FieldKind::Int64,
            crate::serde::KindDef::Float32 => FieldKind::Float32,
            crate::serde::KindDef::Float64 => FieldKind::Float64,
            crate::serde::KindDef::String => FieldKind::String,
            crate::serde::KindDef::Bytes => FieldKind::Bytes,
            crate::serde::KindDef::Struct => FieldKind::Struct,
            crate::serde::KindDef::Script => FieldKind::Script,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::EndiannessDef> for Endianness {
    fn from(value: crate::serde::EndiannessDef) -> Self {
        match value {
            crate::serde::EndiannessDef::Big => Endianness::Big,
            crate::serde::EndiannessDef::Little => Endianness::Little,
        }
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "uint8" => FieldKind::Uint8,
            "uint16" => FieldKind::Uint16,
            "uint32" => FieldKind::Uint32,
            "uint64" => FieldKind::Uint64,
            "int8" => FieldKind::Int8,
            "int16" => FieldKind::Int16,
            "int32" => FieldKind::Int32,
            "int64" => FieldKind::Int64,
            "float32" => FieldKind::Float32,
            "float64" => FieldKind::Float64,
            "string" => FieldKind::String,
            "bytes" => FieldKind::Bytes,
            "struct" => FieldKind::Struct,
            "script" => FieldKind::Script,
            other => return Err(format!("unknown field type `{other}`")),
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_of() {
        assert_eq!(FieldKind::Uint8.size_of(), Some(1));
        assert_eq!(FieldKind::Int16.size_of(), Some(2));
        assert_eq!(FieldKind::Float32.size_of(), Some(4));
        assert_eq!(FieldKind::Uint64.size_of(), Some(8));
        assert_eq!(FieldKind::String.size_of(), None);
        assert_eq!(FieldKind::Struct.size_of(), None);
    }

    #[test]
    fn test_decode_endianness() {
        let raw = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(FieldKind::Uint16.decode(Endianness::Big, &raw), Some(Value::Int(0x0102)));
        assert_eq!(FieldKind::Uint16.decode(Endianness::Little, &raw), Some(Value::Int(0x0201)));
        assert_eq!(FieldKind::Uint32.decode(Endianness::Little, &raw), Some(Value::Int(0x04030201)));
    }

    #[test]
    fn test_decode_signed() {
        assert_eq!(FieldKind::Int8.decode(Endianness::Big, &[0xff]), Some(Value::Int(-1)));
        assert_eq!(FieldKind::Int16.decode(Endianness::Big, &[0xff, 0xfe]), Some(Value::Int(-2)));
        assert_eq!(
            FieldKind::Int64.decode(Endianness::Little, &[0xff; 8]),
            Some(Value::BigInt(-1))
        );
    }

    #[test]
    fn test_decode_wide_and_float() {
        let raw = [0x40, 0x49, 0x0f, 0xdb];
        assert_eq!(
            FieldKind::Float32.decode(Endianness::Big, &raw),
            Some(Value::Float(f64::from(f32::from_bits(0x40490FDB))))
        );
        assert_eq!(
            FieldKind::Uint64.decode(Endianness::Big, &[0, 0, 0, 0, 0, 0, 1, 0]),
            Some(Value::BigUint(256))
        );
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(FieldKind::Uint32.decode(Endianness::Big, &[0x01, 0x02]), None);
        assert_eq!(FieldKind::Uint8.decode(Endianness::Big, &[]), None);
    }

    #[test]
    fn test_decode_text_kinds() {
        assert_eq!(
            FieldKind::String.decode(Endianness::Big, b"Hello"),
            Some(Value::String("Hello".to_string()))
        );
        assert_eq!(
            FieldKind::Bytes.decode(Endianness::Big, &[0xde, 0xad]),
            Some(Value::String("de ad".to_string()))
        );
        assert_eq!(
            FieldKind::Struct.decode(Endianness::Big, &[0x01]),
            Some(Value::Bytes(vec![0x01]))
        );
    }

    #[test]
    fn test_kind_names() {
        for kind in [FieldKind::Uint8, FieldKind::Int64, FieldKind::Bytes, FieldKind::Script] {
            assert_eq!(kind.name().parse::<FieldKind>(), Ok(kind));
        }
        assert!("uint128".parse::<FieldKind>().is_err());
    }
}
